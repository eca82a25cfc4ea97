//! Attribute and category assembly.
//!
//! Builds model objects from resolved category entries. Used for both
//! request categories and the echoed categories of a response result.

use kimberlite_xacml_types::{Attribute, DataTypeRegistry, RequestAttributes};
use tracing::trace;

use crate::category::CategorySpec;
use crate::coerce::{coerce_values, declared_data_type};
use crate::content;
use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::reader::{JsonObject, objects};

const ATTRIBUTE_KEYS: &[&str] = &[
    "AttributeId",
    "Id",
    "Issuer",
    "IncludeInResult",
    "DataType",
    "Value",
];

const CATEGORY_KEYS: &[&str] = &["CategoryId", "Id", "Attribute", "Content"];

/// Assembles one attribute object belonging to `category_id`.
///
/// The identifier is given as `AttributeId` or its alias `Id`, never both.
pub fn attribute(
    registry: &DataTypeRegistry,
    object: &JsonObject,
    category_id: &str,
    path: &JsonPath,
) -> Result<Attribute> {
    object.ensure_keys(path, ATTRIBUTE_KEYS)?;

    let attribute_id = match (object.get("AttributeId"), object.get("Id")) {
        (Some(_), Some(_)) => {
            return Err(StructureError::Invalid {
                path: path.to_string(),
                message: "AttributeId and Id are mutually exclusive".to_string(),
            });
        }
        (Some(node), None) => node.as_str(&path.field("AttributeId"))?,
        (None, Some(node)) => node.as_str(&path.field("Id"))?,
        (None, None) => {
            return Err(StructureError::MissingField {
                path: path.to_string(),
                field: "AttributeId",
            });
        }
    };

    let declared = declared_data_type(registry, object.get("DataType"), &path.field("DataType"))?;
    let values = coerce_values(registry, object.get("Value"), declared, &path.field("Value"))?;

    let mut attribute = Attribute::new(attribute_id, category_id)
        .with_include_in_result(object.boolean(path, "IncludeInResult")?.unwrap_or(false));
    if let Some(issuer) = object.string(path, "Issuer")? {
        attribute = attribute.with_issuer(issuer);
    }
    attribute.values = values;
    Ok(attribute)
}

/// Assembles the `Attribute` array of a category body.
pub fn attributes(
    registry: &DataTypeRegistry,
    body: &JsonObject,
    category_id: &str,
    path: &JsonPath,
) -> Result<Vec<Attribute>> {
    let Some(items) = body.array(path, "Attribute")? else {
        return Ok(Vec::new());
    };
    let items_path = path.field("Attribute");
    objects(items, &items_path)
        .map(|entry| {
            let (object, item_path) = entry?;
            attribute(registry, object, category_id, &item_path)
        })
        .collect()
}

/// Assembles one request category instance.
pub fn category(registry: &DataTypeRegistry, spec: &CategorySpec<'_>) -> Result<RequestAttributes> {
    let body = spec.body;
    let path = &spec.path;
    body.ensure_keys(path, CATEGORY_KEYS)?;

    let mut category = RequestAttributes::new(&spec.category_id);
    if let Some(id) = body.string(path, "Id")? {
        category = category.with_xml_id(id);
    }
    category.attributes = attributes(registry, body, &spec.category_id, path)?;
    if let Some(raw) = body.string(path, "Content")? {
        category = category.with_content(content::decode_at(raw, &path.field("Content"))?);
    }

    trace!(
        category = %spec.category_id,
        attributes = category.attributes.len(),
        "assembled category"
    );
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{JsonNode, parse};
    use kimberlite_xacml_types::AttributeValue;
    use kimberlite_xacml_types::identifiers::category::RESOURCE;

    fn object(json: &str) -> JsonObject {
        match parse(json).unwrap() {
            JsonNode::Object(object) => object,
            other => panic!("expected object, got {}", other.kind()),
        }
    }

    fn assemble(json: &str) -> Result<Attribute> {
        attribute(
            DataTypeRegistry::standard(),
            &object(json),
            RESOURCE,
            &JsonPath::root().field("Attribute").index(0),
        )
    }

    #[test]
    fn test_attribute_defaults() {
        let attr = assemble(r#"{"AttributeId":"document-id","Value":"doc-1"}"#).unwrap();
        assert_eq!(attr.attribute_id, "document-id");
        assert_eq!(attr.category, RESOURCE);
        assert!(!attr.include_in_result);
        assert_eq!(attr.issuer, None);
        assert_eq!(attr.values, vec![AttributeValue::String("doc-1".into())]);
    }

    #[test]
    fn test_id_alias() {
        let attr = assemble(r#"{"Id":"document-id","Issuer":"acme","IncludeInResult":true}"#)
            .unwrap();
        assert_eq!(attr.attribute_id, "document-id");
        assert_eq!(attr.issuer.as_deref(), Some("acme"));
        assert!(attr.include_in_result);
        assert!(attr.values.is_empty());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(matches!(
            assemble(r#"{"Value":1}"#),
            Err(StructureError::MissingField { field: "AttributeId", .. })
        ));
        assert!(matches!(
            assemble(r#"{"AttributeId":"a","Id":"a"}"#),
            Err(StructureError::Invalid { .. })
        ));
        assert!(matches!(
            assemble(r#"{"AttributeId":7}"#),
            Err(StructureError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_flag_kinds() {
        let err = assemble(r#"{"AttributeId":"a","IncludeInResult":"yes"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute[0].IncludeInResult: expected boolean, found string"
        );
        assert!(assemble(r#"{"AttributeId":"a","Issuer":false}"#).is_err());
    }

    #[test]
    fn test_unknown_attribute_key() {
        assert!(matches!(
            assemble(r#"{"AttributeId":"a","Values":[1]}"#),
            Err(StructureError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_category_with_content() {
        let body = object(
            r#"{"Id":"res1","Attribute":[{"AttributeId":"a","Value":1}],"Content":"<doc><title>x</title></doc>"}"#,
        );
        let spec = CategorySpec {
            category_id: RESOURCE.to_string(),
            body: &body,
            path: JsonPath::root().field("Resource"),
        };
        let category = category(DataTypeRegistry::standard(), &spec).unwrap();
        assert_eq!(category.xml_id.as_deref(), Some("res1"));
        assert_eq!(category.attributes.len(), 1);
        assert_eq!(category.content.unwrap().name, "doc");
    }

    #[test]
    fn test_category_attribute_must_be_array_of_objects() {
        let body = object(r#"{"Attribute":["a"]}"#);
        let spec = CategorySpec {
            category_id: RESOURCE.to_string(),
            body: &body,
            path: JsonPath::root().field("Resource"),
        };
        let err = category(DataTypeRegistry::standard(), &spec).unwrap_err();
        assert_eq!(err.to_string(), "Resource.Attribute[0]: expected object, found string");
    }
}
