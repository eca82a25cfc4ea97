//! Value coercion engine.
//!
//! Turns the JSON literals of a `Value` member into typed attribute values.
//!
//! ## Target type
//!
//! A declared `DataType` wins. Otherwise the type is inferred once from the
//! first element (a scalar `Value` is its own first element):
//!
//! | Literal            | Inferred type |
//! |--------------------|---------------|
//! | `true` / `false`   | boolean       |
//! | `12`, `-0`         | integer       |
//! | `1.5`, `1e3`       | double        |
//! | `"text"`           | string        |
//! | `{...}`            | string (the object is flattened, see [`flatten`]) |
//!
//! ## Accepted literals per target
//!
//! | Target          | Accepts                                              |
//! |-----------------|------------------------------------------------------|
//! | boolean         | boolean                                              |
//! | integer         | integer literal, integer text                        |
//! | double          | integer or fractional literal, double text           |
//! | string          | boolean, number, string                              |
//! | xpathExpression | object `{XPath, XPathCategory?, Namespaces?}`        |
//! | anything else   | string, or boolean/number rendered as text first     |
//!
//! `null` and nested arrays are never values.

use std::collections::HashSet;

use kimberlite_xacml_types::{
    AttributeValue, DataType, DataTypeRegistry, NamespaceBinding, XPathExpression,
};

use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::reader::{JsonNode, JsonObject, objects, wrong_kind};

/// Resolves an optional `DataType` member.
pub fn declared_data_type(
    registry: &DataTypeRegistry,
    node: Option<&JsonNode>,
    path: &JsonPath,
) -> Result<Option<DataType>> {
    let Some(node) = node else {
        return Ok(None);
    };
    let name = node.as_str(path)?;
    registry
        .resolve(name)
        .map(Some)
        .map_err(|_| StructureError::UnknownDataType {
            path: path.to_string(),
            name: name.to_string(),
        })
}

/// Infers the target type from a literal.
pub fn infer_data_type(node: &JsonNode, path: &JsonPath) -> Result<DataType> {
    match node {
        JsonNode::Bool(_) => Ok(DataType::Boolean),
        JsonNode::Number(n) if n.is_integer() => Ok(DataType::Integer),
        JsonNode::Number(_) => Ok(DataType::Double),
        JsonNode::String(_) | JsonNode::Object(_) => Ok(DataType::String),
        JsonNode::Null | JsonNode::Array(_) => Err(wrong_kind(path, "attribute value", node)),
    }
}

/// Coerces a whole `Value` member.
///
/// An absent member and an empty array both yield no values.
pub fn coerce_values(
    registry: &DataTypeRegistry,
    value: Option<&JsonNode>,
    declared: Option<DataType>,
    path: &JsonPath,
) -> Result<Vec<AttributeValue>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let items = match value {
        JsonNode::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    let Some(first) = items.first() else {
        return Ok(Vec::new());
    };

    let is_array = matches!(value, JsonNode::Array(_));
    let item_path = |i: usize| if is_array { path.index(i) } else { path.clone() };

    let target = match declared {
        Some(data_type) => data_type,
        None => infer_data_type(first, &item_path(0))?,
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| coerce_value(registry, item, target, declared.is_none(), &item_path(i)))
        .collect()
}

/// Coerces one literal into `target`.
///
/// `inferred` is true when no `DataType` was declared; only then may an
/// object become a flattened string.
pub fn coerce_value(
    registry: &DataTypeRegistry,
    node: &JsonNode,
    target: DataType,
    inferred: bool,
    path: &JsonPath,
) -> Result<AttributeValue> {
    let parse = |text: &str| {
        registry
            .parse(target, text)
            .map_err(|source| StructureError::Value {
                path: path.to_string(),
                source,
            })
    };

    match (target, node) {
        (_, JsonNode::Null | JsonNode::Array(_)) => {
            Err(wrong_kind(path, "attribute value", node))
        }

        (DataType::Boolean, JsonNode::Bool(b)) => Ok(AttributeValue::Boolean(*b)),
        (DataType::Boolean, _) => Err(wrong_kind(path, "boolean", node)),

        (DataType::Integer, JsonNode::Number(n)) if n.is_integer() => parse(n.as_str()),
        (DataType::Integer, JsonNode::String(s)) => parse(s),
        (DataType::Integer, _) => Err(wrong_kind(path, "integer", node)),

        (DataType::Double, JsonNode::Number(n)) => parse(n.as_str()),
        (DataType::Double, JsonNode::String(s)) => parse(s),
        (DataType::Double, _) => Err(wrong_kind(path, "number", node)),

        (DataType::String, JsonNode::Object(object)) if inferred => {
            Ok(AttributeValue::String(flatten_object(object)))
        }
        (DataType::String, JsonNode::Object(_)) => Err(wrong_kind(path, "string", node)),
        (DataType::String, scalar) => Ok(AttributeValue::String(scalar_text(scalar))),

        (DataType::XPathExpression, JsonNode::Object(object)) => {
            Ok(AttributeValue::XPathExpression(xpath_expression(object, path)?))
        }
        (DataType::XPathExpression, _) => Err(wrong_kind(path, "object", node)),

        (_, JsonNode::Object(_)) => Err(wrong_kind(path, "string", node)),
        (_, scalar) => parse(&scalar_text(scalar)),
    }
}

/// Canonical text of a scalar literal.
fn scalar_text(node: &JsonNode) -> String {
    match node {
        JsonNode::Bool(b) => b.to_string(),
        JsonNode::Number(n) => n.as_str().to_string(),
        JsonNode::String(s) => s.clone(),
        other => flatten(other),
    }
}

/// Renders a literal as `{Key=value, Key2=value2}` text.
///
/// Keys keep source order, strings are unquoted, numbers keep their literal
/// text and arrays become `[a, b]`. This is what an object `Value` without a
/// `DataType` turns into; it is a compatibility behavior, not a structural
/// interpretation.
pub fn flatten(node: &JsonNode) -> String {
    match node {
        JsonNode::Null => "null".to_string(),
        JsonNode::Array(items) => {
            let parts: Vec<String> = items.iter().map(flatten).collect();
            format!("[{}]", parts.join(", "))
        }
        JsonNode::Object(object) => flatten_object(object),
        scalar => scalar_text(scalar),
    }
}

fn flatten_object(object: &JsonObject) -> String {
    let parts: Vec<String> = object
        .entries()
        .map(|(key, value)| format!("{key}={}", flatten(value)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Parses the structured form of an `xpathExpression` value.
fn xpath_expression(object: &JsonObject, path: &JsonPath) -> Result<XPathExpression> {
    object.ensure_keys(path, &["XPath", "XPathCategory", "Namespaces"])?;

    let xpath = object.required_string(path, "XPath")?;
    if xpath.trim().is_empty() {
        return Err(StructureError::Invalid {
            path: path.field("XPath").to_string(),
            message: "XPath must not be empty".to_string(),
        });
    }
    let mut expression = XPathExpression::new(xpath);
    if let Some(category) = object.string(path, "XPathCategory")? {
        expression = expression.with_category(category);
    }

    if let Some(items) = object.array(path, "Namespaces")? {
        let namespaces_path = path.field("Namespaces");
        let mut prefixes = HashSet::new();
        for entry in objects(items, &namespaces_path) {
            let (binding, binding_path) = entry?;
            binding.ensure_keys(&binding_path, &["Namespace", "Prefix"])?;
            let namespace = binding.required_string(&binding_path, "Namespace")?;
            let prefix = binding.string(&binding_path, "Prefix")?;
            if let Some(prefix) = prefix {
                if !prefixes.insert(prefix) {
                    return Err(StructureError::Invalid {
                        path: binding_path.field("Prefix").to_string(),
                        message: format!("namespace prefix '{prefix}' is bound twice"),
                    });
                }
            }
            expression = expression.with_namespace(NamespaceBinding::new(prefix, namespace));
        }
    }

    Ok(expression)
}
