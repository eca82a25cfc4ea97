//! Response codec.
//!
//! Both directions run every result through the same consistency check, so
//! a response that renders is one that loads and vice versa.
//!
//! | Status code        | Allowed decisions                   |
//! |--------------------|-------------------------------------|
//! | ok                 | Permit, Deny, NotApplicable         |
//! | anything else      | Indeterminate, Indeterminate{D,P,DP} |
//! | no Status          | any                                 |
//!
//! `StatusDetail` is only allowed with the missing-attribute code. On the
//! wire it is a string of `<MissingAttributeDetail>` XML elements.

use kimberlite_xacml_types::xml::parse_fragment;
use kimberlite_xacml_types::{
    AttributeAssignment, AttributeCategory, DataTypeRegistry, Decision, DecisionResult,
    Directive, IdReference, MissingAttributeDetail, Response, Status, StatusCode, StatusDetail,
    XmlElement,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::assemble;
use crate::category;
use crate::coerce::{coerce_value, declared_data_type, infer_data_type};
use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::reader::{self, JsonNode, JsonObject, objects};
use crate::render;
use crate::settings::OutputConfig;

const RESULT_KEYS: &[&str] = &[
    "Decision",
    "Status",
    "Obligations",
    "AssociatedAdvice",
    "Category",
    "PolicyIdentifierList",
];

const ASSIGNMENT_KEYS: &[&str] = &["AttributeId", "Value", "Category", "DataType", "Issuer"];

const DETAIL_ELEMENT: &str = "MissingAttributeDetail";
const VALUE_ELEMENT: &str = "AttributeValue";

/// Converts between JSON Profile response documents and [`Response`]s.
#[derive(Debug, Clone)]
pub struct ResponseCodec<'r> {
    registry: &'r DataTypeRegistry,
    output: OutputConfig,
}

impl ResponseCodec<'static> {
    /// Creates a codec over the standard data types with default output.
    pub fn new() -> Self {
        Self {
            registry: DataTypeRegistry::standard(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ResponseCodec<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> ResponseCodec<'r> {
    /// Uses `registry` to resolve and parse data types (builder pattern).
    pub fn with_registry<'n>(self, registry: &'n DataTypeRegistry) -> ResponseCodec<'n> {
        ResponseCodec {
            registry,
            output: self.output,
        }
    }

    /// Sets the output formatting (builder pattern).
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Parses a response document.
    pub fn load(&self, text: &str) -> Result<Response> {
        let document = reader::parse(text)?;
        let root = JsonPath::root();
        let top = document.as_object(&root)?;
        top.ensure_keys(&root, &["Response"])?;
        let path = root.field("Response");
        let items = match top.required(&root, "Response")? {
            JsonNode::Array(items) => items,
            other => return Err(reader::wrong_kind(&path, "array", other)),
        };

        let mut response = Response::new();
        for entry in objects(items, &path) {
            let (object, result_path) = entry?;
            let result = self.result(object, &result_path)?;
            validate_result(&result, &result_path)?;
            response = response.with_result(result);
        }

        debug!(results = response.results.len(), "decoded response");
        Ok(response)
    }

    fn result(&self, object: &JsonObject, path: &JsonPath) -> Result<DecisionResult> {
        object.ensure_keys(path, RESULT_KEYS)?;

        let decision = object
            .required_string(path, "Decision")?
            .parse::<Decision>()
            .map_err(|e| StructureError::Invalid {
                path: path.field("Decision").to_string(),
                message: e.to_string(),
            })?;
        let mut result = DecisionResult::new(decision);

        if let Some(status) = object.object(path, "Status")? {
            result.status = Some(self.status(status, &path.field("Status"))?);
        }
        result.obligations = self.directives(object, "Obligations", path)?;
        result.associated_advice = self.directives(object, "AssociatedAdvice", path)?;

        if let Some(items) = object.array(path, "Category")? {
            let categories_path = path.field("Category");
            for entry in objects(items, &categories_path) {
                let (body, category_path) = entry?;
                body.ensure_keys(&category_path, &["CategoryId", "Attribute"])?;
                let category_id = category::category_id(body, &category_path)?;
                let mut echoed = AttributeCategory::new(category_id);
                echoed.attributes =
                    assemble::attributes(self.registry, body, category_id, &category_path)?;
                result = result.with_attribute_category(echoed);
            }
        }

        if let Some(list) = object.object(path, "PolicyIdentifierList")? {
            let list_path = path.field("PolicyIdentifierList");
            list.ensure_keys(&list_path, &["PolicyIdReference", "PolicySetIdReference"])?;
            result.policy_identifiers = id_references(list, "PolicyIdReference", &list_path)?;
            result.policy_set_identifiers =
                id_references(list, "PolicySetIdReference", &list_path)?;
            if result.policy_identifiers.is_empty() && result.policy_set_identifiers.is_empty() {
                return Err(StructureError::EmptyPolicyIdentifiers {
                    path: list_path.to_string(),
                });
            }
        }

        Ok(result)
    }

    fn status(&self, object: &JsonObject, path: &JsonPath) -> Result<Status> {
        object.ensure_keys(path, &["StatusCode", "StatusMessage", "StatusDetail"])?;
        let code_path = path.field("StatusCode");
        let code = object.required(path, "StatusCode")?.as_object(&code_path)?;
        let mut status = Status::new(status_code(code, &code_path)?);
        if let Some(message) = object.string(path, "StatusMessage")? {
            status = status.with_message(message);
        }
        if let Some(detail) = object.string(path, "StatusDetail")? {
            status = status.with_detail(self.status_detail(detail, &path.field("StatusDetail"))?);
        }
        Ok(status)
    }

    fn status_detail(&self, text: &str, path: &JsonPath) -> Result<StatusDetail> {
        let elements = parse_fragment(text).map_err(|e| StructureError::Content {
            path: path.to_string(),
            message: format!("StatusDetail is not XML: {e}"),
        })?;

        let mut detail = StatusDetail::default();
        for (i, element) in elements.iter().enumerate() {
            detail
                .missing_attributes
                .push(self.missing_attribute(element, &path.index(i))?);
        }
        Ok(detail)
    }

    fn missing_attribute(
        &self,
        element: &XmlElement,
        path: &JsonPath,
    ) -> Result<MissingAttributeDetail> {
        if element.name != DETAIL_ELEMENT {
            return Err(StructureError::Content {
                path: path.to_string(),
                message: format!("expected <{DETAIL_ELEMENT}>, found <{}>", element.name),
            });
        }

        let resolve = |name: &str, at: &JsonPath| {
            self.registry
                .resolve(name)
                .map_err(|_| StructureError::UnknownDataType {
                    path: at.to_string(),
                    name: name.to_string(),
                })
        };

        let mut detail = MissingAttributeDetail {
            category: element.attribute("Category").map(str::to_string),
            attribute_id: element.attribute("AttributeId").map(str::to_string),
            issuer: element.attribute("Issuer").map(str::to_string),
            ..MissingAttributeDetail::default()
        };
        if let Some(name) = element.attribute("DataType") {
            detail.data_type = Some(resolve(name, path)?);
        }

        for (i, child) in element.child_elements().enumerate() {
            let value_path = path.index(i);
            if child.name != VALUE_ELEMENT {
                return Err(StructureError::Content {
                    path: value_path.to_string(),
                    message: format!("expected <{VALUE_ELEMENT}>, found <{}>", child.name),
                });
            }
            let data_type = match (child.attribute("DataType"), detail.data_type) {
                (Some(name), _) => resolve(name, &value_path)?,
                (None, Some(data_type)) => data_type,
                (None, None) => {
                    return Err(StructureError::Content {
                        path: value_path.to_string(),
                        message: "AttributeValue without DataType".to_string(),
                    });
                }
            };
            let value = self
                .registry
                .parse(data_type, &child.text())
                .map_err(|source| StructureError::Value {
                    path: value_path.to_string(),
                    source,
                })?;
            detail.values.push(value);
        }
        Ok(detail)
    }

    fn directives(
        &self,
        object: &JsonObject,
        key: &'static str,
        path: &JsonPath,
    ) -> Result<Vec<Directive>> {
        let Some(items) = object.array(path, key)? else {
            return Ok(Vec::new());
        };
        let list_path = path.field(key);
        objects(items, &list_path)
            .map(|entry| {
                let (directive, directive_path) = entry?;
                directive.ensure_keys(&directive_path, &["Id", "AttributeAssignment"])?;
                let mut parsed = Directive::new(directive.required_string(&directive_path, "Id")?);
                let assignments_path = directive_path.field("AttributeAssignment");
                let assignments = directive.array(&directive_path, "AttributeAssignment")?;
                for entry in objects(assignments.unwrap_or_default(), &assignments_path) {
                    let (assignment, assignment_path) = entry?;
                    let assignment = self.assignment(assignment, &assignment_path)?;
                    parsed = parsed.with_assignment(assignment);
                }
                Ok(parsed)
            })
            .collect()
    }

    fn assignment(&self, object: &JsonObject, path: &JsonPath) -> Result<AttributeAssignment> {
        object.ensure_keys(path, ASSIGNMENT_KEYS)?;
        let attribute_id = object.required_string(path, "AttributeId")?;

        let value_path = path.field("Value");
        let node = object.required(path, "Value")?;
        let declared =
            declared_data_type(self.registry, object.get("DataType"), &path.field("DataType"))?;
        let target = match declared {
            Some(data_type) => data_type,
            None => infer_data_type(node, &value_path)?,
        };
        let value = coerce_value(self.registry, node, target, declared.is_none(), &value_path)?;

        let mut assignment = AttributeAssignment::new(attribute_id, value);
        if let Some(category) = object.string(path, "Category")? {
            assignment = assignment.with_category(category);
        }
        if let Some(issuer) = object.string(path, "Issuer")? {
            assignment = assignment.with_issuer(issuer);
        }
        Ok(assignment)
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Renders a response document.
    ///
    /// Fails without output if any result breaks a consistency rule.
    pub fn to_json(&self, response: &Response) -> Result<String> {
        let path = JsonPath::root().field("Response");
        let results = response
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let result_path = path.index(i);
                validate_result(result, &result_path)?;
                render_result(result, &result_path)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut document = Map::new();
        document.insert("Response".into(), Value::Array(results));
        let text = render::to_text(&Value::Object(document), self.output.pretty)?;
        debug!(
            results = response.results.len(),
            bytes = text.len(),
            "encoded response"
        );
        Ok(text)
    }
}

fn status_code(object: &JsonObject, path: &JsonPath) -> Result<StatusCode> {
    object.ensure_keys(path, &["Value", "StatusCode"])?;
    let mut code = StatusCode::new(object.required_string(path, "Value")?);
    if let Some(child) = object.object(path, "StatusCode")? {
        code = code.with_child(status_code(child, &path.field("StatusCode"))?);
    }
    Ok(code)
}

fn id_references(object: &JsonObject, key: &str, path: &JsonPath) -> Result<Vec<IdReference>> {
    let Some(items) = object.array(path, key)? else {
        return Ok(Vec::new());
    };
    let list_path = path.field(key);
    objects(items, &list_path)
        .map(|entry| {
            let (reference, reference_path) = entry?;
            reference.ensure_keys(&reference_path, &["Id", "Version"])?;
            let mut parsed = IdReference::new(reference.required_string(&reference_path, "Id")?);
            if let Some(version) = reference.string(&reference_path, "Version")? {
                parsed = parsed.with_version(version);
            }
            Ok(parsed)
        })
        .collect()
}

// ============================================================================
// Consistency rules
// ============================================================================

/// Checks one result against the response consistency rules.
pub fn validate_result(result: &DecisionResult, path: &JsonPath) -> Result<()> {
    if let Some(status) = &result.status {
        validate_status(result.decision, status, &path.field("Status"))?;
    }

    for (key, list) in [
        ("Obligations", &result.obligations),
        ("AssociatedAdvice", &result.associated_advice),
    ] {
        for (i, directive) in list.iter().enumerate() {
            let directive_path = path.field(key).index(i);
            if directive.id.is_empty() {
                return Err(StructureError::MissingField {
                    path: directive_path.to_string(),
                    field: "Id",
                });
            }
            for (j, assignment) in directive.attribute_assignments.iter().enumerate() {
                if assignment.attribute_id.is_empty() {
                    return Err(StructureError::MissingField {
                        path: directive_path.field("AttributeAssignment").index(j).to_string(),
                        field: "AttributeId",
                    });
                }
            }
        }
    }

    for (i, echoed) in result.attribute_categories.iter().enumerate() {
        if echoed.category_id.is_empty() {
            return Err(StructureError::Invalid {
                path: path.field("Category").index(i).field("CategoryId").to_string(),
                message: "CategoryId must not be empty".to_string(),
            });
        }
    }

    let list_path = path.field("PolicyIdentifierList");
    for (key, references) in [
        ("PolicyIdReference", &result.policy_identifiers),
        ("PolicySetIdReference", &result.policy_set_identifiers),
    ] {
        for (i, reference) in references.iter().enumerate() {
            let reference_path = list_path.field(key).index(i);
            if reference.id.is_empty() {
                return Err(StructureError::MissingField {
                    path: reference_path.to_string(),
                    field: "Id",
                });
            }
            if let Some(version) = &reference.version {
                if !is_version(version) {
                    return Err(StructureError::Invalid {
                        path: reference_path.field("Version").to_string(),
                        message: format!("'{version}' is not a version number"),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_status(decision: Decision, status: &Status, path: &JsonPath) -> Result<()> {
    let code = &status.code;
    if code.value.is_empty() {
        return Err(StructureError::MissingField {
            path: path.field("StatusCode").to_string(),
            field: "Value",
        });
    }

    let allowed = if code.is_ok() {
        matches!(
            decision,
            Decision::Permit | Decision::Deny | Decision::NotApplicable
        )
    } else {
        decision.is_indeterminate()
    };
    if !allowed {
        return Err(StructureError::DecisionStatusMismatch {
            path: path.to_string(),
            decision,
            status_code: code.value.clone(),
        });
    }

    if let Some(detail) = &status.detail {
        let detail_path = path.field("StatusDetail");
        if !code.is_missing_attribute() {
            return Err(StructureError::StatusDetailNotAllowed {
                path: detail_path.to_string(),
                status_code: code.value.clone(),
            });
        }
        if detail.missing_attributes.is_empty() {
            return Err(StructureError::EmptyStatusDetail {
                path: detail_path.to_string(),
            });
        }
        if let Some(i) = detail.missing_attributes.iter().position(|d| !d.is_complete()) {
            return Err(StructureError::IncompleteMissingAttributeDetail {
                path: detail_path.index(i).to_string(),
            });
        }
    }
    Ok(())
}

/// `digits(.digits)*`
fn is_version(text: &str) -> bool {
    text.split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// Rendering helpers
// ============================================================================

fn render_result(result: &DecisionResult, path: &JsonPath) -> Result<Value> {
    let mut object = Map::new();
    object.insert(
        "Decision".into(),
        Value::String(result.decision.as_str().to_string()),
    );

    if let Some(status) = &result.status {
        let mut rendered = Map::new();
        rendered.insert("StatusCode".into(), render_status_code(&status.code));
        if let Some(message) = &status.message {
            rendered.insert("StatusMessage".into(), Value::String(message.clone()));
        }
        if let Some(detail) = &status.detail {
            rendered.insert("StatusDetail".into(), Value::String(render_status_detail(detail)));
        }
        object.insert("Status".into(), Value::Object(rendered));
    }

    if !result.obligations.is_empty() {
        object.insert("Obligations".into(), render_directives(&result.obligations));
    }
    if !result.associated_advice.is_empty() {
        object.insert(
            "AssociatedAdvice".into(),
            render_directives(&result.associated_advice),
        );
    }

    if !result.attribute_categories.is_empty() {
        let categories_path = path.field("Category");
        let categories = result
            .attribute_categories
            .iter()
            .enumerate()
            .map(|(i, category)| render_echoed_category(category, &categories_path.index(i)))
            .collect::<Result<Vec<_>>>()?;
        object.insert("Category".into(), Value::Array(categories));
    }

    if !result.policy_identifiers.is_empty() || !result.policy_set_identifiers.is_empty() {
        let mut list = Map::new();
        if !result.policy_identifiers.is_empty() {
            list.insert(
                "PolicyIdReference".into(),
                render_references(&result.policy_identifiers),
            );
        }
        if !result.policy_set_identifiers.is_empty() {
            list.insert(
                "PolicySetIdReference".into(),
                render_references(&result.policy_set_identifiers),
            );
        }
        object.insert("PolicyIdentifierList".into(), Value::Object(list));
    }

    Ok(Value::Object(object))
}

fn render_status_code(code: &StatusCode) -> Value {
    let mut object = Map::new();
    object.insert("Value".into(), Value::String(code.value.clone()));
    if let Some(child) = &code.child {
        object.insert("StatusCode".into(), render_status_code(child));
    }
    Value::Object(object)
}

fn render_status_detail(detail: &StatusDetail) -> String {
    detail
        .missing_attributes
        .iter()
        .map(|missing| {
            let mut element = XmlElement::new(DETAIL_ELEMENT);
            if let Some(category) = &missing.category {
                element = element.with_attribute("Category", category);
            }
            if let Some(attribute_id) = &missing.attribute_id {
                element = element.with_attribute("AttributeId", attribute_id);
            }
            if let Some(data_type) = missing.data_type {
                element = element.with_attribute("DataType", data_type.identifier());
            }
            if let Some(issuer) = &missing.issuer {
                element = element.with_attribute("Issuer", issuer);
            }
            for value in &missing.values {
                element = element.with_child(
                    XmlElement::new(VALUE_ELEMENT)
                        .with_attribute("DataType", value.data_type().identifier())
                        .with_text(value.to_string()),
                );
            }
            element.to_xml_string()
        })
        .collect()
}

fn render_directives(directives: &[Directive]) -> Value {
    let rendered = directives
        .iter()
        .map(|directive| {
            let mut object = Map::new();
            object.insert("Id".into(), Value::String(directive.id.clone()));
            if !directive.attribute_assignments.is_empty() {
                let assignments = directive
                    .attribute_assignments
                    .iter()
                    .map(render_assignment)
                    .collect();
                object.insert("AttributeAssignment".into(), Value::Array(assignments));
            }
            Value::Object(object)
        })
        .collect();
    Value::Array(rendered)
}

fn render_assignment(assignment: &AttributeAssignment) -> Value {
    let mut object = Map::new();
    object.insert(
        "AttributeId".into(),
        Value::String(assignment.attribute_id.clone()),
    );
    let value = assignment
        .value
        .as_ref()
        .map_or_else(|| Value::String(String::new()), render::value);
    object.insert("Value".into(), value);
    if let Some(category) = &assignment.category {
        object.insert("Category".into(), Value::String(category.clone()));
    }
    if let Some(value) = &assignment.value {
        object.insert(
            "DataType".into(),
            Value::String(value.data_type().identifier().to_string()),
        );
    }
    if let Some(issuer) = &assignment.issuer {
        object.insert("Issuer".into(), Value::String(issuer.clone()));
    }
    Value::Object(object)
}

/// Only attributes flagged for inclusion are echoed; a category may end up
/// with an empty `Attribute` array.
fn render_echoed_category(category: &AttributeCategory, path: &JsonPath) -> Result<Value> {
    let attributes_path = path.field("Attribute");
    let attributes = category
        .attributes
        .iter()
        .enumerate()
        .filter(|(_, attribute)| attribute.include_in_result)
        .map(|(i, attribute)| render::attribute(attribute, &attributes_path.index(i)))
        .collect::<Result<Vec<_>>>()?;

    let mut object = Map::new();
    object.insert(
        "CategoryId".into(),
        Value::String(category.category_id.clone()),
    );
    object.insert("Attribute".into(), Value::Array(attributes));
    Ok(Value::Object(object))
}

fn render_references(references: &[IdReference]) -> Value {
    let rendered = references
        .iter()
        .map(|reference| {
            let mut object = Map::new();
            object.insert("Id".into(), Value::String(reference.id.clone()));
            if let Some(version) = &reference.version {
                object.insert("Version".into(), Value::String(version.clone()));
            }
            Value::Object(object)
        })
        .collect();
    Value::Array(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kimberlite_xacml_types::identifiers::category::{ACCESS_SUBJECT, RESOURCE};
    use kimberlite_xacml_types::{Attribute, AttributeValue, DataType};
    use test_case::test_case;

    fn render(result: DecisionResult) -> Result<String> {
        ResponseCodec::new().to_json(&Response::new().with_result(result))
    }

    #[test_case(Decision::Permit, StatusCode::ok(), true; "ok permit")]
    #[test_case(Decision::NotApplicable, StatusCode::ok(), true; "ok not applicable")]
    #[test_case(Decision::Indeterminate, StatusCode::ok(), false; "ok indeterminate")]
    #[test_case(Decision::Permit, StatusCode::syntax_error(), false; "syntax error permit")]
    #[test_case(Decision::IndeterminateD, StatusCode::syntax_error(), true; "syntax error indeterminate d")]
    #[test_case(Decision::IndeterminateDP, StatusCode::processing_error(), true; "processing error indeterminate dp")]
    #[test_case(Decision::Deny, StatusCode::new("urn:example:custom"), false; "custom deny")]
    fn test_decision_status_coupling(decision: Decision, code: StatusCode, ok: bool) {
        let result = render(DecisionResult::new(decision).with_status(Status::new(code)));
        assert_eq!(result.is_ok(), ok, "{result:?}");
        if !ok {
            assert!(matches!(result, Err(StructureError::DecisionStatusMismatch { .. })));
        }
    }

    #[test]
    fn test_any_decision_without_status() {
        for decision in Decision::ALL {
            assert!(render(DecisionResult::new(decision)).is_ok());
        }
    }

    #[test]
    fn test_status_detail_rules() {
        let detail = StatusDetail {
            missing_attributes: vec![MissingAttributeDetail::new(
                ACCESS_SUBJECT,
                "subject-id",
                DataType::String,
            )],
        };

        let ok_with_detail = DecisionResult::new(Decision::Permit)
            .with_status(Status::new(StatusCode::ok()).with_detail(detail.clone()));
        assert!(matches!(
            render(ok_with_detail),
            Err(StructureError::StatusDetailNotAllowed { .. })
        ));

        let ok_with_empty_detail = DecisionResult::new(Decision::Permit)
            .with_status(Status::new(StatusCode::ok()).with_detail(StatusDetail::default()));
        assert!(matches!(
            render(ok_with_empty_detail),
            Err(StructureError::StatusDetailNotAllowed { .. })
        ));

        let missing_empty = DecisionResult::new(Decision::Indeterminate).with_status(
            Status::new(StatusCode::missing_attribute()).with_detail(StatusDetail::default()),
        );
        assert!(matches!(
            render(missing_empty),
            Err(StructureError::EmptyStatusDetail { .. })
        ));

        let incomplete = DecisionResult::new(Decision::Indeterminate).with_status(
            Status::new(StatusCode::missing_attribute()).with_detail(StatusDetail {
                missing_attributes: vec![MissingAttributeDetail::default()],
            }),
        );
        assert!(matches!(
            render(incomplete),
            Err(StructureError::IncompleteMissingAttributeDetail { .. })
        ));

        let valid = DecisionResult::new(Decision::Indeterminate).with_status(
            Status::new(StatusCode::missing_attribute())
                .with_message("who are you?")
                .with_detail(detail),
        );
        let json = render(valid.clone()).unwrap();
        assert!(json.contains(r#""StatusDetail":"<MissingAttributeDetail Category=\""#));
        let loaded = ResponseCodec::new().load(&json).unwrap();
        assert_eq!(loaded.results[0], valid);
    }

    #[test]
    fn test_status_code_chain() {
        let code = StatusCode::processing_error().with_child(StatusCode::new("urn:example:minor"));
        let json = render(
            DecisionResult::new(Decision::Indeterminate).with_status(Status::new(code)),
        )
        .unwrap();
        assert!(json.contains(
            r#""StatusCode":{"Value":"urn:oasis:names:tc:xacml:1.0:status:processing-error","StatusCode":{"Value":"urn:example:minor"}}"#
        ));
    }

    #[test]
    fn test_assignment_without_value_renders_empty_string() {
        let assignment = AttributeAssignment {
            value: None,
            ..AttributeAssignment::new("reason", "x")
        };
        let json = render(
            DecisionResult::new(Decision::Deny)
                .with_obligation(Directive::new("urn:example:notify").with_assignment(assignment)),
        )
        .unwrap();
        assert!(json.contains(r#"{"AttributeId":"reason","Value":""}"#), "{json}");

        let loaded = ResponseCodec::new().load(&json).unwrap();
        assert_eq!(
            loaded.results[0].obligations[0].attribute_assignments[0].value,
            Some(AttributeValue::String(String::new()))
        );
    }

    #[test]
    fn test_directive_ids_are_mandatory() {
        assert!(matches!(
            render(DecisionResult::new(Decision::Permit).with_obligation(Directive::new(""))),
            Err(StructureError::MissingField { field: "Id", .. })
        ));
        let err = ResponseCodec::new()
            .load(r#"{"Response":[{"Decision":"Permit","Obligations":[{"AttributeAssignment":[]}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, StructureError::MissingField { field: "Id", .. }));

        let err = ResponseCodec::new()
            .load(r#"{"Response":[{"Decision":"Permit","AssociatedAdvice":[{"Id":"a","AttributeAssignment":[{"Value":1}]}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, StructureError::MissingField { field: "AttributeId", .. }));
    }

    #[test]
    fn test_echo_filters_on_include_in_result() {
        let category = AttributeCategory::new(RESOURCE)
            .with_attribute(Attribute::new("hidden", "").with_value("x"));
        let json = render(DecisionResult::new(Decision::Permit).with_attribute_category(category))
            .unwrap();
        assert!(json.contains(&format!(r#"{{"CategoryId":"{RESOURCE}","Attribute":[]}}"#)));
        assert!(!json.contains("hidden"));
    }

    #[test]
    fn test_policy_identifiers() {
        let result = DecisionResult::new(Decision::Permit)
            .with_policy_identifier(IdReference::new("urn:example:policy").with_version("1.0"))
            .with_policy_set_identifier(IdReference::new("urn:example:set"));
        let json = render(result.clone()).unwrap();
        assert_eq!(ResponseCodec::new().load(&json).unwrap().results[0], result);

        let bad_version = DecisionResult::new(Decision::Permit)
            .with_policy_identifier(IdReference::new("p").with_version("1.x"));
        assert!(render(bad_version).is_err());

        let err = ResponseCodec::new()
            .load(r#"{"Response":[{"Decision":"Permit","PolicyIdentifierList":{}}]}"#)
            .unwrap_err();
        assert!(matches!(err, StructureError::EmptyPolicyIdentifiers { .. }));
    }

    #[test_case("1", true; "single")]
    #[test_case("1.0.12", true; "dotted")]
    #[test_case("", false; "empty")]
    #[test_case("1.", false; "trailing dot")]
    #[test_case("v1", false; "letter")]
    fn test_version_pattern(text: &str, valid: bool) {
        assert_eq!(is_version(text), valid);
    }

    #[test]
    fn test_unknown_decision() {
        let err = ResponseCodec::new()
            .load(r#"{"Response":[{"Decision":"Maybe"}]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Response[0].Decision: unknown decision 'Maybe'");
    }

    #[test]
    fn test_status_without_code() {
        let err = ResponseCodec::new()
            .load(r#"{"Response":[{"Decision":"Permit","Status":{"StatusMessage":"fine"}}]}"#)
            .unwrap_err();
        assert!(matches!(err, StructureError::MissingField { field: "StatusCode", .. }));
    }
}
