//! JSON rendering shared by the request and response codecs.

use kimberlite_xacml_types::{Attribute, AttributeValue, DataType, XPathExpression};
use serde_json::{Map, Number, Value};

use crate::error::{Result, StructureError};
use crate::path::JsonPath;

/// Renders one typed value.
pub fn value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::Boolean(b) => Value::Bool(*b),
        AttributeValue::Integer(n) => match i64::try_from(n) {
            Ok(small) => Value::Number(small.into()),
            Err(_) => Value::String(n.to_string()),
        },
        AttributeValue::Double(d) => Number::from_f64(*d)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        AttributeValue::XPathExpression(expression) => xpath_expression(expression),
        other => Value::String(other.to_string()),
    }
}

fn xpath_expression(expression: &XPathExpression) -> Value {
    let mut object = Map::new();
    if let Some(category) = &expression.category {
        object.insert("XPathCategory".into(), Value::String(category.clone()));
    }
    if !expression.namespaces.is_empty() {
        let namespaces = expression
            .namespaces
            .iter()
            .map(|binding| {
                let mut entry = Map::new();
                if let Some(prefix) = &binding.prefix {
                    entry.insert("Prefix".into(), Value::String(prefix.clone()));
                }
                entry.insert("Namespace".into(), Value::String(binding.namespace.clone()));
                Value::Object(entry)
            })
            .collect();
        object.insert("Namespaces".into(), Value::Array(namespaces));
    }
    object.insert("XPath".into(), Value::String(expression.path.clone()));
    Value::Object(object)
}

/// The single data type shared by `values`, if any.
pub fn common_data_type(values: &[AttributeValue], path: &JsonPath) -> Result<Option<DataType>> {
    let Some(first) = values.first() else {
        return Ok(None);
    };
    let data_type = first.data_type();
    match values.iter().find(|v| v.data_type() != data_type) {
        Some(other) => Err(StructureError::MixedDataTypes {
            path: path.to_string(),
            first: data_type.short_name(),
            other: other.data_type().short_name(),
        }),
        None => Ok(Some(data_type)),
    }
}

/// Renders one attribute.
///
/// `IncludeInResult` is written only when set. A single value is written as
/// a scalar, several as an array, none not at all.
pub fn attribute(attribute: &Attribute, path: &JsonPath) -> Result<Value> {
    let mut object = Map::new();
    object.insert(
        "AttributeId".into(),
        Value::String(attribute.attribute_id.clone()),
    );
    if let Some(issuer) = &attribute.issuer {
        object.insert("Issuer".into(), Value::String(issuer.clone()));
    }
    if attribute.include_in_result {
        object.insert("IncludeInResult".into(), Value::Bool(true));
    }
    if let Some(data_type) = common_data_type(&attribute.values, path)? {
        object.insert(
            "DataType".into(),
            Value::String(data_type.identifier().to_string()),
        );
        let rendered = match attribute.values.as_slice() {
            [single] => value(single),
            many => Value::Array(many.iter().map(value).collect()),
        };
        object.insert("Value".into(), rendered);
    }
    Ok(Value::Object(object))
}

/// Renders a JSON document, compact or pretty.
pub fn to_text(document: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(text)
}
