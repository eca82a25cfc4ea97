//! Strict JSON reader.
//!
//! Parses JSON into a literal tree that keeps what `serde_json::Value`
//! throws away:
//! - number literals keep their source text, so `1` (integer literal) and
//!   `1.0` (fractional literal) stay distinguishable and integers of any
//!   magnitude survive
//! - objects keep every entry in source order, so repeated keys can be
//!   reported instead of silently collapsing to the last one
//!
//! Duplicate keys are rejected for the whole tree right after parsing. The
//! typed accessors on [`JsonObject`] enforce JSON kinds and closed schemas.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::{Result, StructureError};
use crate::path::JsonPath;

/// Map key serde_json uses to hand over a number's source text when
/// `arbitrary_precision` is enabled.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

// ============================================================================
// Literal tree
// ============================================================================

/// A JSON number literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonNumber {
    text: String,
}

impl JsonNumber {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The literal exactly as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the literal has neither a fractional part nor an exponent.
    pub fn is_integer(&self) -> bool {
        !self.text.contains(['.', 'e', 'E'])
    }
}

/// A JSON object with entries in source order, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonObject {
    entries: Vec<(String, JsonNode)>,
}

/// A parsed JSON literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonNode {
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonNode>),
    Object(JsonObject),
}

impl JsonNode {
    /// Name of the literal kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            JsonNode::Null => "null",
            JsonNode::Bool(_) => "boolean",
            JsonNode::Number(n) if n.is_integer() => "integer",
            JsonNode::Number(_) => "number",
            JsonNode::String(_) => "string",
            JsonNode::Array(_) => "array",
            JsonNode::Object(_) => "object",
        }
    }

    pub fn as_object(&self, path: &JsonPath) -> Result<&JsonObject> {
        match self {
            JsonNode::Object(object) => Ok(object),
            other => Err(wrong_kind(path, "object", other)),
        }
    }

    pub fn as_str(&self, path: &JsonPath) -> Result<&str> {
        match self {
            JsonNode::String(s) => Ok(s),
            other => Err(wrong_kind(path, "string", other)),
        }
    }

    fn check_unique_keys(&self, path: &JsonPath) -> Result<()> {
        match self {
            JsonNode::Array(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| item.check_unique_keys(&path.index(i))),
            JsonNode::Object(object) => {
                let mut seen = HashSet::with_capacity(object.entries.len());
                for (key, value) in &object.entries {
                    if !seen.insert(key.as_str()) {
                        return Err(StructureError::DuplicateKey {
                            path: path.to_string(),
                            key: key.clone(),
                        });
                    }
                    value.check_unique_keys(&path.field(key))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

pub(crate) fn wrong_kind(
    path: &JsonPath,
    expected: &'static str,
    found: &JsonNode,
) -> StructureError {
    StructureError::WrongKind {
        path: path.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Parses `text`, rejecting malformed JSON and repeated keys anywhere.
pub fn parse(text: &str) -> Result<JsonNode> {
    let node: JsonNode = serde_json::from_str(text)?;
    node.check_unique_keys(&JsonPath::root())?;
    Ok(node)
}

// ============================================================================
// Object accessors
// ============================================================================

impl JsonObject {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &JsonNode)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Rejects any key outside `allowed`.
    pub fn ensure_keys(&self, path: &JsonPath, allowed: &[&str]) -> Result<()> {
        match self.entries.iter().find(|(key, _)| !allowed.contains(&key.as_str())) {
            Some((key, _)) => Err(StructureError::UnknownKey {
                path: path.to_string(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn required(&self, path: &JsonPath, key: &'static str) -> Result<&JsonNode> {
        self.get(key).ok_or_else(|| StructureError::MissingField {
            path: path.to_string(),
            field: key,
        })
    }

    pub fn string(&self, path: &JsonPath, key: &str) -> Result<Option<&str>> {
        self.get(key)
            .map(|node| node.as_str(&path.field(key)))
            .transpose()
    }

    pub fn required_string(&self, path: &JsonPath, key: &'static str) -> Result<&str> {
        self.required(path, key)?.as_str(&path.field(key))
    }

    pub fn boolean(&self, path: &JsonPath, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(JsonNode::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_kind(&path.field(key), "boolean", other)),
        }
    }

    pub fn object(&self, path: &JsonPath, key: &str) -> Result<Option<&JsonObject>> {
        self.get(key)
            .map(|node| node.as_object(&path.field(key)))
            .transpose()
    }

    pub fn array(&self, path: &JsonPath, key: &str) -> Result<Option<&[JsonNode]>> {
        match self.get(key) {
            None => Ok(None),
            Some(JsonNode::Array(items)) => Ok(Some(items)),
            Some(other) => Err(wrong_kind(&path.field(key), "array", other)),
        }
    }
}

/// Iterates over `items` as objects, with each element's path.
pub(crate) fn objects<'a, 'p>(
    items: &'a [JsonNode],
    path: &'p JsonPath,
) -> impl Iterator<Item = Result<(&'a JsonObject, JsonPath)>> + use<'a, 'p> {
    items.iter().enumerate().map(move |(i, item)| {
        let item_path = path.index(i);
        item.as_object(&item_path).map(|object| (object, item_path.clone()))
    })
}

// ============================================================================
// Deserialization
// ============================================================================

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = JsonNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Number(JsonNumber::new(v.to_string())))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Number(JsonNumber::new(v.to_string())))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Number(JsonNumber::new(format!("{v:?}"))))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::String(v))
    }

    fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Null)
    }

    fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
        Ok(JsonNode::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<JsonNode>()? {
            items.push(item);
        }
        Ok(JsonNode::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Some(first_key) = map.next_key::<String>()? else {
            return Ok(JsonNode::Object(JsonObject::default()));
        };
        let first_value = if first_key == NUMBER_TOKEN {
            match map.next_value::<TokenValue>()? {
                TokenValue::Literal(text) if is_number_literal(&text) => {
                    if map.next_key::<String>()?.is_some() {
                        return Err(de::Error::custom(format!("reserved key '{NUMBER_TOKEN}'")));
                    }
                    return Ok(JsonNode::Number(JsonNumber::new(text)));
                }
                TokenValue::Literal(text) => JsonNode::String(text),
                TokenValue::Node(node) => node,
            }
        } else {
            map.next_value::<JsonNode>()?
        };

        let mut entries = vec![(first_key, first_value)];
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<JsonNode>()?;
            entries.push((key, value));
        }
        Ok(JsonNode::Object(JsonObject { entries }))
    }
}

/// Value under [`NUMBER_TOKEN`].
///
/// serde_json hands a number's text over as an owned string, while a string
/// written in the document arrives borrowed or escaped. Only the former is a
/// number; anything else keeps the entry an ordinary object.
enum TokenValue {
    Literal(String),
    Node(JsonNode),
}

impl<'de> Deserialize<'de> for TokenValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TokenValueVisitor)
    }
}

struct TokenValueVisitor;

impl<'de> Visitor<'de> for TokenValueVisitor {
    type Value = TokenValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(TokenValue::Literal(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        NodeVisitor.visit_str(v).map(TokenValue::Node)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        NodeVisitor.visit_bool(v).map(TokenValue::Node)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        NodeVisitor.visit_i64(v).map(TokenValue::Node)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        NodeVisitor.visit_u64(v).map(TokenValue::Node)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        NodeVisitor.visit_f64(v).map(TokenValue::Node)
    }

    fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
        Ok(TokenValue::Node(JsonNode::Null))
    }

    fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
        Ok(TokenValue::Node(JsonNode::Null))
    }

    fn visit_seq<A>(self, seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        NodeVisitor.visit_seq(seq).map(TokenValue::Node)
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        NodeVisitor.visit_map(map).map(TokenValue::Node)
    }
}

/// Checks the JSON number grammar: `-? int frac? exp?`.
fn is_number_literal(text: &str) -> bool {
    fn digits(text: &str) -> (&str, &str) {
        let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
        text.split_at(end)
    }

    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int, mut rest) = digits(unsigned);
    if int.is_empty() || (int.len() > 1 && int.starts_with('0')) {
        return false;
    }
    if let Some(fraction) = rest.strip_prefix('.') {
        let (part, after) = digits(fraction);
        if part.is_empty() {
            return false;
        }
        rest = after;
    }
    if let Some(exponent) = rest.strip_prefix(['e', 'E']) {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        let (part, after) = digits(exponent);
        if part.is_empty() {
            return false;
        }
        rest = after;
    }
    rest.is_empty()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn number(text: &str) -> JsonNode {
        JsonNode::Number(JsonNumber::new(text))
    }

    #[test_case("1", true; "integer")]
    #[test_case("-0", true; "negative zero")]
    #[test_case("1.0", false; "fraction")]
    #[test_case("1e3", false; "exponent")]
    #[test_case("2E-1", false; "upper exponent")]
    fn test_number_literal_kind(text: &str, integer: bool) {
        let node = parse(text).unwrap();
        assert_eq!(node, number(text));
        assert_eq!(matches!(&node, JsonNode::Number(n) if n.is_integer()), integer);
    }

    #[test]
    fn test_number_token_key_in_document_is_an_object() {
        let key = NUMBER_TOKEN;
        for text in [
            format!(r#"{{"{key}":"5"}}"#),
            format!(r#"{{"{key}":"not a number"}}"#),
            format!(r#"{{"{key}":"\u0035"}}"#),
            format!(r#"{{"{key}":7}}"#),
        ] {
            let node = parse(&text).unwrap();
            let JsonNode::Object(object) = node else {
                panic!("expected object for {text}");
            };
            assert_eq!(object.entries().count(), 1);
        }
    }

    #[test_case("0", true; "zero")]
    #[test_case("-12.5e+3", true; "full grammar")]
    #[test_case("01", false; "leading zero")]
    #[test_case("1.", false; "empty fraction")]
    #[test_case("1e", false; "empty exponent")]
    #[test_case("+1", false; "plus sign")]
    #[test_case("five", false; "word")]
    fn test_number_grammar(text: &str, valid: bool) {
        assert_eq!(is_number_literal(text), valid);
    }

    #[test]
    fn test_big_integer_keeps_text() {
        let text = "123456789012345678901234567890";
        assert_eq!(parse(text).unwrap(), number(text));
    }

    #[test]
    fn test_object_preserves_order() {
        let node = parse(r#"{"b":1,"a":[true,null,"x"]}"#).unwrap();
        let JsonNode::Object(object) = node else {
            panic!("expected object");
        };
        let keys: Vec<_> = object.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(
            object.get("a"),
            Some(&JsonNode::Array(vec![
                JsonNode::Bool(true),
                JsonNode::Null,
                JsonNode::String("x".into())
            ]))
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected_with_path() {
        let err = parse(r#"{"Request":{"Category":[{"Id":"a","Id":"b"}]}}"#).unwrap_err();
        match err {
            StructureError::DuplicateKey { path, key } => {
                assert_eq!(path, "Request.Category[0]");
                assert_eq!(key, "Id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_escaped_duplicate_key_is_rejected() {
        assert!(matches!(
            parse(r#"{"Id":1,"\u0049d":2}"#),
            Err(StructureError::DuplicateKey { .. })
        ));
    }

    #[test_case(r#"{"a":}"#; "missing value")]
    #[test_case(r#"{"a":1"#; "unterminated")]
    #[test_case(r#"{"a":1} x"#; "trailing characters")]
    #[test_case(""; "empty input")]
    fn test_malformed_json(text: &str) {
        assert!(matches!(parse(text), Err(StructureError::Syntax(_))));
    }

    #[test]
    fn test_accessors_check_kinds() {
        let JsonNode::Object(object) = parse(r#"{"s":"x","b":"true","n":1}"#).unwrap() else {
            panic!("expected object");
        };
        let path = JsonPath::root().field("Request");
        assert_eq!(object.string(&path, "s").unwrap(), Some("x"));
        assert_eq!(object.string(&path, "missing").unwrap(), None);

        let err = object.boolean(&path, "b").unwrap_err();
        assert_eq!(err.to_string(), "Request.b: expected boolean, found string");

        let err = object.required(&path, "Value").unwrap_err();
        assert!(matches!(err, StructureError::MissingField { field: "Value", .. }));
    }

    #[test]
    fn test_ensure_keys_reports_first_unknown() {
        let JsonNode::Object(object) = parse(r#"{"Id":"x","Bogus":1}"#).unwrap() else {
            panic!("expected object");
        };
        let err = object.ensure_keys(&JsonPath::root(), &["Id"]).unwrap_err();
        assert_eq!(err.to_string(), "root: unknown key 'Bogus'");
    }
}
