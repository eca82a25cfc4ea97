//! Category resolver.
//!
//! A request may list its category instances in the generic `Category`
//! array, under shorthand keys such as `Resource`, or both. Resolution
//! flattens every form into one ordered list:
//!
//! ```text
//! "Category": [ {..}, {..} ]      ──┐
//! "AccessSubject": {..}           ──┼──►  [ CategorySpec ]  (array entries first,
//! "Resource": [ {..}, {..} ]      ──┘                        then shorthand in source order)
//! ```
//!
//! Each shorthand key may hold one object or an array of objects. Downstream
//! code only ever sees resolved [`CategorySpec`]s.

use kimberlite_xacml_types::identifiers::category;
use tracing::trace;

use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::reader::{JsonNode, JsonObject, objects, wrong_kind};

/// Shorthand keys and the category each stands for. `Subject` is the
/// deprecated spelling of `AccessSubject`.
pub const SHORTHANDS: [(&str, &str); 9] = [
    ("AccessSubject", category::ACCESS_SUBJECT),
    ("Subject", category::ACCESS_SUBJECT),
    ("RecipientSubject", category::RECIPIENT_SUBJECT),
    ("IntermediarySubject", category::INTERMEDIARY_SUBJECT),
    ("Codebase", category::CODEBASE),
    ("RequestingMachine", category::REQUESTING_MACHINE),
    ("Action", category::ACTION),
    ("Resource", category::RESOURCE),
    ("Environment", category::ENVIRONMENT),
];

/// Looks up the category URI of a shorthand key.
pub fn shorthand_category(key: &str) -> Option<&'static str> {
    SHORTHANDS
        .iter()
        .find(|(shorthand, _)| *shorthand == key)
        .map(|(_, uri)| *uri)
}

/// The preferred shorthand key for a category URI, if it has one.
pub fn shorthand_key(category_id: &str) -> Option<&'static str> {
    SHORTHANDS
        .iter()
        .find(|(key, uri)| *uri == category_id && *key != "Subject")
        .map(|(key, _)| *key)
}

/// How a shorthand key present in the document holds its instances.
#[derive(Debug, Clone, Copy)]
pub enum Occurrence<'a> {
    Single(&'a JsonObject),
    Array(&'a [JsonNode]),
}

impl<'a> Occurrence<'a> {
    fn of(node: &'a JsonNode, path: &JsonPath) -> Result<Self> {
        match node {
            JsonNode::Object(object) => Ok(Occurrence::Single(object)),
            JsonNode::Array(items) => Ok(Occurrence::Array(items)),
            other => Err(wrong_kind(path, "object or array", other)),
        }
    }
}

/// One category instance with its resolved identifier.
#[derive(Debug, Clone)]
pub struct CategorySpec<'a> {
    pub category_id: String,
    pub body: &'a JsonObject,
    pub path: JsonPath,
}

/// Resolves every category instance of a `Request` object.
pub fn resolve<'a>(request: &'a JsonObject, path: &JsonPath) -> Result<Vec<CategorySpec<'a>>> {
    let mut specs = Vec::new();

    if let Some(items) = request.array(path, "Category")? {
        let array_path = path.field("Category");
        for entry in objects(items, &array_path) {
            let (body, entry_path) = entry?;
            let category_id = category_id(body, &entry_path)?;
            trace!(category = %category_id, path = %entry_path, "resolved category entry");
            specs.push(CategorySpec {
                category_id: category_id.to_string(),
                body,
                path: entry_path,
            });
        }
    }

    for (key, node) in request.entries() {
        let Some(uri) = shorthand_category(key) else {
            continue;
        };
        let key_path = path.field(key);
        match Occurrence::of(node, &key_path)? {
            Occurrence::Single(body) => {
                specs.push(shorthand_spec(body, uri, key_path)?);
            }
            Occurrence::Array(items) => {
                for entry in objects(items, &key_path) {
                    let (body, entry_path) = entry?;
                    specs.push(shorthand_spec(body, uri, entry_path)?);
                }
            }
        }
    }

    Ok(specs)
}

/// Reads the mandatory, non-empty `CategoryId` of a category object.
pub fn category_id<'a>(body: &'a JsonObject, path: &JsonPath) -> Result<&'a str> {
    let category_id = body.required_string(path, "CategoryId")?;
    if category_id.is_empty() {
        return Err(StructureError::Invalid {
            path: path.field("CategoryId").to_string(),
            message: "CategoryId must not be empty".to_string(),
        });
    }
    Ok(category_id)
}

fn shorthand_spec<'a>(
    body: &'a JsonObject,
    uri: &str,
    path: JsonPath,
) -> Result<CategorySpec<'a>> {
    if let Some(declared) = body.string(&path, "CategoryId")? {
        if declared != uri {
            return Err(StructureError::Invalid {
                path: path.field("CategoryId").to_string(),
                message: format!(
                    "CategoryId '{declared}' conflicts with the shorthand category '{uri}'"
                ),
            });
        }
    }
    trace!(category = %uri, path = %path, "resolved shorthand category");
    Ok(CategorySpec {
        category_id: uri.to_string(),
        body,
        path,
    })
}
