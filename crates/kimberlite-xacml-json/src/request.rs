//! Request codec.
//!
//! ```text
//! {"Request": {...}}
//!      │
//!      ▼
//! reader::parse ──► category::resolve ──► assemble::category ──► Request
//!                                              │
//!                                              └─► coerce (per Value)
//! ```
//!
//! Rendering goes the other way and is accepted again by [`RequestCodec::load`].

use kimberlite_xacml_types::{
    DataTypeRegistry, Request, RequestAttributes, RequestDefaults, RequestReference,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::assemble;
use crate::category::{self, shorthand_key};
use crate::content;
use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::reader::{self, JsonObject, objects};
use crate::render;
use crate::settings::OutputConfig;

const REQUEST_KEYS: &[&str] = &[
    "ReturnPolicyIdList",
    "CombinedDecision",
    "RequestDefaults",
    "MultiRequests",
    "Category",
    "AccessSubject",
    "Subject",
    "RecipientSubject",
    "IntermediarySubject",
    "Codebase",
    "RequestingMachine",
    "Action",
    "Resource",
    "Environment",
];

/// Converts between JSON Profile request documents and [`Request`]s.
///
/// # Example
///
/// ```
/// use kimberlite_xacml_json::RequestCodec;
///
/// let codec = RequestCodec::new();
/// let request = codec
///     .load(r#"{"Request":{"Resource":{"Attribute":[{"AttributeId":"document-id","Value":"doc-1"}]}}}"#)
///     .unwrap();
/// assert_eq!(request.categories.len(), 1);
///
/// let json = codec.to_json(&request).unwrap();
/// assert!(codec.load(&json).unwrap().is_equivalent(&request));
/// ```
#[derive(Debug, Clone)]
pub struct RequestCodec<'r> {
    registry: &'r DataTypeRegistry,
    output: OutputConfig,
}

impl RequestCodec<'static> {
    /// Creates a codec over the standard data types with default output.
    pub fn new() -> Self {
        Self {
            registry: DataTypeRegistry::standard(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for RequestCodec<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> RequestCodec<'r> {
    /// Uses `registry` to resolve and parse data types (builder pattern).
    pub fn with_registry<'n>(self, registry: &'n DataTypeRegistry) -> RequestCodec<'n> {
        RequestCodec {
            registry,
            output: self.output,
        }
    }

    /// Sets the output formatting (builder pattern).
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Parses a request document.
    pub fn load(&self, text: &str) -> Result<Request> {
        let document = reader::parse(text)?;
        let root = JsonPath::root();
        let top = document.as_object(&root)?;
        top.ensure_keys(&root, &["Request"])?;
        let path = root.field("Request");
        let body = top.required(&root, "Request")?.as_object(&path)?;

        let request = self.request(body, &path)?;
        debug!(
            categories = request.categories.len(),
            attributes = request.categories.iter().map(|c| c.attributes.len()).sum::<usize>(),
            multi_requests = request.multi_requests.len(),
            "decoded request"
        );
        Ok(request)
    }

    fn request(&self, body: &JsonObject, path: &JsonPath) -> Result<Request> {
        body.ensure_keys(path, REQUEST_KEYS)?;

        let mut request = Request::new()
            .with_return_policy_id_list(body.boolean(path, "ReturnPolicyIdList")?.unwrap_or(false))
            .with_combined_decision(body.boolean(path, "CombinedDecision")?.unwrap_or(false));

        if let Some(defaults) = body.object(path, "RequestDefaults")? {
            let defaults = request_defaults(defaults, &path.field("RequestDefaults"))?;
            request = request.with_request_defaults(defaults);
        }
        if let Some(multi) = body.object(path, "MultiRequests")? {
            request.multi_requests = multi_requests(multi, &path.field("MultiRequests"))?;
        }

        for spec in category::resolve(body, path)? {
            request = request.with_category(assemble::category(self.registry, &spec)?);
        }
        Ok(request)
    }

    /// Renders a request document.
    pub fn to_json(&self, request: &Request) -> Result<String> {
        let path = JsonPath::root().field("Request");
        let mut body = Map::new();
        body.insert(
            "ReturnPolicyIdList".into(),
            Value::Bool(request.return_policy_id_list),
        );
        body.insert("CombinedDecision".into(), Value::Bool(request.combined_decision));

        if let Some(defaults) = &request.request_defaults {
            let mut object = Map::new();
            if let Some(version) = &defaults.xpath_version {
                object.insert("XPathVersion".into(), Value::String(version.clone()));
            }
            body.insert("RequestDefaults".into(), Value::Object(object));
        }

        if !request.multi_requests.is_empty() {
            let references = request
                .multi_requests
                .iter()
                .map(|reference| {
                    let ids = reference.reference_ids.iter().cloned().map(Value::String).collect();
                    let mut object = Map::new();
                    object.insert("ReferenceId".into(), Value::Array(ids));
                    Value::Object(object)
                })
                .collect();
            let mut object = Map::new();
            object.insert("RequestReference".into(), Value::Array(references));
            body.insert("MultiRequests".into(), Value::Object(object));
        }

        self.render_categories(request, &mut body, &path)?;

        let mut document = Map::new();
        document.insert("Request".into(), Value::Object(body));
        let text = render::to_text(&Value::Object(document), self.output.pretty)?;
        debug!(
            categories = request.categories.len(),
            bytes = text.len(),
            "encoded request"
        );
        Ok(text)
    }

    fn render_categories(
        &self,
        request: &Request,
        body: &mut Map<String, Value>,
        path: &JsonPath,
    ) -> Result<()> {
        let mut generic = Vec::new();
        let mut shorthand: Vec<(&'static str, Vec<Value>)> = Vec::new();

        for category in &request.categories {
            let key = if self.output.shorthand_categories {
                shorthand_key(&category.category_id)
            } else {
                None
            };
            match key {
                Some(key) => {
                    let rendered = self.render_category(category, false, &path.field(key))?;
                    match shorthand.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, group)) => group.push(rendered),
                        None => shorthand.push((key, vec![rendered])),
                    }
                }
                None => {
                    let entry_path = path.field("Category").index(generic.len());
                    generic.push(self.render_category(category, true, &entry_path)?);
                }
            }
        }

        if !generic.is_empty() || shorthand.is_empty() {
            body.insert("Category".into(), Value::Array(generic));
        }
        for (key, mut group) in shorthand {
            let value = if group.len() == 1 {
                group.remove(0)
            } else {
                Value::Array(group)
            };
            body.insert(key.into(), value);
        }
        Ok(())
    }

    fn render_category(
        &self,
        category: &RequestAttributes,
        with_id: bool,
        path: &JsonPath,
    ) -> Result<Value> {
        let mut object = Map::new();
        if with_id {
            object.insert("CategoryId".into(), Value::String(category.category_id.clone()));
        }
        if let Some(id) = &category.xml_id {
            object.insert("Id".into(), Value::String(id.clone()));
        }
        if !category.attributes.is_empty() {
            let attributes_path = path.field("Attribute");
            let attributes = category
                .attributes
                .iter()
                .enumerate()
                .map(|(i, attribute)| render::attribute(attribute, &attributes_path.index(i)))
                .collect::<Result<Vec<_>>>()?;
            object.insert("Attribute".into(), Value::Array(attributes));
        }
        if let Some(root) = &category.content {
            object.insert(
                "Content".into(),
                Value::String(content::encode(root, self.output.content_encoding)),
            );
        }
        Ok(Value::Object(object))
    }
}

fn request_defaults(object: &JsonObject, path: &JsonPath) -> Result<RequestDefaults> {
    object.ensure_keys(path, &["XPathVersion"])?;
    Ok(RequestDefaults {
        xpath_version: object.string(path, "XPathVersion")?.map(str::to_string),
    })
}

fn multi_requests(object: &JsonObject, path: &JsonPath) -> Result<Vec<RequestReference>> {
    object.ensure_keys(path, &["RequestReference"])?;
    let items = object.array(path, "RequestReference")?.ok_or_else(|| {
        StructureError::MissingField {
            path: path.to_string(),
            field: "RequestReference",
        }
    })?;

    let references_path = path.field("RequestReference");
    objects(items, &references_path)
        .map(|entry| {
            let (reference, reference_path) = entry?;
            reference.ensure_keys(&reference_path, &["ReferenceId"])?;
            let ids = reference
                .array(&reference_path, "ReferenceId")?
                .ok_or_else(|| StructureError::MissingField {
                    path: reference_path.to_string(),
                    field: "ReferenceId",
                })?;
            if ids.is_empty() {
                return Err(StructureError::Invalid {
                    path: reference_path.field("ReferenceId").to_string(),
                    message: "ReferenceId must list at least one category Id".to_string(),
                });
            }
            let ids_path = reference_path.field("ReferenceId");
            let ids = ids
                .iter()
                .enumerate()
                .map(|(i, id)| id.as_str(&ids_path.index(i)).map(str::to_string))
                .collect::<Result<Vec<_>>>()?;
            Ok(RequestReference::new(ids))
        })
        .collect()
}
