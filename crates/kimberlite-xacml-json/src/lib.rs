//! # kimberlite-xacml-json: XACML JSON Profile codec
//!
//! Reads and writes XACML 3.0 requests and responses in the JSON Profile
//! format. Reading is strict: duplicate keys, unknown keys, wrong literal
//! kinds and lexically invalid values all fail the whole document with a
//! [`StructureError`] that names the JSON path of the offending node.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  RequestCodec / ResponseCodec                             │
//! │  ├─ reader    strict literal tree (order, number text)    │
//! │  ├─ category  Category array + shorthand keys → specs     │
//! │  ├─ assemble  attribute / category objects → model        │
//! │  ├─ coerce    Value literals → AttributeValue             │
//! │  ├─ content   Content ⇄ XmlElement (inline or Base64)     │
//! │  └─ render    model → serde_json::Value                   │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//!                             ▼
//!               kimberlite-xacml-types (model, registry)
//! ```
//!
//! ## Examples
//!
//! ```
//! use kimberlite_xacml_json::{load_request, response_to_json};
//! use kimberlite_xacml_types::{Decision, DecisionResult, Response, Status, StatusCode};
//!
//! let request = load_request(
//!     r#"{"Request":{"Category":[{"CategoryId":"c","Attribute":[{"Id":"x","DataType":"integer","Value":"123"}]}]}}"#,
//! )
//! .unwrap();
//! assert_eq!(request.categories[0].attributes[0].values[0].to_string(), "123");
//!
//! let response = Response::new().with_result(
//!     DecisionResult::new(Decision::Permit).with_status(Status::new(StatusCode::ok())),
//! );
//! let json = response_to_json(&response).unwrap();
//! assert!(json.starts_with(r#"{"Response":[{"Decision":"Permit""#));
//! ```
//!
//! Output formatting comes from [`CodecConfig`], loadable with
//! [`ConfigLoader`].

mod assemble;
pub mod category;
pub mod coerce;
pub mod content;
mod error;
mod path;
pub mod reader;
mod render;
mod request;
mod response;
mod settings;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, Result, StructureError};
pub use path::JsonPath;
pub use request::RequestCodec;
pub use response::{ResponseCodec, validate_result};
pub use settings::{CodecConfig, ConfigLoader, ContentEncoding, OutputConfig};

use kimberlite_xacml_types::{Request, Response};

/// Parses a request document with the standard data types.
pub fn load_request(text: &str) -> Result<Request> {
    RequestCodec::new().load(text)
}

/// Renders a request document with default output settings.
pub fn request_to_json(request: &Request) -> Result<String> {
    RequestCodec::new().to_json(request)
}

/// Parses a response document with the standard data types.
pub fn load_response(text: &str) -> Result<Response> {
    ResponseCodec::new().load(text)
}

/// Renders a response document with default output settings.
pub fn response_to_json(response: &Response) -> Result<String> {
    ResponseCodec::new().to_json(response)
}
