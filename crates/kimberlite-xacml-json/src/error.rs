//! Codec error type.
//!
//! Every variant that originates in a document carries the JSON path of the
//! offending node, e.g. `Request.Category[0].Attribute[1].Value`.

use kimberlite_xacml_types::{Decision, ValueError, XmlError};
use thiserror::Error;

/// Any violation of the JSON Profile structure. Decoding and encoding abort
/// on the first one.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("{path}: duplicate key '{key}'")]
    DuplicateKey { path: String, key: String },

    #[error("{path}: unknown key '{key}'")]
    UnknownKey { path: String, key: String },

    #[error("{path}: missing mandatory '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: expected {expected}, found {found}")]
    WrongKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: {message}")]
    Invalid { path: String, message: String },

    #[error("{path}: unknown data type '{name}'")]
    UnknownDataType { path: String, name: String },

    #[error("{path}: {source}")]
    Value {
        path: String,
        #[source]
        source: ValueError,
    },

    #[error("{path}: {message}")]
    Content { path: String, message: String },

    #[error("{path}: decision {decision} is not allowed with status code '{status_code}'")]
    DecisionStatusMismatch {
        path: String,
        decision: Decision,
        status_code: String,
    },

    #[error("{path}: StatusDetail is only allowed with the missing-attribute status, not '{status_code}'")]
    StatusDetailNotAllowed { path: String, status_code: String },

    #[error("{path}: StatusDetail must contain at least one MissingAttributeDetail")]
    EmptyStatusDetail { path: String },

    #[error("{path}: MissingAttributeDetail requires Category, AttributeId and DataType")]
    IncompleteMissingAttributeDetail { path: String },

    #[error("{path}: PolicyIdentifierList must hold at least one policy or policy set reference")]
    EmptyPolicyIdentifiers { path: String },

    #[error("{path}: values of one attribute must share a data type ({first} and {other})")]
    MixedDataTypes {
        path: String,
        first: &'static str,
        other: &'static str,
    },

    #[error(transparent)]
    DataType(#[from] ValueError),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

pub type Result<T> = std::result::Result<T, StructureError>;

/// Failure to assemble a [`CodecConfig`](crate::CodecConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load codec configuration: {0}")]
    Load(#[from] config::ConfigError),
}
