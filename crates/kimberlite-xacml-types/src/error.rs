//! Error types for attribute values and XML sub-documents.

use thiserror::Error;

use crate::datatype::DataType;

/// Failure to interpret text as a value of an attribute data type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The identifier is neither a registered URI nor a short alias.
    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    /// The text is not in the lexical space of the data type.
    #[error("'{value}' is not a valid {data_type} value")]
    InvalidLexical { data_type: DataType, value: String },

    /// A well-formed value exceeds what the payload can represent.
    #[error("{data_type} value '{value}' is out of range")]
    OutOfRange { data_type: DataType, value: String },
}

impl ValueError {
    pub(crate) fn lexical(data_type: DataType, value: &str) -> Self {
        Self::InvalidLexical {
            data_type,
            value: value.to_string(),
        }
    }
}

/// Failure to parse an XML sub-document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The reader rejected the input.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Input bytes are not UTF-8.
    #[error("XML content is not valid UTF-8")]
    NotUtf8,

    /// An element was opened but never closed.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// Character data appeared outside of any element.
    #[error("text outside of the root element")]
    TextOutsideRoot,

    /// A document must have exactly one root element.
    #[error("expected exactly one root element, found {0}")]
    RootCount(usize),
}
