//! # kimberlite-xacml-types: XACML request/response model
//!
//! The typed model exchanged between a policy decision point and its
//! wire codecs. Nothing in this crate knows about JSON; the JSON Profile
//! codec lives in `kimberlite-xacml-json`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DataTypeRegistry                            │
//! │  ├─ identifier / short alias → DataType      │
//! │  ├─ DataType::parse(text) → AttributeValue   │
//! │  └─ AttributeValue: Display → canonical text │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Request                                     │
//! │  └─ RequestAttributes* (category instances)  │
//! │     ├─ Attribute* ── AttributeValue*         │
//! │     └─ Content (XmlElement)                  │
//! └─────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────┐
//! │  Response                                    │
//! │  └─ DecisionResult*                          │
//! │     ├─ Decision + Status                     │
//! │     ├─ Obligations / AssociatedAdvice        │
//! │     └─ echoed categories, policy references  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use kimberlite_xacml_types::identifiers::{attribute, category};
//! use kimberlite_xacml_types::{Attribute, DataType, DataTypeRegistry, Request, RequestAttributes};
//!
//! let registry = DataTypeRegistry::standard();
//! let data_type = registry.resolve("integer").unwrap();
//! assert_eq!(data_type, DataType::Integer);
//!
//! let request = Request::new().with_category(
//!     RequestAttributes::new(category::ACCESS_SUBJECT).with_attribute(
//!         Attribute::new(attribute::SUBJECT_ID, category::ACCESS_SUBJECT)
//!             .with_value(data_type.parse("42").unwrap()),
//!     ),
//! );
//! assert_eq!(request.categories.len(), 1);
//! ```

pub mod datatype;
pub mod error;
pub mod identifiers;
pub mod names;
pub mod request;
pub mod response;
pub mod temporal;
pub mod value;
pub mod xml;
pub mod xpath;

pub use datatype::{DataType, DataTypeRegistry};
pub use error::{ValueError, XmlError};
pub use request::{Attribute, Request, RequestAttributes, RequestDefaults, RequestReference};
pub use response::{
    Advice, AttributeAssignment, AttributeCategory, Decision, DecisionResult, Directive,
    IdReference, MissingAttributeDetail, Obligation, Response, Status, StatusCode, StatusDetail,
    UnknownDecision,
};
pub use value::AttributeValue;
pub use xml::{XmlElement, XmlNode};
pub use xpath::{NamespaceBinding, XPathExpression};
