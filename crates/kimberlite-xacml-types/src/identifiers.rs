//! Well-known XACML identifiers.
//!
//! The strings here are bit-exact protocol constants.

/// Attribute category URIs.
pub mod category {
    pub const ACCESS_SUBJECT: &str = "urn:oasis:names:tc:xacml:1.0:subject-category:access-subject";
    pub const RECIPIENT_SUBJECT: &str =
        "urn:oasis:names:tc:xacml:1.0:subject-category:recipient-subject";
    pub const INTERMEDIARY_SUBJECT: &str =
        "urn:oasis:names:tc:xacml:1.0:subject-category:intermediary-subject";
    pub const CODEBASE: &str = "urn:oasis:names:tc:xacml:1.0:subject-category:codebase";
    pub const REQUESTING_MACHINE: &str =
        "urn:oasis:names:tc:xacml:1.0:subject-category:requesting-machine";
    pub const ACTION: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:action";
    pub const RESOURCE: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:resource";
    pub const ENVIRONMENT: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:environment";
}

/// Status code URIs.
pub mod status {
    pub const OK: &str = "urn:oasis:names:tc:xacml:1.0:status:ok";
    pub const MISSING_ATTRIBUTE: &str = "urn:oasis:names:tc:xacml:1.0:status:missing-attribute";
    pub const SYNTAX_ERROR: &str = "urn:oasis:names:tc:xacml:1.0:status:syntax-error";
    pub const PROCESSING_ERROR: &str = "urn:oasis:names:tc:xacml:1.0:status:processing-error";
}

/// Common attribute identifiers.
pub mod attribute {
    pub const SUBJECT_ID: &str = "urn:oasis:names:tc:xacml:1.0:subject:subject-id";
    pub const RESOURCE_ID: &str = "urn:oasis:names:tc:xacml:1.0:resource:resource-id";
    pub const ACTION_ID: &str = "urn:oasis:names:tc:xacml:1.0:action:action-id";
    pub const CURRENT_DATETIME: &str =
        "urn:oasis:names:tc:xacml:1.0:environment:current-dateTime";
}

/// XPath version identifier used in `RequestDefaults`.
pub const XPATH_VERSION_1_0: &str = "http://www.w3.org/TR/1999/REC-xpath-19991116";
