//! Decision response model.
//!
//! ```text
//! Response
//! └── DecisionResult*
//!     ├── Decision
//!     ├── Status? ── StatusCode (─ StatusCode ...) ── StatusDetail?
//!     ├── Obligation* / Advice* ── AttributeAssignment*
//!     ├── AttributeCategory* ── Attribute*   (echoed request attributes)
//!     └── PolicyIdentifierList ── IdReference*
//! ```
//!
//! The model is plain data. Consistency rules between decision and status
//! are enforced by the codecs, not by construction.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::datatype::DataType;
use crate::identifiers::status;
use crate::request::Attribute;
use crate::value::AttributeValue;

// ============================================================================
// Decision
// ============================================================================

/// The access-control verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Permit,
    Deny,
    NotApplicable,
    Indeterminate,
    /// Indeterminate, could have been Deny.
    IndeterminateD,
    /// Indeterminate, could have been Permit.
    IndeterminateP,
    /// Indeterminate, could have been Deny or Permit.
    IndeterminateDP,
}

impl Decision {
    pub const ALL: [Decision; 7] = [
        Decision::Permit,
        Decision::Deny,
        Decision::NotApplicable,
        Decision::Indeterminate,
        Decision::IndeterminateD,
        Decision::IndeterminateP,
        Decision::IndeterminateDP,
    ];

    /// Wire spelling of the decision.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Permit => "Permit",
            Decision::Deny => "Deny",
            Decision::NotApplicable => "NotApplicable",
            Decision::Indeterminate => "Indeterminate",
            Decision::IndeterminateD => "Indeterminate{D}",
            Decision::IndeterminateP => "Indeterminate{P}",
            Decision::IndeterminateDP => "Indeterminate{DP}",
        }
    }

    /// Returns true for the four Indeterminate variants.
    pub fn is_indeterminate(self) -> bool {
        matches!(
            self,
            Decision::Indeterminate
                | Decision::IndeterminateD
                | Decision::IndeterminateP
                | Decision::IndeterminateDP
        )
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decision '{0}'")]
pub struct UnknownDecision(pub String);

impl FromStr for Decision {
    type Err = UnknownDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decision::ALL
            .into_iter()
            .find(|decision| decision.as_str() == s)
            .ok_or_else(|| UnknownDecision(s.to_string()))
    }
}

// ============================================================================
// Status
// ============================================================================

/// A status code, optionally refined by a chain of minor codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCode {
    pub value: String,
    pub child: Option<Box<StatusCode>>,
}

impl StatusCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            child: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(status::OK)
    }

    pub fn missing_attribute() -> Self {
        Self::new(status::MISSING_ATTRIBUTE)
    }

    pub fn syntax_error() -> Self {
        Self::new(status::SYNTAX_ERROR)
    }

    pub fn processing_error() -> Self {
        Self::new(status::PROCESSING_ERROR)
    }

    /// Sets the minor code (builder pattern).
    pub fn with_child(mut self, child: StatusCode) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn is_ok(&self) -> bool {
        self.value == status::OK
    }

    pub fn is_missing_attribute(&self) -> bool {
        self.value == status::MISSING_ATTRIBUTE
    }
}

/// Describes one attribute the evaluator needed but did not get.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingAttributeDetail {
    pub category: Option<String>,
    pub attribute_id: Option<String>,
    pub data_type: Option<DataType>,
    pub issuer: Option<String>,
    /// Acceptable values, if the evaluator knows any.
    pub values: Vec<AttributeValue>,
}

impl MissingAttributeDetail {
    pub fn new(
        category: impl Into<String>,
        attribute_id: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            category: Some(category.into()),
            attribute_id: Some(attribute_id.into()),
            data_type: Some(data_type),
            issuer: None,
            values: Vec::new(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// True when category, attribute id and data type are all set.
    pub fn is_complete(&self) -> bool {
        self.category.is_some() && self.attribute_id.is_some() && self.data_type.is_some()
    }
}

/// Machine-readable diagnostics for a missing-attribute status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusDetail {
    pub missing_attributes: Vec<MissingAttributeDetail>,
}

/// Outcome of the evaluation beyond the decision itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: Option<String>,
    pub detail: Option<StatusDetail>,
}

impl Status {
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: None,
            detail: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_detail(mut self, detail: StatusDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

// ============================================================================
// Obligations and advice
// ============================================================================

/// A single-valued attribute attached to an obligation or advice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAssignment {
    pub attribute_id: String,
    pub category: Option<String>,
    pub issuer: Option<String>,
    /// `None` is written as an empty string value.
    pub value: Option<AttributeValue>,
}

impl AttributeAssignment {
    pub fn new(attribute_id: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            category: None,
            issuer: None,
            value: Some(value.into()),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

/// An obligation (`Obligations`) or advice (`AssociatedAdvice`) entry.
///
/// Both share one shape on the wire; the list that holds them decides which
/// one it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub id: String,
    pub attribute_assignments: Vec<AttributeAssignment>,
}

pub type Obligation = Directive;
pub type Advice = Directive;

impl Directive {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute_assignments: Vec::new(),
        }
    }

    pub fn with_assignment(mut self, assignment: AttributeAssignment) -> Self {
        self.attribute_assignments.push(assignment);
        self
    }
}

// ============================================================================
// Policy identifiers
// ============================================================================

/// A reference to a policy or policy set that took part in the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdReference {
    pub id: String,
    pub version: Option<String>,
}

impl IdReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

// ============================================================================
// Result
// ============================================================================

/// Echoed attributes of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCategory {
    pub category_id: String,
    pub attributes: Vec<Attribute>,
}

impl AttributeCategory {
    pub fn new(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute, overwriting its category with this one's.
    pub fn with_attribute(mut self, mut attribute: Attribute) -> Self {
        attribute.category.clone_from(&self.category_id);
        self.attributes.push(attribute);
        self
    }
}

/// One individual decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionResult {
    pub decision: Decision,
    pub status: Option<Status>,
    pub obligations: Vec<Obligation>,
    pub associated_advice: Vec<Advice>,
    pub attribute_categories: Vec<AttributeCategory>,
    pub policy_identifiers: Vec<IdReference>,
    pub policy_set_identifiers: Vec<IdReference>,
}

impl DecisionResult {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            status: None,
            obligations: Vec::new(),
            associated_advice: Vec::new(),
            attribute_categories: Vec::new(),
            policy_identifiers: Vec::new(),
            policy_set_identifiers: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_obligation(mut self, obligation: Obligation) -> Self {
        self.obligations.push(obligation);
        self
    }

    pub fn with_advice(mut self, advice: Advice) -> Self {
        self.associated_advice.push(advice);
        self
    }

    pub fn with_attribute_category(mut self, category: AttributeCategory) -> Self {
        self.attribute_categories.push(category);
        self
    }

    pub fn with_policy_identifier(mut self, reference: IdReference) -> Self {
        self.policy_identifiers.push(reference);
        self
    }

    pub fn with_policy_set_identifier(mut self, reference: IdReference) -> Self {
        self.policy_set_identifiers.push(reference);
        self
    }
}

/// A decision response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub results: Vec<DecisionResult>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, result: DecisionResult) -> Self {
        self.results.push(result);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Permit", Decision::Permit; "permit")]
    #[test_case("NotApplicable", Decision::NotApplicable; "not applicable")]
    #[test_case("Indeterminate{D}", Decision::IndeterminateD; "indeterminate d")]
    #[test_case("Indeterminate{DP}", Decision::IndeterminateDP; "indeterminate dp")]
    fn test_decision_parses_wire_spelling(text: &str, expected: Decision) {
        assert_eq!(text.parse::<Decision>(), Ok(expected));
        assert_eq!(expected.to_string(), text);
    }

    #[test_case("permit"; "lowercase")]
    #[test_case("IndeterminateD"; "no braces")]
    #[test_case(""; "empty")]
    fn test_decision_rejects(text: &str) {
        assert!(text.parse::<Decision>().is_err());
    }

    #[test]
    fn test_indeterminate_family() {
        let indeterminate: Vec<_> = Decision::ALL
            .into_iter()
            .filter(|d| d.is_indeterminate())
            .collect();
        assert_eq!(indeterminate.len(), 4);
        assert!(!Decision::NotApplicable.is_indeterminate());
    }

    #[test]
    fn test_status_code_chain() {
        let code = StatusCode::processing_error().with_child(StatusCode::new("urn:example:minor"));
        assert!(!code.is_ok());
        assert_eq!(code.child.as_deref().map(|c| c.value.as_str()), Some("urn:example:minor"));
    }

    #[test]
    fn test_missing_attribute_detail_completeness() {
        assert!(!MissingAttributeDetail::default().is_complete());
        let detail = MissingAttributeDetail::new(
            crate::identifiers::category::ACCESS_SUBJECT,
            crate::identifiers::attribute::SUBJECT_ID,
            DataType::String,
        );
        assert!(detail.is_complete());
    }
}
