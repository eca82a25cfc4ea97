//! Decision request model.
//!
//! A [`Request`] is an ordered list of category instances, each holding
//! attributes, plus the request-level flags. Values are already typed;
//! nothing here knows about JSON.

use crate::value::AttributeValue;
use crate::xml::XmlElement;

// ============================================================================
// Attribute
// ============================================================================

/// A named, typed, possibly multi-valued datum within a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attribute_id: String,
    /// Category of the owning [`RequestAttributes`].
    pub category: String,
    pub issuer: Option<String>,
    /// Whether the evaluator should echo this attribute in its result.
    pub include_in_result: bool,
    pub values: Vec<AttributeValue>,
}

impl Attribute {
    /// Creates an attribute with no values in the given category.
    pub fn new(attribute_id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            category: category.into(),
            issuer: None,
            include_in_result: false,
            values: Vec::new(),
        }
    }

    /// Sets the issuer (builder pattern).
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Marks the attribute for inclusion in the result (builder pattern).
    pub fn with_include_in_result(mut self, include: bool) -> Self {
        self.include_in_result = include;
        self
    }

    /// Appends a value (builder pattern).
    pub fn with_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.values.push(value.into());
        self
    }

    fn is_equivalent(&self, other: &Attribute) -> bool {
        self.attribute_id == other.attribute_id
            && self.category == other.category
            && self.issuer == other.issuer
            && self.include_in_result == other.include_in_result
            && same_multiset(&self.values, &other.values, PartialEq::eq)
    }
}

// ============================================================================
// Category instance
// ============================================================================

/// One category instance of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAttributes {
    pub category_id: String,
    /// Identifier referenced from `MultiRequests`.
    pub xml_id: Option<String>,
    pub attributes: Vec<Attribute>,
    pub content: Option<XmlElement>,
}

impl RequestAttributes {
    pub fn new(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            xml_id: None,
            attributes: Vec::new(),
            content: None,
        }
    }

    /// Sets the instance identifier (builder pattern).
    pub fn with_xml_id(mut self, id: impl Into<String>) -> Self {
        self.xml_id = Some(id.into());
        self
    }

    /// Adds an attribute, overwriting its category with this instance's.
    pub fn with_attribute(mut self, mut attribute: Attribute) -> Self {
        attribute.category.clone_from(&self.category_id);
        self.attributes.push(attribute);
        self
    }

    /// Sets the content document (builder pattern).
    pub fn with_content(mut self, content: XmlElement) -> Self {
        self.content = Some(content);
        self
    }

    /// Finds the first attribute with the given identifier.
    pub fn attribute(&self, attribute_id: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.attribute_id == attribute_id)
    }

    fn is_equivalent(&self, other: &RequestAttributes) -> bool {
        self.category_id == other.category_id
            && self.xml_id == other.xml_id
            && self.content == other.content
            && same_multiset(&self.attributes, &other.attributes, Attribute::is_equivalent)
    }
}

// ============================================================================
// Request
// ============================================================================

/// Request-wide defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDefaults {
    pub xpath_version: Option<String>,
}

/// A group of category instance identifiers forming one individual decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReference {
    pub reference_ids: Vec<String>,
}

impl RequestReference {
    pub fn new<I, S>(reference_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reference_ids: reference_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// A decision request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    pub return_policy_id_list: bool,
    pub combined_decision: bool,
    pub request_defaults: Option<RequestDefaults>,
    pub multi_requests: Vec<RequestReference>,
    pub categories: Vec<RequestAttributes>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `ReturnPolicyIdList` (builder pattern).
    pub fn with_return_policy_id_list(mut self, value: bool) -> Self {
        self.return_policy_id_list = value;
        self
    }

    /// Sets `CombinedDecision` (builder pattern).
    pub fn with_combined_decision(mut self, value: bool) -> Self {
        self.combined_decision = value;
        self
    }

    /// Sets the request defaults (builder pattern).
    pub fn with_request_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.request_defaults = Some(defaults);
        self
    }

    /// Adds a multi-request reference (builder pattern).
    pub fn with_multi_request(mut self, reference: RequestReference) -> Self {
        self.multi_requests.push(reference);
        self
    }

    /// Adds a category instance (builder pattern).
    pub fn with_category(mut self, category: RequestAttributes) -> Self {
        self.categories.push(category);
        self
    }

    /// Iterates over category instances with the given identifier.
    pub fn categories_with_id<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a RequestAttributes> + 'a {
        self.categories
            .iter()
            .filter(move |category| category.category_id == category_id)
    }

    /// Compares two requests ignoring the order of categories, attributes,
    /// values, multi-request references and reference identifiers.
    ///
    /// Duplicates still count: two identical categories are not equivalent
    /// to one.
    pub fn is_equivalent(&self, other: &Request) -> bool {
        self.return_policy_id_list == other.return_policy_id_list
            && self.combined_decision == other.combined_decision
            && self.request_defaults == other.request_defaults
            && same_multiset(&self.multi_requests, &other.multi_requests, |a, b| {
                same_multiset(&a.reference_ids, &b.reference_ids, PartialEq::eq)
            })
            && same_multiset(
                &self.categories,
                &other.categories,
                RequestAttributes::is_equivalent,
            )
    }
}

/// Multiset equality under `eq`.
fn same_multiset<T>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|item| {
        let found = right
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && eq(item, candidate));
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}
