//! XPath expression values.

use std::fmt::{self, Display};

/// A namespace binding in scope for an XPath expression.
///
/// A binding without a prefix declares the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceBinding {
    pub prefix: Option<String>,
    pub namespace: String,
}

impl NamespaceBinding {
    pub fn new(prefix: Option<&str>, namespace: impl Into<String>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            namespace: namespace.into(),
        }
    }
}

/// An `xpathExpression` value: a path evaluated against the `Content` of a
/// category, with the namespace bindings needed to resolve its prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPathExpression {
    pub path: String,
    /// Category whose `Content` the path addresses.
    pub category: Option<String>,
    pub namespaces: Vec<NamespaceBinding>,
}

impl XPathExpression {
    /// Creates a bare expression with no category and no bindings.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            category: None,
            namespaces: Vec::new(),
        }
    }

    /// Sets the addressed category (builder pattern).
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Adds a namespace binding (builder pattern).
    pub fn with_namespace(mut self, binding: NamespaceBinding) -> Self {
        self.namespaces.push(binding);
        self
    }

    /// Looks up the namespace bound to `prefix` (`None` for the default).
    pub fn namespace_for(&self, prefix: Option<&str>) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|binding| binding.prefix.as_deref() == prefix)
            .map(|binding| binding.namespace.as_str())
    }
}

/// The textual form is the path alone.
impl Display for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
