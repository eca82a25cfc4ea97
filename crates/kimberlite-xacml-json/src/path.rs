//! JSON paths for error messages.

use std::fmt;

/// Location of a node in a JSON document, rendered as
/// `Request.Category[0].Attribute[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    rendered: String,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Self {
        let rendered = if self.rendered.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.rendered)
        };
        Self { rendered }
    }

    pub fn index(&self, index: usize) -> Self {
        Self {
            rendered: format!("{}[{index}]", self.rendered),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rendered.is_empty() {
            f.write_str("root")
        } else {
            f.write_str(&self.rendered)
        }
    }
}
