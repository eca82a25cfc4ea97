//! `Content` codec.
//!
//! A `Content` string holds one XML document, either inline or Base64
//! encoded. Decoding tries inline XML first; only if that fails is the
//! string treated as Base64. A Base64 alphabet string is never well-formed
//! XML, so the two forms cannot be confused.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kimberlite_xacml_types::XmlElement;

use crate::error::{Result, StructureError};
use crate::path::JsonPath;
use crate::settings::ContentEncoding;

/// Decodes a `Content` string into its root element.
pub fn decode(raw: &str) -> Result<XmlElement> {
    decode_at(raw, &JsonPath::root())
}

pub(crate) fn decode_at(raw: &str, path: &JsonPath) -> Result<XmlElement> {
    let xml_error = match XmlElement::parse(raw) {
        Ok(element) => return Ok(element),
        Err(e) => e,
    };

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|b64_error| StructureError::Content {
        path: path.to_string(),
        message: format!("Content is neither XML ({xml_error}) nor Base64 ({b64_error})"),
    })?;

    XmlElement::parse_bytes(&bytes).map_err(|e| StructureError::Content {
        path: path.to_string(),
        message: format!("Base64 Content does not hold an XML document: {e}"),
    })
}

/// Encodes a root element as a `Content` string.
pub fn encode(element: &XmlElement, encoding: ContentEncoding) -> String {
    let xml = element.to_xml_string();
    match encoding {
        ContentEncoding::Inline => xml,
        ContentEncoding::Base64 => STANDARD.encode(xml),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn record() -> XmlElement {
        XmlElement::new("md:record")
            .with_attribute("xmlns:md", "urn:example:med:schemas:record")
            .with_child(XmlElement::new("md:patient").with_text("Bartholomew"))
    }

    #[test_case(ContentEncoding::Inline; "inline")]
    #[test_case(ContentEncoding::Base64; "base64")]
    fn test_encoded_content_decodes(encoding: ContentEncoding) {
        let encoded = encode(&record(), encoding);
        assert_eq!(decode(&encoded).unwrap(), record());
    }

    #[test]
    fn test_inline_form_is_plain_xml() {
        let encoded = encode(&record(), ContentEncoding::Inline);
        assert!(encoded.starts_with("<md:record"));
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let encoded = STANDARD.encode("<a>text</a>");
        let wrapped = format!("{}\n{}", &encoded[..4], &encoded[4..]);
        assert_eq!(decode(&wrapped).unwrap(), XmlElement::new("a").with_text("text"));
    }

    #[test_case("<a>"; "malformed xml")]
    #[test_case("not xml at all!"; "neither form")]
    #[test_case("aGVsbG8="; "base64 of non xml")]
    #[test_case(""; "empty")]
    fn test_decode_rejects(raw: &str) {
        assert!(matches!(decode(raw), Err(StructureError::Content { .. })));
    }
}
