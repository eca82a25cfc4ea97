#![no_main]

use arbitrary::Arbitrary;
use kimberlite_xacml_json::{ContentEncoding, OutputConfig, RequestCodec};
use kimberlite_xacml_types::{Attribute, AttributeValue, Request, RequestAttributes, XmlElement};
use libfuzzer_sys::fuzz_target;

/// One value kind per attribute, so every attribute renders.
#[derive(Debug, Arbitrary)]
enum FuzzValues {
    Strings(Vec<String>),
    Booleans(Vec<bool>),
    Integers(Vec<i64>),
    Doubles(Vec<f64>),
    Bytes(Vec<Vec<u8>>),
}

impl FuzzValues {
    fn into_values(self) -> Vec<AttributeValue> {
        match self {
            Self::Strings(v) => v.into_iter().map(AttributeValue::String).collect(),
            Self::Booleans(v) => v.into_iter().map(AttributeValue::Boolean).collect(),
            Self::Integers(v) => v.into_iter().map(AttributeValue::from).collect(),
            // NaN payload bits do not survive text
            Self::Doubles(v) => v
                .into_iter()
                .filter(|d| !d.is_nan())
                .map(AttributeValue::Double)
                .collect(),
            Self::Bytes(v) => v.into_iter().map(AttributeValue::HexBinary).collect(),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzAttribute {
    id: String,
    issuer: Option<String>,
    include_in_result: bool,
    values: FuzzValues,
}

#[derive(Debug, Arbitrary)]
struct FuzzCategory {
    well_known: Option<u8>,
    custom_id: String,
    xml_id: Option<String>,
    attributes: Vec<FuzzAttribute>,
    content: Option<String>,
}

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    return_policy_id_list: bool,
    combined_decision: bool,
    categories: Vec<FuzzCategory>,
    shorthand: bool,
    base64: bool,
}

const WELL_KNOWN: [&str; 4] = [
    kimberlite_xacml_types::identifiers::category::ACCESS_SUBJECT,
    kimberlite_xacml_types::identifiers::category::RESOURCE,
    kimberlite_xacml_types::identifiers::category::ACTION,
    kimberlite_xacml_types::identifiers::category::ENVIRONMENT,
];

fn build(input: FuzzRequest) -> Request {
    let mut request = Request::new()
        .with_return_policy_id_list(input.return_policy_id_list)
        .with_combined_decision(input.combined_decision);
    for fuzz in input.categories {
        let category_id = match fuzz.well_known {
            Some(i) => WELL_KNOWN[usize::from(i) % WELL_KNOWN.len()].to_string(),
            None if fuzz.custom_id.is_empty() => "urn:example:custom".to_string(),
            None => fuzz.custom_id,
        };
        let mut category = RequestAttributes::new(category_id);
        if let Some(id) = fuzz.xml_id {
            category = category.with_xml_id(id);
        }
        for attribute in fuzz.attributes {
            let mut built = Attribute::new(attribute.id, "")
                .with_include_in_result(attribute.include_in_result);
            if let Some(issuer) = attribute.issuer {
                built = built.with_issuer(issuer);
            }
            built.values = attribute.values.into_values();
            category = category.with_attribute(built);
        }
        // XML cannot carry every code point; keep content to plain words
        if let Some(text) = fuzz.content.filter(|t| !t.is_empty() && t.chars().all(char::is_alphanumeric)) {
            category = category.with_content(XmlElement::new("content").with_text(text));
        }
        request = request.with_category(category);
    }
    request
}

fuzz_target!(|input: FuzzRequest| {
    let output = OutputConfig {
        pretty: false,
        shorthand_categories: input.shorthand,
        content_encoding: if input.base64 {
            ContentEncoding::Base64
        } else {
            ContentEncoding::Inline
        },
    };
    let request = build(input);
    let codec = RequestCodec::new().with_output(output);

    let json = codec.to_json(&request).expect("model requests always render");
    let reloaded = codec.load(&json).expect("rendered request must load");
    assert!(reloaded.is_equivalent(&request), "round trip changed the request:\n{json}");
});
