//! Property tests for kimberlite-xacml-json

use kimberlite_xacml_types::identifiers::category;
use kimberlite_xacml_types::{
    Attribute, AttributeValue, DataType, NamespaceBinding, Request, RequestAttributes,
    RequestDefaults, RequestReference, XPathExpression, XmlElement,
};
use num_bigint::BigInt;
use proptest::prelude::*;

use crate::{ContentEncoding, OutputConfig, RequestCodec, StructureError, load_request};

// ============================================================================
// Strategies
// ============================================================================

fn category_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(category::ACCESS_SUBJECT.to_string()),
        Just(category::RESOURCE.to_string()),
        Just(category::ACTION.to_string()),
        Just(category::ENVIRONMENT.to_string()),
        Just(category::RECIPIENT_SUBJECT.to_string()),
        "urn:example:category:[a-z]{1,8}",
    ]
}

fn xpath_value() -> impl Strategy<Value = AttributeValue> {
    (
        "[a-z]{1,6}(/[a-z]{1,6}){0,3}",
        proptest::option::of(category_id()),
        proptest::collection::vec(("[a-z]{1,4}", "urn:example:ns:[a-z]{1,6}"), 0..3),
    )
        .prop_map(|(path, category, bindings)| {
            let mut expression = XPathExpression::new(path);
            if let Some(category) = category {
                expression = expression.with_category(category);
            }
            let mut seen = Vec::new();
            for (prefix, namespace) in bindings {
                if !seen.contains(&prefix) {
                    expression =
                        expression.with_namespace(NamespaceBinding::new(Some(&prefix), namespace));
                    seen.push(prefix);
                }
            }
            AttributeValue::XPathExpression(expression)
        })
}

/// A non-empty run of values sharing one data type.
fn values() -> impl Strategy<Value = Vec<AttributeValue>> {
    let n = 1..4usize;
    prop_oneof![
        proptest::collection::vec(any::<String>().prop_map(AttributeValue::String), n.clone()),
        proptest::collection::vec(any::<bool>().prop_map(AttributeValue::Boolean), n.clone()),
        proptest::collection::vec(
            any::<i64>().prop_map(|i| AttributeValue::Integer(BigInt::from(i))),
            n.clone()
        ),
        proptest::collection::vec(
            any::<i128>().prop_map(|i| AttributeValue::Integer(BigInt::from(i))),
            n.clone()
        ),
        proptest::collection::vec(
            any::<f64>()
                .prop_filter("NaN payloads do not round trip", |d| !d.is_nan())
                .prop_map(AttributeValue::Double),
            n.clone()
        ),
        proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..8).prop_map(AttributeValue::HexBinary),
            n.clone()
        ),
        proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..8).prop_map(AttributeValue::Base64Binary),
            n.clone()
        ),
        proptest::collection::vec(
            "https://example\\.com/[a-z]{0,8}".prop_map(AttributeValue::AnyUri),
            n.clone()
        ),
        proptest::collection::vec(xpath_value(), n),
    ]
}

fn attribute() -> impl Strategy<Value = Attribute> {
    (
        "urn:example:attribute:[a-z]{1,8}",
        proptest::option::of("[a-z]{1,8}"),
        any::<bool>(),
        prop_oneof![Just(Vec::new()), values()],
    )
        .prop_map(|(id, issuer, include, values)| {
            let mut attribute = Attribute::new(id, "").with_include_in_result(include);
            if let Some(issuer) = issuer {
                attribute = attribute.with_issuer(issuer);
            }
            attribute.values = values;
            attribute
        })
}

fn category_instance() -> impl Strategy<Value = RequestAttributes> {
    (
        category_id(),
        proptest::option::of("[a-z][a-z0-9]{0,6}"),
        proptest::collection::vec(attribute(), 0..4),
        proptest::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(category_id, xml_id, attributes, content)| {
            let mut category = RequestAttributes::new(category_id);
            if let Some(id) = xml_id {
                category = category.with_xml_id(id);
            }
            for attribute in attributes {
                category = category.with_attribute(attribute);
            }
            if let Some(text) = content {
                category = category.with_content(XmlElement::new("doc").with_text(text));
            }
            category
        })
}

fn request() -> impl Strategy<Value = Request> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::vec(proptest::collection::vec("[a-z]{1,4}", 1..3), 0..3),
        proptest::collection::vec(category_instance(), 0..5),
    )
        .prop_map(|(return_list, combined, defaults, references, categories)| {
            let mut request = Request::new()
                .with_return_policy_id_list(return_list)
                .with_combined_decision(combined);
            if defaults {
                request = request.with_request_defaults(RequestDefaults {
                    xpath_version: Some("http://www.w3.org/TR/1999/REC-xpath-19991116".into()),
                });
            }
            for ids in references {
                request = request.with_multi_request(RequestReference::new(ids));
            }
            for category in categories {
                request = request.with_category(category);
            }
            request
        })
}

fn output() -> impl Strategy<Value = OutputConfig> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(pretty, shorthand, base64)| {
        OutputConfig {
            pretty,
            shorthand_categories: shorthand,
            content_encoding: if base64 {
                ContentEncoding::Base64
            } else {
                ContentEncoding::Inline
            },
        }
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: a rendered request loads back as an equivalent request
    #[test]
    fn prop_request_round_trip(request in request(), output in output()) {
        let codec = RequestCodec::new().with_output(output);
        let json = codec.to_json(&request).unwrap();
        let loaded = codec.load(&json).unwrap();
        prop_assert!(loaded.is_equivalent(&request), "{json}");
    }

    /// Property: without a DataType every array element follows the first
    #[test]
    fn prop_integer_first_element_fixes_type(first in any::<i64>(), rest in proptest::collection::vec(any::<i64>(), 0..4)) {
        let mut literals = vec![first.to_string()];
        // integer text is accepted for an integer target too
        literals.extend(rest.iter().map(|i| format!("\"{i}\"")));
        let json = format!(
            r#"{{"Request":{{"Resource":{{"Attribute":[{{"AttributeId":"a","Value":[{}]}}]}}}}}}"#,
            literals.join(",")
        );
        let request = load_request(&json).unwrap();
        let values = &request.categories[0].attributes[0].values;
        prop_assert_eq!(values.len(), rest.len() + 1);
        prop_assert!(values.iter().all(|v| v.data_type() == DataType::Integer));
    }

    /// Property: a string first element turns every scalar into a string
    #[test]
    fn prop_string_first_element_fixes_type(first in "[a-z]{0,6}", numbers in proptest::collection::vec(any::<i32>(), 0..4)) {
        let mut literals = vec![format!("\"{first}\"")];
        literals.extend(numbers.iter().map(ToString::to_string));
        let json = format!(
            r#"{{"Request":{{"Resource":{{"Attribute":[{{"AttributeId":"a","Value":[{}]}}]}}}}}}"#,
            literals.join(",")
        );
        let request = load_request(&json).unwrap();
        let values = &request.categories[0].attributes[0].values;
        prop_assert_eq!(&values[0], &AttributeValue::String(first));
        for (value, number) in values[1..].iter().zip(&numbers) {
            prop_assert_eq!(value, &AttributeValue::String(number.to_string()));
        }
    }

    /// Property: a boolean first element rejects any later number
    #[test]
    fn prop_boolean_first_element_rejects_numbers(flag in any::<bool>(), number in any::<i64>()) {
        let json = format!(
            r#"{{"Request":{{"Resource":{{"Attribute":[{{"AttributeId":"a","Value":[{flag},{number}]}}]}}}}}}"#
        );
        let is_wrong_kind = matches!(load_request(&json), Err(StructureError::WrongKind { .. }));
        prop_assert!(is_wrong_kind);
    }

    /// Property: repeating any key of an attribute object is rejected
    #[test]
    fn prop_repeated_key_rejected(key in prop_oneof![Just("Id"), Just("DataType"), Just("Value"), Just("Issuer")]) {
        let json = format!(
            r#"{{"Request":{{"Resource":{{"Attribute":[{{"{key}":"x","AttributeId":"a","{key}":"y"}}]}}}}}}"#
        );
        let is_duplicate = matches!(load_request(&json), Err(StructureError::DuplicateKey { .. }));
        prop_assert!(is_duplicate);
    }

    /// Property: reading never panics on arbitrary input
    #[test]
    fn prop_load_never_panics(text in "\\PC{0,64}") {
        let _ = load_request(&text);
    }
}
