//! Typed attribute values.

#![allow(clippy::match_same_arms)]

use std::fmt::{self, Display};

use base64::Engine;
use num_bigint::BigInt;

use crate::datatype::DataType;
use crate::names::{DnsName, IpAddress, Rfc822Name, X500Name};
use crate::temporal::{DayTimeDuration, XacmlDate, XacmlDateTime, XacmlTime, YearMonthDuration};
use crate::xpath::XPathExpression;

/// A typed attribute value.
///
/// Exactly one payload per data type; [`AttributeValue::data_type`] recovers
/// the type from the variant, so a value can never disagree with its type.
///
/// Note: doubles compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
/// This keeps equality reflexive for round-trip comparisons.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    String(String),
    Boolean(bool),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    Double(f64),

    // ===== Calendar Types =====
    Time(XacmlTime),
    Date(XacmlDate),
    DateTime(XacmlDateTime),
    DayTimeDuration(DayTimeDuration),
    YearMonthDuration(YearMonthDuration),

    // ===== Binary Types =====
    AnyUri(String),
    /// Bytes written as hex.
    HexBinary(Vec<u8>),
    /// Bytes written as Base64.
    Base64Binary(Vec<u8>),

    // ===== Name Types =====
    Rfc822Name(Rfc822Name),
    X500Name(X500Name),
    IpAddress(IpAddress),
    DnsName(DnsName),

    XPathExpression(XPathExpression),
}

impl AttributeValue {
    /// The data type this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            AttributeValue::String(_) => DataType::String,
            AttributeValue::Boolean(_) => DataType::Boolean,
            AttributeValue::Integer(_) => DataType::Integer,
            AttributeValue::Double(_) => DataType::Double,
            AttributeValue::Time(_) => DataType::Time,
            AttributeValue::Date(_) => DataType::Date,
            AttributeValue::DateTime(_) => DataType::DateTime,
            AttributeValue::DayTimeDuration(_) => DataType::DayTimeDuration,
            AttributeValue::YearMonthDuration(_) => DataType::YearMonthDuration,
            AttributeValue::AnyUri(_) => DataType::AnyUri,
            AttributeValue::HexBinary(_) => DataType::HexBinary,
            AttributeValue::Base64Binary(_) => DataType::Base64Binary,
            AttributeValue::Rfc822Name(_) => DataType::Rfc822Name,
            AttributeValue::X500Name(_) => DataType::X500Name,
            AttributeValue::IpAddress(_) => DataType::IpAddress,
            AttributeValue::DnsName(_) => DataType::DnsName,
            AttributeValue::XPathExpression(_) => DataType::XPathExpression,
        }
    }

    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::String(a), AttributeValue::String(b)) => a == b,
            (AttributeValue::Boolean(a), AttributeValue::Boolean(b)) => a == b,
            (AttributeValue::Integer(a), AttributeValue::Integer(b)) => a == b,
            (AttributeValue::Double(a), AttributeValue::Double(b)) => a.to_bits() == b.to_bits(),
            (AttributeValue::Time(a), AttributeValue::Time(b)) => a == b,
            (AttributeValue::Date(a), AttributeValue::Date(b)) => a == b,
            (AttributeValue::DateTime(a), AttributeValue::DateTime(b)) => a == b,
            (AttributeValue::DayTimeDuration(a), AttributeValue::DayTimeDuration(b)) => a == b,
            (AttributeValue::YearMonthDuration(a), AttributeValue::YearMonthDuration(b)) => a == b,
            (AttributeValue::AnyUri(a), AttributeValue::AnyUri(b)) => a == b,
            (AttributeValue::HexBinary(a), AttributeValue::HexBinary(b)) => a == b,
            (AttributeValue::Base64Binary(a), AttributeValue::Base64Binary(b)) => a == b,
            (AttributeValue::Rfc822Name(a), AttributeValue::Rfc822Name(b)) => a == b,
            (AttributeValue::X500Name(a), AttributeValue::X500Name(b)) => a == b,
            (AttributeValue::IpAddress(a), AttributeValue::IpAddress(b)) => a == b,
            (AttributeValue::DnsName(a), AttributeValue::DnsName(b)) => a == b,
            (AttributeValue::XPathExpression(a), AttributeValue::XPathExpression(b)) => a == b,
            _ => false, // Different types are not equal
        }
    }
}

impl Eq for AttributeValue {}

fn format_double(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        f.write_str("NaN")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "INF" } else { "-INF" })
    } else {
        write!(f, "{value:?}")
    }
}

/// Canonical lexical form, as accepted back by [`DataType::parse`].
impl Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) | AttributeValue::AnyUri(s) => f.write_str(s),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Double(d) => format_double(*d, f),
            AttributeValue::Time(t) => write!(f, "{t}"),
            AttributeValue::Date(d) => write!(f, "{d}"),
            AttributeValue::DateTime(dt) => write!(f, "{dt}"),
            AttributeValue::DayTimeDuration(d) => write!(f, "{d}"),
            AttributeValue::YearMonthDuration(d) => write!(f, "{d}"),
            AttributeValue::HexBinary(bytes) => f.write_str(&hex::encode_upper(bytes)),
            AttributeValue::Base64Binary(bytes) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            AttributeValue::Rfc822Name(n) => write!(f, "{n}"),
            AttributeValue::X500Name(n) => write!(f, "{n}"),
            AttributeValue::IpAddress(a) => write!(f, "{a}"),
            AttributeValue::DnsName(n) => write!(f, "{n}"),
            AttributeValue::XPathExpression(x) => write!(f, "{x}"),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(BigInt::from(i))
    }
}

impl From<BigInt> for AttributeValue {
    fn from(i: BigInt) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> Self {
        AttributeValue::Double(d)
    }
}

impl From<XPathExpression> for AttributeValue {
    fn from(x: XPathExpression) -> Self {
        AttributeValue::XPathExpression(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_double_equality_is_bitwise() {
        assert_eq!(AttributeValue::Double(f64::NAN), AttributeValue::Double(f64::NAN));
        assert_ne!(AttributeValue::Double(0.0), AttributeValue::Double(-0.0));
    }

    #[test]
    fn test_different_types_are_not_equal() {
        assert_ne!(
            AttributeValue::String("urn:a".into()),
            AttributeValue::AnyUri("urn:a".into())
        );
        assert_ne!(
            AttributeValue::HexBinary(vec![1]),
            AttributeValue::Base64Binary(vec![1])
        );
    }

    #[test_case(AttributeValue::Double(f64::INFINITY), "INF"; "inf")]
    #[test_case(AttributeValue::Double(f64::NEG_INFINITY), "-INF"; "negative inf")]
    #[test_case(AttributeValue::Double(f64::NAN), "NaN"; "nan")]
    #[test_case(AttributeValue::Double(1.0), "1.0"; "whole double")]
    #[test_case(AttributeValue::HexBinary(vec![0x0a, 0xff]), "0AFF"; "hex upper")]
    #[test_case(AttributeValue::Base64Binary(b"hi".to_vec()), "aGk="; "base64")]
    #[test_case(AttributeValue::from(-7), "-7"; "integer")]
    fn test_canonical_text(value: AttributeValue, expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn test_data_type_matches_parse() {
        let samples = [
            (DataType::String, "hello"),
            (DataType::Boolean, "true"),
            (DataType::Integer, "-12"),
            (DataType::Double, "2.5"),
            (DataType::Time, "10:00:00"),
            (DataType::Date, "2024-05-01"),
            (DataType::DateTime, "2024-05-01T10:00:00Z"),
            (DataType::DayTimeDuration, "P1D"),
            (DataType::YearMonthDuration, "P1Y"),
            (DataType::AnyUri, "urn:example"),
            (DataType::HexBinary, "00FF"),
            (DataType::Base64Binary, "AAE="),
            (DataType::Rfc822Name, "a@example.com"),
            (DataType::X500Name, "CN=A,O=B"),
            (DataType::IpAddress, "127.0.0.1"),
            (DataType::DnsName, "example.com"),
            (DataType::XPathExpression, "/a/b"),
        ];
        for (data_type, text) in samples {
            let value = data_type.parse(text).unwrap();
            assert_eq!(value.data_type(), data_type);
            let reparsed = data_type.parse(&value.to_string()).unwrap();
            assert_eq!(reparsed, value, "canonical text of {data_type} must reparse");
        }
    }

    proptest! {
        #[test]
        fn prop_double_text_round_trips(d in any::<f64>().prop_filter("NaN payloads vary", |d| !d.is_nan())) {
            let value = AttributeValue::Double(d);
            let reparsed = DataType::Double.parse(&value.to_string()).unwrap();
            prop_assert_eq!(reparsed, value);
        }

        #[test]
        fn prop_integer_text_round_trips(i in any::<i128>()) {
            let value = AttributeValue::Integer(BigInt::from(i));
            let reparsed = DataType::Integer.parse(&value.to_string()).unwrap();
            prop_assert_eq!(reparsed, value);
        }
    }
}
