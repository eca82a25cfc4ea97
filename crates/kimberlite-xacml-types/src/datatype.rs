//! Attribute data types and the registry that resolves their identifiers.
//!
//! Every data type has a full identifier (a URI) and a short alias used by
//! the JSON profile. The [`DataTypeRegistry`] maps both onto the closed
//! [`DataType`] enumeration and delegates text parsing to it.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;

use base64::Engine;
use num_bigint::BigInt;

use crate::error::ValueError;
use crate::names::{DnsName, IpAddress, Rfc822Name, X500Name};
use crate::temporal::{DayTimeDuration, XacmlDate, XacmlDateTime, XacmlTime, YearMonthDuration};
use crate::value::AttributeValue;
use crate::xpath::XPathExpression;

// ============================================================================
// DataType
// ============================================================================

/// The attribute data types understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    String,
    Boolean,
    Integer,
    Double,
    Time,
    Date,
    DateTime,
    DayTimeDuration,
    YearMonthDuration,
    AnyUri,
    HexBinary,
    Base64Binary,
    Rfc822Name,
    X500Name,
    IpAddress,
    DnsName,
    XPathExpression,
}

impl DataType {
    /// All data types, in registry order.
    pub const ALL: [DataType; 17] = [
        DataType::String,
        DataType::Boolean,
        DataType::Integer,
        DataType::Double,
        DataType::Time,
        DataType::Date,
        DataType::DateTime,
        DataType::DayTimeDuration,
        DataType::YearMonthDuration,
        DataType::AnyUri,
        DataType::HexBinary,
        DataType::Base64Binary,
        DataType::Rfc822Name,
        DataType::X500Name,
        DataType::IpAddress,
        DataType::DnsName,
        DataType::XPathExpression,
    ];

    /// The full identifier of this data type.
    pub fn identifier(self) -> &'static str {
        match self {
            DataType::String => "http://www.w3.org/2001/XMLSchema#string",
            DataType::Boolean => "http://www.w3.org/2001/XMLSchema#boolean",
            DataType::Integer => "http://www.w3.org/2001/XMLSchema#integer",
            DataType::Double => "http://www.w3.org/2001/XMLSchema#double",
            DataType::Time => "http://www.w3.org/2001/XMLSchema#time",
            DataType::Date => "http://www.w3.org/2001/XMLSchema#date",
            DataType::DateTime => "http://www.w3.org/2001/XMLSchema#dateTime",
            DataType::DayTimeDuration => "http://www.w3.org/2001/XMLSchema#dayTimeDuration",
            DataType::YearMonthDuration => "http://www.w3.org/2001/XMLSchema#yearMonthDuration",
            DataType::AnyUri => "http://www.w3.org/2001/XMLSchema#anyURI",
            DataType::HexBinary => "http://www.w3.org/2001/XMLSchema#hexBinary",
            DataType::Base64Binary => "http://www.w3.org/2001/XMLSchema#base64Binary",
            DataType::Rfc822Name => "urn:oasis:names:tc:xacml:1.0:data-type:rfc822Name",
            DataType::X500Name => "urn:oasis:names:tc:xacml:1.0:data-type:x500Name",
            DataType::IpAddress => "urn:oasis:names:tc:xacml:2.0:data-type:ipAddress",
            DataType::DnsName => "urn:oasis:names:tc:xacml:2.0:data-type:dnsName",
            DataType::XPathExpression => "urn:oasis:names:tc:xacml:3.0:data-type:xpathExpression",
        }
    }

    /// The JSON profile shorthand for this data type.
    pub fn short_name(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Double => "double",
            DataType::Time => "time",
            DataType::Date => "date",
            DataType::DateTime => "dateTime",
            DataType::DayTimeDuration => "dayTimeDuration",
            DataType::YearMonthDuration => "yearMonthDuration",
            DataType::AnyUri => "anyURI",
            DataType::HexBinary => "hexBinary",
            DataType::Base64Binary => "base64Binary",
            DataType::Rfc822Name => "rfc822Name",
            DataType::X500Name => "x500Name",
            DataType::IpAddress => "ipAddress",
            DataType::DnsName => "dnsName",
            DataType::XPathExpression => "xpathExpression",
        }
    }

    /// Parses the canonical textual form of a value of this type.
    ///
    /// `XPathExpression` yields a bare path; the category and namespace
    /// bindings only travel in structured form.
    pub fn parse(self, text: &str) -> Result<AttributeValue, ValueError> {
        let value = match self {
            DataType::String => AttributeValue::String(text.to_string()),
            DataType::Boolean => AttributeValue::Boolean(parse_boolean(text)?),
            DataType::Integer => AttributeValue::Integer(parse_integer(text)?),
            DataType::Double => AttributeValue::Double(parse_double(text)?),
            DataType::Time => AttributeValue::Time(XacmlTime::parse(text)?),
            DataType::Date => AttributeValue::Date(XacmlDate::parse(text)?),
            DataType::DateTime => AttributeValue::DateTime(XacmlDateTime::parse(text)?),
            DataType::DayTimeDuration => {
                AttributeValue::DayTimeDuration(DayTimeDuration::parse(text)?)
            }
            DataType::YearMonthDuration => {
                AttributeValue::YearMonthDuration(YearMonthDuration::parse(text)?)
            }
            DataType::AnyUri => AttributeValue::AnyUri(parse_any_uri(text)?),
            DataType::HexBinary => AttributeValue::HexBinary(
                hex::decode(text).map_err(|_| ValueError::lexical(self, text))?,
            ),
            DataType::Base64Binary => AttributeValue::Base64Binary(parse_base64(text)?),
            DataType::Rfc822Name => AttributeValue::Rfc822Name(Rfc822Name::parse(text)?),
            DataType::X500Name => AttributeValue::X500Name(X500Name::parse(text)?),
            DataType::IpAddress => AttributeValue::IpAddress(IpAddress::parse(text)?),
            DataType::DnsName => AttributeValue::DnsName(DnsName::parse(text)?),
            DataType::XPathExpression => {
                if text.trim().is_empty() {
                    return Err(ValueError::lexical(self, text));
                }
                AttributeValue::XPathExpression(XPathExpression::new(text))
            }
        };
        Ok(value)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for DataType {
    type Err = ValueError;

    /// Resolves through the standard registry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataTypeRegistry::standard().resolve(s)
    }
}

// ============================================================================
// Lexical helpers
// ============================================================================

fn parse_boolean(text: &str) -> Result<bool, ValueError> {
    match text {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValueError::lexical(DataType::Boolean, text)),
    }
}

/// `[+-]?[0-9]+`; `NaN`, `INF` and friends are rejected.
fn parse_integer(text: &str) -> Result<BigInt, ValueError> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::lexical(DataType::Integer, text));
    }
    let magnitude =
        BigInt::from_str(unsigned).map_err(|_| ValueError::lexical(DataType::Integer, text))?;
    Ok(if text.starts_with('-') { -magnitude } else { magnitude })
}

/// XML Schema double: decimal or scientific notation, or `INF`, `-INF`, `NaN`.
fn parse_double(text: &str) -> Result<f64, ValueError> {
    match text {
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        "NaN" => return Ok(f64::NAN),
        _ => {}
    }

    let unsigned = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (mantissa, ""),
    };
    let mantissa_ok = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp
            .strip_prefix('+')
            .or_else(|| exp.strip_prefix('-'))
            .unwrap_or(exp);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    });
    if !mantissa_ok || !exponent_ok {
        return Err(ValueError::lexical(DataType::Double, text));
    }

    f64::from_str(text).map_err(|_| ValueError::lexical(DataType::Double, text))
}

fn parse_any_uri(text: &str) -> Result<String, ValueError> {
    if text.chars().any(char::is_whitespace) {
        return Err(ValueError::lexical(DataType::AnyUri, text));
    }
    Ok(text.to_string())
}

fn parse_base64(text: &str) -> Result<Vec<u8>, ValueError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| ValueError::lexical(DataType::Base64Binary, text))
}

// ============================================================================
// Registry
// ============================================================================

/// Maps data type identifiers and aliases to [`DataType`]s.
///
/// The standard table is built once per process and never mutated, so it
/// can be shared freely across threads. Deployments that need extra
/// identifiers clone it and layer aliases on top with [`with_alias`].
///
/// [`with_alias`]: DataTypeRegistry::with_alias
#[derive(Debug, Clone)]
pub struct DataTypeRegistry {
    by_name: HashMap<String, DataType>,
}

/// Pre-XACML-3.0 identifiers for the duration types.
const LEGACY_ALIASES: [(&str, DataType); 2] = [
    (
        "http://www.w3.org/TR/2002/WD-xquery-operators-20020816#dayTimeDuration",
        DataType::DayTimeDuration,
    ),
    (
        "http://www.w3.org/TR/2002/WD-xquery-operators-20020816#yearMonthDuration",
        DataType::YearMonthDuration,
    ),
];

impl DataTypeRegistry {
    /// Returns the process-wide standard registry.
    pub fn standard() -> &'static DataTypeRegistry {
        static STANDARD: OnceLock<DataTypeRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::build_standard)
    }

    fn build_standard() -> Self {
        let mut by_name = HashMap::with_capacity(DataType::ALL.len() * 2 + LEGACY_ALIASES.len());
        for data_type in DataType::ALL {
            by_name.insert(data_type.identifier().to_string(), data_type);
            by_name.insert(data_type.short_name().to_string(), data_type);
        }
        for (alias, data_type) in LEGACY_ALIASES {
            by_name.insert(alias.to_string(), data_type);
        }
        Self { by_name }
    }

    /// Adds an extra identifier for an existing data type (builder pattern).
    pub fn with_alias(mut self, alias: impl Into<String>, data_type: DataType) -> Self {
        self.by_name.insert(alias.into(), data_type);
        self
    }

    /// Resolves a full identifier or short alias.
    pub fn resolve(&self, name: &str) -> Result<DataType, ValueError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ValueError::UnknownDataType(name.to_string()))
    }

    /// Parses text as a value of `data_type`.
    pub fn parse(&self, data_type: DataType, text: &str) -> Result<AttributeValue, ValueError> {
        data_type.parse(text)
    }

    /// Renders a value in its canonical textual form.
    pub fn format(&self, value: &AttributeValue) -> String {
        value.to_string()
    }

    /// Reports whether `value` already belongs to `data_type`.
    pub fn matches(&self, data_type: DataType, value: &AttributeValue) -> bool {
        value.data_type() == data_type
    }
}

impl Default for DataTypeRegistry {
    fn default() -> Self {
        Self::standard().clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
