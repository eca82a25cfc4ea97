//! Name and network-address data types.
//!
//! Each type parses its XACML lexical form and renders a canonical one:
//! - `rfc822Name`: `local@domain`, domain compared case-insensitively
//! - `x500Name`: RFC 4514 distinguished name, RDN types upper-cased
//! - `ipAddress`: `address[/mask][:ports]`, IPv6 in brackets
//! - `dnsName`: `host[:ports]`, host optionally `*.`-prefixed

use std::fmt::{self, Display};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::datatype::DataType;
use crate::error::ValueError;

// ============================================================================
// rfc822Name
// ============================================================================

/// An e-mail style name. The domain is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rfc822Name {
    pub local_part: String,
    pub domain: String,
}

impl Rfc822Name {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::Rfc822Name, text);
        let (local_part, domain) = text.split_once('@').ok_or_else(invalid)?;
        if local_part.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || text.chars().any(char::is_whitespace)
        {
            return Err(invalid());
        }
        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_ascii_lowercase(),
        })
    }
}

impl Display for Rfc822Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

// ============================================================================
// x500Name
// ============================================================================

/// One `TYPE=value` pair of a relative distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeTypeAndValue {
    pub attribute_type: String,
    pub value: String,
}

/// A distinguished name as an ordered list of RDNs, each a set of pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct X500Name {
    pub rdns: Vec<Vec<AttributeTypeAndValue>>,
}

/// Splits on any of `separators` outside quotes and backslash escapes.
fn split_unescaped(text: &str, separators: &[char]) -> Vec<(String, Option<char>)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut quoted = false;
    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                quoted = !quoted;
            }
            c if !quoted && separators.contains(&c) => {
                parts.push((std::mem::take(&mut current), Some(c)));
            }
            c => current.push(c),
        }
    }
    parts.push((current, None));
    parts
}

impl X500Name {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::X500Name, text);
        if text.trim().is_empty() {
            return Err(invalid());
        }

        let mut rdns = Vec::new();
        let mut rdn = Vec::new();
        for (component, separator) in split_unescaped(text, &[',', ';', '+']) {
            let (attribute_type, value) = component.split_once('=').ok_or_else(invalid)?;
            let attribute_type = attribute_type.trim();
            let value = value.trim();
            if attribute_type.is_empty() || value.is_empty() {
                return Err(invalid());
            }
            rdn.push(AttributeTypeAndValue {
                attribute_type: attribute_type.to_ascii_uppercase(),
                value: value.to_string(),
            });
            if separator != Some('+') {
                rdns.push(std::mem::take(&mut rdn));
            }
        }
        Ok(Self { rdns })
    }
}

impl Display for X500Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            for (j, pair) in rdn.iter().enumerate() {
                if j > 0 {
                    f.write_str("+")?;
                }
                write!(f, "{}={}", pair.attribute_type, pair.value)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Port ranges
// ============================================================================

/// A port range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PortRange {
    pub low: Option<u16>,
    pub high: Option<u16>,
}

impl PortRange {
    fn parse(text: &str) -> Option<Self> {
        let parse_port = |s: &str| -> Option<Option<u16>> {
            if s.is_empty() {
                return Some(None);
            }
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok().map(Some)
        };
        let range = match text.split_once('-') {
            Some((low, high)) => Self {
                low: parse_port(low)?,
                high: parse_port(high)?,
            },
            None => {
                let port = parse_port(text)??;
                Self {
                    low: Some(port),
                    high: Some(port),
                }
            }
        };
        match (range.low, range.high) {
            (None, None) => None,
            (Some(low), Some(high)) if low > high => None,
            _ => Some(range),
        }
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low, self.high) {
            (Some(low), Some(high)) if low == high => write!(f, "{low}"),
            (low, high) => {
                if let Some(low) = low {
                    write!(f, "{low}")?;
                }
                f.write_str("-")?;
                if let Some(high) = high {
                    write!(f, "{high}")?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// ipAddress
// ============================================================================

/// An IP address with optional mask and port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpAddress {
    pub address: IpAddr,
    pub mask: Option<IpAddr>,
    pub ports: Option<PortRange>,
}

impl IpAddress {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let parsed = if text.starts_with('[') {
            Self::parse_v6(text)
        } else {
            Self::parse_v4(text)
        };
        parsed.ok_or_else(|| ValueError::lexical(DataType::IpAddress, text))
    }

    fn parse_v4(text: &str) -> Option<Self> {
        let (rest, ports) = match text.split_once(':') {
            Some((rest, ports)) => (rest, Some(PortRange::parse(ports)?)),
            None => (text, None),
        };
        let (address, mask) = match rest.split_once('/') {
            Some((address, mask)) => (address, Some(mask.parse::<Ipv4Addr>().ok()?)),
            None => (rest, None),
        };
        Some(Self {
            address: IpAddr::V4(address.parse().ok()?),
            mask: mask.map(IpAddr::V4),
            ports,
        })
    }

    fn parse_v6(text: &str) -> Option<Self> {
        let (address, mut rest) = text.strip_prefix('[')?.split_once(']')?;
        let address: Ipv6Addr = address.parse().ok()?;

        let mut mask = None;
        if let Some(after) = rest.strip_prefix("/[") {
            let (inner, after) = after.split_once(']')?;
            mask = Some(IpAddr::V6(inner.parse().ok()?));
            rest = after;
        }
        let ports = match rest.strip_prefix(':') {
            Some(ports) => Some(PortRange::parse(ports)?),
            None if rest.is_empty() => None,
            None => return None,
        };
        Some(Self {
            address: IpAddr::V6(address),
            mask,
            ports,
        })
    }
}

impl Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V4(address) => write!(f, "{address}")?,
            IpAddr::V6(address) => write!(f, "[{address}]")?,
        }
        match self.mask {
            Some(IpAddr::V4(mask)) => write!(f, "/{mask}")?,
            Some(IpAddr::V6(mask)) => write!(f, "/[{mask}]")?,
            None => {}
        }
        if let Some(ports) = self.ports {
            write!(f, ":{ports}")?;
        }
        Ok(())
    }
}

// ============================================================================
// dnsName
// ============================================================================

/// A host name with optional port range. The host is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsName {
    pub host: String,
    pub ports: Option<PortRange>,
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

impl DnsName {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::lexical(DataType::DnsName, text);
        let (host, ports) = match text.split_once(':') {
            Some((host, ports)) => (host, Some(PortRange::parse(ports).ok_or_else(invalid)?)),
            None => (text, None),
        };
        let labels = host.strip_prefix("*.").unwrap_or(host);
        if !labels.split('.').all(is_valid_label) {
            return Err(invalid());
        }
        Ok(Self {
            host: host.to_ascii_lowercase(),
            ports,
        })
    }

    /// Whether the host is a `*.` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.host.starts_with("*.")
    }
}

impl Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)?;
        if let Some(ports) = self.ports {
            write!(f, ":{ports}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_rfc822_domain_is_case_insensitive() {
        let a = Rfc822Name::parse("Anne@Example.COM").unwrap();
        let b = Rfc822Name::parse("Anne@example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Anne@example.com");
        assert_ne!(a, Rfc822Name::parse("anne@example.com").unwrap());
    }

    #[test_case("anne"; "no at sign")]
    #[test_case("@example.com"; "empty local part")]
    #[test_case("anne@"; "empty domain")]
    #[test_case("a@b@c"; "two at signs")]
    fn test_rfc822_rejects(text: &str) {
        assert!(Rfc822Name::parse(text).is_err());
    }

    #[test]
    fn test_x500_canonical_form() {
        let name = X500Name::parse("cn=John Smith , o = Medico Corp; c=US").unwrap();
        assert_eq!(name.to_string(), "CN=John Smith,O=Medico Corp,C=US");
        assert_eq!(name.rdns.len(), 3);
    }

    #[test]
    fn test_x500_multi_valued_rdn_and_escapes() {
        let name = X500Name::parse(r"CN=Smith\, John+UID=jsmith,O=Acme").unwrap();
        assert_eq!(name.rdns.len(), 2);
        assert_eq!(name.rdns[0].len(), 2);
        assert_eq!(name.rdns[0][0].value, r"Smith\, John");
    }

    #[test_case(""; "empty")]
    #[test_case("CN"; "missing equals")]
    #[test_case("CN=,O=Acme"; "empty value")]
    fn test_x500_rejects(text: &str) {
        assert!(X500Name::parse(text).is_err());
    }

    #[test_case("10.0.0.1", "10.0.0.1"; "bare v4")]
    #[test_case("10.0.0.0/255.0.0.0", "10.0.0.0/255.0.0.0"; "v4 mask")]
    #[test_case("10.0.0.1:80-90", "10.0.0.1:80-90"; "v4 port range")]
    #[test_case("10.0.0.1/255.255.0.0:443", "10.0.0.1/255.255.0.0:443"; "v4 mask and port")]
    #[test_case("[::1]", "[::1]"; "bare v6")]
    #[test_case("[2001:DB8::1]/[ffff::]:-1024", "[2001:db8::1]/[ffff::]:-1024"; "v6 everything")]
    fn test_ip_address_canonical(text: &str, expected: &str) {
        assert_eq!(IpAddress::parse(text).unwrap().to_string(), expected);
    }

    #[test_case("10.0.0"; "short v4")]
    #[test_case("::1"; "unbracketed v6")]
    #[test_case("10.0.0.1:90-80"; "inverted range")]
    #[test_case("10.0.0.1:-"; "empty range")]
    #[test_case("[::1]x"; "trailing garbage")]
    fn test_ip_address_rejects(text: &str) {
        assert!(IpAddress::parse(text).is_err());
    }

    #[test_case("Example.COM", "example.com"; "lower cased")]
    #[test_case("*.example.com:8080", "*.example.com:8080"; "wildcard with port")]
    #[test_case("host:1024-", "host:1024-"; "open upper bound")]
    fn test_dns_name_canonical(text: &str, expected: &str) {
        assert_eq!(DnsName::parse(text).unwrap().to_string(), expected);
    }

    #[test_case("ex ample.com"; "space")]
    #[test_case("-bad.com"; "leading hyphen")]
    #[test_case("a..b"; "empty label")]
    #[test_case("foo.*.com"; "inner wildcard")]
    fn test_dns_name_rejects(text: &str) {
        assert!(DnsName::parse(text).is_err());
    }

    #[test]
    fn test_dns_wildcard_flag() {
        assert!(DnsName::parse("*.example.com").unwrap().is_wildcard());
        assert!(!DnsName::parse("www.example.com").unwrap().is_wildcard());
    }
}
