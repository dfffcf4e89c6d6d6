//! Address records: A, AAAA and APL.
use std::net::{Ipv4Addr, Ipv6Addr};

use super::fields::{check_ttl, number_in, zero_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

/// A and AAAA.
pub struct AddressValidator {
    hostnames: HostnameValidator,
    family: Family,
}

impl AddressValidator {
    pub fn a(hostnames: HostnameValidator) -> Self {
        Self {
            hostnames,
            family: Family::V4,
        }
    }

    pub fn aaaa(hostnames: HostnameValidator) -> Self {
        Self {
            hostnames,
            family: Family::V6,
        }
    }
}

impl RecordValidator for AddressValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let (ok, rtype) = match self.family {
            Family::V4 => (content.parse::<Ipv4Addr>().is_ok(), "A"),
            Family::V6 => (content.parse::<Ipv6Addr>().is_ok(), "AAAA"),
        };
        if !ok {
            return Err(match self.family {
                Family::V4 => Rejected::new("This is not a valid IPv4 address."),
                Family::V6 => Rejected::new("This is not a valid IPv6 address."),
            });
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, rtype)?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        }))
    }
}

/// APL (RFC 3123): a list of `[!]afi:address/prefix` items.
pub struct AplValidator {
    hostnames: HostnameValidator,
}

impl AplValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for AplValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let content = input.content.trim();

        let mut warnings = Vec::new();
        if content.is_empty() {
            warnings.push(
                "Empty APL record represents an empty list of address prefixes.".to_string(),
            );
        }
        for item in content.split_whitespace() {
            if let Some(w) = check_apl_item(item)? {
                warnings.push(w);
            }
        }

        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        let prio = zero_prio(input.prio, "APL")?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}

fn check_apl_item(item: &str) -> Result<Option<String>, Rejected> {
    let item = item.strip_prefix('!').unwrap_or(item);
    let parsed = item
        .split_once(':')
        .and_then(|(afi, rest)| rest.split_once('/').map(|(addr, prefix)| (afi, addr, prefix)));
    let Some((afi, addr, prefix)) = parsed else {
        return Err(Rejected::new(
            "Invalid APL element format. Expected [!]afi:address/prefix.",
        ));
    };
    let Some(prefix) = number_in(prefix, 0, i64::MAX) else {
        return Err(Rejected::new(
            "Invalid APL element format. Expected [!]afi:address/prefix.",
        ));
    };

    match afi {
        "1" => {
            let ip: Ipv4Addr = addr
                .parse()
                .map_err(|_| Rejected::new("Invalid IPv4 address in APL record."))?;
            if prefix > 32 {
                return Err(Rejected::new("IPv4 prefix must be between 0 and 32."));
            }
            let host_bits = u32::from(ip) & u32::MAX.checked_shr(prefix as u32).unwrap_or(0);
            if host_bits != 0 {
                return Ok(Some(format!(
                    "APL item {item} has address bits set beyond its /{prefix} prefix."
                )));
            }
        }
        "2" => {
            addr.parse::<Ipv6Addr>()
                .map_err(|_| Rejected::new("Invalid IPv6 address in APL record."))?;
            if prefix > 128 {
                return Err(Rejected::new("IPv6 prefix must be between 0 and 128."));
            }
        }
        _ => {
            return Err(Rejected::new(
                "Invalid Address Family Identifier (AFI). Must be 1 for IPv4 or 2 for IPv6.",
            ));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> AddressValidator {
        AddressValidator::a(HostnameValidator::default())
    }

    #[test]
    fn a_record() {
        let res = a().validate(&RecordInput::new("192.0.2.1", "www.example.com").default_ttl(3600));
        assert!(res.is_valid());
        let data = res.data.unwrap();
        assert_eq!(data.ttl, 3600);
        assert_eq!(data.prio, 0);

        let res = a().validate(&RecordInput::new("192.0.2.256", "www.example.com"));
        assert_eq!(res.first_error(), Some("This is not a valid IPv4 address."));
        let res = a().validate(&RecordInput::new("2001:db8::1", "www.example.com"));
        assert!(!res.is_valid());
    }

    #[test]
    fn a_record_allows_wildcard_names() {
        assert!(a().validate(&RecordInput::new("192.0.2.1", "*.example.com")).is_valid());
    }

    #[test]
    fn aaaa_record() {
        let v = AddressValidator::aaaa(HostnameValidator::default());
        assert!(v.validate(&RecordInput::new("2001:db8::1", "host.example.com")).is_valid());
        let res = v.validate(&RecordInput::new("192.0.2.1", "host.example.com"));
        assert_eq!(res.first_error(), Some("This is not a valid IPv6 address."));
    }

    #[test]
    fn address_rejects_priority() {
        let res = a().validate(&RecordInput::new("192.0.2.1", "www.example.com").prio("5"));
        assert!(!res.is_valid());
    }

    #[test]
    fn apl_items() {
        let v = AplValidator::new(HostnameValidator::default());
        let ok = v.validate(&RecordInput::new(
            "1:192.168.32.0/21 !1:192.168.38.0/28 2:2001:db8::/32",
            "acl.example.com",
        ));
        assert!(ok.is_valid());
        assert!(ok.warnings.is_empty());

        let empty = v.validate(&RecordInput::new("", "acl.example.com"));
        assert!(empty.is_valid());
        assert_eq!(empty.warnings.len(), 1);

        assert!(!v.validate(&RecordInput::new("3:192.0.2.0/24", "acl.example.com")).is_valid());
        assert!(!v.validate(&RecordInput::new("1:192.0.2.0/33", "acl.example.com")).is_valid());
        assert!(!v.validate(&RecordInput::new("1:192.0.2.0", "acl.example.com")).is_valid());
        assert!(!v.validate(&RecordInput::new("2:zzzz::/64", "acl.example.com")).is_valid());

        let loose = v.validate(&RecordInput::new("1:192.0.2.1/24", "acl.example.com"));
        assert!(loose.is_valid());
        assert_eq!(loose.warnings.len(), 1);
    }

    #[test]
    fn apl_priority_must_be_zero() {
        let v = AplValidator::new(HostnameValidator::default());
        let res = v.validate(&RecordInput::new("1:192.0.2.0/24", "acl.example.com").prio("1"));
        assert_eq!(
            res.first_error(),
            Some("Invalid value for priority field. APL records must have priority value of 0.")
        );
    }
}
