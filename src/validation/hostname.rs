//! Hostname syntax rules shared by every record type.
use regex::Regex;

use super::Rejected;

lazy_static::lazy_static! {
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_/-]+$").unwrap();
}

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

const INVALID_CHARS: &str = "You have invalid characters in your zone name.";
const DASH_EDGE: &str = "A hostname can not start or end with a dash.";
const BAD_LABEL_LEN: &str = "Given hostname or one of the labels is too short or too long.";

#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameValidator {
    top_level_tld_check: bool,
}

impl HostnameValidator {
    pub fn new(top_level_tld_check: bool) -> Self {
        Self {
            top_level_tld_check,
        }
    }

    /// Check `hostname` and return it without its trailing dot.
    ///
    /// `.`, `@` and `@.`-prefixed names pass untouched. Under `.arpa`, one
    /// label may use RFC 2317 `subnet/prefix` notation.
    pub fn check(&self, hostname: &str, allow_wildcard: bool) -> Result<String, Rejected> {
        if hostname == "." || hostname == "@" || hostname.starts_with("@.") {
            return Ok(hostname.to_string());
        }

        let normalized = hostname.strip_suffix('.').unwrap_or(hostname);
        if normalized.len() > MAX_HOSTNAME_LEN {
            return Err(Rejected::new("The hostname is too long."));
        }

        let labels: Vec<&str> = normalized.split('.').collect();
        if self.top_level_tld_check && labels.len() == 1 {
            return Err(Rejected::new("Single-label hostnames are not allowed."));
        }

        let mut errors = Vec::new();
        for (idx, label) in labels.iter().enumerate() {
            let wildcard = allow_wildcard && idx == 0 && *label == "*";
            if !wildcard && !LABEL_RE.is_match(label) {
                errors.push(INVALID_CHARS.to_string());
            }
            if label.starts_with('-') || label.ends_with('-') {
                errors.push(DASH_EDGE.to_string());
            }
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                errors.push(BAD_LABEL_LEN.to_string());
            }
        }
        if !errors.is_empty() {
            return Err(Rejected::many(errors));
        }

        if labels.last() == Some(&"arpa") {
            check_classless_arpa(&labels)?;
        } else if normalized.contains('/') {
            return Err(Rejected::new("Given hostname has too many slashes."));
        }

        Ok(normalized.to_string())
    }

    pub fn is_valid(&self, hostname: &str, allow_wildcard: bool) -> bool {
        self.check(hostname, allow_wildcard).is_ok()
    }
}

/// RFC 2317 `subnet/prefix` labels inside reverse zones.
fn check_classless_arpa(labels: &[&str]) -> Result<(), Rejected> {
    let mut slashed = labels.iter().filter(|l| l.contains('/'));
    let Some(label) = slashed.next() else {
        return Ok(());
    };
    if slashed.next().is_some() {
        return Err(Rejected::new(
            "Multiple slashes in different labels are not allowed in ARPA zones.",
        ));
    }

    let parts: Vec<&str> = label.split('/').collect();
    let &[subnet, prefix] = parts.as_slice() else {
        return Err(Rejected::new(
            "Invalid RFC 2317 format. Use format: subnet/prefix (e.g., 0/26).",
        ));
    };

    let family = labels.len().checked_sub(2).map(|i| labels[i]);
    let prefix_num = || {
        prefix
            .parse::<u32>()
            .map_err(|_| {
                Rejected::new("Invalid prefix length in RFC 2317 notation. Must be numeric.")
            })
    };

    match family {
        Some("in-addr") => {
            let subnet = subnet.parse::<u32>().ok().filter(|s| *s <= 255).ok_or_else(|| {
                Rejected::new("Invalid subnet number in RFC 2317 notation. Must be 0-255 for IPv4.")
            })?;
            let prefix = prefix_num()?;
            if !(24..=32).contains(&prefix) {
                return Err(Rejected::new(
                    "Invalid IPv4 prefix length for RFC 2317. Typically 24-32 (classless delegation usually 25-31).",
                ));
            }
            let block = 1u32 << (32 - prefix);
            if subnet % block != 0 {
                return Err(Rejected::new(format!(
                    "Subnet {subnet} is not aligned with prefix /{prefix}. Should be multiple of {block}."
                )));
            }
        }
        Some("ip6") => {
            if !super::fields::is_hex(subnet) {
                return Err(Rejected::new(
                    "Invalid subnet in RFC 2317 notation. Must be hexadecimal (0-9, a-f) for IPv6.",
                ));
            }
            if prefix_num()? > 128 {
                return Err(Rejected::new("Invalid IPv6 prefix length. Must be 0-128."));
            }
        }
        _ => {
            if !super::fields::is_hex(subnet) {
                return Err(Rejected::new(
                    "Invalid subnet in RFC 2317 notation. Must be numeric or hexadecimal.",
                ));
            }
            if prefix_num()? > 128 {
                return Err(Rejected::new("Invalid prefix length. Must be 0-128."));
            }
        }
    }
    Ok(())
}

/// Qualify a record name with its zone unless it already ends with it.
/// Blank and `@` stand for the apex.
pub fn normalize_record_name(name: &str, zone: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "@" {
        return zone.to_string();
    }
    let (lower, zone_lower) = (name.to_ascii_lowercase(), zone.to_ascii_lowercase());
    if lower == zone_lower || lower.ends_with(&format!(".{zone_lower}")) {
        return name.to_string();
    }
    format!("{name}.{zone}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v() -> HostnameValidator {
        HostnameValidator::default()
    }

    #[test]
    fn accepts_common_names() {
        assert_eq!(v().check("www.example.com", false).unwrap(), "www.example.com");
        assert_eq!(v().check("example.com.", false).unwrap(), "example.com");
        assert_eq!(v().check("_sip._tcp.example.com", false).unwrap(), "_sip._tcp.example.com");
        assert!(v().is_valid("@", false));
        assert!(v().is_valid(".", false));
    }

    #[test]
    fn wildcard_only_in_first_label() {
        assert!(v().is_valid("*.example.com", true));
        assert!(!v().is_valid("*.example.com", false));
        assert!(!v().is_valid("www.*.example.com", true));
    }

    #[test]
    fn label_errors_are_collected_once() {
        let err = v().check("-bad-.ex!ample.com", false).unwrap_err();
        assert_eq!(err.errors(), &[DASH_EDGE.to_string(), INVALID_CHARS.to_string()]);

        let err = v().check("a..com", false).unwrap_err();
        assert!(err.errors().contains(&BAD_LABEL_LEN.to_string()));
    }

    #[test]
    fn length_limits() {
        let long_label = "a".repeat(64);
        assert!(!v().is_valid(&format!("{long_label}.com"), false));
        let long_name = format!("{}.com", ["abcdefghi"; 26].join("."));
        assert_eq!(v().check(&long_name, false).unwrap_err().first(), "The hostname is too long.");
    }

    #[test]
    fn single_label_toggle() {
        assert!(v().is_valid("localhost", false));
        let strict = HostnameValidator::new(true);
        assert_eq!(
            strict.check("localhost", false).unwrap_err().first(),
            "Single-label hostnames are not allowed."
        );
    }

    #[test]
    fn slashes() {
        assert!(v().is_valid("0/26.1.168.192.in-addr.arpa", false));
        assert!(v().is_valid("64/26.1.168.192.in-addr.arpa", false));
        assert_eq!(
            v().check("65/26.1.168.192.in-addr.arpa", false).unwrap_err().first(),
            "Subnet 65 is not aligned with prefix /26. Should be multiple of 64."
        );
        assert!(!v().is_valid("0/20.1.168.192.in-addr.arpa", false));
        assert!(!v().is_valid("0/26.1/2.168.192.in-addr.arpa", false));
        assert!(v().is_valid("f/64.8.b.d.0.1.0.0.2.ip6.arpa", false));
        assert_eq!(
            v().check("a/b.example.com", false).unwrap_err().first(),
            "Given hostname has too many slashes."
        );
    }

    #[test]
    fn record_names_are_qualified() {
        assert_eq!(normalize_record_name("www", "example.com"), "www.example.com");
        assert_eq!(normalize_record_name("www.example.com", "example.com"), "www.example.com");
        assert_eq!(normalize_record_name("WWW.Example.COM", "example.com"), "WWW.Example.COM");
        assert_eq!(normalize_record_name("", "example.com"), "example.com");
        assert_eq!(normalize_record_name("@", "example.com"), "example.com");
        assert_eq!(
            normalize_record_name("myexample.com", "example.com"),
            "myexample.com.example.com"
        );
    }
}
