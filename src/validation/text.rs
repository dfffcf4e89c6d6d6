//! Text-carrying records: TXT, SPF, HINFO and CAA.
use std::net::{Ipv4Addr, Ipv6Addr};

use regex::Regex;

use super::fields::{check_ttl, has_html_tags, is_printable, zero_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref SPF_DOMAIN_SPEC_RE: Regex = Regex::new(r"^[A-Za-z0-9_.%{}+=-]+$").unwrap();
    static ref SPF_MODIFIER_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").unwrap();
    static ref CAA_RE: Regex = Regex::new(r#"^(\d{1,3})\s+([A-Za-z0-9]+)\s+"(.*)"$"#).unwrap();
}

const MAX_CHARACTER_STRING: usize = 255;

/// One `<character-string>` of presentation format.
#[derive(Debug, PartialEq, Eq)]
struct CharString {
    text: String,
    quoted: bool,
}

/// Split content into character-strings: `"..."` with backslash escapes, or
/// bare words. `None` when a quote is left open or sits inside a bare word.
fn character_strings(s: &str) -> Option<Vec<CharString>> {
    let mut out = Vec::new();
    let mut chars = s.trim().chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut text = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        text.push(c);
                        text.push(chars.next()?);
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => text.push(c),
                }
            }
            if !closed || chars.peek().is_some_and(|c| !c.is_whitespace()) {
                return None;
            }
            out.push(CharString { text, quoted: true });
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                if c == '"' {
                    return None;
                }
                text.push(c);
                chars.next();
            }
            out.push(CharString {
                text,
                quoted: false,
            });
        }
    }
    Some(out)
}

pub struct TxtValidator {
    hostnames: HostnameValidator,
}

impl TxtValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for TxtValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters have been used in this record."));
        }
        if has_html_tags(content) {
            return Err(Rejected::new("HTML tags are not allowed in TXT records."));
        }
        if !(content.len() >= 2 && content.starts_with('"') && content.ends_with('"')) {
            return Err(Rejected::new("Add quotes around TXT record content."));
        }
        let strings = character_strings(content).filter(|s| s.iter().all(|s| s.quoted));
        if strings.is_none() {
            return Err(Rejected::new(
                "Backslashes must precede all quotes (\") in TXT content.",
            ));
        }

        let prio = zero_prio(input.prio, "TXT")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        }))
    }
}

/// SPF (RFC 7208). Unquoted content is wrapped in quotes before storage.
pub struct SpfValidator {
    hostnames: HostnameValidator,
}

impl SpfValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for SpfValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let policy = super::fields::unquote(content).unwrap_or(content);
        if !is_valid_spf(policy) {
            return Err(Rejected::new("The content of the SPF record is invalid."));
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "SPF")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: format!("\"{policy}\""),
            name,
            prio,
            ttl,
        }))
    }
}

fn is_valid_spf(policy: &str) -> bool {
    let mut terms = policy.split_whitespace();
    if terms.next() != Some("v=spf1") {
        return false;
    }
    terms.all(is_valid_spf_term)
}

fn is_valid_spf_term(term: &str) -> bool {
    // name=value before any ':' or '/' makes it a modifier.
    if let Some(idx) = term.find(['=', ':', '/']) {
        if term[idx..].starts_with('=') {
            let (name, value) = (&term[..idx], &term[idx + 1..]);
            return match name.to_ascii_lowercase().as_str() {
                "redirect" | "exp" => SPF_DOMAIN_SPEC_RE.is_match(value),
                _ => SPF_MODIFIER_RE.is_match(name),
            };
        }
    }

    let term = term.strip_prefix(['+', '-', '~', '?']).unwrap_or(term);
    let (mechanism, arg) = match term.find([':', '/']) {
        Some(idx) => term.split_at(idx),
        None => (term, ""),
    };

    match mechanism.to_ascii_lowercase().as_str() {
        "all" => arg.is_empty(),
        "include" | "exists" => arg
            .strip_prefix(':')
            .is_some_and(|d| SPF_DOMAIN_SPEC_RE.is_match(d)),
        "a" | "mx" => is_domain_with_cidr(arg),
        "ptr" => {
            arg.is_empty()
                || arg
                    .strip_prefix(':')
                    .is_some_and(|d| SPF_DOMAIN_SPEC_RE.is_match(d))
        }
        "ip4" => arg
            .strip_prefix(':')
            .is_some_and(|net| is_network(net, 32, |a| a.parse::<Ipv4Addr>().is_ok())),
        "ip6" => arg
            .strip_prefix(':')
            .is_some_and(|net| is_network(net, 128, |a| a.parse::<Ipv6Addr>().is_ok())),
        _ => false,
    }
}

/// `[:domain][/cidr4][//cidr6]` as used by the `a` and `mx` mechanisms.
fn is_domain_with_cidr(arg: &str) -> bool {
    let (domain, cidr) = match arg.find('/') {
        Some(idx) => arg.split_at(idx),
        None => (arg, ""),
    };
    if !domain.is_empty()
        && !domain
            .strip_prefix(':')
            .is_some_and(|d| SPF_DOMAIN_SPEC_RE.is_match(d))
    {
        return false;
    }
    if cidr.is_empty() {
        return true;
    }
    let (v4, v6) = match cidr.split_once("//") {
        Some((v4, v6)) => (v4, Some(v6)),
        None => (cidr, None),
    };
    let v4_ok = v4.is_empty()
        || v4
            .strip_prefix('/')
            .and_then(|n| n.parse::<u8>().ok())
            .is_some_and(|n| n <= 32);
    let v6_ok = v6.is_none_or(|n| n.parse::<u8>().is_ok_and(|n| n <= 128));
    v4_ok && v6_ok
}

fn is_network(net: &str, max_prefix: u8, is_addr: impl Fn(&str) -> bool) -> bool {
    match net.split_once('/') {
        Some((addr, prefix)) => {
            is_addr(addr) && prefix.parse::<u8>().is_ok_and(|p| p <= max_prefix)
        }
        None => is_addr(net),
    }
}

/// HINFO (RFC 1035): `cpu os`, each quoted or a bare word.
pub struct HinfoValidator {
    hostnames: HostnameValidator,
}

impl HinfoValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for HinfoValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let fields = character_strings(content)
            .filter(|f| f.len() == 2)
            .ok_or_else(|| {
                Rejected::new("HINFO record must have exactly two fields (CPU and OS).")
            })?;
        if fields.iter().any(|f| f.text.trim().is_empty()) {
            return Err(Rejected::new("HINFO fields cannot be empty."));
        }
        if fields.iter().any(|f| f.text.len() > MAX_CHARACTER_STRING) {
            return Err(Rejected::new(
                "HINFO field exceeds maximum length of 255 characters.",
            ));
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "HINFO")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        }))
    }
}

/// CAA (RFC 8659): `flags tag "value"`.
pub struct CaaValidator {
    hostnames: HostnameValidator,
}

impl CaaValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for CaaValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let caps = CAA_RE.captures(content).ok_or_else(|| {
            Rejected::new("CAA record must be in the format: <flags> <tag> \"<value>\"")
        })?;
        let flags = &caps[1];
        let tag = caps[2].to_ascii_lowercase();
        let value = &caps[3];

        if flags.parse::<u8>().is_err() {
            return Err(Rejected::new("CAA flags must be a number between 0 and 255."));
        }
        if tag.len() > 15 {
            return Err(Rejected::new("CAA tag must not be longer than 15 characters."));
        }
        if !value.is_empty() && !is_printable(value) {
            return Err(Rejected::new("Invalid characters have been used in the CAA value."));
        }

        let mut warnings = Vec::new();
        match tag.as_str() {
            "issue" | "issuewild" | "issuemail" => {}
            "iodef" => {
                let lower = value.to_ascii_lowercase();
                let url_like = ["mailto:", "http://", "https://"]
                    .iter()
                    .any(|scheme| lower.starts_with(scheme));
                if !url_like {
                    return Err(Rejected::new(
                        "CAA iodef value must be a mailto:, http:// or https:// URL.",
                    ));
                }
            }
            _ => warnings.push(format!(
                "CAA tag '{tag}' is not one of issue, issuewild, issuemail or iodef."
            )),
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "CAA")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;

    fn h() -> HostnameValidator {
        HostnameValidator::default()
    }

    fn txt(content: &str) -> ValidationResult {
        TxtValidator::new(h()).validate(&RecordInput::new(content, "example.com"))
    }

    #[test]
    fn txt_quoting() {
        assert!(txt("\"This is a valid TXT record\"").is_valid());
        assert!(txt("\"v=DKIM1; k=rsa; \" \"p=MIGfMA0\"").is_valid());
        assert!(txt("\"This has \\\"escaped\\\" quotes\"").is_valid());
        assert_eq!(
            txt("This needs quotes").first_error(),
            Some("Add quotes around TXT record content.")
        );
        assert!(txt("\"This has \"unescaped\" quotes\"").first_error().unwrap().contains("quotes"));
    }

    #[test]
    fn txt_rejects_html_and_priority() {
        assert!(txt("\"This has <html> tags\"").first_error().unwrap().contains("HTML"));
        let v = TxtValidator::new(h());
        let res = v.validate(&RecordInput::new("\"ok\"", "example.com").prio("10"));
        assert!(res.first_error().unwrap().contains("priority"));
        let res = v.validate(&RecordInput::new("\"ok\"", "example.com").ttl("-5"));
        assert!(res.first_error().unwrap().contains("TTL"));
    }

    #[test]
    fn spf_is_wrapped_in_quotes() {
        let v = SpfValidator::new(h());
        let bare = "v=spf1 mx a:mail.example.com ip4:192.0.2.0/24 -all";
        let res = v.validate(&RecordInput::new(bare, "example.com"));
        assert!(res.is_valid());
        assert_eq!(
            res.data.unwrap().content,
            "\"v=spf1 mx a:mail.example.com ip4:192.0.2.0/24 -all\""
        );
        let quoted = "\"v=spf1 include:_spf.example.net ~all\"";
        let res = v.validate(&RecordInput::new(quoted, "example.com"));
        assert_eq!(res.data.unwrap().content, quoted);
    }

    #[test]
    fn spf_grammar() {
        for ok in [
            "v=spf1",
            "v=spf1 -all",
            "v=spf1 a/24 mx//64 ?ip6:2001:db8::/32 redirect=_spf.example.com",
            "v=spf1 exists:%{i}.bl.example.com exp=explain.example.com -all",
            "v=spf1 ptr +ptr:example.com a:example.com/28//64 all",
        ] {
            assert!(is_valid_spf(ok), "{ok}");
        }
        for bad in [
            "spf1 -all",
            "v=spf1 include",
            "v=spf1 ip4:300.1.1.1",
            "v=spf1 ip4:192.0.2.0/33",
            "v=spf1 bogus:example.com",
            "v=spf1 all:example.com",
        ] {
            assert!(!is_valid_spf(bad), "{bad}");
        }
        let res = SpfValidator::new(h()).validate(&RecordInput::new("v=spf2", "example.com"));
        assert_eq!(res.first_error(), Some("The content of the SPF record is invalid."));
    }

    #[test]
    fn hinfo_fields() {
        let v = HinfoValidator::new(h());
        for ok in ["\"Intel Xeon\" \"Linux 6.1\"", "x86_64 Linux"] {
            assert!(v.validate(&RecordInput::new(ok, "host.example.com")).is_valid(), "{ok}");
        }

        let res = v.validate(&RecordInput::new("\"only one\"", "host.example.com"));
        assert!(res.first_error().unwrap().contains("exactly two fields"));
        let res = v.validate(&RecordInput::new("a b c", "host.example.com"));
        assert!(res.first_error().unwrap().contains("exactly two fields"));
        let res = v.validate(&RecordInput::new("\"\" \"Linux\"", "host.example.com"));
        assert!(res.first_error().unwrap().contains("cannot be empty"));
        let long = format!("\"{}\" Linux", "x".repeat(256));
        let res = v.validate(&RecordInput::new(&long, "host.example.com"));
        assert!(res.first_error().unwrap().contains("exceeds maximum length"));
        let res = v.validate(&RecordInput::new("x86 Linux", "host.example.com").prio("1"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }

    #[test]
    fn caa_records() {
        let v = CaaValidator::new(h());
        for ok in ["0 issue \"letsencrypt.org\"", "0 iodef \"mailto:security@example.com\""] {
            assert!(v.validate(&RecordInput::new(ok, "example.com")).is_valid(), "{ok}");
        }
        for bad in ["0 iodef \"ftp://x\"", "256 issue \"ca.example\"", "0 issue ca.example"] {
            assert!(!v.validate(&RecordInput::new(bad, "example.com")).is_valid(), "{bad}");
        }
        let custom = v.validate(&RecordInput::new("128 tbs \"x\"", "example.com"));
        assert!(custom.is_valid());
        assert_eq!(custom.warnings.len(), 1);
    }
}
