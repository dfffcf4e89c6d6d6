//! Records whose content names another host: NS, PTR, DNAME, ALIAS,
//! CNAME, MX, KX, MINFO and RP.
use regex::Regex;

use super::fields::{check_ttl, is_printable, ranged_prio, zero_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref RP_LABEL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$").unwrap();
}

/// NS, PTR, DNAME and ALIAS: a bare hostname target.
pub struct TargetValidator {
    hostnames: HostnameValidator,
    rtype: &'static str,
    coerce_prio: bool,
}

impl TargetValidator {
    pub fn new(hostnames: HostnameValidator, rtype: &'static str) -> Self {
        Self {
            hostnames,
            rtype,
            coerce_prio: false,
        }
    }

    /// PTR keeps whatever priority it is given at zero.
    pub fn ptr(hostnames: HostnameValidator) -> Self {
        Self {
            hostnames,
            rtype: "PTR",
            coerce_prio: true,
        }
    }
}

impl RecordValidator for TargetValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = self.hostnames.check(input.content.trim(), false)?;
        let name = self.hostnames.check(input.name, true)?;
        let prio = if self.coerce_prio {
            0
        } else {
            zero_prio(input.prio, self.rtype)?
        };
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content,
            name,
            prio,
            ttl,
        }))
    }
}

pub struct CnameValidator {
    hostnames: HostnameValidator,
}

impl CnameValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for CnameValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        if let Some(zone) = input.zone {
            if name.eq_ignore_ascii_case(zone.trim_end_matches('.')) {
                return Err(Rejected::new("Empty CNAME records are not allowed."));
            }
        }

        let content = self.hostnames.check(input.content.trim(), false)?;
        let prio = input.prio.trim();
        if !(prio.is_empty() || prio == "0") {
            return Err(Rejected::new(
                "Invalid value for priority field. CNAME records must have priority value of 0.",
            ));
        }
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content,
            name,
            prio: 0,
            ttl,
        }))
    }
}

pub struct MxValidator {
    hostnames: HostnameValidator,
}

impl MxValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for MxValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = self
            .hostnames
            .check(input.content.trim(), false)
            .map_err(|_| Rejected::new("Invalid mail server hostname."))?;
        let name = self.hostnames.check(input.name, true)?;
        let prio = ranged_prio(
            input.prio,
            10,
            "Invalid value for MX priority field. It should be a number between 0 and 65535.",
        )?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content,
            name,
            prio,
            ttl,
        }))
    }
}

/// KX (RFC 2230): like MX, with the priority called "preference".
pub struct KxValidator {
    hostnames: HostnameValidator,
}

impl KxValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for KxValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = self
            .hostnames
            .check(input.content.trim(), false)
            .map_err(|_| Rejected::new("Invalid key exchanger hostname."))?;
        let name = self.hostnames.check(input.name, true)?;
        let prio = ranged_prio(
            input.prio,
            10,
            "Invalid value for KX preference field. It should be a number between 0 and 65535.",
        )?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        let warnings = vec![
            "KX records are only trustworthy when the zone is signed with DNSSEC (RFC 2230)."
                .to_string(),
            format!(
                "Make sure {content} has A/AAAA records; key exchangers are looked up by address."
            ),
        ];

        Ok(Accepted::new(RecordData {
            content,
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}

/// MINFO (RFC 1035): `rmailbx emailbx`, either may be the root `.`.
pub struct MinfoValidator {
    hostnames: HostnameValidator,
}

impl MinfoValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn mailbox(&self, raw: &str, message: &str) -> Result<String, Rejected> {
        if raw == "." {
            return Ok(raw.to_string());
        }
        self.hostnames
            .check(raw, false)
            .map_err(|_| Rejected::new(message))
    }
}

impl RecordValidator for MinfoValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let parts: Vec<&str> = input.content.split_whitespace().collect();
        let &[rmailbx, emailbx] = parts.as_slice() else {
            return Err(Rejected::new(
                "MINFO record must contain both a responsible mailbox and an error mailbox.",
            ));
        };
        let rmailbx = self.mailbox(rmailbx, "Invalid responsible mailbox in MINFO record.")?;
        let emailbx = self.mailbox(emailbx, "Invalid error mailbox in MINFO record.")?;

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "MINFO")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        let mut warnings = vec![
            "MINFO is an experimental record type (RFC 1035) and few resolvers use it.".to_string(),
        ];
        if rmailbx != "." && !rmailbx.split('.').next().unwrap_or_default().ends_with("-request") {
            warnings.push(
                "By convention the responsible mailbox of a mailing list is its -request address."
                    .to_string(),
            );
        }

        Ok(Accepted::new(RecordData {
            content: format!("{rmailbx} {emailbx}"),
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}

/// RP (RFC 1183): `mbox-dname txt-dname`, both fully qualified or `.`.
pub struct RpValidator {
    hostnames: HostnameValidator,
}

impl RpValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

/// One RP domain field. `what` names the field in messages.
fn check_rp_domain(domain: &str, what: &str) -> Result<(), Rejected> {
    if domain == "." {
        return Ok(());
    }
    let Some(body) = domain.strip_suffix('.') else {
        return Err(Rejected::new(format!(
            "RP {what} must be a fully qualified domain name (end with a dot)."
        )));
    };
    if !body.split('.').all(|label| RP_LABEL_RE.is_match(label)) {
        return Err(Rejected::new(format!("RP {what} contains invalid characters.")));
    }
    Ok(())
}

impl RecordValidator for RpValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        if !is_printable(input.name) {
            return Err(Rejected::new("Invalid characters in name field."));
        }
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        if content.is_empty() {
            return Err(Rejected::new("RP record content cannot be empty."));
        }
        if !is_printable(content) {
            return Err(Rejected::new("RP record contains invalid characters."));
        }
        let parts: Vec<&str> = content.split_whitespace().collect();
        let &[mailbox, txt] = parts.as_slice() else {
            return Err(Rejected::new(
                "RP record must contain mailbox-domain and txt-record-domain.",
            ));
        };
        check_rp_domain(mailbox, "mailbox domain")?;
        check_rp_domain(txt, "TXT domain")?;

        let prio = zero_prio(input.prio, "RP")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: format!("{mailbox} {txt}"),
            name,
            prio,
            ttl,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h() -> HostnameValidator {
        HostnameValidator::default()
    }

    #[test]
    fn mx_priority_defaults_to_ten() {
        let res =
            MxValidator::new(h()).validate(&RecordInput::new("mail.example.com", "example.com"));
        assert!(res.is_valid());
        assert_eq!(res.data.unwrap().prio, 10);
    }

    #[test]
    fn mx_priority_out_of_range() {
        for prio in ["-1", "65536", "ten"] {
            let res = MxValidator::new(h())
                .validate(&RecordInput::new("mail.example.com", "example.com").prio(prio));
            assert!(res.first_error().unwrap().contains("Invalid value for MX priority"));
        }
    }

    #[test]
    fn mx_requires_hostname() {
        let res = MxValidator::new(h()).validate(&RecordInput::new("mail server", "example.com"));
        assert_eq!(res.first_error(), Some("Invalid mail server hostname."));
    }

    #[test]
    fn kx_warns_and_uses_preference_wording() {
        let kx = KxValidator::new(h());
        let ok = kx.validate(&RecordInput::new("kx.example.com", "example.com").prio("5"));
        assert!(ok.is_valid());
        let joined = ok.warnings.join(" ");
        assert!(joined.contains("DNSSEC"));
        assert!(joined.contains("RFC 2230"));
        assert!(joined.contains("A/AAAA records"));

        let bad = kx.validate(&RecordInput::new("kx.example.com", "example.com").prio("70000"));
        assert!(bad.first_error().unwrap().contains("preference field"));
    }

    #[test]
    fn cname_at_apex_is_rejected() {
        let v = CnameValidator::new(h());
        let apex = RecordInput::new("target.example.net", "example.com").zone("example.com");
        let res = v.validate(&apex);
        assert!(res.first_error().unwrap().contains("Empty CNAME"));

        let below = RecordInput::new("target.example.net", "www.example.com").zone("example.com");
        assert!(v.validate(&below).is_valid());
    }

    #[test]
    fn cname_priority_must_be_zero() {
        let res = CnameValidator::new(h())
            .validate(&RecordInput::new("target.example.net", "www.example.com").prio("10"));
        assert!(!res.is_valid());
    }

    #[test]
    fn ptr_coerces_priority() {
        let res = TargetValidator::ptr(h())
            .validate(&RecordInput::new("host.example.com", "1.2.0.192.in-addr.arpa").prio("10"));
        assert!(res.is_valid());
        assert_eq!(res.data.unwrap().prio, 0);
    }

    #[test]
    fn ns_rejects_priority() {
        let res = TargetValidator::new(h(), "NS")
            .validate(&RecordInput::new("ns1.example.com", "example.com").prio("3"));
        assert!(!res.is_valid());
    }

    #[test]
    fn minfo_mailboxes() {
        let v = MinfoValidator::new(h());
        let res = v.validate(&RecordInput::new(
            "list-request.example.com owner.example.com",
            "list.example.com",
        ));
        assert!(res.is_valid());
        assert_eq!(res.warnings.len(), 1);

        let res = v.validate(&RecordInput::new(". .", "list.example.com"));
        assert!(res.is_valid());

        assert!(!v.validate(&RecordInput::new("only.example.com", "list.example.com")).is_valid());
        let res = v.validate(&RecordInput::new("bad!box.example.com .", "list.example.com"));
        assert!(!res.is_valid());
        let both = "a.example.com b.example.com";
        let res = v.validate(&RecordInput::new(both, "list.example.com").prio("1"));
        assert!(!res.is_valid());
    }

    #[test]
    fn rp_domains() {
        let v = RpValidator::new(h());
        let res = v.validate(&RecordInput::new(
            "hostmaster.example.com.  contact.example.com.",
            "example.com",
        ));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert_eq!(
            res.data.unwrap().content,
            "hostmaster.example.com. contact.example.com."
        );
        assert!(v.validate(&RecordInput::new(". .", "example.com")).is_valid());

        let cases = [
            ("", "RP record content cannot be empty."),
            (
                "hostmaster.example.com.",
                "RP record must contain mailbox-domain and txt-record-domain.",
            ),
            (
                "hostmaster.example.com contact.example.com.",
                "RP mailbox domain must be a fully qualified domain name (end with a dot).",
            ),
            (
                "hostmaster.example.com. contact.example.com",
                "RP TXT domain must be a fully qualified domain name (end with a dot).",
            ),
            (
                "host_master.example.com. contact.example.com.",
                "RP mailbox domain contains invalid characters.",
            ),
            (
                "hostmaster.example.com. -txt.example.com.",
                "RP TXT domain contains invalid characters.",
            ),
        ];
        for (content, msg) in cases {
            let res = v.validate(&RecordInput::new(content, "example.com"));
            assert_eq!(res.first_error(), Some(msg), "{content}");
        }

        let res = v.validate(&RecordInput::new(". .", "example.com").prio("5"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }
}
