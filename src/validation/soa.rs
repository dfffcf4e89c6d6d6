//! SOA content: `primary-ns hostmaster serial refresh retry expire minimum`.
use chrono::NaiveDate;
use regex::Regex;

use super::fields::check_ttl;
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
    ).unwrap();
}

/// Timer fields after the serial, with their RFC 2308 recommended floors.
const TIMERS: [(&str, i64); 4] = [
    ("refresh", 1800),
    ("retry", 600),
    ("expire", 604800),
    ("minimum", 300),
];

pub struct SoaValidator {
    hostnames: HostnameValidator,
}

impl SoaValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(&self, content: &str) -> Result<(String, Vec<String>), Rejected> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        let &[primary, hostmaster, serial, ..] = fields.as_slice() else {
            return Err(field_count_error());
        };
        if fields.len() != 7 {
            return Err(field_count_error());
        }

        let primary = self
            .hostnames
            .check(primary, false)
            .ok()
            .filter(|ns| !is_arpa(ns))
            .ok_or_else(|| Rejected::new("Invalid primary nameserver in SOA record."))?;
        let rname = mailbox_to_rname(hostmaster)?;

        let mut warnings = Vec::new();
        let n: i64 = serial
            .parse()
            .map_err(|_| Rejected::new("Serial number must be numeric."))?;
        if !(0..=u32::MAX as i64).contains(&n) {
            return Err(Rejected::new(
                "Serial number must be a 32-bit unsigned integer (0 to 4294967295).",
            ));
        }
        if serial.len() == 10 && !is_calendar_date(&serial[..8]) {
            warnings.push(
                "Serial number appears to use YYYYMMDDnn format but contains an invalid date. This is allowed but not recommended."
                    .to_string(),
            );
        }

        let mut timers = [0i64; 4];
        for (idx, (label, floor)) in TIMERS.iter().enumerate() {
            let raw = fields[3 + idx];
            let value: i64 = raw
                .parse()
                .map_err(|_| Rejected::new(format!("SOA {label} field must be numeric.")))?;
            if value < 0 {
                return Err(Rejected::new(format!(
                    "SOA {label} field must be a positive integer."
                )));
            }
            if value < *floor {
                warnings.push(format!(
                    "SOA {label} value ({value}) is below the RFC 2308 recommended minimum ({floor}). This is allowed but not recommended."
                ));
            }
            timers[idx] = value;
        }

        let [refresh, retry, _, minimum] = timers;
        if retry >= refresh {
            warnings.push(
                "SOA retry value should be less than refresh value according to RFC 2308. This is allowed but not recommended."
                    .to_string(),
            );
        }
        if minimum > 86400 {
            warnings.push(
                "SOA minimum (negative caching) value exceeds 24 hours (86400), which may be excessive according to RFC 2308."
                    .to_string(),
            );
        }

        let content = format!("{primary} {rname} {}", fields[2..].join(" "));
        Ok((content, warnings))
    }
}

impl RecordValidator for SoaValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let zone = input.zone.ok_or_else(|| {
            Rejected::new("The zone name is required to validate an SOA record.")
        })?;
        let zone = zone.trim_end_matches('.');

        let name = input.name.trim().trim_end_matches('.');
        if !name.eq_ignore_ascii_case(zone) {
            return Err(Rejected::new(
                "Invalid value for name field of SOA record. It should be the name of the zone.",
            ));
        }
        let name = self.hostnames.check(name, true)?;

        let (content, warnings) = self.check_content(input.content)?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content,
            name,
            prio: 0,
            ttl,
        })
        .with_warnings(warnings))
    }
}

fn field_count_error() -> Rejected {
    Rejected::new(
        "SOA record must have exactly 7 fields (primary NS, email, serial, refresh, retry, expire, minimum).",
    )
}

fn is_arpa(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "arpa" || lower.ends_with(".arpa")
}

fn is_calendar_date(yyyymmdd: &str) -> bool {
    NaiveDate::parse_from_str(yyyymmdd, "%Y%m%d").is_ok()
}

/// Turn a hostmaster given as `user.example.com` or `user@example.com`
/// into SOA RNAME form, escaping dots that belong to the local part.
fn mailbox_to_rname(hostmaster: &str) -> Result<String, Rejected> {
    let email = if hostmaster.contains('@') {
        hostmaster.to_string()
    } else {
        let split = first_unescaped_dot(hostmaster)
            .ok_or_else(|| Rejected::new("Invalid email address in SOA record."))?;
        let local = hostmaster[..split].replace("\\.", ".");
        format!("{local}@{}", &hostmaster[split + 1..])
    };
    let email = email.trim_end_matches('.');
    if !EMAIL_RE.is_match(email) {
        return Err(Rejected::new("Invalid email address in SOA record."));
    }

    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| Rejected::new("Invalid email address in SOA record."))?;
    Ok(format!("{}.{domain}", local.replace('.', "\\.")))
}

fn first_unescaped_dot(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '.' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v() -> SoaValidator {
        SoaValidator::new(HostnameValidator::default())
    }

    const TIMERS: &str = "28800 7200 604800 86400";

    fn soa(head: &str) -> String {
        format!("{head} {TIMERS}")
    }

    fn input(content: &str) -> RecordInput<'_> {
        RecordInput::new(content, "example.com").zone("example.com")
    }

    #[test]
    fn valid_soa_is_normalized() {
        let res = v().validate(&input(
            "ns1.example.com. hostmaster.example.com 2024010101 28800 7200 604800 86400",
        ));
        assert!(res.is_valid(), "{:?}", res.errors);
        let data = res.data.unwrap();
        assert_eq!(
            data.content,
            "ns1.example.com hostmaster.example.com 2024010101 28800 7200 604800 86400"
        );
        assert_eq!(data.prio, 0);
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn email_form_and_escaped_local_part() {
        let expected = soa("ns1.example.com john\\.doe.example.com 1");
        for head in [
            "ns1.example.com john.doe@example.com 1",
            "ns1.example.com john\\.doe.example.com 1",
        ] {
            let content = soa(head);
            let res = v().validate(&input(&content));
            assert_eq!(res.data.unwrap().content, expected, "{head}");
        }
    }

    #[test]
    fn name_must_be_the_zone() {
        let content = soa("ns1.example.com hostmaster.example.com 1");
        let res = v().validate(&RecordInput::new(&content, "www.example.com").zone("example.com"));
        assert_eq!(
            res.first_error(),
            Some("Invalid value for name field of SOA record. It should be the name of the zone.")
        );
    }

    #[test]
    fn field_count_is_checked_before_the_fields() {
        for content in [
            "",
            "ns1.example.com",
            "ns1.example.com hostmaster.example.com",
            "ns1.example.com hostmaster.example.com 2024010101",
            "1.in-addr.arpa bad 1 2 3",
            "a b c d e f g h",
        ] {
            let res = v().validate(&input(content));
            let err = res.first_error().unwrap_or_default();
            assert!(err.starts_with("SOA record must have exactly 7 fields"), "{content}: {err}");
        }
    }

    #[test]
    fn primary_ns_and_serial_checks() {
        let cases = [
            (
                "1.in-addr.arpa hostmaster.example.com 1",
                "Invalid primary nameserver in SOA record.",
            ),
            ("ns1.example.com hostmaster.example.com abc", "Serial number must be numeric."),
            (
                "ns1.example.com hostmaster.example.com 4294967296",
                "Serial number must be a 32-bit unsigned integer (0 to 4294967295).",
            ),
        ];
        for (head, msg) in cases {
            let content = soa(head);
            assert_eq!(v().validate(&input(&content)).first_error(), Some(msg), "{head}");
        }

        let content = soa("ns1.example.com hostmaster.example.com 2024133101");
        let res = v().validate(&input(&content));
        assert!(res.is_valid());
        assert!(res.warnings[0].contains("invalid date"));
    }

    #[test]
    fn timers() {
        let head = "ns1.example.com hostmaster.example.com 1";
        let res = v().validate(&input(&format!("{head} x 7200 604800 86400")));
        assert_eq!(res.first_error(), Some("SOA refresh field must be numeric."));

        let res = v().validate(&input(&format!("{head} 3600 3600 604800 100000")));
        assert!(res.is_valid());
        assert_eq!(res.warnings.len(), 2);

        let res = v().validate(&input(&format!("{head} 60 30 604800 86400")));
        assert!(res.warnings.iter().any(|w| w.contains("SOA refresh value (60)")));
    }

    #[test]
    fn zone_is_required() {
        let res = v().validate(&RecordInput::new("ns1.example.com a.b 1 2 3 4 5", "example.com"));
        assert!(!res.is_valid());
    }
}
