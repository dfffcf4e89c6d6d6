//! LOC (RFC 1876) in its textual form:
//! `d1 [m1 [s1]] {N|S} d2 [m2 [s2]] {E|W} alt[m] [siz[m] [hp[m] [vp[m]]]]`.
use regex::Regex;

use super::fields::{check_ttl, zero_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    // Altitude runs from -100000.00 to 42849672.95 metres.
    static ref LOC_RE: Regex = Regex::new(concat!(
        r"^(90|[1-8]\d|0?\d)( ([1-5]\d|0?\d)( ([1-5]\d|0?\d)(\.\d{1,3})?)?)? [NS] ",
        r"(180|1[0-7]\d|[1-9]\d|0?\d)( ([1-5]\d|0?\d)( ([1-5]\d|0?\d)(\.\d{1,3})?)?)? [EW] ",
        r"(-(100000(\.00)?|\d{1,5}(\.\d\d)?)",
        r"|([1-3]?\d{1,7}(\.\d\d)?",
        r"|4([01][0-9]{6}|2([0-7][0-9]{5}|8([0-3][0-9]{4}|4([0-8][0-9]{3}|9([0-5][0-9]{2}|6([0-6][0-9]|7[01]))))))(\.\d\d)?",
        r"|42849672(\.([0-8]\d|9[0-5]))?))[m]?",
        r"( (\d{1,7}|[1-8]\d{7})(\.\d\d)?[m]?){0,3}$",
    ))
    .unwrap();
}

pub struct LocValidator {
    hostnames: HostnameValidator,
}

impl LocValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for LocValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        if !LOC_RE.is_match(content) {
            return Err(Rejected::new("Invalid value for content field of LOC record."));
        }
        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "LOC")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(content: &str) -> crate::validation::ValidationResult {
        LocValidator::new(HostnameValidator::default())
            .validate(&RecordInput::new(content, "geo.example.com"))
    }

    #[test]
    fn accepts_rfc1876_examples() {
        for content in [
            "42 21 54 N 71 06 18 W -24m 30m",
            "42 21 43.952 N 71 5 6.344 W -24m 1m 200m",
            "52 14 05 N 00 08 50 E 10m",
            "32 7 19 S 116 2 25 E 10m",
            "90 S 180 W 42849672.95m 1000000m 10000m 10m",
            "0 N 0 E 0",
        ] {
            assert!(loc(content).is_valid(), "{content}");
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for content in [
            "91 N 0 E 0m",
            "42 60 N 71 E 0m",
            "42 N 181 E 0m",
            "42 N 71 X 0m",
            "42 N 71 E -100001m",
            "42 N 71 E 42849673m",
            "42 N 71 E 0m 1m 1m 1m 1m",
            "",
        ] {
            let res = loc(content);
            assert_eq!(
                res.first_error(),
                Some("Invalid value for content field of LOC record."),
                "{content}"
            );
        }
    }

    #[test]
    fn priority_must_be_zero() {
        let res = LocValidator::new(HostnameValidator::default())
            .validate(&RecordInput::new("52 14 05 N 00 08 50 E 10m", "geo.example.com").prio("1"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }
}
