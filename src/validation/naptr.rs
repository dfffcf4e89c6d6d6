//! NAPTR (RFC 3403): `order preference "flags" "service" "regexp" replacement`.
use regex::Regex;

use super::fields::{check_ttl, is_quoted, is_u16, split_fields, zero_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref SERVICE_RE: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9:+\-]{0,31})(\+[a-zA-Z][a-zA-Z0-9:+\-]{0,31})*$").unwrap();
    static ref ENUM_SERVICE_RE: Regex = Regex::new(r"^(?i)E2U(\+[a-z][a-z0-9]{0,31})*$").unwrap();
    static ref ENUM_NAME_RE: Regex = Regex::new(r"\d+\.\d+\.\d+\.in-addr\.arpa$").unwrap();
    static ref DANGEROUS_REGEXP: [(Regex, &'static str); 5] = [
        (Regex::new(r"\(\?\{").unwrap(), "Perl code execution in regexp"),
        (Regex::new(r"\(\?[<>]").unwrap(), "Named backreferences"),
        (Regex::new(r"\(\?[#|=!]").unwrap(), "Conditional or comment expressions"),
        (Regex::new(r"\\\$[$&`']").unwrap(), "Potentially dangerous backreferences"),
        (Regex::new(r"\$\$").unwrap(), "Double dollar sign backreference"),
    ];
}

const MAX_REGEXP_LEN: usize = 1000;

pub struct NaptrValidator {
    hostnames: HostnameValidator,
}

impl NaptrValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(&self, content: &str) -> Result<Vec<String>, Rejected> {
        let parts = split_fields(content, 6);
        let &[order, preference, flags, service, regexp, replacement] = parts.as_slice() else {
            return Err(Rejected::new(
                "NAPTR record must contain order, preference, flags, service, regexp, and replacement values.",
            ));
        };

        if !is_u16(order) {
            return Err(Rejected::new(
                "NAPTR record order must be a number between 0 and 65535.",
            ));
        }
        if !is_u16(preference) {
            return Err(Rejected::new(
                "NAPTR record preference must be a number between 0 and 65535.",
            ));
        }

        if !is_quoted(flags) {
            return Err(Rejected::new("NAPTR record flags must be a quoted string."));
        }
        let flags = flags.trim_matches('"');
        if !flags.chars().all(|c| "APSUapsu".contains(c)) {
            return Err(Rejected::new(
                "NAPTR record flags must contain only A, P, S, or U.",
            ));
        }
        if flags.len() > 1 {
            return Err(Rejected::new(
                "Terminal flags \"S\", \"A\", \"U\", and \"P\" should not be combined with other flags.",
            ));
        }

        if !is_quoted(service) {
            return Err(Rejected::new("NAPTR record service must be a quoted string."));
        }
        let service = service.trim_matches('"');
        if !service.is_empty() && !SERVICE_RE.is_match(service) {
            return Err(Rejected::new(
                "NAPTR service must follow the format: [protocol][+rs][+rs]... where protocol and rs start with a letter and contain alphanumeric characters, hyphens, colons, or plus signs (max 32 chars each).",
            ));
        }
        let mut warnings = Vec::new();
        if ENUM_SERVICE_RE.is_match(service) {
            warnings.push(
                "This appears to be an ENUM NAPTR record (RFC 6116). Ensure the domain is under e164.arpa or a private ENUM tree."
                    .to_string(),
            );
            if !flags.eq_ignore_ascii_case("u") {
                warnings.push(
                    "ENUM records should have the \"U\" flag to indicate URI output.".to_string(),
                );
            }
        }

        if !is_quoted(regexp) {
            return Err(Rejected::new("NAPTR record regexp must be a quoted string."));
        }
        let regexp = regexp.trim_matches('"');
        check_regexp(regexp)?;
        if regexp.len() > 50 {
            warnings.push(
                "Complex regexp patterns in NAPTR records can be difficult to debug and maintain.".to_string(),
            );
        }

        if replacement != "." && !self.hostnames.is_valid(replacement, true) {
            return Err(Rejected::new(
                "NAPTR record replacement must be either \".\" or a valid fully-qualified domain name.",
            ));
        }
        if !regexp.is_empty() && replacement != "." {
            return Err(Rejected::new(
                "NAPTR record with a regexp must have \".\" as the replacement.",
            ));
        }

        Ok(warnings)
    }
}

/// `<delim>pattern<delim>replacement<delim>flags`, flags limited to `i`.
fn check_regexp(regexp: &str) -> Result<(), Rejected> {
    let Some(delim) = regexp.chars().next() else {
        return Ok(());
    };
    if regexp.matches(delim).count() < 3 {
        return Err(Rejected::new(
            "NAPTR regexp must have the format delimiter+pattern+delimiter+replacement+delimiter+flags.",
        ));
    }
    let flags = regexp.rsplit(delim).next().unwrap_or_default();
    if !flags.chars().all(|c| c == 'i') {
        return Err(Rejected::new(
            "NAPTR regexp flags (after third delimiter) should only contain \"i\" or be empty.",
        ));
    }
    for (pattern, description) in DANGEROUS_REGEXP.iter() {
        if pattern.is_match(regexp) {
            return Err(Rejected::new(format!(
                "NAPTR regexp contains potentially dangerous pattern: {description}"
            )));
        }
    }
    if regexp.len() > MAX_REGEXP_LEN {
        return Err(Rejected::new(
            "NAPTR regexp is too long. Maximum length is 1000 characters.",
        ));
    }
    Ok(())
}

impl RecordValidator for NaptrValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;

        let mut warnings = Vec::new();
        if name.contains("e164.arpa") || ENUM_NAME_RE.is_match(&name) {
            warnings.push(
                "This appears to be an ENUM domain. NAPTR records should use E2U service field and follow RFC 6116."
                    .to_string(),
            );
        }
        warnings.extend(self.check_content(input.content)?);

        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        let prio = zero_prio(input.prio, "NAPTR")?;
        warnings.push(
            "This record follows RFC 3403. Be aware that some DNS servers may not fully support all NAPTR features."
                .to_string(),
        );

        Ok(Accepted::new(RecordData {
            content: input.content.trim().to_string(),
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}
