//! Service binding records: SVCB and HTTPS (RFC 9460).
use std::net::{Ipv4Addr, Ipv6Addr};

use regex::Regex;

use super::fields::{check_ttl, is_printable, number_in, ranged_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref SVCB_RE: Regex = Regex::new(r"^(\d+)\s+(\S+)(\s+.*)?$").unwrap();
    static ref SVC_PARAM_RE: Regex = Regex::new(r"^([a-z0-9-]+)(?:=(.+))?$").unwrap();
    static ref ALPN_RE: Regex = Regex::new(r"^[a-z0-9,\-]+$").unwrap();
    static ref KEY_N_RE: Regex = Regex::new(r"^key[0-9]{1,5}$").unwrap();
}

/// Parameters that take no value.
const FLAG_PARAMS: &[&str] = &["no-default-alpn"];

const KNOWN_PARAMS: &[&str] = &[
    "mandatory",
    "alpn",
    "no-default-alpn",
    "port",
    "ipv4hint",
    "ech",
    "ipv6hint",
    "dohpath",
];

/// `priority target [key=value ...]`. Priority 0 is AliasMode and takes no
/// parameters; anything else is ServiceMode.
pub struct SvcbValidator {
    hostnames: HostnameValidator,
    rtype: &'static str,
}

impl SvcbValidator {
    pub fn svcb(hostnames: HostnameValidator) -> Self {
        Self {
            hostnames,
            rtype: "SVCB",
        }
    }

    pub fn https(hostnames: HostnameValidator) -> Self {
        Self {
            hostnames,
            rtype: "HTTPS",
        }
    }

    fn reject(&self, msg: &str) -> Rejected {
        Rejected::new(format!("{} {msg}", self.rtype))
    }

    /// Returns the priority field and warnings about the parameters.
    fn check_content(&self, content: &str) -> Result<(u16, Vec<String>), Rejected> {
        let caps = SVCB_RE.captures(content).ok_or_else(|| {
            self.reject(
                "record must start with a priority and target: \
                 <priority> <target> [<params>...]",
            )
        })?;
        let priority = caps[1]
            .parse::<u16>()
            .map_err(|_| self.reject("priority must be between 0 and 65535."))?;
        let target = &caps[2];
        if target != "." && !self.hostnames.is_valid(target, false) {
            return Err(self.reject(
                "target must be either \".\" (for AliasMode) or a valid hostname.",
            ));
        }

        let params: Vec<&str> = caps
            .get(3)
            .map(|m| m.as_str().split_whitespace().collect())
            .unwrap_or_default();
        if priority == 0 && !params.is_empty() {
            return Err(self.reject("AliasMode (priority 0) records must not have parameters."));
        }

        let mut warnings = Vec::new();
        let mut keys = Vec::with_capacity(params.len());
        let mut mandatory: Vec<&str> = Vec::new();
        for param in params {
            let caps = SVC_PARAM_RE
                .captures(param)
                .ok_or_else(|| self.reject("parameters must be in \"key=value\" format."))?;
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map(|m| m.as_str());
            if keys.contains(&key) {
                return Err(Rejected::new(format!(
                    "{} parameter \"{key}\" must not appear more than once.",
                    self.rtype
                )));
            }
            keys.push(key);

            let Some(value) = value else {
                if FLAG_PARAMS.contains(&key) {
                    continue;
                }
                return Err(self.reject("parameters must be in \"key=value\" format."));
            };
            match key {
                "mandatory" => mandatory.extend(value.split(',')),
                "alpn" if !ALPN_RE.is_match(value) => {
                    return Err(self.reject(
                        "alpn parameter must be a comma-separated list of protocol names.",
                    ));
                }
                "ipv4hint" if !value.split(',').all(|ip| ip.parse::<Ipv4Addr>().is_ok()) => {
                    return Err(self.reject("ipv4hint must contain valid IPv4 addresses."));
                }
                "ipv6hint" if !value.split(',').all(|ip| ip.parse::<Ipv6Addr>().is_ok()) => {
                    return Err(self.reject("ipv6hint must contain valid IPv6 addresses."));
                }
                "port" if number_in(value, 1, 65535).is_none() => {
                    return Err(self.reject("port must be between 1 and 65535."));
                }
                _ if !KNOWN_PARAMS.contains(&key) && !KEY_N_RE.is_match(key) => {
                    warnings.push(format!(
                        "{} parameter \"{key}\" is unknown and will be passed through unchecked.",
                        self.rtype
                    ));
                }
                _ => {}
            }
        }

        for key in mandatory {
            if key == "mandatory" {
                return Err(self.reject("mandatory parameter must not list itself."));
            }
            if !keys.contains(&key) {
                return Err(Rejected::new(format!(
                    "{} mandatory parameter \"{key}\" is listed but not present.",
                    self.rtype
                )));
            }
        }
        Ok((priority, warnings))
    }
}

impl RecordValidator for SvcbValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        if !is_printable(input.name) {
            return Err(Rejected::new("Invalid characters in name field."));
        }
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in content field."));
        }
        let (priority, warnings) = self.check_content(content)?;

        let prio = ranged_prio(
            input.prio,
            priority,
            &format!("{} priority must be between 0 and 65535.", self.rtype),
        )?;
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
