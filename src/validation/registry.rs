//! Record type tokens and the type → validator map.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::address::{AddressValidator, AplValidator};
use super::certs::{CertValidator, OpenpgpkeyValidator, SmimeaValidator};
use super::keys::{
    CdsValidator, CsyncValidator, DsValidator, RkeyValidator, SshfpValidator, TlsaValidator,
    TsigValidator, ZonemdValidator,
};
use super::loc::LocValidator;
use super::naptr::NaptrValidator;
use super::soa::SoaValidator;
use super::srv::{SrvValidator, UriValidator};
use super::svcb::SvcbValidator;
use super::target::{
    CnameValidator, KxValidator, MinfoValidator, MxValidator, RpValidator, TargetValidator,
};
use super::text::{CaaValidator, HinfoValidator, SpfValidator, TxtValidator};
use super::{HostnameValidator, RecordInput, RecordValidator, ValidationConfig, ValidationResult};

macro_rules! record_types {
    ($($variant:ident),+ $(,)?) => {
        /// Record types this service knows how to validate.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum RecordType {
            $($variant),+
        }

        impl RecordType {
            pub const ALL: &'static [RecordType] = &[$(RecordType::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(RecordType::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

record_types!(
    A, AAAA, ALIAS, APL, CAA, CDS, CERT, CNAME, CSYNC, DNAME, DS, HINFO, HTTPS, KX, LOC, MINFO, MX,
    NAPTR, NS, OPENPGPKEY, PTR, RKEY, RP, SMIMEA, SOA, SPF, SRV, SSHFP, SVCB, TLSA, TSIG, TXT, URI,
    ZONEMD,
);

#[derive(Debug, thiserror::Error)]
#[error("Unknown record type.")]
pub struct UnknownRecordType;

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownRecordType)
    }
}

impl TryFrom<String> for RecordType {
    type Error = UnknownRecordType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecordType {
    /// Types whose content names a host that must not be a CNAME.
    pub fn points_to_host(self) -> bool {
        matches!(self, RecordType::MX | RecordType::NS | RecordType::KX)
    }
}

/// Mnemonics accepted in a CSYNC type bitmap, beyond the ones above.
const EXTRA_KNOWN_TYPES: &[&str] = &[
    "AFSDB", "CDNSKEY", "DHCID", "DLV", "DNSKEY", "EUI48", "EUI64", "IPSECKEY", "L32", "L64", "LP",
    "LUA", "MAILA", "MAILB", "NID", "NSEC", "NSEC3", "NSEC3PARAM", "RRSIG", "TKEY", "WKS",
];

/// Whether `token` (upper case) names a DNS record type.
pub(crate) fn is_known_type(token: &str) -> bool {
    token.parse::<RecordType>().is_ok() || EXTRA_KNOWN_TYPES.contains(&token)
}

/// Maps each [`RecordType`] to its validator.
pub struct ValidatorRegistry {
    hostnames: HostnameValidator,
    validators: HashMap<RecordType, Box<dyn RecordValidator>>,
}

impl ValidatorRegistry {
    pub fn new(config: &ValidationConfig) -> Self {
        let h = HostnameValidator::new(config.top_level_tld_check);
        let mut validators: HashMap<RecordType, Box<dyn RecordValidator>> = HashMap::new();
        for &rtype in RecordType::ALL {
            let validator: Box<dyn RecordValidator> = match rtype {
                RecordType::A => Box::new(AddressValidator::a(h)),
                RecordType::AAAA => Box::new(AddressValidator::aaaa(h)),
                RecordType::ALIAS => Box::new(TargetValidator::new(h, "ALIAS")),
                RecordType::APL => Box::new(AplValidator::new(h)),
                RecordType::CAA => Box::new(CaaValidator::new(h)),
                RecordType::CDS => Box::new(CdsValidator::new(h)),
                RecordType::CERT => Box::new(CertValidator::new(h)),
                RecordType::CNAME => Box::new(CnameValidator::new(h)),
                RecordType::CSYNC => Box::new(CsyncValidator::new(h)),
                RecordType::DNAME => Box::new(TargetValidator::new(h, "DNAME")),
                RecordType::DS => Box::new(DsValidator::new(h)),
                RecordType::HINFO => Box::new(HinfoValidator::new(h)),
                RecordType::HTTPS => Box::new(SvcbValidator::https(h)),
                RecordType::KX => Box::new(KxValidator::new(h)),
                RecordType::LOC => Box::new(LocValidator::new(h)),
                RecordType::MINFO => Box::new(MinfoValidator::new(h)),
                RecordType::MX => Box::new(MxValidator::new(h)),
                RecordType::NAPTR => Box::new(NaptrValidator::new(h)),
                RecordType::NS => Box::new(TargetValidator::new(h, "NS")),
                RecordType::OPENPGPKEY => Box::new(OpenpgpkeyValidator::new(h)),
                RecordType::PTR => Box::new(TargetValidator::ptr(h)),
                RecordType::RKEY => Box::new(RkeyValidator::new(h)),
                RecordType::RP => Box::new(RpValidator::new(h)),
                RecordType::SMIMEA => Box::new(SmimeaValidator::new(h)),
                RecordType::SOA => Box::new(SoaValidator::new(h)),
                RecordType::SPF => Box::new(SpfValidator::new(h)),
                RecordType::SRV => Box::new(SrvValidator::new(h)),
                RecordType::SSHFP => Box::new(SshfpValidator::new(h)),
                RecordType::SVCB => Box::new(SvcbValidator::svcb(h)),
                RecordType::TLSA => Box::new(TlsaValidator::new(h)),
                RecordType::TSIG => Box::new(TsigValidator::new(h)),
                RecordType::TXT => Box::new(TxtValidator::new(h)),
                RecordType::URI => Box::new(UriValidator::new(h)),
                RecordType::ZONEMD => Box::new(ZonemdValidator::new(h)),
            };
            validators.insert(rtype, validator);
        }
        Self {
            hostnames: h,
            validators,
        }
    }

    pub fn hostnames(&self) -> HostnameValidator {
        self.hostnames
    }

    pub fn get(&self, rtype: RecordType) -> Option<&dyn RecordValidator> {
        self.validators.get(&rtype).map(|v| v.as_ref())
    }

    /// Validate `input` as a record of type `type_token`.
    pub fn validate(&self, type_token: &str, input: &RecordInput<'_>) -> ValidationResult {
        match type_token.parse::<RecordType>() {
            Ok(rtype) => self.validate_as(rtype, input),
            Err(e) => ValidationResult::failure(e.to_string()),
        }
    }

    pub fn validate_as(&self, rtype: RecordType, input: &RecordInput<'_>) -> ValidationResult {
        match self.get(rtype) {
            Some(validator) => validator.validate(input),
            None => ValidationResult::failure(UnknownRecordType.to_string()),
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens_parse_case_insensitively() {
        assert_eq!("mx".parse::<RecordType>().unwrap(), RecordType::MX);
        assert_eq!(" Aaaa ".parse::<RecordType>().unwrap(), RecordType::AAAA);
        assert!("BOGUS".parse::<RecordType>().is_err());
        assert_eq!(RecordType::ZONEMD.to_string(), "ZONEMD");
    }

    #[test]
    fn serde_uses_the_mnemonic() {
        let json = serde_json::to_string(&RecordType::NAPTR).unwrap();
        assert_eq!(json, "\"NAPTR\"");
        let parsed: RecordType = serde_json::from_str("\"txt\"").unwrap();
        assert_eq!(parsed, RecordType::TXT);
        assert!(serde_json::from_str::<RecordType>("\"NOPE\"").is_err());
    }

    #[test]
    fn every_type_has_a_validator() {
        let registry = ValidatorRegistry::default();
        for &t in RecordType::ALL {
            assert!(registry.get(t).is_some(), "{t}");
        }
    }

    #[test]
    fn unknown_type_fails() {
        let registry = ValidatorRegistry::default();
        let res = registry.validate("WKS", &RecordInput::new("x", "example.com"));
        assert!(!res.is_valid());
        assert_eq!(res.first_error(), Some("Unknown record type."));
    }

    #[test]
    fn dispatches_by_token() {
        let registry = ValidatorRegistry::default();
        let res = registry.validate("a", &RecordInput::new("192.0.2.1", "www.example.com").ttl(""));
        assert!(res.is_valid());
        assert_eq!(res.data.unwrap().ttl, RecordInput::DEFAULT_TTL);

        let res = registry.validate("MX", &RecordInput::new("mail.example.com", "example.com"));
        assert_eq!(res.data.unwrap().prio, 10);
        let res = registry.validate(
            "MX",
            &RecordInput::new("mail.example.com", "example.com").prio("70000"),
        );
        assert!(res.first_error().unwrap().contains("Invalid value for MX priority"));

        let res = registry.validate(
            "PTR",
            &RecordInput::new("host.example.com", "1.2.0.192.in-addr.arpa").prio("9"),
        );
        assert_eq!(res.data.unwrap().prio, 0);

        let res = registry.validate("https", &RecordInput::new("1 svc.example.net", "example.com"));
        assert_eq!(res.data.unwrap().prio, 1);
        let res = registry.validate("RP", &RecordInput::new(". .", "example.com"));
        assert!(res.is_valid());
    }

    #[test]
    fn tld_check_is_injected() {
        let strict = ValidatorRegistry::new(&ValidationConfig {
            top_level_tld_check: true,
        });
        let input = RecordInput::new("192.0.2.1", "localhost");
        assert!(!strict.validate("A", &input).is_valid());
        assert!(ValidatorRegistry::default().validate("A", &input).is_valid());
    }

    #[test]
    fn csync_knows_types_outside_the_enum() {
        assert!(is_known_type("DNSKEY"));
        assert!(is_known_type("A"));
        assert!(is_known_type("SVCB"));
        assert!(!is_known_type("BOGUS"));
    }
}
