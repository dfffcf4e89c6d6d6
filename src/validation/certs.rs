//! Certificate and key publication: CERT (RFC 4398), OPENPGPKEY (RFC 7929)
//! and SMIMEA (RFC 8162).
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;

use super::fields::{
    check_ttl, is_base64, is_hex, is_printable, is_u16, number_in, split_fields, zero_prio,
};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref CERT_DATA_RE: Regex = Regex::new(r"^[A-Za-z0-9+/=]+$").unwrap();
    static ref OPENPGPKEY_NAME_RE: Regex = Regex::new(r"^(?i)[0-9a-f]{56}\._openpgpkey\.").unwrap();
    static ref SMIMEA_NAME_RE: Regex = Regex::new(r"^(?i)[0-9a-f]+\._smimecert\.").unwrap();
}

/// Key blobs are often pasted without trailing `=`.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const CERT_TYPES: &[(&str, u16)] = &[
    ("PKIX", 1),
    ("SPKI", 2),
    ("PGP", 3),
    ("IPKIX", 4),
    ("ISPKI", 5),
    ("IPGP", 6),
    ("ACPKIX", 7),
    ("IACPKIX", 8),
    ("URI", 253),
    ("OID", 254),
];

const CERT_ALGORITHMS: &[(&str, u8)] = &[
    ("RSAMD5", 1),
    ("DH", 2),
    ("DSA", 3),
    ("ECC", 4),
    ("RSASHA1", 5),
    ("RSASHA256", 8),
    ("RSASHA512", 10),
    ("ECCGOST", 12),
    ("ECDSAP256SHA256", 13),
    ("ECDSAP384SHA384", 14),
    ("ED25519", 15),
    ("ED448", 16),
];

fn mnemonic<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|&(_, value)| value)
}

/// CERT: `type key-tag algorithm certificate-data`. Type and algorithm may
/// be numeric or mnemonic.
pub struct CertValidator {
    hostnames: HostnameValidator,
}

impl CertValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(content: &str) -> Result<(), Rejected> {
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in content field."));
        }
        let parts = split_fields(content, 4);
        let &[cert_type, key_tag, algorithm, data] = parts.as_slice() else {
            return Err(Rejected::new(
                "CERT record must contain type, key-tag, algorithm and certificate-data separated by spaces.",
            ));
        };
        if !is_u16(cert_type) && mnemonic(CERT_TYPES, cert_type).is_none() {
            return Err(Rejected::new(
                "CERT type must be a number between 0 and 65535 or a valid mnemonic (PKIX, SPKI, PGP, etc.).",
            ));
        }
        if !is_u16(key_tag) {
            return Err(Rejected::new("CERT key tag must be a number between 0 and 65535."));
        }
        if number_in(algorithm, 0, 255).is_none()
            && mnemonic(CERT_ALGORITHMS, algorithm).is_none()
        {
            return Err(Rejected::new(
                "CERT algorithm must be a number between 0 and 255 or a valid mnemonic (RSASHA1, DSA, etc.).",
            ));
        }
        if !CERT_DATA_RE.is_match(data) {
            return Err(Rejected::new(
                "CERT certificate data must contain only valid base64 characters.",
            ));
        }
        if !is_base64(data) {
            return Err(Rejected::new(
                "CERT certificate data must be valid base64-encoded data.",
            ));
        }
        Ok(())
    }
}

impl RecordValidator for CertValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let content = input.content.trim();
        Self::check_content(content)?;
        let prio = zero_prio(input.prio, "CERT")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        }))
    }
}

/// OPENPGPKEY: a base64 transferable public key, published under
/// `<sha256(local-part) truncated to 28 octets>._openpgpkey.<domain>`.
pub struct OpenpgpkeyValidator {
    hostnames: HostnameValidator,
}

impl OpenpgpkeyValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for OpenpgpkeyValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        if !is_printable(input.name) {
            return Err(Rejected::new("Invalid characters in hostname."));
        }
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        if content.is_empty() {
            return Err(Rejected::new("OPENPGPKEY record content cannot be empty."));
        }
        let compact: String = content.split_whitespace().collect();
        if LENIENT_BASE64.decode(&compact).is_err() {
            return Err(Rejected::new(
                "OPENPGPKEY record content must be valid base64-encoded data.",
            ));
        }

        let prio = zero_prio(input.prio, "OPENPGPKEY")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        let mut warnings = Vec::new();
        if !OPENPGPKEY_NAME_RE.is_match(&name) {
            warnings.push(
                "OPENPGPKEY record name does not follow the standard OPENPGPKEY format (<sha256-hash-truncated-to-28-octets>._openpgpkey.<domain>).".to_string(),
            );
        }
        warnings.push(
            "OPENPGPKEY records REQUIRE DNSSEC for any security benefit (RFC 7929).".to_string(),
        );

        Ok(Accepted::new(RecordData {
            content: content.to_string(),
            name,
            prio,
            ttl,
        })
        .with_warnings(warnings))
    }
}

/// SMIMEA: TLSA-shaped association data for S/MIME certificates.
pub struct SmimeaValidator {
    hostnames: HostnameValidator,
}

impl SmimeaValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(content: &str) -> Result<(), Rejected> {
        if content.is_empty() {
            return Err(Rejected::new("SMIMEA record content cannot be empty."));
        }
        let parts: Vec<&str> = content.split_whitespace().collect();
        let &[usage, selector, matching, data] = parts.as_slice() else {
            return Err(Rejected::new(
                "SMIMEA record must contain usage, selector, matching-type and certificate-data separated by spaces.",
            ));
        };
        if number_in(usage, 0, 3).is_none() {
            return Err(Rejected::new("SMIMEA certificate usage field must be 0, 1, 2, or 3."));
        }
        if number_in(selector, 0, 1).is_none() {
            return Err(Rejected::new("SMIMEA selector field must be 0 or 1."));
        }
        let Some(matching) = number_in(matching, 0, 2) else {
            return Err(Rejected::new("SMIMEA matching type field must be 0, 1, or 2."));
        };
        if !is_hex(data) {
            return Err(Rejected::new(
                "SMIMEA certificate data must be a hexadecimal string.",
            ));
        }
        match matching {
            1 if data.len() != 64 => Err(Rejected::new(
                "SMIMEA SHA-256 hash must be exactly 64 hexadecimal characters.",
            )),
            2 if data.len() != 128 => Err(Rejected::new(
                "SMIMEA SHA-512 hash must be exactly 128 hexadecimal characters.",
            )),
            _ => Ok(()),
        }
    }
}

impl RecordValidator for SmimeaValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let content = input.content.trim();
        Self::check_content(content)?;
        let prio = zero_prio(input.prio, "SMIMEA")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;

        let mut warnings = Vec::new();
        if !SMIMEA_NAME_RE.is_match(&name) {
            warnings.push(
                "SMIMEA record name should follow the format <hash>._smimecert.<domain> (RFC 8162).".to_string(),
            );
        }

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

    fn h() -> HostnameValidator {
        HostnameValidator::default()
    }

    const PGP_KEY: &str = concat!(
        "mDMEXEcE6RYJKwYBBAHaRw8BAQdArjWwk3FAqyiFbFBKT4TzXcVBqPTB3gmzlC/",
        "Ub7O1u120F2pvaG5AZXhhbXBsZS5jb20",
    );
    const SHA256: &str = "a0b9b16969687adf0323d15048fb4fa4c354c4e01594e8956522cfe3566cae74";

    #[test]
    fn cert_numeric_and_mnemonic_fields() {
        let v = CertValidator::new(h());
        for content in [
            "1 12345 8 MIIBIjANBgkqhkiG9w0BAQE=",
            "PKIX 12345 RSASHA256 MIIBIjANBgkqhkiG9w0BAQE=",
        ] {
            let res = v.validate(&RecordInput::new(content, "cert.example.com"));
            assert!(res.is_valid(), "{content}: {:?}", res.errors);
            assert_eq!(res.data.unwrap().prio, 0);
        }
    }

    #[test]
    fn cert_errors() {
        let v = CertValidator::new(h());
        let cases = [
            ("1 12345 8", "CERT record must contain type"),
            ("BOGUS 12345 8 AAAA", "CERT type must be"),
            ("1 70000 8 AAAA", "CERT key tag"),
            ("1 1 256 AAAA", "CERT algorithm must be"),
            ("1 1 8 not*base64", "only valid base64 characters"),
            ("1 1 8 AAA", "valid base64-encoded data"),
        ];
        for (content, msg) in cases {
            let res = v.validate(&RecordInput::new(content, "cert.example.com"));
            assert!(res.first_error().unwrap().contains(msg), "{content}: {:?}", res.errors);
        }
        let res = v.validate(&RecordInput::new("1 1 8 AAAA", "cert.example.com").prio("1"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }

    #[test]
    fn openpgpkey_content_and_name_format() {
        let v = OpenpgpkeyValidator::new(h());
        let hashed = concat!(
            "c93f1e400f26708f98cb19d936620da35eec8f72e57f9eec01c1afd6",
            "._openpgpkey.example.com",
        );
        let res = v.validate(&RecordInput::new(PGP_KEY, hashed).ttl("3600"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert_eq!(res.data.as_ref().unwrap().ttl, 3600);
        assert_eq!(res.warnings.len(), 1);
        assert!(res.warnings[0].contains("REQUIRE DNSSEC"));

        let res = v.validate(&RecordInput::new(PGP_KEY, "abc-xyz._openpgpkey.example.com"));
        assert!(res.is_valid());
        assert!(
            res.warnings
                .iter()
                .any(|w| w.contains("does not follow the standard OPENPGPKEY format"))
        );
    }

    #[test]
    fn openpgpkey_errors() {
        let v = OpenpgpkeyValidator::new(h());
        let name = "ab12cd._openpgpkey.example.com";
        let res = v.validate(&RecordInput::new("", name));
        assert!(res.first_error().unwrap().contains("cannot be empty"));
        let broken = "mDMEXEcE6RYJKwYBBAHaRw8BAQdArjWwk3FAqyi!FbFBKT4TzXcVB";
        let res = v.validate(&RecordInput::new(broken, name));
        assert!(res.first_error().unwrap().contains("valid base64"));
        let res = v.validate(&RecordInput::new(PGP_KEY, "ab12cd._openpgpkey.example.com\u{1}"));
        assert_eq!(res.first_error(), Some("Invalid characters in hostname."));
        let res = v.validate(&RecordInput::new(PGP_KEY, name).prio("10"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }

    #[test]
    fn smimea_fields() {
        let v = SmimeaValidator::new(h());
        let name = "abc123._smimecert.example.com";
        for content in [
            format!("3 1 1 {SHA256}"),
            format!("0 0 1 {SHA256}"),
            format!("3 1 2 {SHA256}{SHA256}"),
            "3 0 0 30820122300d".to_string(),
        ] {
            let res = v.validate(&RecordInput::new(&content, name));
            assert!(res.is_valid(), "{content}: {:?}", res.errors);
            assert!(res.warnings.is_empty());
        }

        let cases = [
            (format!("4 1 1 {SHA256}"), "usage field"),
            (format!("3 2 1 {SHA256}"), "selector field"),
            (format!("3 1 3 {SHA256}"), "matching type field"),
            (format!("3 1 1 {SHA256}g"), "certificate data"),
            ("3 1 1 a0b9b16969".to_string(), "SHA-256"),
            (format!("3 1 2 {SHA256}"), "SHA-512"),
            ("3 1".to_string(), "must contain"),
            (String::new(), "cannot be empty"),
        ];
        for (content, msg) in cases {
            let res = v.validate(&RecordInput::new(&content, name));
            assert!(res.first_error().unwrap().contains(msg), "{content}: {:?}", res.errors);
        }
    }

    #[test]
    fn smimea_name_and_priority() {
        let v = SmimeaValidator::new(h());
        let content = format!("3 1 1 {SHA256}");
        let res = v.validate(&RecordInput::new(&content, "smimea.example.com"));
        assert!(res.is_valid());
        assert!(res.warnings[0].contains("_smimecert"));

        let res = v.validate(&RecordInput::new(&content, "invalid hostname with spaces"));
        assert!(!res.is_valid());
        let name = "abc123._smimecert.example.com";
        let res = v.validate(&RecordInput::new(&content, name).prio("10"));
        assert!(res.first_error().unwrap().contains("priority"));
    }
}
