//! Key and digest material: DS, CDS, TSIG, RKEY, ZONEMD, CSYNC, SSHFP and TLSA.
use regex::Regex;

use super::fields::{
    check_ttl, is_base64, is_hex, is_printable, is_u16, is_u32, number_in, split_fields, zero_prio,
};
use super::registry::is_known_type;
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref DS_RE: Regex = Regex::new(r"^(?i)([0-9]+) ([0-9]+) ([0-9]+) ([a-f0-9]+)$").unwrap();
}

fn accepted(content: String, name: String, prio: u16, ttl: u32) -> Accepted {
    Accepted::new(RecordData {
        content,
        name,
        prio,
        ttl,
    })
}

/// DS (RFC 4034): `keytag algorithm digest-type digest`.
pub struct DsValidator {
    hostnames: HostnameValidator,
}

impl DsValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for DsValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let caps = DS_RE.captures(content).ok_or_else(|| {
            Rejected::new(
                "DS record must be in the format: <key tag> <algorithm> <digest type> <digest>",
            )
        })?;
        if !is_u16(&caps[1]) {
            return Err(Rejected::new("Key tag must be a number between 0 and 65535."));
        }
        if number_in(&caps[2], 0, 255).is_none() {
            return Err(Rejected::new("Algorithm must be a number between 0 and 255."));
        }
        let expected_len = match &caps[3] {
            "1" => 40,
            "2" | "3" => 64,
            "4" => 96,
            _ => {
                return Err(Rejected::new(
                    "Digest type must be 1 (SHA-1), 2 (SHA-256), 3 (GOST R 34.11-94) or 4 (SHA-384).",
                ));
            }
        };
        if caps[4].len() != expected_len {
            return Err(Rejected::new(format!(
                "Digest of type {} must be exactly {expected_len} hexadecimal characters.",
                &caps[3]
            )));
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "DS")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, prio, ttl))
    }
}

/// RFC 8078 content asking the parent to remove every DS record.
const CDS_DELETE: &str = "0 0 0 00";

/// CDS (RFC 7344, RFC 8078). Same layout as DS, but restricted to the
/// algorithms and digests a parent may act on.
pub struct CdsValidator {
    hostnames: HostnameValidator,
}

impl CdsValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(content: &str, warnings: &mut Vec<String>) -> Result<(), Rejected> {
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in CDS record content."));
        }
        if content == CDS_DELETE {
            warnings.push(
                "This is a CDS deletion record as defined in RFC 8078. It signals that the corresponding DS records should be removed from the parent.".into(),
            );
            return Ok(());
        }

        let parts = split_fields(content, 4);
        let &[key_tag, algorithm, digest_type, digest] = parts.as_slice() else {
            return Err(Rejected::new(
                "CDS record must contain key-tag, algorithm, digest-type and digest separated by spaces.",
            ));
        };
        let digest = digest.trim();
        if !is_u16(key_tag) {
            return Err(Rejected::new("CDS key tag must be a number between 0 and 65535."));
        }
        let Some(algorithm) = number_in(algorithm, 1, 16) else {
            return Err(Rejected::new("CDS algorithm must be a number between 1 and 16."));
        };
        if let Some(warning) = algorithm_guidance(algorithm) {
            warnings.push(warning);
        }

        let expected_len = match number_in(digest_type, 1, 4) {
            Some(1) => {
                warnings.push(
                    "SHA-1 (digest type 1) is deprecated for security reasons. Consider using SHA-256 (digest type 2) or SHA-384 (digest type 4) instead.".into(),
                );
                40
            }
            Some(2) => 64,
            Some(4) => 96,
            _ => {
                return Err(Rejected::new(
                    "CDS digest type must be 1 (SHA-1), 2 (SHA-256), or 4 (SHA-384).",
                ));
            }
        };
        if !is_hex(digest) || digest.len() != expected_len {
            return Err(Rejected::new(format!(
                "CDS digest must be a valid hex string of length {expected_len} for the selected digest type."
            )));
        }

        warnings.push(
            "CDS records must be accompanied by matching CDNSKEY records as recommended by RFC 7344.".into(),
        );
        Ok(())
    }
}

/// RFC 8624 usage advice for a DNSSEC algorithm number.
fn algorithm_guidance(algorithm: i64) -> Option<String> {
    let advice = match algorithm {
        8 | 13 => return None,
        15 | 16 => "is recommended for use according to RFC 8624. This is a good choice.",
        14 => "is optional for implementation according to RFC 8624.",
        3 | 5 | 6 | 7 | 12 => {
            "is NOT RECOMMENDED for use according to RFC 8624. Consider using ECDSAP256SHA256 (13) or ED25519 (15) instead."
        }
        1 => "is DEPRECATED according to RFC 8624. Do not use this algorithm for new deployments.",
        _ => "MUST NOT be implemented according to RFC 8624. This value should not be used.",
    };
    Some(format!("Algorithm {algorithm} {advice}"))
}

impl RecordValidator for CdsValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let mut warnings = Vec::new();
        let at_apex = match input.zone {
            Some(zone) => name.eq_ignore_ascii_case(zone.trim_end_matches('.')),
            None => name.split('.').count() <= 2,
        };
        if !at_apex {
            warnings.push(
                "CDS records should only be placed at the zone apex, not on subdomains, as required by RFC 7344.".into(),
            );
        }

        let content = input.content.trim();
        Self::check_content(content, &mut warnings)?;

        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        let prio = zero_prio(input.prio, "CDS")?;
        warnings.push(
            "According to RFC 8078, CDS records should be stable for some time before parent zones accept them.".into(),
        );
        Ok(accepted(content.to_string(), name, prio, ttl).with_warnings(warnings))
    }
}

const TSIG_ALGORITHMS: &[&str] = &[
    "hmac-md5.sig-alg.reg.int.",
    "hmac-md5.",
    "hmac-sha1.",
    "hmac-sha224.",
    "hmac-sha256.",
    "hmac-sha384.",
    "hmac-sha512.",
];

/// TSIG (RFC 8945) in presentation form:
/// `algorithm timestamp fudge mac original-id error other-len [other-data]`.
pub struct TsigValidator {
    hostnames: HostnameValidator,
}

impl TsigValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    fn check_content(&self, content: &str) -> Result<(), Rejected> {
        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() < 7 {
            return Err(Rejected::new(
                "TSIG record must contain at least algorithm-name, timestamp, fudge, mac, original-id, error, and other-len separated by spaces.",
            ));
        }
        let algorithm = parts[0].to_ascii_lowercase();
        let known = TSIG_ALGORITHMS.contains(&algorithm.as_str());
        if !known && !(algorithm.ends_with('.') && self.hostnames.is_valid(&algorithm, false)) {
            return Err(Rejected::new(
                "TSIG algorithm name must be a valid domain name ending with a dot (e.g., hmac-sha256.).",
            ));
        }
        if number_in(parts[1], 0, i64::MAX).is_none() {
            return Err(Rejected::new("TSIG timestamp must be a non-negative integer."));
        }
        if number_in(parts[2], 0, i64::MAX).is_none() {
            return Err(Rejected::new("TSIG fudge must be a non-negative integer."));
        }
        if !(is_base64(parts[3]) || is_hex(parts[3])) {
            return Err(Rejected::new(
                "TSIG MAC must be a valid base64-encoded string or hexadecimal string.",
            ));
        }
        if !is_u16(parts[4]) {
            return Err(Rejected::new(
                "TSIG original ID must be a number between 0 and 65535.",
            ));
        }
        if number_in(parts[5], 0, 23).is_none() {
            return Err(Rejected::new(
                "TSIG error must be a valid DNS RCODE number between 0 and 23.",
            ));
        }
        if number_in(parts[6], 0, i64::MAX).is_none() {
            return Err(Rejected::new("TSIG other-len must be a non-negative integer."));
        }
        if let Some(other) = parts.get(7) {
            if !(is_base64(other) || is_hex(other)) {
                return Err(Rejected::new(
                    "TSIG other-data must be a valid base64-encoded string or hexadecimal string.",
                ));
            }
        }
        Ok(())
    }
}

impl RecordValidator for TsigValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let content = input.content.trim();
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in content field."));
        }
        self.check_content(content)?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, 0, ttl))
    }
}

/// RKEY (draft-reid-dnsext-rkey): `flags protocol algorithm key`.
pub struct RkeyValidator {
    hostnames: HostnameValidator,
}

impl RkeyValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for RkeyValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        let content = input.content.trim();
        if content.is_empty() {
            return Err(Rejected::new("RKEY record content cannot be empty."));
        }
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in content field."));
        }

        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(Rejected::new(
                "RKEY record must contain flags, protocol, algorithm, and public key data.",
            ));
        }
        let flags = number_in(parts[0], 0, i64::MAX)
            .ok_or_else(|| Rejected::new("RKEY flags field must be a numeric value."))?;
        let protocol = number_in(parts[1], 0, i64::MAX)
            .ok_or_else(|| Rejected::new("RKEY protocol field must be a numeric value."))?;
        let algorithm = number_in(parts[2], 0, i64::MAX)
            .ok_or_else(|| Rejected::new("RKEY algorithm field must be a numeric value."))?;
        if algorithm > 16 {
            return Err(Rejected::new(
                "RKEY algorithm field must be a valid DNSSEC algorithm number (0-16).",
            ));
        }
        let key = parts[3..].concat();
        if key.is_empty() {
            return Err(Rejected::new("RKEY public key data cannot be empty."));
        }

        let mut warnings = vec![
            "RKEY records were never formally standardized as an RFC, only proposed in draft-reid-dnsext-rkey-00."
                .to_string(),
        ];
        if !matches!(flags, 0 | 256 | 257) {
            warnings.push(
                "Unusual flags value. Common values are 0, 256 (Zone Key), or 257 (Zone Key + SEP).".to_string(),
            );
        }
        if protocol != 3 {
            warnings.push(
                "Protocol field should be 3 for compliance with standards based on DNSKEY format.".to_string(),
            );
        }
        match algorithm {
            1 | 3 | 5 | 7 => warnings.push(
                "This algorithm is considered insecure. Use algorithm 8 (RSA/SHA-256) or later.".to_string(),
            ),
            _ => {}
        }
        if !is_base64(&key) {
            warnings.push(
                "Public key data should be Base64 encoded according to RFC 4034.".to_string(),
            );
        }

        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, 0, ttl).with_warnings(warnings))
    }
}

/// ZONEMD (RFC 8976): `serial scheme hash-algorithm digest`.
pub struct ZonemdValidator {
    hostnames: HostnameValidator,
}

impl ZonemdValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for ZonemdValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;
        if let Some(zone) = input.zone {
            if !name.eq_ignore_ascii_case(zone.trim_end_matches('.')) {
                return Err(Rejected::new(
                    "ZONEMD records must be placed at the zone apex (same as SOA record).",
                ));
            }
        }

        let content = input.content.trim();
        let parts: Vec<&str> = content.split_whitespace().collect();
        let &[serial, scheme, hash, digest] = parts.as_slice() else {
            return Err(Rejected::new(
                "ZONEMD record must contain serial, scheme, hash-algorithm, and digest separated by spaces.",
            ));
        };
        if !is_u32(serial) {
            return Err(Rejected::new(
                "ZONEMD serial must be a number between 0 and 4294967295 (32-bit unsigned integer).",
            ));
        }

        let mut warnings = Vec::new();
        let scheme = number_in(scheme, 0, 255)
            .ok_or_else(|| Rejected::new("ZONEMD scheme must be a number between 0 and 255."))?;
        match scheme {
            0 => return Err(Rejected::new("ZONEMD scheme 0 is reserved and not for standard use.")),
            1 => {}
            240..=255 => warnings.push(
                "ZONEMD scheme values 240-255 are reserved for private use and may not be interoperable.".to_string(),
            ),
            _ => warnings.push(
                "ZONEMD scheme must be 1 (Simple ZONEMD scheme) for standard use. Other values are reserved or unassigned."
                    .to_string(),
            ),
        }

        let hash = number_in(hash, 0, 255).ok_or_else(|| {
            Rejected::new("ZONEMD hash algorithm must be a number between 0 and 255.")
        })?;
        if !is_hex(digest) {
            return Err(Rejected::new("ZONEMD digest must be a hexadecimal string."));
        }
        if digest.len() < 24 {
            return Err(Rejected::new(
                "ZONEMD digest must be at least 24 hexadecimal characters (12 octets).",
            ));
        }
        match hash {
            0 => {
                return Err(Rejected::new(
                    "ZONEMD hash algorithm 0 is reserved and not for standard use.",
                ));
            }
            1 if digest.len() != 96 => {
                return Err(Rejected::new(
                    "ZONEMD digest for SHA-384 (algorithm 1) must be exactly 96 hexadecimal characters (48 octets).",
                ));
            }
            2 if digest.len() != 128 => {
                return Err(Rejected::new(
                    "ZONEMD digest for SHA-512 (algorithm 2) must be exactly 128 hexadecimal characters (64 octets).",
                ));
            }
            240..=255 => warnings.push(
                "ZONEMD hash algorithm values 240-255 are reserved for private use and may not be interoperable."
                    .to_string(),
            ),
            _ => {}
        }
        warnings.push(
            "For proper security, zones with ZONEMD records should also be signed with DNSSEC.".to_string(),
        );

        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, 0, ttl).with_warnings(warnings))
    }
}

/// Types a CSYNC record may not ask to be synchronised.
const CSYNC_PROHIBITED: &[&str] = &["DS", "CDS", "CDNSKEY", "CSYNC"];

/// CSYNC (RFC 7477): `soa-serial flags type [type ...]`.
pub struct CsyncValidator {
    hostnames: HostnameValidator,
}

impl CsyncValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for CsyncValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(Rejected::new(
                "CSYNC record must contain an SOA Serial, Flags and at least one record type.",
            ));
        }
        if !is_u32(parts[0]) {
            return Err(Rejected::new(
                "Invalid SOA Serial in CSYNC record. It must be a number between 0 and 4294967295.",
            ));
        }
        if number_in(parts[1], 0, 3).is_none() {
            return Err(Rejected::new(
                "Invalid Flags in CSYNC record. Only bits 0 (immediate) and 1 (soaminimum) are defined, so the value must be between 0 and 3.",
            ));
        }
        let types = &parts[2..];
        if types.is_empty() {
            return Err(Rejected::new("CSYNC record must specify at least one record type."));
        }
        for t in types {
            let upper = t.to_ascii_uppercase();
            if !is_known_type(&upper) {
                return Err(Rejected::new(format!("Invalid Type in CSYNC record: {t}")));
            }
            if CSYNC_PROHIBITED.contains(&upper.as_str()) {
                return Err(Rejected::new(format!(
                    "Type {upper} is prohibited in CSYNC records."
                )));
            }
        }

        let prio = zero_prio(input.prio, "CSYNC")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, prio, ttl))
    }
}

/// SSHFP (RFC 4255): `algorithm fp-type fingerprint`.
pub struct SshfpValidator {
    hostnames: HostnameValidator,
}

impl SshfpValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for SshfpValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let parts: Vec<&str> = content.split_whitespace().collect();
        let &[algorithm, fp_type, fingerprint] = parts.as_slice() else {
            return Err(Rejected::new(
                "SSHFP record must contain algorithm, fingerprint type and fingerprint.",
            ));
        };
        if !matches!(algorithm, "1" | "2" | "3" | "4" | "6") {
            return Err(Rejected::new(
                "SSHFP algorithm must be 1 (RSA), 2 (DSA), 3 (ECDSA), 4 (Ed25519) or 6 (Ed448).",
            ));
        }
        let expected_len = match fp_type {
            "1" => 40,
            "2" => 64,
            _ => {
                return Err(Rejected::new(
                    "SSHFP fingerprint type must be 1 (SHA-1) or 2 (SHA-256).",
                ));
            }
        };
        if !is_hex(fingerprint) || fingerprint.len() != expected_len {
            return Err(Rejected::new(format!(
                "SSHFP fingerprint of type {fp_type} must be exactly {expected_len} hexadecimal characters."
            )));
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "SSHFP")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, prio, ttl))
    }
}

/// TLSA (RFC 6698): `usage selector matching-type data`.
pub struct TlsaValidator {
    hostnames: HostnameValidator,
}

impl TlsaValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for TlsaValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let content = input.content.trim();
        let parts: Vec<&str> = content.split_whitespace().collect();
        let &[usage, selector, matching, data] = parts.as_slice() else {
            return Err(Rejected::new(
                "TLSA record must contain usage, selector, matching type and certificate data.",
            ));
        };
        if number_in(usage, 0, 3).is_none() {
            return Err(Rejected::new("TLSA certificate usage must be between 0 and 3."));
        }
        if number_in(selector, 0, 1).is_none() {
            return Err(Rejected::new("TLSA selector must be 0 or 1."));
        }
        let expected_len = match number_in(matching, 0, 2) {
            Some(0) => None,
            Some(1) => Some(64),
            Some(_) => Some(128),
            None => return Err(Rejected::new("TLSA matching type must be between 0 and 2.")),
        };
        if !is_hex(data) || expected_len.is_some_and(|len| data.len() != len) {
            return Err(Rejected::new(
                "TLSA certificate data must be hexadecimal and match the length of its matching type.",
            ));
        }

        let name = self.hostnames.check(input.name, true)?;
        let prio = zero_prio(input.prio, "TLSA")?;
        let ttl = check_ttl(input.ttl, input.default_ttl)?;
        Ok(accepted(content.to_string(), name, prio, ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;

    fn h() -> HostnameValidator {
        HostnameValidator::default()
    }

    fn run(v: &dyn RecordValidator, content: &str, name: &str) -> ValidationResult {
        v.validate(&RecordInput::new(content, name))
    }

    fn error_of(v: &dyn RecordValidator, content: &str, name: &str) -> String {
        run(v, content, name).first_error().unwrap_or_default().to_string()
    }

    const SHA256: &str = "2bb183af5f22588179a53b0a98631fad1a292118f0f1e3f02ce5e4ad53a1bd20";

    #[test]
    fn ds_digest_lengths() {
        let v = DsValidator::new(h());
        let ok = format!("60485 5 2 {SHA256}");
        assert!(run(&v, &ok, "example.com").is_valid());
        let short = "60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118";
        assert!(run(&v, short, "example.com").is_valid());

        for bad in [
            "60485 5 2 abcd".to_string(),
            format!("70000 5 2 {SHA256}"),
            format!("60485 5 9 {SHA256}"),
            "not a ds".to_string(),
        ] {
            assert!(!run(&v, &bad, "example.com").is_valid(), "{bad}");
        }
        let res = v.validate(&RecordInput::new(&ok, "example.com").prio("1"));
        assert!(res.first_error().unwrap().contains("priority field"));
    }

    #[test]
    fn cds_deletion_record() {
        let v = CdsValidator::new(h());
        let res = v.validate(&RecordInput::new("0 0 0 00", "example.com").zone("example.com"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert!(res.warnings[0].contains("deletion record"));

        let ds = DsValidator::new(h());
        assert!(!run(&ds, "0 0 0 00", "example.com").is_valid());
    }

    #[test]
    fn cds_algorithm_and_digest_bounds() {
        let v = CdsValidator::new(h());
        let input = |content: &str| {
            v.validate(&RecordInput::new(content, "example.com").zone("example.com"))
        };

        let res = input(&format!("60485 13 2 {SHA256}"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert!(!res.warnings.iter().any(|w| w.starts_with("Algorithm")));

        let res = input(&format!("60485 0 2 {SHA256}"));
        assert_eq!(
            res.first_error(),
            Some("CDS algorithm must be a number between 1 and 16.")
        );
        assert!(!input(&format!("60485 17 2 {SHA256}")).is_valid());

        let res = input(&format!("60485 13 3 {SHA256}"));
        assert_eq!(
            res.first_error(),
            Some("CDS digest type must be 1 (SHA-1), 2 (SHA-256), or 4 (SHA-384).")
        );
        assert!(input(&format!("60485 13 4 {}", "ab".repeat(48))).is_valid());
        assert!(
            input("60485 13 4 abcd")
                .first_error()
                .unwrap()
                .contains("length 96")
        );

        let res = input("60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118");
        assert!(res.is_valid());
        assert!(res.warnings.iter().any(|w| w.contains("NOT RECOMMENDED")));
        assert!(res.warnings.iter().any(|w| w.starts_with("SHA-1")));
    }

    #[test]
    fn cds_below_apex_warns() {
        let v = CdsValidator::new(h());
        let content = format!("60485 15 2 {SHA256}");
        let res = v.validate(&RecordInput::new(&content, "sub.example.com").zone("example.com"));
        assert!(res.is_valid());
        assert!(res.warnings.iter().any(|w| w.contains("zone apex")));
        assert!(res.warnings.iter().any(|w| w.contains("recommended for use")));
    }

    #[test]
    fn tsig_fields() {
        let v = TsigValidator::new(h());
        let name = "key.example.com";
        let ok = "hmac-sha256. 1609459200 300 dGVzdG1hYw== 12345 0 0";
        let res = v.validate(&RecordInput::new(ok, name).prio("5"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert_eq!(res.data.unwrap().prio, 0);

        let cases = [
            ("hmac-sha256. 1 300 abc= 1 0", "TSIG record must contain"),
            ("hmac-sha256 1 300 abcd 1 0 0", "TSIG algorithm name"),
            ("hmac-sha256. 1 300 abcd 1 24 0", "RCODE"),
            ("hmac-sha256. 1 300 abcd 70000 0 0", "original ID"),
            ("hmac-sha256. 1 300 !!! 1 0 0", "MAC"),
        ];
        for (content, msg) in cases {
            let err = error_of(&v, content, name);
            assert!(err.contains(msg), "{content}: {err}");
        }
        let custom = "custom-alg.example.com. 1 300 abcd 1 0 4 cafe";
        assert!(run(&v, custom, name).is_valid());
    }

    #[test]
    fn rkey_fields_and_warnings() {
        let v = RkeyValidator::new(h());
        let res = v.validate(&RecordInput::new("256 3 8 AwEAAcw5QLr0", "example.com").prio("7"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert_eq!(res.data.unwrap().prio, 0);
        assert_eq!(res.warnings.len(), 1);

        let res = run(&v, "1 2 5 not_base64!", "example.com");
        assert!(res.is_valid());
        assert!(res.warnings.iter().any(|w| w.contains("Protocol field should be 3")));
        assert!(res.warnings.iter().any(|w| w.contains("Base64")));

        for bad in ["256 3 17 AwEAAQ==", "x 3 8 AwEAAQ==", "256 3 8"] {
            assert!(!run(&v, bad, "example.com").is_valid(), "{bad}");
        }
    }

    #[test]
    fn zonemd_rules() {
        let v = ZonemdValidator::new(h());
        let sha384 = "a".repeat(96);
        let ok = format!("2024010101 1 1 {sha384}");
        let res = v.validate(&RecordInput::new(&ok, "example.com").zone("example.com").prio("3"));
        assert!(res.is_valid(), "{:?}", res.errors);
        assert_eq!(res.data.unwrap().prio, 0);

        let res = v.validate(&RecordInput::new(&ok, "www.example.com").zone("example.com"));
        assert!(res.first_error().unwrap().contains("zone apex"));
        for bad in [
            format!("1 0 1 {sha384}"),
            format!("1 1 0 {sha384}"),
            "1 1 1 abcdef".to_string(),
            format!("1 1 2 {sha384}"),
            format!("4294967296 1 1 {sha384}"),
        ] {
            assert!(!run(&v, &bad, "example.com").is_valid(), "{bad}");
        }

        let private = format!("1 1 241 {}", "b".repeat(40));
        let res = run(&v, &private, "example.com");
        assert!(res.is_valid());
        assert!(res.warnings.iter().any(|w| w.contains("private use")));
    }

    #[test]
    fn csync_rules() {
        let v = CsyncValidator::new(h());
        assert!(run(&v, "66 3 A NS AAAA", "example.com").is_valid());
        let res = v.validate(&RecordInput::new("66 3 A NS", "example.com").prio("1"));
        assert!(res.first_error().unwrap().contains("priority field"));

        let cases = [
            ("4294967296 3 A", "SOA Serial"),
            ("66 4 A", "Flags"),
            ("66 3", "at least one record type"),
            ("66 3 A BOGUS", "Invalid Type"),
            ("66 3 A DS", "prohibited"),
            ("66 3 A CDNSKEY", "prohibited"),
            ("66 3 A CSYNC", "prohibited"),
        ];
        for (content, msg) in cases {
            let err = error_of(&v, content, "example.com");
            assert!(err.contains(msg), "{content}: {err}");
        }
    }

    #[test]
    fn sshfp_and_tlsa() {
        let sshfp = SshfpValidator::new(h());
        let host = "host.example.com";
        assert!(run(&sshfp, &format!("4 2 {SHA256}"), host).is_valid());
        assert!(!run(&sshfp, &format!("4 1 {SHA256}"), host).is_valid());
        assert!(!run(&sshfp, &format!("5 2 {SHA256}"), host).is_valid());

        let tlsa = TlsaValidator::new(h());
        let service = "_443._tcp.example.com";
        assert!(run(&tlsa, &format!("3 1 1 {SHA256}"), service).is_valid());
        assert!(run(&tlsa, "3 0 0 30820122300d", service).is_valid());
        assert!(!run(&tlsa, &format!("4 1 1 {SHA256}"), service).is_valid());
        assert!(!run(&tlsa, &format!("3 1 2 {SHA256}"), service).is_valid());
    }
}
