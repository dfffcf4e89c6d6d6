//! Service location records: SRV (RFC 2782) and URI (RFC 7553).
use regex::Regex;

use super::fields::{check_ttl, is_printable, is_u16, ranged_prio};
use super::{Accepted, HostnameValidator, RecordData, RecordInput, RecordValidator, Rejected};

lazy_static::lazy_static! {
    static ref SRV_SERVICE_RE: Regex = Regex::new(r"^_[A-Za-z0-9_-]+$").unwrap();
    static ref SRV_PROTO_RE: Regex = Regex::new(r"^_[A-Za-z0-9_]+$").unwrap();
    static ref URI_CONTENT_RE: Regex = Regex::new(r#"^(\d+)\s+(\d+)\s+"(.*)"$"#).unwrap();
    static ref URI_SCHEME_RE: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*):").unwrap();
    static ref URI_HTTP_HOST_RE: Regex = Regex::new(r"^(?i)https?://[^/\s]+").unwrap();
    static ref PERCENT_ESCAPE_RE: Regex = Regex::new(r"%[0-9A-Fa-f]{2}").unwrap();
}

const KNOWN_URI_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "ldap", "ldaps", "mailto", "tel", "sms", "bitcoin", "urn",
    "sip", "sips", "xmpp", "ws", "wss", "sftp", "git", "file",
];

/// Schemes written without `//` after the colon.
const OPAQUE_URI_SCHEMES: &[&str] = &["mailto", "tel", "sms", "bitcoin", "urn"];

pub struct SrvValidator {
    hostnames: HostnameValidator,
}

impl SrvValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }

    /// `_service._proto.domain`
    fn check_name(&self, name: &str) -> Result<String, Rejected> {
        if name.len() > 255 {
            return Err(Rejected::new("The hostname is too long."));
        }
        let mut fields = name.splitn(3, '.');
        let (Some(service), Some(proto), Some(domain)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(Rejected::new(
                "SRV record name must be in format _service._protocol.domain",
            ));
        };
        if !SRV_SERVICE_RE.is_match(service) {
            return Err(Rejected::new("Invalid service value in name field of SRV record."));
        }
        if !SRV_PROTO_RE.is_match(proto) {
            return Err(Rejected::new("Invalid protocol value in name field of SRV record."));
        }
        let domain = self
            .hostnames
            .check(domain, false)
            .map_err(|_| Rejected::new("Invalid FQDN value in name field of SRV record."))?;
        Ok(format!("{service}.{proto}.{domain}"))
    }

    /// `priority weight port target`
    fn check_content(&self, content: &str) -> Result<String, Rejected> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        let &[priority, weight, port, target] = fields.as_slice() else {
            return Err(Rejected::new(
                "SRV record content must have priority, weight, port and target",
            ));
        };
        for (value, label) in [(priority, "priority"), (weight, "weight"), (port, "port")] {
            if !is_u16(value) {
                return Err(Rejected::new(format!(
                    "Invalid value for the {label} field of the SRV record."
                )));
            }
        }
        if target != "." && !self.hostnames.is_valid(target, false) {
            return Err(Rejected::new("Invalid SRV target."));
        }
        Ok(fields.join(" "))
    }
}

impl RecordValidator for SrvValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.check_name(input.name.trim())?;
        let content = self.check_content(input.content)?;
        let prio = ranged_prio(
            input.prio,
            10,
            "Invalid value for the priority field of the SRV record.",
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

pub struct UriValidator {
    hostnames: HostnameValidator,
}

impl UriValidator {
    pub fn new(hostnames: HostnameValidator) -> Self {
        Self { hostnames }
    }
}

impl RecordValidator for UriValidator {
    fn check(&self, input: &RecordInput<'_>) -> Result<Accepted, Rejected> {
        let name = self.hostnames.check(input.name, true)?;

        let content = input.content.trim();
        if !is_printable(content) {
            return Err(Rejected::new("Invalid characters in content field."));
        }
        let caps = URI_CONTENT_RE.captures(content).ok_or_else(|| {
            Rejected::new("URI record must be in the format: <priority> <weight> \"<target URI>\"")
        })?;
        let priority = caps[1].parse::<u16>().map_err(|_| {
            Rejected::new("URI priority must be between 0 and 65535 (16-bit unsigned integer).")
        })?;
        if !is_u16(&caps[2]) {
            return Err(Rejected::new(
                "URI weight must be between 0 and 65535 (16-bit unsigned integer).",
            ));
        }
        let mut warnings = check_uri(&caps[3])?;
        warnings.push(
            "URI records should be protected with DNSSEC to prevent manipulation by attackers.".to_string(),
        );

        let prio = ranged_prio(
            input.prio,
            priority,
            "URI priority must be between 0 and 65535 (16-bit unsigned integer).",
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

/// Target URI checks. Returns warnings for legal but doubtful URIs.
fn check_uri(uri: &str) -> Result<Vec<String>, Rejected> {
    if uri.trim().is_empty() {
        return Err(Rejected::new("URI must not be empty."));
    }
    let scheme = URI_SCHEME_RE
        .captures(uri)
        .map(|c| c[1].to_ascii_lowercase())
        .ok_or_else(|| {
            Rejected::new(
                "URI must start with a valid scheme that begins with a letter followed by letters, digits, plus, period, or hyphen.",
            )
        })?;

    let mut warnings = Vec::new();
    if !KNOWN_URI_SCHEMES.contains(&scheme.as_str()) {
        warnings.push(
            "URI uses an uncommon protocol. Consider using a standard URI scheme for better compatibility.".to_string(),
        );
    }
    if !OPAQUE_URI_SCHEMES.contains(&scheme.as_str())
        && !uri[scheme.len() + 1..].starts_with("//")
    {
        return Err(Rejected::new(
            "URI with this protocol must include \"://\" after the protocol name.",
        ));
    }
    if (scheme == "http" || scheme == "https") && !URI_HTTP_HOST_RE.is_match(uri) {
        return Err(Rejected::new("HTTP/HTTPS URIs must include a hostname."));
    }

    match scheme.as_str() {
        "http" => {
            warnings.push("Consider using HTTPS instead of HTTP for better security.".to_string())
        }
        "ftp" => warnings.push(
            "FTP is considered less secure than alternatives like SFTP or HTTPS.".to_string(),
        ),
        "ldap" => warnings.push(
            "Consider using LDAPS (LDAP over SSL/TLS) for securing LDAP connections.".to_string(),
        ),
        "tel" | "sms" => warnings.push(
            "Phone-related URI schemes may contain sensitive personal information.".to_string(),
        ),
        "file" => warnings.push(
            "The \"file\" URI scheme may pose security risks and is not recommended for public DNS records."
                .to_string(),
        ),
        _ => {}
    }
    if uri.contains('\\') {
        warnings.push(
            "URI contains backslash characters, which may be interpreted differently across systems.".to_string(),
        );
    }
    if uri.contains("..") {
        warnings.push("URI contains \"..\" sequences, which may be used for directory traversal attacks.".to_string());
    }
    if uri.contains('%') && !PERCENT_ESCAPE_RE.is_match(uri) {
        warnings.push(
            "URI contains percent characters not used for properly formatted percent-encoding.".to_string(),
        );
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srv() -> SrvValidator {
        SrvValidator::new(HostnameValidator::default())
    }

    #[test]
    fn srv_valid() {
        let res =
            srv().validate(&RecordInput::new("10 60 5060 sip.example.com", "_sip._tcp.example.com"));
        assert!(res.is_valid());
        let data = res.data.unwrap();
        assert_eq!(data.prio, 10);
        assert_eq!(data.content, "10 60 5060 sip.example.com");

        let input = RecordInput::new("0 0 0 .", "_xmpp-server._tcp.example.com").prio("0");
        let res = srv().validate(&input);
        assert!(res.is_valid());
    }

    #[test]
    fn srv_name_rules() {
        let cases = [
            ("example.com", "SRV record name must be in format _service._protocol.domain"),
            ("sip._tcp.example.com", "Invalid service value in name field of SRV record."),
            ("_sip._t-cp.example.com", "Invalid protocol value in name field of SRV record."),
            ("_sip._tcp.-bad.com", "Invalid FQDN value in name field of SRV record."),
        ];
        for (name, msg) in cases {
            let res = srv().validate(&RecordInput::new("10 60 5060 sip.example.com", name));
            assert_eq!(res.first_error(), Some(msg), "{name}");
        }
    }

    #[test]
    fn srv_content_rules() {
        let name = "_sip._tcp.example.com";
        let cases = [
            (
                "10 60 sip.example.com",
                "SRV record content must have priority, weight, port and target",
            ),
            (
                "10 -1 5060 sip.example.com",
                "Invalid value for the weight field of the SRV record.",
            ),
            (
                "10 60 70000 sip.example.com",
                "Invalid value for the port field of the SRV record.",
            ),
            ("10 60 5060 bad_host!", "Invalid SRV target."),
        ];
        for (content, msg) in cases {
            let res = srv().validate(&RecordInput::new(content, name));
            assert_eq!(res.first_error(), Some(msg), "{content}");
        }
        let input = RecordInput::new("10 60 5060 sip.example.com", name).prio("65536");
        assert_eq!(
            srv().validate(&input).first_error(),
            Some("Invalid value for the priority field of the SRV record.")
        );
    }

    fn uri(content: &str) -> crate::validation::ValidationResult {
        UriValidator::new(HostnameValidator::default())
            .validate(&RecordInput::new(content, "_http._tcp.example.com"))
    }

    #[test]
    fn uri_valid_and_priority_from_content() {
        let res = uri("10 1 \"https://www.example.com/path\"");
        assert!(res.is_valid());
        assert_eq!(res.data.as_ref().unwrap().prio, 10);
        assert!(res.warnings.iter().any(|w| w.contains("DNSSEC")));

        let input = RecordInput::new("10 1 \"mailto:ops@example.com\"", "_mail.example.com");
        let res = UriValidator::new(HostnameValidator::default()).validate(&input.prio("3"));
        assert_eq!(res.data.unwrap().prio, 3);
    }

    #[test]
    fn uri_errors() {
        let cases = [
            ("10 1 https://example.com", "URI record must be in the format"),
            ("70000 1 \"https://example.com\"", "priority"),
            ("10 70000 \"https://example.com\"", "weight"),
            ("10 1 \"\"", "URI must not be empty."),
            ("10 1 \"1http://x\"", "valid scheme"),
            ("10 1 \"ftp:example.com\"", "://"),
            ("10 1 \"https:///path\"", "HTTP/HTTPS URIs must include a hostname."),
        ];
        for (content, msg) in cases {
            let res = uri(content);
            let err = res.first_error().unwrap_or_default();
            assert!(err.contains(msg), "{content}: {err}");
        }
    }

    #[test]
    fn uri_warnings() {
        let res = uri("10 1 \"http://example.com/../x%zz\"");
        assert!(res.is_valid());
        assert!(res.warnings.iter().any(|w| w.contains("HTTPS")));
        assert!(res.warnings.iter().any(|w| w.contains("directory traversal")));
        assert!(res.warnings.iter().any(|w| w.contains("percent")));
    }
}
