//! Field-level helpers shared by the per-type validators.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::Rejected;

pub const MAX_TTL: i64 = 2_147_483_647;

/// Resolve the TTL field: blank means `default_ttl`.
pub fn check_ttl(raw: &str, default_ttl: u32) -> Result<u32, Rejected> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default_ttl);
    }
    match raw.parse::<i64>() {
        Ok(ttl) if (0..=MAX_TTL).contains(&ttl) => Ok(ttl as u32),
        _ => Err(Rejected::new(
            "Invalid value for TTL field. It should be numeric.",
        )),
    }
}

/// Priority for types that carry one (MX, KX, SRV). Blank means `default`.
pub(crate) fn ranged_prio(raw: &str, default: u16, message: &str) -> Result<u16, Rejected> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<u16>().map_err(|_| Rejected::new(message))
}

/// Priority for types without one: blank or zero, anything else is refused.
pub(crate) fn zero_prio(raw: &str, rtype: &str) -> Result<u16, Rejected> {
    let raw = raw.trim();
    if raw.is_empty() || raw.parse::<i64>() == Ok(0) {
        return Ok(0);
    }
    Err(Rejected::new(format!(
        "Invalid value for priority field. {rtype} records must have priority value of 0."
    )))
}

/// Parse a decimal field and require it to fall in `min..=max`.
pub(crate) fn number_in(raw: &str, min: i64, max: i64) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|n| (min..=max).contains(n))
}

pub(crate) fn is_u16(raw: &str) -> bool {
    number_in(raw, 0, 65535).is_some()
}

pub(crate) fn is_u32(raw: &str) -> bool {
    number_in(raw, 0, u32::MAX as i64).is_some()
}

/// Non-empty and made of printable ASCII only.
pub(crate) fn is_printable(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

pub(crate) fn has_html_tags(s: &str) -> bool {
    s.contains('<') || s.contains('>')
}

pub(crate) fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn is_base64(s: &str) -> bool {
    !s.is_empty() && BASE64.decode(s).is_ok()
}

/// Strip one pair of surrounding double quotes.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

pub(crate) fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && unquote(s).is_some()
}

/// Split on runs of whitespace into at most `n` fields; the last field
/// keeps whatever follows, inner spacing included.
pub(crate) fn split_fields(s: &str, n: usize) -> Vec<&str> {
    let mut out = Vec::with_capacity(n);
    let mut rest = s.trim();
    while !rest.is_empty() {
        if out.len() + 1 == n {
            out.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(idx) => {
                out.push(&rest[..idx]);
                rest = rest[idx..].trim_start();
            }
            None => {
                out.push(rest);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_blank() {
        assert_eq!(check_ttl("", 3600), Ok(3600));
        assert_eq!(check_ttl("  ", 3600), Ok(3600));
        assert_eq!(check_ttl("300", 3600), Ok(300));
        assert_eq!(check_ttl("0", 3600), Ok(0));
    }

    #[test]
    fn ttl_rejects_garbage_and_out_of_range() {
        for raw in ["-1", "abc", "2147483648", "1.5"] {
            let err = check_ttl(raw, 3600).unwrap_err();
            assert_eq!(err.first(), "Invalid value for TTL field. It should be numeric.");
        }
        assert_eq!(check_ttl("2147483647", 0), Ok(2_147_483_647));
    }

    #[test]
    fn zero_prio_accepts_blank_and_zero_only() {
        assert_eq!(zero_prio("", "TXT"), Ok(0));
        assert_eq!(zero_prio("0", "TXT"), Ok(0));
        let err = zero_prio("10", "TXT").unwrap_err();
        assert!(err.first().contains("priority field"));
    }

    #[test]
    fn ranged_prio_bounds() {
        assert_eq!(ranged_prio("", 10, "bad"), Ok(10));
        assert_eq!(ranged_prio("65535", 10, "bad"), Ok(65535));
        assert!(ranged_prio("65536", 10, "bad").is_err());
        assert!(ranged_prio("-1", 10, "bad").is_err());
    }

    #[test]
    fn split_fields_keeps_tail() {
        assert_eq!(split_fields("  1   2 \"a b\"  ", 3), vec!["1", "2", "\"a b\""]);
        assert_eq!(split_fields("1 2", 3), vec!["1", "2"]);
        assert!(split_fields("   ", 3).is_empty());
    }

    #[test]
    fn encodings() {
        assert!(is_hex("deadBEEF01"));
        assert!(!is_hex("xyz"));
        assert!(is_base64("aGVsbG8="));
        assert!(!is_base64("not base64!"));
    }
}
