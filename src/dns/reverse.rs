//! Reverse-lookup names and reverse-zone selection.
use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;

/// A reverse zone must start matching before this offset of the PTR name.
/// The longest `ip6.arpa` name is 72 characters.
pub const MAX_PTR_NAME_OFFSET: usize = 72;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReverseError {
    #[error("{0} is not a valid IPv4 address.")]
    InvalidIpv4(String),
    #[error("{0} is not a valid IPv6 address.")]
    InvalidIpv6(String),
}

/// `192.168.1.1` → `1.1.168.192.in-addr.arpa`
pub fn ipv4_to_ptr(ip: &str) -> Result<String, ReverseError> {
    let addr: Ipv4Addr = ip
        .trim()
        .parse()
        .map_err(|_| ReverseError::InvalidIpv4(ip.to_string()))?;
    Ok(ipv4_addr_to_ptr(addr))
}

pub fn ipv4_addr_to_ptr(addr: Ipv4Addr) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa")
}

/// `2001:db8::1` → `1.0.0.0.(...).8.b.d.0.1.0.0.2.ip6.arpa`
pub fn ipv6_to_ptr(ip: &str) -> Result<String, ReverseError> {
    let addr: Ipv6Addr = ip
        .trim()
        .parse()
        .map_err(|_| ReverseError::InvalidIpv6(ip.to_string()))?;
    Ok(ipv6_addr_to_ptr(addr))
}

pub fn ipv6_addr_to_ptr(addr: Ipv6Addr) -> String {
    let mut labels: Vec<String> = addr
        .octets()
        .iter()
        .flat_map(|b| [b >> 4, b & 0x0f])
        .map(|nibble| format!("{nibble:x}"))
        .collect();
    labels.reverse();
    labels.push("ip6.arpa".to_string());
    labels.join(".")
}

/// PTR name for either address family.
pub fn ip_to_ptr(ip: &str) -> Result<String, ReverseError> {
    if ip.contains(':') {
        ipv6_to_ptr(ip)
    } else {
        ipv4_to_ptr(ip)
    }
}

/// Pick the zone a PTR name belongs to.
///
/// Only names ending in `.arpa` are candidates. The zone found earliest in
/// `ptr_name` (case-insensitively) wins; on ties the longer name is kept.
pub fn best_matching_zone<'a, I>(ptr_name: &str, zones: I) -> Option<i64>
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    let mut candidates: Vec<(i64, &str)> = zones
        .into_iter()
        .filter(|(_, name)| name.to_ascii_lowercase().ends_with(".arpa"))
        .collect();
    candidates.sort_by_key(|(_, name)| std::cmp::Reverse(name.len()));

    let haystack = ptr_name.to_ascii_lowercase();
    let mut best: Option<(usize, i64)> = None;
    for (id, name) in candidates {
        let Some(pos) = haystack.find(&name.to_ascii_lowercase()) else {
            continue;
        };
        let limit = best.map_or(MAX_PTR_NAME_OFFSET, |(p, _)| p);
        if pos < limit {
            best = Some((pos, id));
        }
    }
    best.map(|(_, id)| id)
}
