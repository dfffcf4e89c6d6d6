//! Bulk PTR creation for a whole IPv4 network or the start of an IPv6 /64.
use std::collections::{HashMap, HashSet};
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::db::record_repo::{self, NewRecord};
use crate::db::user_repo::User;
use crate::db::zone_repo;
use crate::dns::best_matching_zone;
use crate::dns::reverse::{ipv4_addr_to_ptr, ipv6_addr_to_ptr};
use crate::error::AppError;
use crate::validation::{RecordInput, RecordType};

use super::{authorize_record_edit, bump_serial, find_zone, rectify};

/// Widest IPv4 network accepted: a /20 has 4096 addresses.
pub const MIN_IPV4_PREFIX_LEN: u8 = 20;
pub const MAX_IPV6_HOSTS: u32 = 1000;
const DEFAULT_IPV6_HOSTS: u32 = 256;

#[derive(Debug, Clone, Deserialize)]
pub struct Ipv4Batch {
    /// Any address inside the network, usually the network address.
    pub network: String,
    #[serde(default = "default_prefix_len")]
    pub prefix_len: u8,
    pub host_prefix: String,
    pub domain: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

fn default_prefix_len() -> u8 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ipv6Batch {
    /// The /64 prefix as four groups, e.g. `2001:db8:1:1`.
    pub prefix: String,
    pub host_prefix: String,
    pub domain: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
    pub message: String,
}

impl BatchReport {
    fn finish(mut self, what: &str) -> Result<Self, AppError> {
        if self.created == 0 && self.skipped == 0 {
            let mut msg = format!("Failed to create any {what} records.");
            for e in self.errors.iter().take(3) {
                msg.push(' ');
                msg.push_str(e);
            }
            if self.errors.len() > 3 {
                msg.push_str("...");
            }
            return Err(AppError::Invalid(vec![msg]));
        }
        let mut message = format!("Created {} {what} records successfully", self.created);
        if self.skipped > 0 {
            message.push_str(&format!(" ({} skipped as they already exist)", self.skipped));
        }
        if self.failed > 0 {
            message.push_str(&format!(" ({} failed)", self.failed));
        }
        self.message = message;
        Ok(self)
    }
}

/// One PTR to create: reverse name and the forward name it points to.
struct PtrTarget {
    ip: String,
    ptr_name: String,
    fqdn: String,
}

fn ensure_enabled(state: &AppState) -> Result<(), AppError> {
    if !state.config.reverse_records_enabled {
        return Err(AppError::forbidden("Reverse record creation is not allowed."));
    }
    Ok(())
}

/// Hosts of `network/prefix_len`, each with its PTR name and generated
/// forward name.
fn ipv4_targets(req: &Ipv4Batch) -> Result<Vec<PtrTarget>, AppError> {
    let addr: Ipv4Addr = req
        .network
        .trim()
        .parse()
        .map_err(|_| {
            AppError::invalid("Invalid network address. Each octet must be between 0 and 255.")
        })?;
    if !(MIN_IPV4_PREFIX_LEN..=32).contains(&req.prefix_len) {
        return Err(AppError::invalid(format!(
            "Network prefix length must be between /{MIN_IPV4_PREFIX_LEN} and /32."
        )));
    }
    let mask = u32::MAX << (32 - u32::from(req.prefix_len));
    let first = u32::from(addr) & mask;
    let count = 1u32 << (32 - u32::from(req.prefix_len));
    let wide = req.prefix_len < 24;
    let domain = req.domain.trim().trim_end_matches('.');

    Ok((0..count)
        .map(|i| {
            let ip = Ipv4Addr::from(first + i);
            let [_, _, c, d] = ip.octets();
            let host = if wide {
                format!("{}-{c}-{d}", req.host_prefix)
            } else {
                format!("{}-{d}", req.host_prefix)
            };
            PtrTarget {
                ip: ip.to_string(),
                ptr_name: ipv4_addr_to_ptr(ip),
                fqdn: format!("{host}.{domain}"),
            }
        })
        .collect())
}

fn ipv6_targets(req: &Ipv6Batch) -> Result<Vec<PtrTarget>, AppError> {
    let prefix = req.prefix.trim().trim_end_matches("::");
    if prefix.matches(':').count() != 3 {
        return Err(AppError::invalid(
            "Network prefix must be a valid IPv6 /64 prefix (e.g., \"2001:db8:1:1\").",
        ));
    }
    let network: Ipv6Addr = format!("{prefix}::")
        .parse()
        .map_err(|_| AppError::invalid("Invalid IPv6 prefix."))?;
    let count = req.count.unwrap_or(DEFAULT_IPV6_HOSTS).clamp(1, MAX_IPV6_HOSTS);
    let domain = req.domain.trim().trim_end_matches('.');

    Ok((0..count)
        .map(|i| {
            let ip = Ipv6Addr::from(u128::from(network) | u128::from(i));
            PtrTarget {
                ip: ip.to_string(),
                ptr_name: ipv6_addr_to_ptr(ip),
                fqdn: format!("{}-{i:x}.{domain}", req.host_prefix),
            }
        })
        .collect())
}

pub async fn create_ipv4_ptrs(
    state: &AppState,
    actor: &User,
    req: &Ipv4Batch,
) -> Result<BatchReport, AppError> {
    ensure_enabled(state)?;
    let targets = ipv4_targets(req)?;
    create_ptrs(state, actor, targets, req.ttl).await?.finish("PTR")
}

pub async fn create_ipv6_ptrs(
    state: &AppState,
    actor: &User,
    req: &Ipv6Batch,
) -> Result<BatchReport, AppError> {
    ensure_enabled(state)?;
    let targets = ipv6_targets(req)?;
    create_ptrs(state, actor, targets, req.ttl).await?.finish("IPv6 PTR")
}

async fn create_ptrs(
    state: &AppState,
    actor: &User,
    targets: Vec<PtrTarget>,
    ttl: Option<u32>,
) -> Result<BatchReport, AppError> {
    let zones = zone_repo::reverse_zones(&state.db).await?;
    let zone_of = |ptr_name: &str| {
        best_matching_zone(ptr_name, zones.iter().map(|(id, n)| (*id, n.as_str())))
    };

    if let Some(first) = targets.first() {
        if zone_of(&first.ptr_name).is_none() {
            return Err(AppError::not_found(
                "No matching reverse zone found for this network prefix. Please create the reverse zone first.",
            ));
        }
    }

    let ttl_raw = ttl.map(|t| t.to_string()).unwrap_or_default();
    let mut report = BatchReport::default();
    let mut zone_names: HashMap<i64, String> = HashMap::new();
    let mut touched: HashSet<i64> = HashSet::new();

    for target in targets {
        let Some(zone_id) = zone_of(&target.ptr_name) else {
            report.failed += 1;
            report
                .errors
                .push(format!("No matching reverse zone found for {}", target.ptr_name));
            continue;
        };
        if !zone_names.contains_key(&zone_id) {
            let zone = find_zone(state, zone_id).await?;
            authorize_record_edit(state, actor, &zone, &[RecordType::PTR]).await?;
            zone_names.insert(zone_id, zone.name);
        }

        if record_repo::record_exists(&state.db, zone_id, &target.ptr_name, "PTR", &target.fqdn)
            .await?
        {
            tracing::debug!(ptr = %target.ptr_name, "PTR already present, skipped");
            report.skipped += 1;
            continue;
        }

        let input = RecordInput::new(&target.fqdn, &target.ptr_name)
            .ttl(&ttl_raw)
            .default_ttl(state.config.default_ttl);
        let result = state.validators.validate_as(RecordType::PTR, &input);
        let Some(data) = result.data else {
            report.failed += 1;
            report.errors.push(format!(
                "Failed to create PTR record for {}: {}",
                target.ip,
                result.first_error().unwrap_or_default()
            ));
            continue;
        };

        let inserted = record_repo::insert(
            &state.db,
            NewRecord {
                domain_id: zone_id,
                name: &data.name,
                rtype: "PTR",
                content: &data.content,
                ttl: data.ttl,
                prio: 0,
            },
        )
        .await;
        match inserted {
            Ok(_) => {
                report.created += 1;
                touched.insert(zone_id);
            }
            Err(err) => {
                report.failed += 1;
                report
                    .errors
                    .push(format!("Failed to create PTR record for {}: {err}", target.ip));
            }
        }
    }

    for zone_id in touched {
        let mut conn = state.db.acquire().await?;
        bump_serial(&mut conn, zone_id, state.config.today()).await?;
        if let Some(name) = zone_names.get(&zone_id) {
            rectify(state, name).await;
        }
    }

    tracing::info!(
        user = %actor.username,
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "batch PTR creation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(network: &str, prefix_len: u8) -> Ipv4Batch {
        Ipv4Batch {
            network: network.into(),
            prefix_len,
            host_prefix: "host".into(),
            domain: "example.com.".into(),
            ttl: None,
        }
    }

    #[test]
    fn ipv4_slash_24() {
        let targets = ipv4_targets(&v4("192.0.2.77", 24)).unwrap();
        assert_eq!(targets.len(), 256);
        assert_eq!(targets[0].ptr_name, "0.2.0.192.in-addr.arpa");
        assert_eq!(targets[0].fqdn, "host-0.example.com");
        assert_eq!(targets[255].ip, "192.0.2.255");
    }

    #[test]
    fn ipv4_wider_networks_name_by_two_octets() {
        let targets = ipv4_targets(&v4("10.1.0.0", 20)).unwrap();
        assert_eq!(targets.len(), 4096);
        assert_eq!(targets[300].fqdn, "host-1-44.example.com");
        assert!(matches!(ipv4_targets(&v4("10.1.0.0", 19)), Err(AppError::Invalid(_))));
        assert!(matches!(ipv4_targets(&v4("10.1.0", 24)), Err(AppError::Invalid(_))));
    }

    #[test]
    fn ipv6_prefix_rules() {
        let req = Ipv6Batch {
            prefix: "2001:db8:1:1".into(),
            host_prefix: "host".into(),
            domain: "example.com".into(),
            count: Some(5000),
            ttl: None,
        };
        let targets = ipv6_targets(&req).unwrap();
        assert_eq!(targets.len(), MAX_IPV6_HOSTS as usize);
        assert_eq!(targets[255].ip, "2001:db8:1:1::ff");
        assert_eq!(targets[255].fqdn, "host-ff.example.com");
        assert!(targets[1].ptr_name.starts_with("1.0.0.0.0.0.0.0"));

        let bad = Ipv6Batch { prefix: "2001:db8".into(), ..req.clone() };
        assert!(ipv6_targets(&bad).is_err());
        let bad = Ipv6Batch { prefix: "2001:db8:zz:1".into(), ..req };
        assert!(ipv6_targets(&bad).is_err());
    }

    #[test]
    fn report_messages() {
        let report = BatchReport {
            created: 250,
            skipped: 6,
            ..BatchReport::default()
        }
        .finish("PTR")
        .unwrap();
        assert_eq!(
            report.message,
            "Created 250 PTR records successfully (6 skipped as they already exist)"
        );

        let err = BatchReport {
            failed: 2,
            errors: vec!["a".into(), "b".into()],
            ..BatchReport::default()
        }
        .finish("PTR")
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Invalid(ref e) if e[0] == "Failed to create any PTR records. a b"
        ));
    }
}
