//! Zone lifecycle: creation with SOA/NS seeding, deletion, serial updates
//! and DNSSEC toggling.
use std::net::IpAddr;

use serde::Deserialize;

use crate::AppState;
use crate::db::record_repo::{self, NewRecord};
use crate::db::user_repo::{PermEdit, User};
use crate::db::zone_repo::{self, Zone, ZoneKind};
use crate::error::AppError;

use super::{authorize_zone_admin, bump_serial, find_zone};

#[derive(Debug, Clone, Deserialize)]
pub struct NewZone {
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ZoneKind,
    /// Comma-separated master addresses, SLAVE zones only.
    #[serde(default)]
    pub masters: Option<String>,
}

fn default_kind() -> ZoneKind {
    ZoneKind::Master
}

pub async fn list_zones(state: &AppState, actor: &User) -> Result<Vec<Zone>, AppError> {
    let owner = match actor.perm_edit {
        PermEdit::All => None,
        _ => Some(actor.id),
    };
    Ok(zone_repo::list(&state.db, owner).await?)
}

pub async fn add_zone(state: &AppState, actor: &User, req: &NewZone) -> Result<Zone, AppError> {
    if actor.perm_edit == PermEdit::None {
        return Err(AppError::forbidden("You do not have the permission to add zones."));
    }

    let name = state
        .validators
        .hostnames()
        .check(req.name.trim(), false)?
        .to_ascii_lowercase();
    if zone_repo::exists_by_name(&state.db, &name).await? {
        return Err(AppError::conflict("There is already a zone with this name."));
    }

    let masters = match req.kind {
        ZoneKind::Slave => Some(parse_masters(req.masters.as_deref().unwrap_or_default())?),
        ZoneKind::Master | ZoneKind::Native => None,
    };

    let mut tx = state.db.begin().await?;
    let zone_id = zone_repo::insert(&mut tx, &name, req.kind, masters.as_deref(), actor.id).await?;
    if req.kind != ZoneKind::Slave {
        let ttl = state.config.default_ttl;
        let soa = state.config.default_soa_content(state.config.today());
        record_repo::insert(
            &mut *tx,
            NewRecord {
                domain_id: zone_id,
                name: &name,
                rtype: "SOA",
                content: &soa,
                ttl,
                prio: 0,
            },
        )
        .await?;
        for ns in &state.config.nameservers {
            record_repo::insert(
                &mut *tx,
                NewRecord {
                    domain_id: zone_id,
                    name: &name,
                    rtype: "NS",
                    content: ns.trim_end_matches('.'),
                    ttl,
                    prio: 0,
                },
            )
            .await?;
        }
    }
    tx.commit().await?;

    tracing::info!(user = %actor.username, zone = %name, kind = %req.kind, "zone added");

    Ok(Zone {
        id: zone_id,
        name,
        kind: req.kind,
        master: masters,
    })
}

/// Normalise `192.0.2.1, 2001:db8::1` into `192.0.2.1,2001:db8::1`.
fn parse_masters(raw: &str) -> Result<String, AppError> {
    let masters: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();
    if masters.is_empty() {
        return Err(AppError::invalid("A slave zone needs at least one master."));
    }
    for m in &masters {
        if m.parse::<IpAddr>().is_err() {
            return Err(AppError::invalid(format!(
                "{m} is not a valid IP address of a master server."
            )));
        }
    }
    Ok(masters.join(","))
}

pub async fn delete_zone(state: &AppState, actor: &User, zone_id: i64) -> Result<(), AppError> {
    let zone = find_zone(state, zone_id).await?;
    authorize_zone_admin(state, actor, &zone).await?;

    if let Some(provider) = state.dnssec() {
        match provider.is_zone_secured(&zone.name).await {
            Ok(true) => {
                if let Err(err) = provider.unsecure_zone(&zone.name).await {
                    tracing::warn!(
                        zone = %zone.name,
                        error = %err,
                        "unsecure before delete failed"
                    );
                }
            }
            Ok(false) => {}
            Err(err) => tracing::warn!(zone = %zone.name, error = %err, "DNSSEC state unknown"),
        }
    }

    let mut tx = state.db.begin().await?;
    zone_repo::delete(&mut tx, zone.id).await?;
    tx.commit().await?;

    tracing::info!(user = %actor.username, zone = %zone.name, "zone deleted");
    Ok(())
}

/// Bump the zone's SOA serial. Returns whether the serial changed.
pub async fn update_soa_serial(state: &AppState, zone_id: i64) -> Result<bool, AppError> {
    let mut conn = state.db.acquire().await?;
    Ok(bump_serial(&mut conn, zone_id, state.config.today()).await?)
}

fn require_provider(state: &AppState) -> Result<&dyn crate::powerdns::DnssecProvider, AppError> {
    state
        .dnssec()
        .ok_or_else(|| AppError::bad_request("DNSSEC is not enabled."))
}

pub async fn secure_zone(state: &AppState, actor: &User, zone_id: i64) -> Result<(), AppError> {
    let zone = find_zone(state, zone_id).await?;
    authorize_zone_admin(state, actor, &zone).await?;
    let provider = require_provider(state)?;

    provider.secure_zone(&zone.name).await?;
    update_soa_serial(state, zone.id).await?;
    tracing::info!(user = %actor.username, zone = %zone.name, "zone secured");
    Ok(())
}

pub async fn unsecure_zone(state: &AppState, actor: &User, zone_id: i64) -> Result<(), AppError> {
    let zone = find_zone(state, zone_id).await?;
    authorize_zone_admin(state, actor, &zone).await?;
    let provider = require_provider(state)?;

    provider.unsecure_zone(&zone.name).await?;
    update_soa_serial(state, zone.id).await?;
    tracing::info!(user = %actor.username, zone = %zone.name, "zone unsecured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masters_are_normalised() {
        assert_eq!(parse_masters("192.0.2.1, 2001:db8::1").unwrap(), "192.0.2.1,2001:db8::1");
        assert!(matches!(parse_masters(" , "), Err(AppError::Invalid(_))));
        assert!(matches!(parse_masters("192.0.2.300"), Err(AppError::Invalid(_))));
    }
}
