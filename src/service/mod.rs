//! Database-aware operations on zones and records. Handlers call into here;
//! everything below is independent of HTTP.

pub mod records;
pub mod reverse;
pub mod zones;

use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::AppState;
use crate::db::record_repo;
use crate::db::user_repo::{PermEdit, User};
use crate::db::zone_repo::{self, Zone, ZoneKind};
use crate::dns::updated_soa_content;
use crate::error::AppError;
use crate::validation::RecordType;

const NO_EDIT_PERMISSION: &str = "You do not have the permission to edit this zone.";

/// Check that `actor` may change records of `rtypes` in `zone`.
pub(crate) async fn authorize_record_edit(
    state: &AppState,
    actor: &User,
    zone: &Zone,
    rtypes: &[RecordType],
) -> Result<(), AppError> {
    if zone.kind == ZoneKind::Slave {
        return Err(AppError::forbidden(
            "Records of a slave zone are maintained by its master and cannot be edited.",
        ));
    }
    match actor.perm_edit {
        PermEdit::All => Ok(()),
        PermEdit::None => Err(AppError::forbidden(NO_EDIT_PERMISSION)),
        PermEdit::Own | PermEdit::OwnAsClient => {
            if !zone_repo::is_owner(&state.db, zone.id, actor.id).await? {
                return Err(AppError::forbidden(NO_EDIT_PERMISSION));
            }
            let restricted = rtypes
                .iter()
                .any(|t| matches!(t, RecordType::SOA | RecordType::NS));
            if actor.perm_edit == PermEdit::OwnAsClient && restricted {
                return Err(AppError::forbidden(
                    "You do not have the permission to edit SOA or NS records.",
                ));
            }
            Ok(())
        }
    }
}

/// Users without the `all` permission only see zones they own.
pub(crate) async fn authorize_zone_view(
    state: &AppState,
    actor: &User,
    zone: &Zone,
) -> Result<(), AppError> {
    if actor.perm_edit == PermEdit::All
        || zone_repo::is_owner(&state.db, zone.id, actor.id).await?
    {
        return Ok(());
    }
    Err(AppError::forbidden("You do not have the permission to view this zone."))
}

/// Check that `actor` may delete or re-sign `zone` as a whole.
pub(crate) async fn authorize_zone_admin(
    state: &AppState,
    actor: &User,
    zone: &Zone,
) -> Result<(), AppError> {
    let allowed = match actor.perm_edit {
        PermEdit::All => true,
        PermEdit::Own => zone_repo::is_owner(&state.db, zone.id, actor.id).await?,
        PermEdit::OwnAsClient | PermEdit::None => false,
    };
    if !allowed {
        return Err(AppError::forbidden(NO_EDIT_PERMISSION));
    }
    Ok(())
}

/// Advance the SOA serial of `zone_id`. Returns whether it changed.
pub(crate) async fn bump_serial(
    conn: &mut SqliteConnection,
    zone_id: i64,
    today: NaiveDate,
) -> sqlx::Result<bool> {
    let Some((soa_id, content)) = record_repo::soa_of_zone(&mut *conn, zone_id).await? else {
        return Ok(false);
    };
    let updated = updated_soa_content(&content, today);
    if updated == content {
        return Ok(false);
    }
    record_repo::update_content(&mut *conn, soa_id, &updated).await?;
    Ok(true)
}

/// Ask the DNSSEC backend to rectify `zone_name`. Failures are logged only.
pub(crate) async fn rectify(state: &AppState, zone_name: &str) {
    let Some(provider) = state.dnssec() else {
        return;
    };
    if let Err(err) = provider.rectify_zone(zone_name).await {
        tracing::warn!(zone = %zone_name, error = %err, "rectify failed");
    }
}

pub(crate) async fn find_zone(state: &AppState, zone_id: i64) -> Result<Zone, AppError> {
    zone_repo::find_by_id(&state.db, zone_id)
        .await?
        .ok_or_else(|| AppError::not_found("Zone not found."))
}
