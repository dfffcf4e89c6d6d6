use axum::{Extension, Json, extract::Path, http::StatusCode};
use serde_json::json;

use crate::db::zone_repo::Zone;
use crate::error::AppError;
use crate::service::zones::{self, NewZone};
use crate::{SharedState, auth::Authenticated};

// GET /api/zones
pub async fn list(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<Zone>>, AppError> {
    Ok(Json(zones::list_zones(&state, &user).await?))
}

// POST /api/zones
pub async fn create(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Json(req): Json<NewZone>,
) -> Result<(StatusCode, Json<Zone>), AppError> {
    let zone = zones::add_zone(&state, &user, &req).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

// DELETE /api/zones/{id}
pub async fn remove(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    zones::delete_zone(&state, &user, zone_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/zones/{id}/dnssec
pub async fn secure(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    zones::secure_zone(&state, &user, zone_id).await?;
    Ok(Json(json!({ "dnssec": true })))
}

// DELETE /api/zones/{id}/dnssec
pub async fn unsecure(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    zones::unsecure_zone(&state, &user, zone_id).await?;
    Ok(Json(json!({ "dnssec": false })))
}
