use axum::{Extension, Json, extract::Query};
use serde::{Deserialize, Serialize};

use crate::db::zone_repo;
use crate::dns::{best_matching_zone, ip_to_ptr};
use crate::error::AppError;
use crate::service::reverse::{self, BatchReport, Ipv4Batch, Ipv6Batch};
use crate::{SharedState, auth::Authenticated};

#[derive(Deserialize)]
pub struct PtrQuery {
    pub ip: String,
}

#[derive(Serialize)]
pub struct PtrLookup {
    pub ptr_name: String,
    /// Best matching reverse zone, `-1` when there is none.
    pub zone_id: i64,
}

// GET /api/reverse/ptr?ip=
pub async fn lookup(
    Authenticated(_user): Authenticated,
    Extension(state): Extension<SharedState>,
    Query(q): Query<PtrQuery>,
) -> Result<Json<PtrLookup>, AppError> {
    let ptr_name = ip_to_ptr(q.ip.trim()).map_err(|e| AppError::invalid(e.to_string()))?;
    let zones = zone_repo::reverse_zones(&state.db).await?;
    let zone_id = best_matching_zone(&ptr_name, zones.iter().map(|(id, n)| (*id, n.as_str())))
        .unwrap_or(-1);
    Ok(Json(PtrLookup { ptr_name, zone_id }))
}

// POST /api/reverse/ipv4
pub async fn batch_ipv4(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Json(req): Json<Ipv4Batch>,
) -> Result<Json<BatchReport>, AppError> {
    Ok(Json(reverse::create_ipv4_ptrs(&state, &user, &req).await?))
}

// POST /api/reverse/ipv6
pub async fn batch_ipv6(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Json(req): Json<Ipv6Batch>,
) -> Result<Json<BatchReport>, AppError> {
    Ok(Json(reverse::create_ipv6_ptrs(&state, &user, &req).await?))
}

#[derive(Deserialize)]
pub struct SerialQuery {
    pub current: u32,
}

// GET /api/serial/next?current=
pub async fn next_serial(
    Authenticated(_user): Authenticated,
    Extension(state): Extension<SharedState>,
    Query(q): Query<SerialQuery>,
) -> Json<serde_json::Value> {
    let next = crate::dns::next_serial(q.current, state.config.today());
    Json(serde_json::json!({ "current": q.current, "next": next }))
}
