use axum::{Extension, Json, extract::Path, http::StatusCode};

use crate::db::record_repo::Record;
use crate::error::AppError;
use crate::service::records::{self, RecordRequest, SavedRecord};
use crate::validation::ValidationResult;
use crate::{SharedState, auth::Authenticated};

// GET /api/zones/{id}/records
pub async fn list(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(records::list_records(&state, &user, zone_id).await?))
}

// POST /api/zones/{id}/records
pub async fn create(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
    Json(req): Json<RecordRequest>,
) -> Result<(StatusCode, Json<SavedRecord>), AppError> {
    let saved = records::add_record(&state, &user, zone_id, &req).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

// POST /api/zones/{id}/records/validate
pub async fn validate(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(zone_id): Path<i64>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<ValidationResult>, AppError> {
    Ok(Json(records::dry_run(&state, &user, zone_id, &req).await?))
}

// PUT /api/records/{id}
pub async fn update(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(record_id): Path<i64>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<SavedRecord>, AppError> {
    Ok(Json(records::edit_record(&state, &user, record_id, &req).await?))
}

// DELETE /api/records/{id}
pub async fn remove(
    Authenticated(user): Authenticated,
    Extension(state): Extension<SharedState>,
    Path(record_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    records::delete_record(&state, &user, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
