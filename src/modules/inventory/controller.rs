use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use warehouse_core::AppError;
use warehouse_models::{
    GenerateSnapshotsDto, GenerateSnapshotsResponse, InventorySnapshot, SnapshotQuery,
};

use super::service;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/inventory/snapshots",
    request_body = GenerateSnapshotsDto,
    responses(
        (status = 200, description = "Snapshots generated for the month", body = GenerateSnapshotsResponse),
        (status = 400, description = "Month is not formatted as YYYY-MM"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Inventory",
    security(("bearer_auth" = []))
)]
pub async fn generate_snapshots(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<GenerateSnapshotsDto>,
) -> Result<Json<GenerateSnapshotsResponse>, AppError> {
    let result = service::generate_snapshots(&state.db, dto.month).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/inventory/snapshots",
    params(("month" = String, Query, description = "Month formatted as YYYY-MM")),
    responses(
        (status = 200, description = "Snapshots for the month", body = Vec<InventorySnapshot>),
        (status = 400, description = "Missing or malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Inventory",
    security(("bearer_auth" = []))
)]
pub async fn get_snapshots(
    State(state): State<AppState>,
    query: Result<Query<SnapshotQuery>, QueryRejection>,
) -> Result<Json<Vec<InventorySnapshot>>, AppError> {
    let Query(query) = query
        .map_err(|_| AppError::bad_request(anyhow!("month is required and must be formatted as YYYY-MM")))?;
    let snapshots = service::list_snapshots(&state.db, query.month).await?;
    Ok(Json(snapshots))
}
