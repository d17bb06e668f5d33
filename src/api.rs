use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::model::{DiagnosticKind, LakeDiagnostic, LakeRecord, Status};
use crate::services::DatasetService;

#[derive(Clone)]
pub struct AppState {
    pub dataset_service: DatasetService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct LakeListResponse {
    pub generated_at: DateTime<Utc>,
    pub total_lakes: usize,
    pub lakes: Vec<LakeRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub total: usize,
    pub diagnostics: Vec<LakeDiagnostic>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lake Quality Service",
        description = "Bathing water status of monitored lakes"
    ),
    paths(health, get_lakes, get_lake, get_diagnostics),
    components(schemas(
        HealthResponse,
        LakeListResponse,
        DiagnosticsResponse,
        LakeRecord,
        LakeDiagnostic,
        DiagnosticKind,
        Status
    ))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/lakes", get(get_lakes))
        .route("/lakes/{id}", get(get_lake))
        .route("/diagnostics", get(get_diagnostics))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/lakes",
    responses(
        (status = 200, description = "Latest record per lake", body = LakeListResponse),
        (status = 503, description = "No dataset built yet")
    )
)]
#[instrument(skip(state))]
async fn get_lakes(State(state): State<AppState>) -> Result<Json<LakeListResponse>, StatusCode> {
    debug!("Fetching lake records");
    let dataset = state.dataset_service.latest().await.ok_or_else(|| {
        warn!("Lake records requested before first refresh");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    info!(
        "Retrieved {} lake records generated at {}",
        dataset.records.len(),
        dataset.generated_at
    );

    Ok(Json(LakeListResponse {
        generated_at: dataset.generated_at,
        total_lakes: dataset.records.len(),
        lakes: dataset.records,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/lakes/{id}",
    params(("id" = String, Path, description = "Lake site code, e.g. bgwl0085")),
    responses(
        (status = 200, description = "Latest record for the lake", body = LakeRecord),
        (status = 404, description = "Lake not in the current dataset"),
        (status = 503, description = "No dataset built yet")
    )
)]
#[instrument(skip(state), fields(lake_id = %id))]
async fn get_lake(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LakeRecord>, StatusCode> {
    debug!("Fetching record for lake {}", id);
    let record = state
        .dataset_service
        .record(&id)
        .await
        .map_err(|_| {
            warn!("Lake {} requested before first refresh", id);
            StatusCode::SERVICE_UNAVAILABLE
        })?
        .ok_or_else(|| {
            warn!("Lake {} not found", id);
            StatusCode::NOT_FOUND
        })?;

    info!("Retrieved record for lake {} from {}", id, record.sample_date);
    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Lakes skipped or partially processed in the last run", body = DiagnosticsResponse),
        (status = 503, description = "No dataset built yet")
    )
)]
#[instrument(skip(state))]
async fn get_diagnostics(
    State(state): State<AppState>,
) -> Result<Json<DiagnosticsResponse>, StatusCode> {
    let diagnostics = state
        .dataset_service
        .diagnostics()
        .await
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(DiagnosticsResponse {
        total: diagnostics.len(),
        diagnostics,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let spec = generate_openapi_spec();
        for path in [
            "/api/v1/health",
            "/api/v1/lakes",
            "/api/v1/lakes/{id}",
            "/api/v1/diagnostics",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
