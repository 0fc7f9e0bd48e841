use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::insights::AppState;
use crate::errors::AppError;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "OK" while the process serves requests
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// API version
    pub version: String,
    /// Insights currently held by the result cache
    pub cached_insights: usize,
}

/// Service banner returned at the root path.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<String>,
    pub docs: String,
}

/// Health check endpoint.
///
/// Upstream providers are not probed: every insight endpoint degrades to
/// synthetic data, so the service is healthy as long as it answers.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Climate insights API is running".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_insights: state.insights.cached_entries().await,
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service banner", body = ServiceInfo),
    )
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Climate Insights API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "/api/travel/{location}".to_string(),
            "/api/agriculture/rice/{location}".to_string(),
            "/api/solar/{location}".to_string(),
            "/api/risk/{location}".to_string(),
            "/api/health".to_string(),
        ],
        docs: "/swagger-ui/".to_string(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
