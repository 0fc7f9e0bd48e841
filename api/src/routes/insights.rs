//! Insight HTTP endpoints.
//!
//! - GET /api/travel/:location
//! - GET /api/agriculture/rice/:location
//! - GET /api/solar/:location
//! - GET /api/risk/:location

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::errors::{AppError, ErrorResponse};
use crate::models::Domain;
use crate::services::insights::{Insight, InsightService};

/// Shared application state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) insights: Arc<InsightService>,
}

async fn assemble(state: &AppState, domain: Domain, location: &str) -> Result<Json<Insight>, AppError> {
    tracing::info!("{} insight requested for '{}'", domain, location);
    let insight = state.insights.assemble(domain, location).await?;
    Ok(Json(insight))
}

/// Travel comfort insight.
///
/// Ranks the calendar months by temperature, rainfall and humidity comfort
/// and attaches current conditions.
#[utoipa::path(
    get,
    path = "/api/travel/{location}",
    tag = "Insights",
    params(("location" = String, Path, description = "Free-text place name")),
    responses(
        (status = 200, description = "Travel insight", body = crate::services::insights::TravelInsight),
        (status = 400, description = "Empty location", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    )
)]
pub async fn get_travel_insights(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Insight>, AppError> {
    assemble(&state, Domain::Travel, &location).await
}

/// Rice cultivation insight.
#[utoipa::path(
    get,
    path = "/api/agriculture/rice/{location}",
    tag = "Insights",
    params(("location" = String, Path, description = "Free-text place name")),
    responses(
        (status = 200, description = "Rice cultivation insight", body = crate::services::insights::AgricultureInsight),
        (status = 400, description = "Empty location", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    )
)]
pub async fn get_rice_insights(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Insight>, AppError> {
    assemble(&state, Domain::Agriculture, &location).await
}

/// Rooftop solar potential and financial outlook for a 3 kW system.
#[utoipa::path(
    get,
    path = "/api/solar/{location}",
    tag = "Insights",
    params(("location" = String, Path, description = "Free-text place name")),
    responses(
        (status = 200, description = "Solar insight", body = crate::services::insights::SolarInsight),
        (status = 400, description = "Empty location", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    )
)]
pub async fn get_solar_analysis(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Insight>, AppError> {
    assemble(&state, Domain::Solar, &location).await
}

/// Climate-disaster risk assessment.
#[utoipa::path(
    get,
    path = "/api/risk/{location}",
    tag = "Insights",
    params(("location" = String, Path, description = "Free-text place name")),
    responses(
        (status = 200, description = "Risk insight", body = crate::services::insights::RiskInsight),
        (status = 400, description = "Empty location", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    )
)]
pub async fn get_risk_assessment(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<Insight>, AppError> {
    assemble(&state, Domain::Risk, &location).await
}
