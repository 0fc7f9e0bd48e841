pub mod health;
pub mod insights;

use axum::{routing::get, Router};

use insights::AppState;

/// All API routes. Layers (CORS, tracing) and Swagger UI are added in `main`.
pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::service_info))
        .route("/api/health", get(health::health_check))
        .route("/api/travel/:location", get(insights::get_travel_insights))
        .route(
            "/api/agriculture/rice/:location",
            get(insights::get_rice_insights),
        )
        .route("/api/solar/:location", get(insights::get_solar_analysis))
        .route("/api/risk/:location", get(insights::get_risk_assessment))
        .fallback(health::not_found)
        .with_state(state)
}
