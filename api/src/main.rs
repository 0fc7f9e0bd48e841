// Climate Insights API v0.1
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod analyzers;
mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::insights::AppState;
use services::cache::SystemClock;
use services::geocode::GeocodingClient;
use services::insights::InsightService;
use services::power::PowerClient;
use services::synthetic::SyntheticGenerator;
use services::weather::CurrentWeatherClient;

/// Climate Insights API, OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Climate Insights API",
        version = "0.1.0",
        description = "Location-based climate insights for Indian places. \
            Pulls daily history from NASA POWER (or a synthetic series when the \
            provider is unavailable) and turns it into travel comfort rankings, \
            rice cultivation guidance, rooftop solar economics and a disaster \
            risk assessment.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Insights", description = "Climate insights per location"),
    ),
    paths(
        routes::health::health_check,
        routes::health::service_info,
        routes::insights::get_travel_insights,
        routes::insights::get_rice_insights,
        routes::insights::get_solar_analysis,
        routes::insights::get_risk_assessment,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::health::ServiceInfo,
            models::Location,
            models::RegionClass,
            analyzers::Recommendation,
            services::insights::InsightMetadata,
            services::insights::TravelInsight,
            services::insights::AgricultureInsight,
            services::insights::SolarInsight,
            services::insights::RiskInsight,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_insights_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let timeout = config.upstream_timeout();

    let power = PowerClient::new(&config.power_api_url, timeout)
        .expect("Failed to build climate data client");

    let geocoder = match &config.locationiq_api_key {
        Some(key) => Some(
            GeocodingClient::new(&config.geocoder_url, key, timeout)
                .expect("Failed to build geocoding client"),
        ),
        None => {
            tracing::info!("LOCATIONIQ_API_KEY not set, resolving places from the gazetteer only");
            None
        }
    };

    let weather = match &config.openweather_api_key {
        Some(key) => Some(
            CurrentWeatherClient::new(&config.weather_api_url, key, timeout)
                .expect("Failed to build current weather client"),
        ),
        None => {
            tracing::info!("OPENWEATHER_API_KEY not set, current conditions will be simulated");
            None
        }
    };

    if let Some(seed) = config.synthetic_seed {
        tracing::info!("Synthetic climate series seeded with {}", seed);
    }

    let insights = InsightService::new(
        power,
        geocoder,
        weather,
        SyntheticGenerator::new(config.synthetic_seed),
        Arc::new(SystemClock),
    );

    let app_state = AppState {
        insights: Arc::new(insights),
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let app = routes::build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
