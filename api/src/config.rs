use std::time::Duration;

use crate::services::geocode::DEFAULT_GEOCODER_URL;
use crate::services::power::DEFAULT_POWER_API_URL;
use crate::services::weather::DEFAULT_WEATHER_API_URL;

/// Default bound on a single upstream call, in seconds.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
/// Upstream calls are never allowed to wait longer than this.
const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 15;
const MIN_UPSTREAM_TIMEOUT_SECS: u64 = 1;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// NASA POWER daily point endpoint.
    pub power_api_url: String,
    /// LocationIQ-compatible search endpoint.
    pub geocoder_url: String,
    /// Remote geocoding is skipped when unset.
    pub locationiq_api_key: Option<String>,
    /// OpenWeatherMap-compatible current weather endpoint.
    pub weather_api_url: String,
    /// Current conditions are simulated when unset.
    pub openweather_api_key: Option<String>,
    pub upstream_timeout_secs: u64,
    /// Fixed seed for synthetic series; OS entropy when unset.
    pub synthetic_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            power_api_url: std::env::var("POWER_API_URL")
                .unwrap_or_else(|_| DEFAULT_POWER_API_URL.to_string()),
            geocoder_url: std::env::var("GEOCODER_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
            locationiq_api_key: non_empty_var("LOCATIONIQ_API_KEY"),
            weather_api_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
            openweather_api_key: non_empty_var("OPENWEATHER_API_KEY"),
            upstream_timeout_secs: parse_timeout_secs(non_empty_var("UPSTREAM_TIMEOUT_SECS")),
            synthetic_seed: non_empty_var("SYNTHETIC_SEED").and_then(|s| match s.parse() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    tracing::warn!("Ignoring invalid SYNTHETIC_SEED '{}': {}", s, e);
                    None
                }
            }),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the upstream timeout, falling back to the default on bad input and
/// clamping into the allowed window.
fn parse_timeout_secs(raw: Option<String>) -> u64 {
    let secs = match raw {
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid UPSTREAM_TIMEOUT_SECS '{}', using {}s",
                s,
                DEFAULT_UPSTREAM_TIMEOUT_SECS
            );
            DEFAULT_UPSTREAM_TIMEOUT_SECS
        }),
        None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
    };
    secs.clamp(MIN_UPSTREAM_TIMEOUT_SECS, MAX_UPSTREAM_TIMEOUT_SECS)
}
