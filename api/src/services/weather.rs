//! Current conditions from an OpenWeatherMap-compatible endpoint.

use serde::Deserialize;
use std::time::Duration;

use crate::errors::UpstreamError;

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct CurrentWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Snapshot of the weather right now, metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    /// Condition group, e.g. "Clear", "Rain"
    pub condition: String,
    pub description: String,
    /// True when produced locally instead of observed.
    pub simulated: bool,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl CurrentWeatherClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather, UpstreamError> {
        let lat_str = format!("{:.4}", lat);
        let lon_str = format!("{:.4}", lon);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat_str.as_str()),
                ("lon", lon_str.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "weather service returned HTTP {}",
                response.status()
            )));
        }

        let body: OwmResponse = response.json().await?;
        let (condition, description) = body
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .ok_or_else(|| UpstreamError::Malformed("weather list is empty".to_string()))?;

        Ok(CurrentWeather {
            temperature_c: body.main.temp,
            feels_like_c: body.main.feels_like.unwrap_or(body.main.temp),
            humidity_pct: body.main.humidity,
            wind_speed_ms: body.wind.map(|w| w.speed).unwrap_or(0.0),
            condition,
            description,
            simulated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_current_weather() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 31.2, "feels_like": 36.0, "humidity": 74 },
                "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
                "wind": { "speed": 4.1 }
            })))
            .mount(&mock_server)
            .await;

        let client = CurrentWeatherClient::new(&mock_server.uri(), "k", Duration::from_secs(5)).unwrap();
        let weather = client.current(19.076, 72.8777).await.unwrap();

        assert_eq!(weather.condition, "Clouds");
        assert_eq!(weather.humidity_pct, 74.0);
        assert_eq!(weather.feels_like_c, 36.0);
        assert!(!weather.simulated);
    }

    #[tokio::test]
    async fn test_current_weather_missing_main_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": []
            })))
            .mount(&mock_server)
            .await;

        let client = CurrentWeatherClient::new(&mock_server.uri(), "k", Duration::from_secs(5)).unwrap();
        let err = client.current(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }
}
