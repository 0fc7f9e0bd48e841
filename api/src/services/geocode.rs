//! Forward geocoding against a LocationIQ-compatible search endpoint.
//! Only used when an API key is configured; the gazetteer covers the rest.

use serde::Deserialize;
use std::time::Duration;

use crate::errors::UpstreamError;

pub const DEFAULT_GEOCODER_URL: &str = "https://us1.locationiq.com/v1/search.php";

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Best match for a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    display_name: String,
    lat: String,
    lon: String,
    address: Option<SearchAddress>,
}

#[derive(Debug, Deserialize)]
struct SearchAddress {
    country: Option<String>,
    state: Option<String>,
}

impl GeocodingClient {
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

    pub async fn search(&self, text: &str) -> Result<GeocodeResult, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", text),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "geocoder returned HTTP {}",
                response.status()
            )));
        }

        let hits: Vec<SearchHit> = response.json().await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Malformed(format!("no geocoding match for '{}'", text)))?;

        let latitude = parse_coordinate(&hit.lat, 90.0)?;
        let longitude = parse_coordinate(&hit.lon, 180.0)?;
        let (country, state) = hit
            .address
            .map(|a| (a.country, a.state))
            .unwrap_or((None, None));

        Ok(GeocodeResult {
            display_name: hit.display_name,
            latitude,
            longitude,
            country,
            state,
        })
    }
}

fn parse_coordinate(raw: &str, limit: f64) -> Result<f64, UpstreamError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| UpstreamError::Malformed(format!("invalid coordinate '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(" 19.0760 ", 90.0).unwrap(), 19.076);
        assert!(parse_coordinate("91", 90.0).is_err());
        assert!(parse_coordinate("north", 90.0).is_err());
    }

    #[tokio::test]
    async fn test_search_returns_first_hit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Mumbai"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "display_name": "Mumbai, Maharashtra, India",
                    "lat": "19.0759837",
                    "lon": "72.8776559",
                    "address": { "state": "Maharashtra", "country": "India" }
                },
                {
                    "display_name": "Mumbai, Somewhere Else",
                    "lat": "1.0",
                    "lon": "1.0"
                }
            ])))
            .mount(&mock_server)
            .await;

        let client =
            GeocodingClient::new(&mock_server.uri(), "test-key", Duration::from_secs(5)).unwrap();
        let result = client.search("Mumbai").await.unwrap();

        assert_eq!(result.display_name, "Mumbai, Maharashtra, India");
        assert_eq!(result.state.as_deref(), Some("Maharashtra"));
        assert!((result.latitude - 19.0759837).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_search_without_hits_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client =
            GeocodingClient::new(&mock_server.uri(), "test-key", Duration::from_secs(5)).unwrap();
        let err = client.search("Atlantis").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_search_rejected_key_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client =
            GeocodingClient::new(&mock_server.uri(), "bad-key", Duration::from_secs(5)).unwrap();
        let err = client.search("Mumbai").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable(_)));
    }
}
