//! NASA POWER daily point client.
//!
//! Fetches daily climate history for a coordinate.
//! See: https://power.larc.nasa.gov/docs/services/api/temporal/daily/

use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::errors::UpstreamError;
use crate::models::{ClimateParameter, ClimateRecord, ClimateSeries};

pub const DEFAULT_POWER_API_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// POWER marks days without a value with this fill number.
const MISSING_SENTINEL: f64 = -999.0;
const DATE_FORMAT: &str = "%Y%m%d";

/// Client for the NASA POWER daily point API.
#[derive(Debug, Clone)]
pub struct PowerClient {
    client: reqwest::Client,
    base_url: String,
}

// --- POWER JSON response types ---

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<HashMap<String, HashMap<String, Option<f64>>>>,
}

impl PowerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch the last `span_years` of daily values, ending today.
    pub async fn fetch(
        &self,
        lat: f64,
        lon: f64,
        parameters: &[ClimateParameter],
        span_years: u32,
    ) -> Result<ClimateSeries, UpstreamError> {
        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_months(Months::new(12 * span_years))
            .unwrap_or(end);
        self.fetch_range(lat, lon, parameters, span_years, start, end)
            .await
    }

    /// Fetch daily values for an explicit inclusive date range.
    pub async fn fetch_range(
        &self,
        lat: f64,
        lon: f64,
        parameters: &[ClimateParameter],
        span_years: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ClimateSeries, UpstreamError> {
        let codes = parameters
            .iter()
            .map(|p| p.power_code())
            .collect::<Vec<_>>()
            .join(",");

        tracing::debug!(
            "Requesting POWER {} for ({:.4}, {:.4}) {}..{}",
            codes,
            lat,
            lon,
            start,
            end
        );

        let start_str = start.format(DATE_FORMAT).to_string();
        let end_str = end.format(DATE_FORMAT).to_string();
        let lat_str = format!("{:.4}", lat);
        let lon_str = format!("{:.4}", lon);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("parameters", codes.as_str()),
                ("start", start_str.as_str()),
                ("end", end_str.as_str()),
                ("latitude", lat_str.as_str()),
                ("longitude", lon_str.as_str()),
                ("community", "RE"),
                ("format", "JSON"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "POWER returned HTTP {}",
                response.status()
            )));
        }

        let raw_json: serde_json::Value = response.json().await?;
        parse_power_payload(&raw_json, parameters, span_years, start, end)
    }
}

/// Turn a POWER payload into a `ClimateSeries`.
///
/// Pure function (no I/O). Sentinel and null values are dropped, as are keys
/// that are not valid dates or fall outside `start..=end`.
pub fn parse_power_payload(
    raw_json: &serde_json::Value,
    parameters: &[ClimateParameter],
    span_years: u32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ClimateSeries, UpstreamError> {
    let response: PowerResponse = serde_json::from_value(raw_json.clone())
        .map_err(|e| UpstreamError::Malformed(format!("POWER response structure error: {}", e)))?;

    let blocks = response
        .properties
        .and_then(|p| p.parameter)
        .ok_or_else(|| UpstreamError::Malformed("missing properties.parameter".to_string()))?;

    let mut records: BTreeMap<NaiveDate, ClimateRecord> = BTreeMap::new();

    for &parameter in parameters {
        let Some(values) = blocks.get(parameter.power_code()) else {
            tracing::warn!("POWER payload has no {} block", parameter.power_code());
            continue;
        };

        for (key, value) in values {
            let Some(v) = value.filter(|v| v.is_finite() && *v > MISSING_SENTINEL) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(key, DATE_FORMAT) else {
                continue;
            };
            if date < start || date > end {
                continue;
            }
            records.entry(date).or_default().set(parameter, v);
        }
    }

    if records.is_empty() {
        return Err(UpstreamError::Malformed(
            "POWER payload contained no usable values".to_string(),
        ));
    }

    Ok(ClimateSeries {
        parameters: parameters.to_vec(),
        records,
        synthetic: false,
        span_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const PARAMS: [ClimateParameter; 2] =
        [ClimateParameter::Temperature, ClimateParameter::Precipitation];

    #[test]
    fn test_parse_drops_sentinels_and_bad_keys() {
        let json = serde_json::json!({
            "properties": {
                "parameter": {
                    "T2M": {
                        "20240101": 21.5,
                        "20240102": -999.0,
                        "20240103": null,
                        "2024-01-04": 22.0,
                        "20230101": 18.0
                    },
                    "PRECTOTCORR": {
                        "20240101": 0.4,
                        "20240102": 1.2
                    }
                }
            }
        });

        let series =
            parse_power_payload(&json, &PARAMS, 1, day(2024, 1, 1), day(2024, 12, 31)).unwrap();

        assert_eq!(series.data_points(), 2);
        assert!(!series.synthetic);
        let jan1 = series.records[&day(2024, 1, 1)];
        assert_eq!(jan1.temperature_c, Some(21.5));
        assert_eq!(jan1.precipitation_mm, Some(0.4));
        let jan2 = series.records[&day(2024, 1, 2)];
        assert_eq!(jan2.temperature_c, None);
        assert_eq!(jan2.precipitation_mm, Some(1.2));
    }

    #[test]
    fn test_parse_missing_parameter_block_is_malformed() {
        let json = serde_json::json!({ "properties": {} });
        let err = parse_power_payload(&json, &PARAMS, 1, day(2024, 1, 1), day(2024, 12, 31))
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[test]
    fn test_parse_all_sentinels_is_malformed() {
        let json = serde_json::json!({
            "properties": { "parameter": { "T2M": { "20240101": -999.0 } } }
        });
        let err = parse_power_payload(&json, &PARAMS, 1, day(2024, 1, 1), day(2024, 12, 31))
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_range_sends_expected_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("parameters", "T2M,PRECTOTCORR"))
            .and(query_param("start", "20240101"))
            .and(query_param("end", "20240131"))
            .and(query_param("community", "RE"))
            .and(query_param("format", "JSON"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": { "parameter": {
                    "T2M": { "20240115": 19.0 },
                    "PRECTOTCORR": { "20240115": 0.0 }
                } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = PowerClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let series = client
            .fetch_range(19.076, 72.8777, &PARAMS, 1, day(2024, 1, 1), day(2024, 1, 31))
            .await
            .unwrap();

        assert_eq!(series.data_points(), 1);
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = PowerClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.fetch(0.0, 0.0, &PARAMS, 2).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = PowerClient::new(&mock_server.uri(), Duration::from_millis(50)).unwrap();
        let err = client.fetch(0.0, 0.0, &PARAMS, 2).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout));
    }
}
