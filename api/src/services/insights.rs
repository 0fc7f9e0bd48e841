//! Insight assembly pipeline.
//!
//! cache lookup → resolve place → fetch climate series (synthetic on upstream
//! failure) → analyze (default analysis on analysis failure) → metadata →
//! cache write. Only results built from real climate data are cached.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::analyzers::agriculture::{self, AgricultureAnalysis};
use crate::analyzers::risk::{self, RiskAnalysis};
use crate::analyzers::solar::{self, SolarAnalysis};
use crate::analyzers::travel::{self, TravelAnalysis};
use crate::analyzers::AnalysisError;
use crate::errors::AppError;
use crate::models::{ClimateSeries, Domain, Location};
use crate::services::cache::{Clock, InsightCache};
use crate::services::gazetteer;
use crate::services::geocode::GeocodingClient;
use crate::services::power::PowerClient;
use crate::services::synthetic::SyntheticGenerator;
use crate::services::weather::{CurrentWeather, CurrentWeatherClient};

/// Fields every insight response carries.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightMetadata {
    /// When the insight was assembled
    pub timestamp: DateTime<Utc>,
    /// Daily records behind the analysis
    pub data_points: usize,
    pub years_analyzed: u32,
    /// 0-100
    pub confidence_score: f64,
    /// True when synthetic data or a default analysis was used
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TravelInsight {
    pub location: Location,
    pub analysis: TravelAnalysis,
    #[serde(flatten)]
    pub meta: InsightMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AgricultureInsight {
    pub location: Location,
    pub crop: String,
    pub analysis: AgricultureAnalysis,
    #[serde(flatten)]
    pub meta: InsightMetadata,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SolarInsight {
    pub location: Location,
    pub analysis: SolarAnalysis,
    #[serde(flatten)]
    pub meta: InsightMetadata,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskInsight {
    pub location: Location,
    pub risk_analysis: RiskAnalysis,
    #[serde(flatten)]
    pub meta: InsightMetadata,
    pub success: bool,
}

/// An assembled insight for any domain. Serializes as the inner response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Insight {
    Travel(TravelInsight),
    Agriculture(AgricultureInsight),
    Solar(SolarInsight),
    Risk(RiskInsight),
}

impl Insight {
    pub fn meta(&self) -> &InsightMetadata {
        match self {
            Insight::Travel(i) => &i.meta,
            Insight::Agriculture(i) => &i.meta,
            Insight::Solar(i) => &i.meta,
            Insight::Risk(i) => &i.meta,
        }
    }
}

type Analyzer<A> = fn(&ClimateSeries, &Location) -> Result<A, AnalysisError>;

pub struct InsightService {
    power: PowerClient,
    geocoder: Option<GeocodingClient>,
    weather: Option<CurrentWeatherClient>,
    generator: SyntheticGenerator,
    cache: InsightCache<Insight>,
    clock: Arc<dyn Clock>,
}

impl InsightService {
    pub fn new(
        power: PowerClient,
        geocoder: Option<GeocodingClient>,
        weather: Option<CurrentWeatherClient>,
        generator: SyntheticGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            power,
            geocoder,
            weather,
            generator,
            cache: InsightCache::new(clock.clone()),
            clock,
        }
    }

    /// Number of entries currently held by the result cache.
    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }

    pub async fn assemble(&self, domain: Domain, query: &str) -> Result<Insight, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Location parameter is required".to_string(),
            ));
        }

        if let Some(hit) = self.cache.get(domain, query).await {
            tracing::debug!("Serving cached {} insight for '{}'", domain, query);
            return Ok(hit);
        }

        let location = self.resolve(domain, query).await;
        let series = self.climate_series(domain, &location).await;

        let insight = match domain {
            Domain::Travel => {
                let (mut analysis, series, fell_back) =
                    self.analyze_or_default(domain, &location, series, travel::analyze)?;
                let weather = self.current_weather(&location).await;
                analysis.current_conditions = Some(travel::current_conditions(&weather));
                let meta = self.metadata(&series, analysis.confidence_score, fell_back);
                Insight::Travel(TravelInsight {
                    location,
                    analysis,
                    meta,
                })
            }
            Domain::Agriculture => {
                let (analysis, series, fell_back) =
                    self.analyze_or_default(domain, &location, series, agriculture::analyze)?;
                let meta = self.metadata(&series, analysis.confidence_score, fell_back);
                Insight::Agriculture(AgricultureInsight {
                    location,
                    crop: "Rice".to_string(),
                    analysis,
                    meta,
                    success: true,
                })
            }
            Domain::Solar => {
                let (analysis, series, fell_back) =
                    self.analyze_or_default(domain, &location, series, solar::analyze)?;
                let meta = self.metadata(&series, analysis.confidence_score, fell_back);
                Insight::Solar(SolarInsight {
                    location,
                    analysis,
                    meta,
                    success: true,
                })
            }
            Domain::Risk => {
                let (risk_analysis, series, fell_back) =
                    self.analyze_or_default(domain, &location, series, risk::analyze)?;
                let meta = self.metadata(&series, risk_analysis.confidence_score, fell_back);
                Insight::Risk(RiskInsight {
                    location,
                    risk_analysis,
                    meta,
                    success: true,
                })
            }
        };

        if insight.meta().demo {
            tracing::info!("Caching demo {} insight for '{}'", domain, query);
        }
        self.cache.insert(domain, query, insight.clone()).await;

        Ok(insight)
    }

    /// Gazetteer lookup, or the remote geocoder for travel when configured.
    async fn resolve(&self, domain: Domain, query: &str) -> Location {
        let geocoder = match (&self.geocoder, domain) {
            (Some(geocoder), Domain::Travel) => geocoder,
            _ => return gazetteer::resolve(query),
        };

        match geocoder.search(query.trim()).await {
            Ok(found) => Location {
                name: found.display_name,
                country: found.country.unwrap_or_else(|| "Unknown".to_string()),
                state: found.state,
                latitude: found.latitude,
                longitude: found.longitude,
                region: gazetteer::region_for(query),
            },
            Err(e) => {
                tracing::warn!("Geocoding '{}' failed, using gazetteer: {}", query, e);
                gazetteer::resolve(query)
            }
        }
    }

    async fn climate_series(&self, domain: Domain, location: &Location) -> ClimateSeries {
        match self
            .power
            .fetch(
                location.latitude,
                location.longitude,
                domain.parameters(),
                domain.fetch_span_years(),
            )
            .await
        {
            Ok(series) => {
                tracing::debug!(
                    "Fetched {} climate records for {}",
                    series.data_points(),
                    location.name
                );
                series
            }
            Err(e) => {
                tracing::warn!(
                    "Climate data for {} unavailable, using synthetic series: {}",
                    location.name,
                    e
                );
                self.generator.generate(location.region, domain)
            }
        }
    }

    /// Run `analyze`; on failure retry once with a fresh synthetic series.
    /// Returns the analysis, the series it was computed from, and whether the
    /// fallback was taken.
    fn analyze_or_default<A>(
        &self,
        domain: Domain,
        location: &Location,
        series: ClimateSeries,
        analyze: Analyzer<A>,
    ) -> Result<(A, ClimateSeries, bool), AppError> {
        match analyze(&series, location) {
            Ok(analysis) => Ok((analysis, series, false)),
            Err(e) => {
                tracing::warn!(
                    "{} analysis for {} failed, using default analysis: {}",
                    domain,
                    location.name,
                    e
                );
                let fallback = self.generator.generate(location.region, domain);
                let analysis = analyze(&fallback, location)?;
                Ok((analysis, fallback, true))
            }
        }
    }

    async fn current_weather(&self, location: &Location) -> CurrentWeather {
        let Some(client) = &self.weather else {
            return self.generator.simulated_conditions();
        };

        match client.current(location.latitude, location.longitude).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::warn!("Current weather for {} unavailable: {}", location.name, e);
                self.generator.simulated_conditions()
            }
        }
    }

    fn metadata(&self, series: &ClimateSeries, confidence: f64, fell_back: bool) -> InsightMetadata {
        InsightMetadata {
            timestamp: self.clock.now(),
            data_points: series.data_points(),
            years_analyzed: series.span_years,
            confidence_score: confidence,
            demo: series.synthetic || fell_back,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::cache::ManualClock;
    use chrono::Duration;
    use std::time::Duration as StdDuration;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// POWER payload with a value for each of the last `days` days.
    fn power_payload(days: i64) -> serde_json::Value {
        let today = Utc::now().date_naive();
        let mut t2m = serde_json::Map::new();
        let mut rain = serde_json::Map::new();
        let mut rh = serde_json::Map::new();
        let mut solar = serde_json::Map::new();
        let mut wind = serde_json::Map::new();
        for i in 0..days {
            let key = (today - Duration::days(i)).format("%Y%m%d").to_string();
            t2m.insert(key.clone(), serde_json::json!(28.0));
            rain.insert(key.clone(), serde_json::json!(5.0));
            rh.insert(key.clone(), serde_json::json!(70.0));
            solar.insert(key.clone(), serde_json::json!(5.5));
            wind.insert(key, serde_json::json!(3.0));
        }
        serde_json::json!({
            "properties": { "parameter": {
                "T2M": t2m,
                "PRECTOTCORR": rain,
                "RH2M": rh,
                "ALLSKY_SFC_SW_DWN": solar,
                "WS2M": wind
            } }
        })
    }

    pub(crate) fn service_for(power_url: &str, timeout: StdDuration) -> (Arc<ManualClock>, InsightService) {
        let clock = Arc::new(ManualClock::new(
            "2025-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap(),
        ));
        let service = InsightService::new(
            PowerClient::new(power_url, timeout).unwrap(),
            None,
            None,
            SyntheticGenerator::new(Some(42)),
            clock.clone(),
        );
        (clock, service)
    }

    /// Travel service with a remote geocoder and current-weather client.
    fn travel_service(power_url: &str, geocoder_url: &str, weather_url: &str) -> InsightService {
        let timeout = StdDuration::from_secs(5);
        InsightService::new(
            PowerClient::new(power_url, timeout).unwrap(),
            Some(GeocodingClient::new(geocoder_url, "geo-key", timeout).unwrap()),
            Some(CurrentWeatherClient::new(weather_url, "owm-key", timeout).unwrap()),
            SyntheticGenerator::new(Some(42)),
            Arc::new(ManualClock::new(
                "2025-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap(),
            )),
        )
    }

    async fn failing_upstream(status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    async fn geocoder_upstream() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Chennai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "display_name": "Chennai, Chennai District, Tamil Nadu, India",
                "lat": "13.0836939",
                "lon": "80.270186",
                "address": { "state": "Tamil Nadu", "country": "India" }
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    async fn weather_upstream() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 31.6, "feels_like": 38.2, "humidity": 66 },
                "weather": [{ "main": "Haze", "description": "haze" }],
                "wind": { "speed": 3.6 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    async fn healthy_upstream(expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(power_payload(700)))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_upstream_timeout_yields_demo_insight() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(power_payload(10))
                    .set_delay(StdDuration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_millis(50));
        let insight = service.assemble(Domain::Agriculture, "Nadia").await.unwrap();

        let meta = insight.meta();
        assert!(meta.demo);
        assert_eq!(meta.data_points, 1095);
        assert_eq!(meta.years_analyzed, 3);
        assert_eq!(meta.confidence_score, 85.0);
    }

    #[tokio::test]
    async fn test_mumbai_agriculture() {
        let mock_server = healthy_upstream(1).await;
        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));

        let Insight::Agriculture(insight) = service.assemble(Domain::Agriculture, "Mumbai").await.unwrap()
        else {
            panic!("expected an agriculture insight");
        };

        assert_eq!(insight.location.name, "Mumbai");
        assert_eq!(insight.crop, "Rice");
        assert!(!insight.meta.demo);
        let potential = &insight.analysis.yield_potential;
        assert_eq!(potential.estimated_yield, potential.category.estimated_yield());
        assert!(insight.analysis.recommendations.len() >= 3);
        assert!(insight
            .analysis
            .recommendations
            .iter()
            .any(|r| r.title == "Optimal Planting Time" && r.content.contains("June - July")));
    }

    #[tokio::test]
    async fn test_cached_until_ttl_expires() {
        let mock_server = healthy_upstream(2).await;
        let (clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));

        let first = service.assemble(Domain::Solar, "Delhi").await.unwrap();
        clock.advance(Duration::minutes(90));
        let second = service.assemble(Domain::Solar, "  delhi ").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(service.cached_entries().await, 1);

        clock.advance(Duration::hours(2));
        let third = service.assemble(Domain::Solar, "Delhi").await.unwrap();
        assert!(third.meta().timestamp > first.meta().timestamp);
    }

    #[tokio::test]
    async fn test_demo_results_are_cached_for_the_ttl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));
        let first = service.assemble(Domain::Agriculture, "Mumbai").await.unwrap();
        let second = service.assemble(Domain::Agriculture, "Mumbai").await.unwrap();

        assert!(first.meta().demo);
        assert_eq!(first.meta().data_points, 1095);
        assert_eq!(first, second);
        assert_eq!(service.cached_entries().await, 1);
    }

    #[tokio::test]
    async fn test_demo_results_expire_with_the_ttl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&mock_server)
            .await;

        let (clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));
        let first = service.assemble(Domain::Risk, "Goa").await.unwrap();
        clock.advance(Duration::hours(3) + Duration::seconds(1));
        let second = service.assemble(Domain::Risk, "Goa").await.unwrap();

        assert!(second.meta().demo);
        assert_eq!(second.meta().data_points, 730);
        assert!(second.meta().timestamp > first.meta().timestamp);
    }

    #[tokio::test]
    async fn test_empty_location_is_rejected() {
        let (_clock, service) = service_for("http://127.0.0.1:9", StdDuration::from_secs(1));
        let err = service.assemble(Domain::Travel, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_every_domain_reports_bounded_confidence_and_twelve_months() {
        let mock_server = healthy_upstream(4).await;
        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));

        let monthly_key = |domain: Domain| match domain {
            Domain::Travel => ("analysis", "monthlyBreakdown"),
            Domain::Agriculture => ("analysis", "monthlyData"),
            Domain::Solar => ("analysis", "monthlyData"),
            Domain::Risk => ("riskAnalysis", "monthlyRisks"),
        };

        for domain in Domain::ALL {
            let insight = service.assemble(domain, "Kolkata").await.unwrap();
            let json = serde_json::to_value(&insight).unwrap();

            let confidence = json["confidenceScore"].as_f64().unwrap();
            assert!((0.0..=100.0).contains(&confidence), "{}: {}", domain, confidence);
            assert_eq!(json["demo"], false);

            let (outer, inner) = monthly_key(domain);
            assert_eq!(json[outer][inner].as_array().unwrap().len(), 12, "{}", domain);
        }
    }

    #[tokio::test]
    async fn test_travel_attaches_simulated_conditions() {
        let mock_server = healthy_upstream(1).await;
        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));

        let Insight::Travel(insight) = service.assemble(Domain::Travel, "Chennai").await.unwrap() else {
            panic!("expected a travel insight");
        };

        let conditions = insight.analysis.current_conditions.unwrap();
        assert!(conditions.simulated);
        assert_eq!(conditions.icon, "☀️");
        assert!(!insight.meta.demo);
        assert_eq!(insight.meta.years_analyzed, 5);
    }

    #[tokio::test]
    async fn test_travel_uses_remote_geocoder_and_weather() {
        let power = healthy_upstream(1).await;
        let geocoder = geocoder_upstream().await;
        let weather = weather_upstream().await;
        let service = travel_service(&power.uri(), &geocoder.uri(), &weather.uri());

        let Insight::Travel(insight) = service.assemble(Domain::Travel, "Chennai").await.unwrap() else {
            panic!("expected a travel insight");
        };

        assert_eq!(insight.location.name, "Chennai, Chennai District, Tamil Nadu, India");
        assert_eq!(insight.location.country, "India");
        assert_eq!(insight.location.state.as_deref(), Some("Tamil Nadu"));
        assert!((insight.location.latitude - 13.0836939).abs() < 1e-9);
        assert_eq!(insight.location.region, gazetteer::region_for("Chennai"));

        let conditions = insight.analysis.current_conditions.unwrap();
        assert!(!conditions.simulated);
        assert_eq!(conditions.description, "haze");
        assert!(!insight.meta.demo);
    }

    #[tokio::test]
    async fn test_geocoder_failure_falls_back_to_gazetteer() {
        let power = healthy_upstream(1).await;
        let geocoder = failing_upstream(500).await;
        let weather = weather_upstream().await;
        let service = travel_service(&power.uri(), &geocoder.uri(), &weather.uri());

        let Insight::Travel(insight) = service.assemble(Domain::Travel, "Chennai").await.unwrap() else {
            panic!("expected a travel insight");
        };

        assert_eq!(insight.location, gazetteer::resolve("Chennai"));
        assert!(!insight.meta.demo);
    }

    #[tokio::test]
    async fn test_weather_failure_simulates_conditions_without_demo() {
        let power = healthy_upstream(1).await;
        let geocoder = geocoder_upstream().await;
        let weather = failing_upstream(500).await;
        let service = travel_service(&power.uri(), &geocoder.uri(), &weather.uri());

        let Insight::Travel(insight) = service.assemble(Domain::Travel, "Chennai").await.unwrap() else {
            panic!("expected a travel insight");
        };

        let conditions = insight.analysis.current_conditions.unwrap();
        assert!(conditions.simulated);
        assert!(!insight.meta.demo);
    }

    #[tokio::test]
    async fn test_incomplete_series_falls_back_to_default_analysis() {
        let mock_server = MockServer::start().await;
        // Only 20 days: most calendar months have no values.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(power_payload(20)))
            .mount(&mock_server)
            .await;

        let (_clock, service) = service_for(&mock_server.uri(), StdDuration::from_secs(5));
        let insight = service.assemble(Domain::Solar, "Jaipur, Rajasthan").await.unwrap();

        assert!(insight.meta().demo);
        assert_eq!(insight.meta().data_points, 730);
        assert_eq!(service.cached_entries().await, 1);
    }
}
