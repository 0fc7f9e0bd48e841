//! Travel comfort analysis.
//!
//! Scores each calendar month on temperature, rainfall and humidity against
//! fixed comfort ideals and ranks the months.

use serde::Serialize;
use utoipa::ToSchema;

use super::{monthly_values, monthly_values_or, scaled_confidence, AnalysisError, Recommendation};
use crate::helpers::{mean, round_1dp, round_dp};
use crate::models::{ClimateParameter, ClimateSeries, Location, MONTH_NAMES};
use crate::services::weather::CurrentWeather;

const IDEAL_TEMP_C: f64 = 22.5;
const TEMP_SENSITIVITY: f64 = 2.5;
const IDEAL_RAIN_MM: f64 = 0.0;
const RAIN_SENSITIVITY: f64 = 20.0;
const IDEAL_HUMIDITY_PCT: f64 = 50.0;
const HUMIDITY_SENSITIVITY: f64 = 5.0;
const HOT_CLIMATE_THRESHOLD_C: f64 = 28.0;
const SYNTHETIC_CONFIDENCE: f64 = 85.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubScores {
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
}

/// Comfort figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComfort {
    pub month: String,
    pub month_index: usize,
    /// Mean of the three sub-scores, 0-10
    pub overall_score: f64,
    /// Mean temperature, °C
    pub temperature: f64,
    /// Mean daily rainfall, mm
    pub rainfall: f64,
    /// Mean relative humidity, %
    pub humidity: f64,
    pub sub_scores: SubScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: f64,
    pub description: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub feels_like: f64,
    pub icon: String,
    /// True when the conditions were simulated
    pub simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelAnalysis {
    pub best_travel_months: Vec<MonthlyComfort>,
    /// All twelve months, best first
    pub monthly_breakdown: Vec<MonthlyComfort>,
    pub recommendations: Vec<Recommendation>,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_conditions: Option<CurrentConditions>,
}

/// `max(0, 10 − |metric − ideal| / sensitivity)`
pub fn comfort_score(metric: f64, ideal: f64, sensitivity: f64) -> f64 {
    (10.0 - (metric - ideal).abs() / sensitivity).max(0.0)
}

pub fn analyze(series: &ClimateSeries, _location: &Location) -> Result<TravelAnalysis, AnalysisError> {
    let temperatures = monthly_values(series, ClimateParameter::Temperature)?;
    let rainfall = monthly_values_or(series, ClimateParameter::Precipitation, 0.0);
    let humidity = monthly_values_or(series, ClimateParameter::Humidity, IDEAL_HUMIDITY_PCT);

    let mut breakdown: Vec<MonthlyComfort> = (0..12)
        .map(|m| monthly_comfort(m, temperatures[m], rainfall[m], humidity[m]))
        .collect();
    // Stable, so equal scores keep calendar order.
    breakdown.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    let best = breakdown
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::Degenerate("no monthly scores".to_string()))?;

    let activities = activity_suggestions(best.temperature, best.rainfall);
    let annual_mean_temp = mean(&breakdown.iter().map(|m| m.temperature).collect::<Vec<_>>());
    let recommendations = recommendations(&best, &activities, annual_mean_temp);

    Ok(TravelAnalysis {
        best_travel_months: vec![best],
        monthly_breakdown: breakdown,
        recommendations,
        confidence_score: scaled_confidence(series, SYNTHETIC_CONFIDENCE, 100.0),
        current_conditions: None,
    })
}

fn monthly_comfort(month: usize, temp: f64, rain: f64, humidity: f64) -> MonthlyComfort {
    let temp_score = comfort_score(temp, IDEAL_TEMP_C, TEMP_SENSITIVITY);
    let rain_score = comfort_score(rain, IDEAL_RAIN_MM, RAIN_SENSITIVITY);
    let humidity_score = comfort_score(humidity, IDEAL_HUMIDITY_PCT, HUMIDITY_SENSITIVITY);

    MonthlyComfort {
        month: MONTH_NAMES[month].to_string(),
        month_index: month,
        overall_score: round_1dp((temp_score + rain_score + humidity_score) / 3.0),
        temperature: round_1dp(temp),
        rainfall: round_1dp(rain),
        humidity: round_dp(humidity, 0),
        sub_scores: SubScores {
            temperature: round_1dp(temp_score),
            rainfall: round_1dp(rain_score),
            humidity: round_1dp(humidity_score),
        },
    }
}

fn activity_suggestions(temp: f64, rain: f64) -> Vec<&'static str> {
    let mut activities = Vec::new();

    if temp > 25.0 {
        activities.extend(["🏊 Beach activities", "🍦 Ice cream tours", "🏛️ Indoor museums"]);
    } else if temp > 15.0 {
        activities.extend(["🚶 City walking tours", "🌳 Park visits", "📸 Photography"]);
    } else {
        activities.extend(["☕ Cafe hopping", "🏛️ Museums", "🎭 Theater shows"]);
    }

    if rain < 50.0 {
        activities.extend(["🥾 Hiking", "🚴 Cycling", "🏖️ Outdoor markets"]);
    } else if rain < 100.0 {
        activities.push("☂️ Light outdoor activities");
    } else {
        activities.extend(["🏢 Shopping malls", "🎬 Indoor entertainment"]);
    }

    activities.truncate(4);
    activities
}

fn recommendations(
    best: &MonthlyComfort,
    activities: &[&str],
    annual_mean_temp: f64,
) -> Vec<Recommendation> {
    let mut recs = vec![
        Recommendation::new(
            "🌟",
            "🌟 Best Month to Visit",
            format!(
                "{} has the best conditions with a score of {}/10",
                best.month, best.overall_score
            ),
        )
        .with_kind("best_time"),
        Recommendation::new("🎯", "🎯 Recommended Activities", activities.join(", "))
            .with_kind("activities"),
    ];

    if annual_mean_temp > HOT_CLIMATE_THRESHOLD_C {
        recs.push(
            Recommendation::new(
                "🔥",
                "🔥 Hot Climate Tip",
                "Pack light clothing and stay hydrated during your visit",
            )
            .with_kind("hot_climate"),
        );
    }

    recs
}

/// Present current weather the way the travel view shows it.
pub fn current_conditions(weather: &CurrentWeather) -> CurrentConditions {
    let icon = match weather.condition.as_str() {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" => "🌫️",
        _ => "🌍",
    };

    CurrentConditions {
        temperature: round_dp(weather.temperature_c, 0),
        description: weather.description.clone(),
        humidity: round_dp(weather.humidity_pct, 0),
        wind_speed: round_1dp(weather.wind_speed_ms),
        feels_like: round_dp(weather.feels_like_c, 0),
        icon: icon.to_string(),
        simulated: weather.simulated,
    }
}
