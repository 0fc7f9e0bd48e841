//! Domain analyzers.
//!
//! Each analyzer turns a daily `ClimateSeries` into a domain analysis:
//! monthly aggregates, composite scores, a category and a list of
//! recommendations. Analyzers are pure and fail only on genuine data
//! problems, reported as `AnalysisError`.

pub mod agriculture;
pub mod risk;
pub mod solar;
pub mod travel;

use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::round_1dp;
use crate::models::{ClimateParameter, ClimateSeries, MONTH_NAMES};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("series was not built with {0}")]
    NotFetched(ClimateParameter),

    #[error("no {parameter} values for {month}")]
    MissingMonth {
        parameter: ClimateParameter,
        month: &'static str,
    },

    #[error("degenerate input: {0}")]
    Degenerate(String),
}

/// A single human-readable recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Recommendation {
    /// Machine-readable category, when the domain assigns one
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub emoji: String,
    pub title: String,
    pub content: String,
}

impl Recommendation {
    pub(crate) fn new(emoji: &str, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: None,
            emoji: emoji.to_string(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub(crate) fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }
}

/// Monthly means of `parameter`, failing if any calendar month has no value.
pub(crate) fn monthly_values(
    series: &ClimateSeries,
    parameter: ClimateParameter,
) -> Result<[f64; 12], AnalysisError> {
    if !series.parameters.contains(&parameter) {
        return Err(AnalysisError::NotFetched(parameter));
    }
    let means = series.monthly_means(parameter);
    let mut values = [0.0; 12];
    for (m, mean) in means.iter().enumerate() {
        values[m] = mean.ok_or(AnalysisError::MissingMonth {
            parameter,
            month: MONTH_NAMES[m],
        })?;
    }
    Ok(values)
}

/// Monthly means with a fallback for months without values.
pub(crate) fn monthly_values_or(
    series: &ClimateSeries,
    parameter: ClimateParameter,
    fallback: f64,
) -> [f64; 12] {
    series.monthly_means(parameter).map(|m| m.unwrap_or(fallback))
}

/// Fixed score for synthetic input, otherwise `scale × coverage` (1 dp).
pub(crate) fn scaled_confidence(series: &ClimateSeries, synthetic_score: f64, scale: f64) -> f64 {
    if series.synthetic {
        synthetic_score
    } else {
        round_1dp((scale * series.coverage()).clamp(0.0, 100.0))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::flat_year;
    use super::*;

    #[test]
    fn test_monthly_values_rejects_parameter_not_fetched() {
        let series = flat_year(&[(ClimateParameter::Temperature, [20.0; 12])]);
        let err = monthly_values(&series, ClimateParameter::SolarIrradiance).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NotFetched(ClimateParameter::SolarIrradiance)
        ));
    }

    #[test]
    fn test_monthly_values_reports_missing_month() {
        let mut series = flat_year(&[(ClimateParameter::Temperature, [20.0; 12])]);
        series
            .records
            .retain(|date, _| chrono::Datelike::month(date) != 3);

        let err = monthly_values(&series, ClimateParameter::Temperature).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingMonth { month: "Mar", .. }
        ));
    }

    #[test]
    fn test_scaled_confidence() {
        let mut series = flat_year(&[(ClimateParameter::Temperature, [20.0; 12])]);
        assert_eq!(scaled_confidence(&series, 85.0, 92.0), 92.0);
        series.synthetic = true;
        assert_eq!(scaled_confidence(&series, 85.0, 92.0), 85.0);
    }

    #[test]
    fn test_recommendation_serializes_kind_as_type() {
        let rec = Recommendation::new("🌟", "Title", "Body").with_kind("best_time");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "best_time");

        let plain = serde_json::to_value(Recommendation::new("💧", "T", "C")).unwrap();
        assert!(plain.get("type").is_none());
    }
}
