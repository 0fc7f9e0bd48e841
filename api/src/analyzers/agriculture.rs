//! Rice cultivation analysis for the Kharif season.

use serde::Serialize;
use utoipa::ToSchema;

use super::{monthly_values, scaled_confidence, AnalysisError, Recommendation};
use crate::helpers::{round_1dp, round_u32};
use crate::models::{days_in_month, ClimateParameter, ClimateSeries, Location, MONTH_NAMES};

const SYNTHETIC_CONFIDENCE: f64 = 85.0;
const CONFIDENCE_SCALE: f64 = 92.0;
const BASE_YIELD_SCORE: i32 = 70;
const DRY_MONTH_MM: f64 = 50.0;
const WET_MONTH_MM: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantingSchedule {
    pub planting: String,
    pub growth: String,
    pub harvest: String,
    pub market: String,
    pub suitability_score: u32,
}

impl PlantingSchedule {
    fn kharif() -> Self {
        Self {
            planting: "June - July".to_string(),
            growth: "August - September".to_string(),
            harvest: "October - November".to_string(),
            market: "November - December".to_string(),
            suitability_score: 78,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum YieldCategory {
    High,
    Medium,
    Low,
}

impl YieldCategory {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => YieldCategory::High,
            s if s >= 60 => YieldCategory::Medium,
            _ => YieldCategory::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YieldCategory::High => "High",
            YieldCategory::Medium => "Medium",
            YieldCategory::Low => "Low",
        }
    }

    pub fn estimated_yield(&self) -> &'static str {
        match self {
            YieldCategory::High => "5-7 tons/hectare",
            YieldCategory::Medium => "3-5 tons/hectare",
            YieldCategory::Low => "2-4 tons/hectare",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YieldFactors {
    pub temperature: u32,
    pub rainfall: u32,
    pub season_length: u32,
    pub soil_suitability: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YieldPotential {
    /// 30-100
    pub score: u32,
    pub category: YieldCategory,
    pub estimated_yield: String,
    pub factors: YieldFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CropRisk {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub level: String,
    pub probability: u32,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCropClimate {
    pub month: String,
    /// Mean temperature, °C, 1 dp
    pub avg_temp: f64,
    /// Rainfall over the month, mm
    pub total_rain: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgricultureAnalysis {
    pub planting_schedule: PlantingSchedule,
    pub yield_potential: YieldPotential,
    /// Never empty
    pub risks: Vec<CropRisk>,
    pub recommendations: Vec<Recommendation>,
    pub monthly_data: Vec<MonthlyCropClimate>,
    pub confidence_score: f64,
}

pub fn analyze(
    series: &ClimateSeries,
    _location: &Location,
) -> Result<AgricultureAnalysis, AnalysisError> {
    let temperatures = monthly_values(series, ClimateParameter::Temperature)?;
    let daily_rain = monthly_values(series, ClimateParameter::Precipitation)?;

    let monthly_data: Vec<MonthlyCropClimate> = (0..12)
        .map(|m| MonthlyCropClimate {
            month: MONTH_NAMES[m].to_string(),
            avg_temp: round_1dp(temperatures[m]),
            total_rain: round_u32(daily_rain[m] * days_in_month(m)),
        })
        .collect();

    let planting_schedule = PlantingSchedule::kharif();
    let yield_potential = yield_potential(&monthly_data);
    let risks = identify_risks(&monthly_data);
    let recommendations = recommendations(&planting_schedule, &yield_potential, &risks);

    Ok(AgricultureAnalysis {
        planting_schedule,
        yield_potential,
        risks,
        recommendations,
        monthly_data,
        confidence_score: scaled_confidence(series, SYNTHETIC_CONFIDENCE, CONFIDENCE_SCALE),
    })
}

/// Yield score from the annual mean temperature and annual rainfall.
pub fn yield_score(avg_temp: f64, total_rain: f64) -> u32 {
    let mut score = BASE_YIELD_SCORE;

    if (25.0..=32.0).contains(&avg_temp) {
        score += 20;
    } else if (20.0..=35.0).contains(&avg_temp) {
        score += 10;
    }

    if (1000.0..=2000.0).contains(&total_rain) {
        score += 10;
    } else if (500.0..=2500.0).contains(&total_rain) {
        score += 5;
    }

    score.clamp(30, 100) as u32
}

fn yield_potential(monthly: &[MonthlyCropClimate]) -> YieldPotential {
    let total_rain: f64 = monthly.iter().map(|m| f64::from(m.total_rain)).sum();
    let avg_temp = monthly.iter().map(|m| m.avg_temp).sum::<f64>() / 12.0;

    let score = yield_score(avg_temp, total_rain);
    let category = YieldCategory::from_score(score);

    YieldPotential {
        score,
        category,
        estimated_yield: category.estimated_yield().to_string(),
        factors: YieldFactors {
            temperature: round_u32((avg_temp / 35.0 * 100.0).min(100.0)),
            rainfall: round_u32((total_rain / 2000.0 * 100.0).min(100.0)),
            season_length: 75,
            soil_suitability: 80,
        },
    }
}

fn identify_risks(monthly: &[MonthlyCropClimate]) -> Vec<CropRisk> {
    let mut risks = Vec::new();

    let dry_months = monthly
        .iter()
        .filter(|m| f64::from(m.total_rain) < DRY_MONTH_MM)
        .count();
    if dry_months >= 3 {
        risks.push(CropRisk {
            kind: "drought".to_string(),
            description: "Extended periods of low rainfall may affect water availability for rice cultivation".to_string(),
            level: "High".to_string(),
            probability: 65,
            mitigation: "Implement drip irrigation and water conservation practices".to_string(),
        });
    }

    let wet_months = monthly
        .iter()
        .filter(|m| f64::from(m.total_rain) > WET_MONTH_MM)
        .count();
    if wet_months >= 2 {
        risks.push(CropRisk {
            kind: "flood".to_string(),
            description: "Heavy monsoon rainfall may cause flooding in paddy fields".to_string(),
            level: "Medium".to_string(),
            probability: 45,
            mitigation: "Improve drainage systems and consider raised bed cultivation".to_string(),
        });
    }

    if risks.is_empty() {
        risks.push(CropRisk {
            kind: "monsoon_variability".to_string(),
            description: "Typical monsoon variability may affect planting schedules".to_string(),
            level: "Low".to_string(),
            probability: 30,
            mitigation: "Monitor weather forecasts and adjust planting dates accordingly".to_string(),
        });
    }

    risks
}

fn recommendations(
    schedule: &PlantingSchedule,
    potential: &YieldPotential,
    risks: &[CropRisk],
) -> Vec<Recommendation> {
    let mut recs = vec![
        Recommendation::new(
            "🌱",
            "Optimal Planting Time",
            format!(
                "Start planting during {} for Kharif season rice cultivation",
                schedule.planting
            ),
        ),
        Recommendation::new(
            "🌾",
            "Expected Yield",
            format!(
                "{} yield potential: {} under optimal conditions",
                potential.category.as_str(),
                potential.estimated_yield
            ),
        ),
        Recommendation::new(
            "💧",
            "Water Management",
            "Maintain 2-5 cm standing water during vegetative stage for optimal growth",
        ),
    ];

    if let Some(primary) = risks.first() {
        recs.push(Recommendation::new(
            "🛡️",
            "Risk Management",
            format!("Primary risk: {}. {}", primary.kind, primary.mitigation),
        ));
    }

    recs
}
