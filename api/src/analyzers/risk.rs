//! Climate-disaster risk assessment.
//!
//! Every month gets four sub-risks (heat, flood, storm, drought). Each sub-risk
//! lies in a seasonal band that depends on the region class; where inside the
//! band it lands is decided by that month's temperature, rainfall and wind.

use serde::Serialize;
use utoipa::ToSchema;

use super::{monthly_values, scaled_confidence, AnalysisError, Recommendation};
use crate::helpers::{mean, round_u32};
use crate::models::{ClimateParameter, ClimateSeries, Location, RegionClass, MONTH_NAMES};

const SYNTHETIC_CONFIDENCE: f64 = 85.0;
const CONFIDENCE_SCALE: f64 = 90.0;
/// Sub-risk at or above this counts as a high-risk month.
const HIGH_RISK_THRESHOLD: u32 = 60;
const PREPAREDNESS_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Heat,
    Flood,
    Storm,
    Drought,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// `≥60` High, `≥40` Medium, else Low.
pub fn month_risk_level(score: f64) -> RiskLevel {
    if score >= 60.0 {
        RiskLevel::High
    } else if score >= 40.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum OverallRiskLevel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "Low Risk")]
    Low,
}

impl OverallRiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            OverallRiskLevel::High => "High Risk",
            OverallRiskLevel::Moderate => "Moderate Risk",
            OverallRiskLevel::Low => "Low Risk",
        }
    }

    pub fn preparation(&self) -> &'static str {
        match self {
            OverallRiskLevel::High => {
                "Immediate precautions recommended. Monitor weather alerts regularly."
            }
            OverallRiskLevel::Moderate => {
                "Stay informed about weather forecasts. Basic preparedness advised."
            }
            OverallRiskLevel::Low => {
                "Standard safety measures sufficient. Enjoy your activities with normal precautions."
            }
        }
    }
}

/// Overall level from the mean monthly risk score.
pub fn classify_overall(mean_score: f64) -> OverallRiskLevel {
    if mean_score >= 60.0 {
        OverallRiskLevel::High
    } else if mean_score >= 40.0 {
        OverallRiskLevel::Moderate
    } else {
        OverallRiskLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SubRisks {
    pub heat: u32,
    pub flood: u32,
    pub storm: u32,
    pub drought: u32,
}

impl SubRisks {
    fn get(&self, hazard: Hazard) -> u32 {
        match hazard {
            Hazard::Heat => self.heat,
            Hazard::Flood => self.flood,
            Hazard::Storm => self.storm,
            Hazard::Drought => self.drought,
        }
    }

    /// Highest sub-risk; on a tie the later hazard in heat, flood, storm,
    /// drought order wins.
    fn primary(&self) -> Hazard {
        [Hazard::Flood, Hazard::Storm, Hazard::Drought]
            .into_iter()
            .fold(Hazard::Heat, |best, h| {
                if self.get(h) >= self.get(best) {
                    h
                } else {
                    best
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRisk {
    pub month: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub sub_risks: SubRisks,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisasterProbabilities {
    pub heatwave: u32,
    pub flood: u32,
    pub storm: u32,
    pub drought: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendSummary {
    pub trend: String,
    /// Change per year
    pub rate: f64,
    pub confidence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExtremeEvents {
    pub heatwaves: u32,
    pub floods: u32,
    pub droughts: u32,
    pub storms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClimateTrends {
    pub data_period: String,
    pub temperature: TrendSummary,
    pub rainfall: TrendSummary,
    pub extreme_events: ExtremeEvents,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskCalendarEntry {
    pub month: String,
    pub risk_level: RiskLevel,
    pub primary_risk: Hazard,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub overall_risk_level: OverallRiskLevel,
    /// Mean monthly risk score
    pub overall_risk_score: u32,
    pub disaster_probabilities: DisasterProbabilities,
    pub climate_trends: ClimateTrends,
    pub risk_calendar: Vec<RiskCalendarEntry>,
    pub monthly_risks: Vec<MonthlyRisk>,
    pub preparedness: Vec<Recommendation>,
    pub confidence_score: f64,
}

/// (base, width) per hazard, in heat, flood, storm, drought order.
type Bands = [(f64, f64); 4];

fn seasonal_bands(region: RegionClass, month0: usize) -> Bands {
    match region {
        RegionClass::Coastal if (5..=9).contains(&month0) => {
            [(30.0, 20.0), (70.0, 25.0), (60.0, 35.0), (10.0, 15.0)]
        }
        RegionClass::Coastal => [(40.0, 30.0), (20.0, 30.0), (30.0, 40.0), (20.0, 25.0)],
        RegionClass::Arid if (3..=6).contains(&month0) => {
            [(80.0, 15.0), (10.0, 20.0), (20.0, 30.0), (70.0, 25.0)]
        }
        RegionClass::Arid => [(50.0, 30.0), (15.0, 25.0), (25.0, 35.0), (40.0, 35.0)],
        RegionClass::Tropical if (5..=10).contains(&month0) => {
            [(35.0, 20.0), (65.0, 30.0), (55.0, 35.0), (10.0, 15.0)]
        }
        RegionClass::Tropical => [(45.0, 25.0), (25.0, 25.0), (30.0, 35.0), (20.0, 25.0)],
        RegionClass::Moderate if (5..=9).contains(&month0) => {
            [(40.0, 25.0), (60.0, 30.0), (50.0, 40.0), (20.0, 20.0)]
        }
        RegionClass::Moderate if (3..=5).contains(&month0) => {
            [(70.0, 25.0), (20.0, 25.0), (30.0, 35.0), (50.0, 30.0)]
        }
        RegionClass::Moderate => [(40.0, 30.0), (25.0, 30.0), (35.0, 40.0), (30.0, 25.0)],
    }
}

/// Regional weighting of disaster probabilities (heatwave, flood, storm, drought).
fn regional_factors(region: RegionClass) -> [f64; 4] {
    match region {
        RegionClass::Coastal => [0.8, 1.6, 1.4, 1.0],
        RegionClass::Arid => [1.3, 0.7, 1.0, 1.8],
        RegionClass::Tropical => [1.0, 1.4, 1.5, 1.0],
        RegionClass::Moderate => [1.0, 1.0, 1.0, 1.0],
    }
}

fn position(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn monthly_risk(region: RegionClass, month0: usize, temp: f64, rain: f64, wind: f64) -> MonthlyRisk {
    let bands = seasonal_bands(region, month0);
    let positions = [
        position((temp - 20.0) / 20.0),
        position(rain / 15.0),
        position((wind - 1.0) / 6.0),
        position(1.0 - rain / 5.0),
    ];
    let scores: Vec<f64> = bands
        .iter()
        .zip(positions)
        .map(|((base, width), p)| base + width * p)
        .collect();
    let total = mean(&scores);

    MonthlyRisk {
        month: MONTH_NAMES[month0].to_string(),
        risk_score: round_u32(total),
        risk_level: month_risk_level(total),
        sub_risks: SubRisks {
            heat: round_u32(scores[0]),
            flood: round_u32(scores[1]),
            storm: round_u32(scores[2]),
            drought: round_u32(scores[3]),
        },
    }
}

pub fn analyze(series: &ClimateSeries, location: &Location) -> Result<RiskAnalysis, AnalysisError> {
    let temperatures = monthly_values(series, ClimateParameter::Temperature)?;
    let rainfall = monthly_values(series, ClimateParameter::Precipitation)?;
    let wind = monthly_values(series, ClimateParameter::WindSpeed)?;

    let monthly_risks: Vec<MonthlyRisk> = (0..12)
        .map(|m| monthly_risk(location.region, m, temperatures[m], rainfall[m], wind[m]))
        .collect();

    let mean_score = mean(
        &monthly_risks
            .iter()
            .map(|m| f64::from(m.risk_score))
            .collect::<Vec<_>>(),
    );
    let overall = classify_overall(mean_score);
    let probabilities = disaster_probabilities(&monthly_risks, location.region);
    let climate_trends = climate_trends(series, &monthly_risks);
    let risk_calendar = monthly_risks
        .iter()
        .map(|m| RiskCalendarEntry {
            month: m.month.clone(),
            risk_level: m.risk_level,
            primary_risk: m.sub_risks.primary(),
        })
        .collect();
    let preparedness = preparedness(overall, &probabilities);

    Ok(RiskAnalysis {
        overall_risk_level: overall,
        overall_risk_score: round_u32(mean_score),
        disaster_probabilities: probabilities,
        climate_trends,
        risk_calendar,
        monthly_risks,
        preparedness,
        confidence_score: scaled_confidence(series, SYNTHETIC_CONFIDENCE, CONFIDENCE_SCALE),
    })
}

fn high_risk_months(monthly: &[MonthlyRisk], hazard: Hazard) -> usize {
    monthly
        .iter()
        .filter(|m| m.sub_risks.get(hazard) >= HIGH_RISK_THRESHOLD)
        .count()
}

fn disaster_probabilities(monthly: &[MonthlyRisk], region: RegionClass) -> DisasterProbabilities {
    let factors = regional_factors(region);
    let probability = |hazard: Hazard, factor: f64| {
        let base = high_risk_months(monthly, hazard) as f64 / 12.0 * 100.0;
        round_u32(base * factor).min(100)
    };

    DisasterProbabilities {
        heatwave: probability(Hazard::Heat, factors[0]),
        flood: probability(Hazard::Flood, factors[1]),
        storm: probability(Hazard::Storm, factors[2]),
        drought: probability(Hazard::Drought, factors[3]),
    }
}

fn climate_trends(series: &ClimateSeries, monthly: &[MonthlyRisk]) -> ClimateTrends {
    let data_period = match series.year_range() {
        Some((first, last)) => format!("{}-{}", first, last),
        None => "unknown".to_string(),
    };
    let years = series.span_years.max(1) as usize;
    let events = |hazard: Hazard| (high_risk_months(monthly, hazard) * years) as u32;

    ClimateTrends {
        data_period,
        temperature: TrendSummary {
            trend: "Increasing".to_string(),
            rate: 0.03,
            confidence: 95,
        },
        rainfall: TrendSummary {
            trend: "Variable".to_string(),
            rate: -1.2,
            confidence: 80,
        },
        extreme_events: ExtremeEvents {
            heatwaves: events(Hazard::Heat),
            floods: events(Hazard::Flood),
            droughts: events(Hazard::Drought),
            storms: events(Hazard::Storm),
        },
    }
}

fn preparedness(overall: OverallRiskLevel, probabilities: &DisasterProbabilities) -> Vec<Recommendation> {
    let mut recs = vec![Recommendation::new(
        "🚨",
        "Overall Risk Assessment",
        format!("{}: {}", overall.label(), overall.preparation()),
    )];

    let specific = [
        (
            probabilities.heatwave,
            "🔥",
            "Heatwave Preparedness",
            "Stay hydrated, avoid outdoor activities during peak heat hours, use cooling systems",
        ),
        (
            probabilities.flood,
            "🌊",
            "Flood Safety",
            "Know evacuation routes, avoid floodwaters, keep emergency supplies ready",
        ),
        (
            probabilities.storm,
            "⚡",
            "Storm Preparedness",
            "Secure outdoor items, prepare emergency kit, monitor weather alerts",
        ),
        (
            probabilities.drought,
            "🏜️",
            "Water Conservation",
            "Implement water-saving measures, monitor water levels, plan for shortages",
        ),
    ];
    for (probability, emoji, title, content) in specific {
        if probability >= PREPAREDNESS_THRESHOLD {
            recs.push(Recommendation::new(emoji, title, content));
        }
    }

    recs.push(Recommendation::new(
        "📱",
        "Stay Informed",
        "Download weather alert apps and monitor local forecasts regularly",
    ));
    recs
}
