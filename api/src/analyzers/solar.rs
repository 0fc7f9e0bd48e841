//! Rooftop solar potential and financial outlook.
//!
//! Irradiance figures are per kW of installed capacity. Money is computed
//! with `Decimal` for a fixed 3 kW reference system.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use super::{monthly_values, scaled_confidence, AnalysisError, Recommendation};
use crate::helpers::{dec_to_f64, f64_to_decimal, round_1dp, round_2dp, round_dp};
use crate::models::{ClimateParameter, ClimateSeries, Location, MONTH_NAMES};

const SYNTHETIC_CONFIDENCE: f64 = 88.0;
const CONFIDENCE_SCALE: f64 = 92.0;
const DAYS_PER_MONTH: f64 = 30.44;
const PERFORMANCE_RATIO: f64 = 0.85;
const HOURS_PER_YEAR: f64 = 24.0 * 365.0;
const SYSTEM_SIZE_KW: u32 = 3;
const COST_PER_KW_INR: i64 = 45_000;
const ELECTRICITY_RATE_INR: Decimal = Decimal::from_parts(65, 0, 0, false, 1);
const SYSTEM_LIFETIME_YEARS: i64 = 25;
const SUBSIDY_COUNTRY: &str = "India";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySolar {
    pub month: String,
    pub month_index: usize,
    /// kWh/m²/day
    pub daily_radiation: f64,
    /// kWh/m² over the month
    pub monthly_radiation: f64,
    pub avg_temperature: f64,
    /// Temperature derating, reported only
    pub efficiency_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum SolarPotential {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Moderate,
}

impl SolarPotential {
    pub fn from_daily_radiation(avg_daily: f64) -> Self {
        if avg_daily > 6.0 {
            SolarPotential::Excellent
        } else if avg_daily > 5.0 {
            SolarPotential::VeryGood
        } else if avg_daily > 4.0 {
            SolarPotential::Good
        } else {
            SolarPotential::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolarPotential::Excellent => "Excellent",
            SolarPotential::VeryGood => "Very Good",
            SolarPotential::Good => "Good",
            SolarPotential::Moderate => "Moderate",
        }
    }

    pub fn quality(&self) -> &'static str {
        match self {
            SolarPotential::Excellent => "Very High",
            SolarPotential::VeryGood => "High",
            SolarPotential::Good => "Medium",
            SolarPotential::Moderate => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnualPotential {
    pub total_radiation: f64,
    pub avg_daily_radiation: f64,
    /// kWh per kW installed
    pub annual_generation: f64,
    /// Percent
    pub capacity_factor: f64,
    pub potential: SolarPotential,
    pub quality: String,
    pub cost_reduction: String,
    pub peak_sun_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum InvestmentTier {
    #[serde(rename = "Highly Recommended")]
    HighlyRecommended,
    Recommended,
    #[serde(rename = "Moderately Recommended")]
    ModeratelyRecommended,
    #[serde(rename = "Consider Other Options")]
    ConsiderOtherOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    /// kW
    pub system_size: u32,
    pub total_cost: f64,
    pub subsidy_amount: f64,
    pub net_cost: f64,
    /// kWh per year for the whole system
    pub annual_generation: f64,
    pub annual_savings: f64,
    /// Years
    pub payback_period: f64,
    /// Lifetime return on the net cost, percent
    pub roi: f64,
    pub total_lifetime_savings: f64,
    pub net_profit: f64,
    pub recommendation: InvestmentTier,
    /// INR per kWh
    pub electricity_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarAnalysis {
    pub monthly_data: Vec<MonthlySolar>,
    pub annual_potential: AnnualPotential,
    pub financial_analysis: FinancialAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub confidence_score: f64,
}

pub fn analyze(series: &ClimateSeries, location: &Location) -> Result<SolarAnalysis, AnalysisError> {
    let irradiance = monthly_values(series, ClimateParameter::SolarIrradiance)?;
    let temperatures = monthly_values(series, ClimateParameter::Temperature)?;

    let monthly_data: Vec<MonthlySolar> = (0..12)
        .map(|m| MonthlySolar {
            month: MONTH_NAMES[m].to_string(),
            month_index: m,
            daily_radiation: round_2dp(irradiance[m]),
            monthly_radiation: round_2dp(irradiance[m] * DAYS_PER_MONTH),
            avg_temperature: round_1dp(temperatures[m]),
            efficiency_factor: round_2dp(efficiency_factor(temperatures[m])),
        })
        .collect();

    let annual_potential = annual_potential(&monthly_data);
    let subsidised = location.country == SUBSIDY_COUNTRY;
    let financial_analysis = financials(annual_potential.annual_generation, subsidised)?;
    let recommendations = recommendations(&annual_potential, &financial_analysis);

    Ok(SolarAnalysis {
        monthly_data,
        annual_potential,
        financial_analysis,
        recommendations,
        confidence_score: scaled_confidence(series, SYNTHETIC_CONFIDENCE, CONFIDENCE_SCALE),
    })
}

/// `max(0.75, 1 − max(0, T − 25) × 0.004)`
pub fn efficiency_factor(temperature_c: f64) -> f64 {
    (1.0 - (temperature_c - 25.0).max(0.0) * 0.004).max(0.75)
}

fn annual_potential(monthly: &[MonthlySolar]) -> AnnualPotential {
    let total_radiation: f64 = monthly.iter().map(|m| m.monthly_radiation).sum();
    let avg_daily = monthly.iter().map(|m| m.daily_radiation).sum::<f64>() / 12.0;
    let annual_generation = total_radiation * PERFORMANCE_RATIO;
    let capacity_factor = annual_generation / HOURS_PER_YEAR * 100.0;
    let potential = SolarPotential::from_daily_radiation(avg_daily);

    AnnualPotential {
        total_radiation: round_dp(total_radiation, 0),
        avg_daily_radiation: round_2dp(avg_daily),
        annual_generation: round_dp(annual_generation, 0),
        capacity_factor: round_2dp(capacity_factor),
        potential,
        quality: potential.quality().to_string(),
        cost_reduction: "20-40%".to_string(),
        peak_sun_hours: round_2dp(avg_daily),
    }
}

/// Investment tier from payback (years) and lifetime ROI (percent).
pub fn recommendation_tier(payback_years: Decimal, roi_pct: Decimal) -> InvestmentTier {
    if payback_years <= Decimal::from(4) && roi_pct >= Decimal::from(20) {
        InvestmentTier::HighlyRecommended
    } else if payback_years <= Decimal::from(6) && roi_pct >= Decimal::from(15) {
        InvestmentTier::Recommended
    } else if payback_years <= Decimal::from(8) && roi_pct >= Decimal::from(10) {
        InvestmentTier::ModeratelyRecommended
    } else {
        InvestmentTier::ConsiderOtherOptions
    }
}

fn subsidy_rate(system_size_kw: u32) -> Decimal {
    if system_size_kw <= 3 {
        Decimal::new(40, 2)
    } else {
        Decimal::new(20, 2)
    }
}

fn round_money(d: Decimal, dp: u32) -> f64 {
    dec_to_f64(d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}

/// Reference-system economics from per-kW annual generation.
fn financials(generation_per_kw: f64, subsidised: bool) -> Result<FinancialAnalysis, AnalysisError> {
    let size = Decimal::from(SYSTEM_SIZE_KW);
    let total_cost = size * Decimal::from(COST_PER_KW_INR);
    let subsidy = if subsidised {
        total_cost * subsidy_rate(SYSTEM_SIZE_KW)
    } else {
        Decimal::ZERO
    };
    let net_cost = total_cost - subsidy;

    let annual_generation = f64_to_decimal(generation_per_kw) * size;
    let annual_savings = annual_generation * ELECTRICITY_RATE_INR;
    if annual_savings <= Decimal::ZERO {
        return Err(AnalysisError::Degenerate(format!(
            "annual savings of {} INR",
            annual_savings
        )));
    }

    let payback = net_cost
        .checked_div(annual_savings)
        .ok_or_else(|| AnalysisError::Degenerate("payback overflow".to_string()))?;
    let lifetime_savings = annual_savings * Decimal::from(SYSTEM_LIFETIME_YEARS);
    let net_profit = lifetime_savings - net_cost;
    let roi = net_profit
        .checked_div(net_cost)
        .map(|r| r * Decimal::ONE_HUNDRED)
        .ok_or_else(|| AnalysisError::Degenerate("zero net cost".to_string()))?;

    Ok(FinancialAnalysis {
        system_size: SYSTEM_SIZE_KW,
        total_cost: round_money(total_cost, 0),
        subsidy_amount: round_money(subsidy, 0),
        net_cost: round_money(net_cost, 0),
        annual_generation: round_money(annual_generation, 0),
        annual_savings: round_money(annual_savings, 0),
        payback_period: round_money(payback, 1),
        roi: round_money(roi, 1),
        total_lifetime_savings: round_money(lifetime_savings, 0),
        net_profit: round_money(net_profit, 0),
        recommendation: recommendation_tier(payback, roi),
        electricity_rate: dec_to_f64(ELECTRICITY_RATE_INR),
    })
}

/// `1234567` → `"1,234,567"`
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn recommendations(potential: &AnnualPotential, finance: &FinancialAnalysis) -> Vec<Recommendation> {
    let mut recs = vec![
        Recommendation::new(
            "☀️",
            "Solar Resource Quality",
            format!(
                "{} potential with {} kWh/m²/day daily radiation",
                potential.potential.as_str(),
                potential.avg_daily_radiation
            ),
        ),
        Recommendation::new(
            "⚡",
            "Energy Production",
            format!(
                "Estimated {} kWh per year for a {}kW system",
                group_thousands(potential.annual_generation),
                finance.system_size
            ),
        ),
        Recommendation::new(
            "💰",
            "Financial Outlook",
            format!(
                "Payback period: {} years | ROI: {}% over {} years",
                finance.payback_period, finance.roi, SYSTEM_LIFETIME_YEARS
            ),
        ),
    ];

    if finance.subsidy_amount > 0.0 {
        let pct = round_dp(finance.subsidy_amount / finance.total_cost * 100.0, 0);
        recs.push(Recommendation::new(
            "🏛️",
            "Government Support",
            format!(
                "Eligible for {}% subsidy - ₹{}",
                pct,
                group_thousands(finance.subsidy_amount)
            ),
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::flat_year;
    use crate::services::gazetteer;

    fn analyze_flat(daily: f64, temp: f64, location: &Location) -> SolarAnalysis {
        let series = flat_year(&[
            (ClimateParameter::SolarIrradiance, [daily; 12]),
            (ClimateParameter::Temperature, [temp; 12]),
        ]);
        analyze(&series, location).unwrap()
    }

    #[test]
    fn test_recommendation_tier_thresholds() {
        let d = |v: i64| Decimal::from(v);
        assert_eq!(recommendation_tier(d(3), d(25)), InvestmentTier::HighlyRecommended);
        assert_eq!(recommendation_tier(d(5), d(25)), InvestmentTier::Recommended);
        assert_eq!(recommendation_tier(d(7), d(12)), InvestmentTier::ModeratelyRecommended);
        assert_eq!(recommendation_tier(d(9), d(12)), InvestmentTier::ConsiderOtherOptions);
        assert_eq!(recommendation_tier(d(3), d(5)), InvestmentTier::ConsiderOtherOptions);
    }

    #[test]
    fn test_tier_serializes_to_label() {
        let json = serde_json::to_value(InvestmentTier::ConsiderOtherOptions).unwrap();
        assert_eq!(json, "Consider Other Options");
    }

    #[test]
    fn test_efficiency_factor() {
        assert_eq!(efficiency_factor(20.0), 1.0);
        assert!((efficiency_factor(35.0) - 0.96).abs() < 1e-12);
        assert_eq!(efficiency_factor(200.0), 0.75);
    }

    #[test]
    fn test_potential_tiers() {
        assert_eq!(SolarPotential::from_daily_radiation(6.2), SolarPotential::Excellent);
        assert_eq!(SolarPotential::from_daily_radiation(6.0), SolarPotential::VeryGood);
        assert_eq!(SolarPotential::from_daily_radiation(4.5), SolarPotential::Good);
        assert_eq!(SolarPotential::from_daily_radiation(3.0), SolarPotential::Moderate);
    }

    #[test]
    fn test_indian_location_gets_subsidy() {
        let analysis = analyze_flat(5.5, 28.0, &gazetteer::resolve("Delhi"));
        let finance = &analysis.financial_analysis;

        assert_eq!(finance.total_cost, 135000.0);
        assert_eq!(finance.subsidy_amount, 54000.0);
        assert_eq!(finance.net_cost, 81000.0);
        assert_eq!(analysis.annual_potential.potential, SolarPotential::VeryGood);
        // 5.5 × 30.44 × 12 × 0.85 ≈ 1708 kWh per kW
        assert_eq!(analysis.annual_potential.annual_generation, 1708.0);
        assert_eq!(finance.annual_generation, 5124.0);
        assert_eq!(finance.annual_savings, 33306.0);
        assert_eq!(finance.payback_period, 2.4);
        assert_eq!(finance.recommendation, InvestmentTier::HighlyRecommended);

        let titles: Vec<&str> = analysis.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Solar Resource Quality", "Energy Production", "Financial Outlook", "Government Support"]
        );
        assert_eq!(analysis.recommendations[3].content, "Eligible for 40% subsidy - ₹54,000");
    }

    #[test]
    fn test_no_subsidy_outside_india() {
        let mut location = gazetteer::resolve("Delhi");
        location.country = "Nepal".to_string();
        let analysis = analyze_flat(5.5, 28.0, &location);
        assert_eq!(analysis.financial_analysis.subsidy_amount, 0.0);
        assert_eq!(analysis.recommendations.len(), 3);
    }

    #[test]
    fn test_zero_irradiance_is_degenerate() {
        let series = flat_year(&[
            (ClimateParameter::SolarIrradiance, [0.0; 12]),
            (ClimateParameter::Temperature, [25.0; 12]),
        ]);
        let err = analyze(&series, &gazetteer::resolve("Delhi")).unwrap_err();
        assert!(matches!(err, AnalysisError::Degenerate(_)));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1708.0), "1,708");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
    }
}
