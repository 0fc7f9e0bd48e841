//! Core types shared by the resolver, the climate data sources and the analyzers.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Short English month names, indexed by zero-based month.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Coarse climate bucket used to shape synthetic series and seasonal risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegionClass {
    Coastal,
    Arid,
    Tropical,
    Moderate,
}

/// A resolved place. Immutable once produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Location {
    /// Place name (gazetteer name, geocoder display name, or the raw query)
    pub name: String,
    /// Country name
    pub country: String,
    /// State or region, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Latitude (WGS84), within [-90, 90]
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude (WGS84), within [-180, 180]
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Region class driving seasonal curves and risk bands
    pub region: RegionClass,
}

/// The four insight verticals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Travel,
    Agriculture,
    Solar,
    Risk,
}

impl Domain {
    #[cfg(test)]
    pub const ALL: [Domain; 4] = [
        Domain::Travel,
        Domain::Agriculture,
        Domain::Solar,
        Domain::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Travel => "travel",
            Domain::Agriculture => "agriculture",
            Domain::Solar => "solar",
            Domain::Risk => "risk",
        }
    }

    /// Parameters requested from the climate provider for this domain.
    pub fn parameters(&self) -> &'static [ClimateParameter] {
        use ClimateParameter::*;
        match self {
            Domain::Travel | Domain::Agriculture => &[Temperature, Precipitation, Humidity],
            Domain::Solar => &[SolarIrradiance, Temperature],
            Domain::Risk => &[Temperature, Precipitation, WindSpeed],
        }
    }

    /// Years of history requested from the climate provider.
    pub fn fetch_span_years(&self) -> u32 {
        match self {
            Domain::Travel => 5,
            Domain::Agriculture | Domain::Solar | Domain::Risk => 2,
        }
    }

    /// Years covered by a generated series when the provider is unavailable.
    pub fn synthetic_span_years(&self) -> u32 {
        match self {
            Domain::Travel => 5,
            Domain::Agriculture => 3,
            Domain::Solar | Domain::Risk => 2,
        }
    }

    /// How long an assembled insight stays in the result cache.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            Domain::Travel => Duration::hours(1),
            Domain::Agriculture => Duration::hours(2),
            Domain::Solar | Domain::Risk => Duration::hours(3),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical quantity in a climate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClimateParameter {
    /// Air temperature at 2 m, °C
    Temperature,
    /// Precipitation, mm/day
    Precipitation,
    /// Relative humidity at 2 m, %
    Humidity,
    /// All-sky surface shortwave irradiance, kWh/m²/day
    SolarIrradiance,
    /// Wind speed at 2 m, m/s
    WindSpeed,
}

impl ClimateParameter {
    /// NASA POWER parameter code.
    pub fn power_code(&self) -> &'static str {
        match self {
            ClimateParameter::Temperature => "T2M",
            ClimateParameter::Precipitation => "PRECTOTCORR",
            ClimateParameter::Humidity => "RH2M",
            ClimateParameter::SolarIrradiance => "ALLSKY_SFC_SW_DWN",
            ClimateParameter::WindSpeed => "WS2M",
        }
    }
}

impl fmt::Display for ClimateParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClimateParameter::Temperature => "temperature",
            ClimateParameter::Precipitation => "precipitation",
            ClimateParameter::Humidity => "humidity",
            ClimateParameter::SolarIrradiance => "solar irradiance",
            ClimateParameter::WindSpeed => "wind speed",
        };
        f.write_str(name)
    }
}

/// Values observed (or generated) for one day. Missing values are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateRecord {
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub solar_kwh_m2: Option<f64>,
    pub wind_speed_ms: Option<f64>,
}

impl ClimateRecord {
    pub fn get(&self, parameter: ClimateParameter) -> Option<f64> {
        match parameter {
            ClimateParameter::Temperature => self.temperature_c,
            ClimateParameter::Precipitation => self.precipitation_mm,
            ClimateParameter::Humidity => self.humidity_pct,
            ClimateParameter::SolarIrradiance => self.solar_kwh_m2,
            ClimateParameter::WindSpeed => self.wind_speed_ms,
        }
    }

    pub fn set(&mut self, parameter: ClimateParameter, value: f64) {
        let slot = match parameter {
            ClimateParameter::Temperature => &mut self.temperature_c,
            ClimateParameter::Precipitation => &mut self.precipitation_mm,
            ClimateParameter::Humidity => &mut self.humidity_pct,
            ClimateParameter::SolarIrradiance => &mut self.solar_kwh_m2,
            ClimateParameter::WindSpeed => &mut self.wind_speed_ms,
        };
        *slot = Some(value);
    }
}

/// A daily climate series for one location.
///
/// When `synthetic` is false, every date key lies inside the span that was
/// requested from the provider.
#[derive(Debug, Clone)]
pub struct ClimateSeries {
    pub parameters: Vec<ClimateParameter>,
    pub records: BTreeMap<NaiveDate, ClimateRecord>,
    pub synthetic: bool,
    pub span_years: u32,
}

impl ClimateSeries {
    pub fn data_points(&self) -> usize {
        self.records.len()
    }

    /// Fraction of the expected daily records that are present, capped at 1.
    pub fn coverage(&self) -> f64 {
        let expected = 365.0 * f64::from(self.span_years.max(1));
        (self.data_points() as f64 / expected).min(1.0)
    }

    /// Mean of `parameter` per calendar month (index 0 = January).
    /// `None` for months without a single finite value.
    pub fn monthly_means(&self, parameter: ClimateParameter) -> [Option<f64>; 12] {
        let mut sums = [0.0_f64; 12];
        let mut counts = [0_u32; 12];

        for (date, record) in &self.records {
            if let Some(value) = record.get(parameter).filter(|v| v.is_finite()) {
                let m = date.month0() as usize;
                sums[m] += value;
                counts[m] += 1;
            }
        }

        let mut means = [None; 12];
        for m in 0..12 {
            if counts[m] > 0 {
                means[m] = Some(sums[m] / f64::from(counts[m]));
            }
        }
        means
    }

    /// First and last calendar year present in the series.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let first = self.records.keys().next()?;
        let last = self.records.keys().next_back()?;
        Some((first.year(), last.year()))
    }
}

/// Days in a zero-based month of a non-leap year.
pub fn days_in_month(month0: usize) -> f64 {
    match month0 {
        1 => 28.0,
        3 | 5 | 8 | 10 => 30.0,
        _ => 31.0,
    }
}
