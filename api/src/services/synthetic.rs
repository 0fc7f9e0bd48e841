//! Region-shaped synthetic climate series.
//!
//! Used whenever the climate provider cannot deliver a usable series, and
//! as the input for default analyses. Output is plausible rather than
//! accurate: seasonal temperature follows a sine over the year, rain is
//! concentrated in the monsoon months, and every value carries some noise.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::Mutex;

use crate::models::{ClimateParameter, ClimateRecord, ClimateSeries, Domain, RegionClass};
use crate::services::weather::CurrentWeather;

/// Seasonal shape of one region class.
struct RegionProfile {
    base_temp_c: f64,
    temp_amplitude_c: f64,
    monsoon_rain_chance: f64,
    monsoon_rain_max_mm: f64,
    dry_rain_chance: f64,
    dry_rain_max_mm: f64,
    humidity_offset_pct: f64,
    monsoon_wind_boost_ms: f64,
    /// (peak, monsoon, rest of year) irradiance ranges, kWh/m²/day
    solar_bands: [(f64, f64); 3],
}

fn profile(region: RegionClass) -> RegionProfile {
    match region {
        RegionClass::Coastal => RegionProfile {
            base_temp_c: 27.0,
            temp_amplitude_c: 4.0,
            monsoon_rain_chance: 0.7,
            monsoon_rain_max_mm: 30.0,
            dry_rain_chance: 0.1,
            dry_rain_max_mm: 20.0,
            humidity_offset_pct: 10.0,
            monsoon_wind_boost_ms: 2.0,
            solar_bands: [(5.5, 6.5), (4.0, 5.0), (5.0, 5.8)],
        },
        RegionClass::Arid => RegionProfile {
            base_temp_c: 26.0,
            temp_amplitude_c: 10.0,
            monsoon_rain_chance: 0.3,
            monsoon_rain_max_mm: 12.0,
            dry_rain_chance: 0.05,
            dry_rain_max_mm: 8.0,
            humidity_offset_pct: -25.0,
            monsoon_wind_boost_ms: 0.0,
            solar_bands: [(6.5, 7.5), (5.0, 6.0), (5.8, 6.6)],
        },
        RegionClass::Tropical => RegionProfile {
            base_temp_c: 27.0,
            temp_amplitude_c: 3.0,
            monsoon_rain_chance: 0.65,
            monsoon_rain_max_mm: 24.0,
            dry_rain_chance: 0.15,
            dry_rain_max_mm: 16.0,
            humidity_offset_pct: 10.0,
            monsoon_wind_boost_ms: 2.0,
            solar_bands: [(5.5, 6.5), (4.0, 5.0), (5.0, 5.8)],
        },
        RegionClass::Moderate => RegionProfile {
            base_temp_c: 25.0,
            temp_amplitude_c: 8.0,
            monsoon_rain_chance: 0.6,
            monsoon_rain_max_mm: 20.0,
            dry_rain_chance: 0.1,
            dry_rain_max_mm: 20.0,
            humidity_offset_pct: 0.0,
            monsoon_wind_boost_ms: 0.0,
            solar_bands: [(6.0, 7.0), (4.5, 5.5), (5.5, 6.3)],
        },
    }
}

/// June through September, zero-based.
pub(crate) fn is_monsoon_month(month0: u32) -> bool {
    (5..=8).contains(&month0)
}

/// Generates synthetic series from a shared RNG.
///
/// A fixed seed makes output reproducible; otherwise the RNG is seeded from
/// OS entropy.
pub struct SyntheticGenerator {
    rng: Mutex<StdRng>,
}

impl SyntheticGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Series for `domain`, ending today, covering its synthetic span.
    pub fn generate(&self, region: RegionClass, domain: Domain) -> ClimateSeries {
        self.generate_ending(
            region,
            domain.parameters(),
            domain.synthetic_span_years(),
            Utc::now().date_naive(),
        )
    }

    /// Exactly `365 * span_years` consecutive daily records ending at `end`.
    pub fn generate_ending(
        &self,
        region: RegionClass,
        parameters: &[ClimateParameter],
        span_years: u32,
        end: NaiveDate,
    ) -> ClimateSeries {
        let profile = profile(region);
        let days = 365 * i64::from(span_years.max(1));
        let start = end - Duration::days(days - 1);

        // A poisoned lock only means another request panicked mid-draw.
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());

        let mut records = BTreeMap::new();
        for offset in 0..days {
            let date = start + Duration::days(offset);
            let month0 = date.month0();
            let mut record = ClimateRecord::default();
            for &parameter in parameters {
                let value = sample(&mut *rng, &profile, parameter, month0);
                record.set(parameter, value);
            }
            records.insert(date, record);
        }

        tracing::debug!(
            "Generated {} synthetic days ({:?}, {} years)",
            records.len(),
            region,
            span_years
        );

        ClimateSeries {
            parameters: parameters.to_vec(),
            records,
            synthetic: true,
            span_years: span_years.max(1),
        }
    }

    /// Stand-in for observed current conditions.
    pub fn simulated_conditions(&self) -> CurrentWeather {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        CurrentWeather {
            temperature_c: 25.0 + rng.random_range(-5.0..5.0),
            feels_like_c: 25.0 + rng.random_range(-5.0..5.0),
            humidity_pct: 60.0 + rng.random_range(0.0..20.0),
            wind_speed_ms: 2.0 + rng.random_range(0.0..5.0),
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            simulated: true,
        }
    }
}

fn sample<R: Rng>(
    rng: &mut R,
    profile: &RegionProfile,
    parameter: ClimateParameter,
    month0: u32,
) -> f64 {
    let monsoon = is_monsoon_month(month0);
    match parameter {
        ClimateParameter::Temperature => {
            let seasonal = ((f64::from(month0) - 6.0) * PI / 6.0).sin();
            profile.base_temp_c + profile.temp_amplitude_c * seasonal + rng.random_range(-3.0..3.0)
        }
        ClimateParameter::Precipitation => {
            let (chance, max) = if monsoon {
                (profile.monsoon_rain_chance, profile.monsoon_rain_max_mm)
            } else {
                (profile.dry_rain_chance, profile.dry_rain_max_mm)
            };
            if rng.random_bool(chance) {
                rng.random_range(0.0..max)
            } else {
                0.0
            }
        }
        ClimateParameter::Humidity => {
            (60.0 + rng.random_range(0.0..20.0) + profile.humidity_offset_pct).clamp(5.0, 100.0)
        }
        ClimateParameter::SolarIrradiance => {
            let (lo, hi) = match month0 {
                2..=5 => profile.solar_bands[0],
                6..=8 => profile.solar_bands[1],
                _ => profile.solar_bands[2],
            };
            rng.random_range(lo..hi)
        }
        ClimateParameter::WindSpeed => {
            let boost = if monsoon {
                profile.monsoon_wind_boost_ms
            } else {
                0.0
            };
            2.0 + rng.random_range(0.0..5.0) + boost
        }
    }
}
