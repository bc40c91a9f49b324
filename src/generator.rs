//! Synthetic per-city metric series.
//!
//! Values follow `base(tier) + trend(year) + shock(year) + noise`, clamped to the
//! metric's valid range. Structure is fixed by the inputs (every city in every
//! year); magnitudes come from the injected RNG, so a seeded RNG reproduces a
//! series exactly.

use rand::Rng;
use std::f64::consts::PI;
use thiserror::Error;

use crate::cities::City;
use crate::logging::{log_series_generated, ProfileScope};
use crate::metric::{MetricKey, UnknownMetric};
use crate::series::{MetricSeries, YearSnapshot};

/// Reference year for all per-year trend terms.
pub const BASE_YEAR: i32 = 2019;

pub const DEFAULT_YEARS: [i32; 6] = [2019, 2020, 2021, 2022, 2023, 2024];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),
    #[error("invalid year range: {0}")]
    InvalidYearRange(String),
}

/// Years must be non-empty, ascending and contiguous.
pub fn validate_years(years: &[i32]) -> Result<(), GenerateError> {
    if years.is_empty() {
        return Err(GenerateError::InvalidYearRange("no years given".to_string()));
    }
    for pair in years.windows(2) {
        if pair[0].checked_add(1) != Some(pair[1]) {
            return Err(GenerateError::InvalidYearRange(format!(
                "{} does not directly follow {}",
                pair[1], pair[0]
            )));
        }
    }
    Ok(())
}

pub fn year_range(start: i32, end: i32) -> Vec<i32> {
    (start..=end).collect()
}

/// Deterministic part of a value: everything except the noise term, unclamped.
pub fn expected_value(metric: MetricKey, city: &City, year: i32) -> f64 {
    let elapsed = (year - BASE_YEAR) as f64;
    match metric {
        MetricKey::GdpGrowth => {
            let shock = match year {
                2020 => -4.0,
                2021 => -1.0,
                _ => 0.0,
            };
            city.tier.pick([7.5, 6.8, 6.2]) + shock
        }
        MetricKey::Population => city.population * 1.02_f64.powf(elapsed),
        MetricKey::LiteracyRate => city.tier.pick([88.0, 82.0, 78.0]) + elapsed * 0.8,
        MetricKey::AirQuality => {
            let seasonal = (elapsed * PI).sin() * 20.0;
            city.tier.pick([180.0, 140.0, 120.0]) - elapsed * 5.0 + seasonal
        }
        MetricKey::HealthcareIndex => {
            let shock = match year {
                2020 => -5.0,
                2021 => -2.0,
                _ => 0.0,
            };
            city.tier.pick([72.0, 65.0, 58.0]) + elapsed * 1.5 + shock
        }
        MetricKey::DigitalAdoption => {
            let boost = if year >= 2020 { 10.0 } else { 0.0 };
            city.tier.pick([45.0, 35.0, 25.0]) + elapsed * 8.0 + boost
        }
    }
}

fn noise<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}

/// Builds one metric series over `cities` x `years`.
pub fn generate_series<R: Rng>(
    metric_key: &str,
    cities: &[City],
    years: &[i32],
    rng: &mut R,
) -> Result<MetricSeries, GenerateError> {
    let metric: MetricKey = metric_key.parse()?;
    generate_metric(metric, cities, years, rng)
}

pub fn generate_metric<R: Rng>(
    metric: MetricKey,
    cities: &[City],
    years: &[i32],
    rng: &mut R,
) -> Result<MetricSeries, GenerateError> {
    validate_years(years)?;
    let _scope = ProfileScope::new("generator", "generate_metric");
    let desc = metric.descriptor();

    let snapshots = years
        .iter()
        .map(|&year| {
            let mut snap = YearSnapshot::new(year);
            for city in cities {
                let raw = expected_value(metric, city, year) + noise(rng, desc.noise);
                snap.insert(&city.name, desc.range.clamp(raw));
            }
            snap
        })
        .collect();

    let series = MetricSeries::new(metric, snapshots);
    log_series_generated(metric.as_str(), cities.len(), years, &series.fingerprint());
    Ok(series)
}

/// All six metrics, in descriptor-table order.
pub fn generate_all<R: Rng>(
    cities: &[City],
    years: &[i32],
    rng: &mut R,
) -> Result<Vec<MetricSeries>, GenerateError> {
    MetricKey::ALL
        .iter()
        .map(|&metric| generate_metric(metric, cities, years, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{registry, Tier};
    use rand::{rngs::StdRng, SeedableRng};

    fn city(name: &str, tier: Tier, population: f64) -> City {
        City::new(name, name, "Test", population, (0.0, 0.0), tier)
    }

    #[test]
    fn test_validate_years() {
        assert!(validate_years(&[2019, 2020, 2021]).is_ok());
        assert!(validate_years(&[2024]).is_ok());
        assert!(matches!(validate_years(&[]), Err(GenerateError::InvalidYearRange(_))));
        assert!(validate_years(&[2020, 2019]).is_err());
        assert!(validate_years(&[2019, 2019]).is_err());
        assert!(validate_years(&[2019, 2021]).is_err());
        assert!(matches!(
            validate_years(&[i32::MAX, 1]),
            Err(GenerateError::InvalidYearRange(_))
        ));
        assert!(validate_years(&[i32::MAX - 1, i32::MAX]).is_ok());
    }

    #[test]
    fn test_unknown_metric() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_series("employment_rate", &registry(), &DEFAULT_YEARS, &mut rng).unwrap_err();
        assert_eq!(err, GenerateError::UnknownMetric(UnknownMetric("employment_rate".into())));
    }

    #[test]
    fn test_population_is_exact_compound_growth() {
        let cities = vec![city("A", Tier::One, 10.0)];
        let mut rng = StdRng::seed_from_u64(7);
        let series = generate_series("population", &cities, &[2019, 2020, 2021], &mut rng).unwrap();
        assert_eq!(series.year(2019).unwrap().get("A"), Some(10.0));
        let y2021 = series.year(2021).unwrap().get("A").unwrap();
        assert!((y2021 - 10.0 * 1.02 * 1.02).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let cities = registry();
        let a = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a[0].fingerprint(), c[0].fingerprint());
    }

    #[test]
    fn test_noise_stays_within_width() {
        let cities = registry();
        let mut rng = StdRng::seed_from_u64(9);
        let series = generate_metric(MetricKey::LiteracyRate, &cities, &[2019], &mut rng).unwrap();
        for c in &cities {
            let v = series.latest().unwrap().get(&c.name).unwrap();
            let expected = expected_value(MetricKey::LiteracyRate, c, 2019);
            assert!((v - expected).abs() <= 2.0 + 1e-9, "{} drifted: {}", c.name, v);
        }
    }

    #[test]
    fn test_digital_adoption_boost_from_2020() {
        let a = city("A", Tier::Two, 1.0);
        let d2019 = expected_value(MetricKey::DigitalAdoption, &a, 2019);
        let d2020 = expected_value(MetricKey::DigitalAdoption, &a, 2020);
        assert!((d2020 - d2019 - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_hold_for_late_years() {
        // Far-future years push literacy and digital adoption past 100.
        let cities = registry();
        let years = year_range(2030, 2035);
        let mut rng = StdRng::seed_from_u64(3);
        for series in generate_all(&cities, &years, &mut rng).unwrap() {
            let range = series.metric.descriptor().range;
            for snap in &series.snapshots {
                assert!(snap.values.iter().all(|cv| range.contains(cv.value)));
            }
        }
    }
}
