//! End-to-end properties of generated series over the full city registry.

use rand::{rngs::StdRng, SeedableRng};

use bharatvikas::cities::{registry, City, Tier};
use bharatvikas::generator::{expected_value, generate_all, generate_series, DEFAULT_YEARS};
use bharatvikas::metric::MetricKey;

fn trio() -> Vec<City> {
    vec![
        City::new("a", "A", "S1", 10.0, (72.8, 19.0), Tier::One),
        City::new("b", "B", "S2", 4.0, (77.6, 12.9), Tier::Two),
        City::new("c", "C", "S3", 1.5, (75.8, 26.9), Tier::Three),
    ]
}

#[test]
fn population_is_reported_in_millions() {
    let mut rng = StdRng::seed_from_u64(2);
    let series = generate_series("population", &trio(), &[2019, 2020], &mut rng).unwrap();
    let a = series.year(2020).unwrap().get("A").unwrap();
    assert!((a - 10.2).abs() < 1e-9, "{}", a);
    assert_eq!(series.year(2019).unwrap().get("C"), Some(1.5));
}

#[test]
fn every_city_every_year_every_metric() {
    let cities = registry();
    let mut rng = StdRng::seed_from_u64(11);
    let all = generate_all(&cities, &DEFAULT_YEARS, &mut rng).unwrap();
    assert_eq!(all.len(), MetricKey::ALL.len());
    for series in &all {
        assert_eq!(series.years(), DEFAULT_YEARS.to_vec());
        assert!(series.covers(&cities), "{} misses a city", series.metric);
    }
}

#[test]
fn values_respect_metric_ranges() {
    let cities = registry();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        for series in generate_all(&cities, &DEFAULT_YEARS, &mut rng).unwrap() {
            let desc = series.metric.descriptor();
            for snap in &series.snapshots {
                for cv in &snap.values {
                    assert!(desc.range.contains(cv.value), "{} {} = {}", series.metric, cv.city, cv.value);
                }
            }
        }
    }
}

#[test]
fn gdp_pandemic_shock_is_about_four_points() {
    let cities = trio();
    let years = [2019, 2020];
    let mut total_gap = 0.0;
    let runs = 200;
    for seed in 0..runs {
        let mut rng = StdRng::seed_from_u64(seed);
        let series = generate_series("gdp_growth", &cities, &years, &mut rng).unwrap();
        let snap = series.year(2020).unwrap();
        for city in &cities {
            let value = snap.get(&city.name).unwrap();
            assert!(value >= 0.0);
            let no_shock = expected_value(MetricKey::GdpGrowth, city, 2020) + 4.0;
            total_gap += no_shock - value;
        }
    }
    let mean_gap = total_gap / (runs as f64 * cities.len() as f64);
    assert!((mean_gap - 4.0).abs() < 0.3, "mean gap {}", mean_gap);
}

#[test]
fn same_seed_same_fingerprint() {
    let cities = registry();
    let a = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(5)).unwrap();
    let c = generate_all(&cities, &DEFAULT_YEARS, &mut StdRng::seed_from_u64(6)).unwrap();
    assert_eq!(a[0].fingerprint(), b[0].fingerprint());
    assert_ne!(a[0].fingerprint(), c[0].fingerprint());
}

#[test]
fn bad_inputs_are_rejected() {
    let cities = trio();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(generate_series("gdp", &cities, &DEFAULT_YEARS, &mut rng).is_err());
    assert!(generate_series("gdp_growth", &cities, &[], &mut rng).is_err());
    assert!(generate_series("gdp_growth", &cities, &[2019, 2021], &mut rng).is_err());
}
