//! Polarity-aware rankings and comparisons over a [`MetricSeries`].
//!
//! Every ordering here consults [`MetricDescriptor::polarity`]; call sites never
//! special-case a metric key. Sorting is stable, so equal values keep the order
//! they have in the snapshot (registry order).

use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::metric::{MetricDescriptor, Polarity};
use crate::series::{CityValue, MetricSeries};

/// Number of entries shown in a ranking table.
pub const RANKING_DISPLAY_LIMIT: usize = 10;

/// Largest selection the comparison view is designed for.
pub const MAX_COMPARED_CITIES: usize = 6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    #[error("city '{city}' has no value in the {year} snapshot")]
    MissingCityInSelection { city: String, year: i32 },
}

/// What `compare_selected` does with a selected city absent from the latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCityPolicy {
    /// Report the city with value 0. Legacy dashboard behaviour; it cannot be told
    /// apart from a real zero.
    #[default]
    SubstituteZero,
    /// Leave the city out of the result.
    Skip,
    /// Fail with [`RankingError::MissingCityInSelection`].
    Reject,
}

impl FromStr for MissingCityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" | "substitute_zero" => Ok(MissingCityPolicy::SubstituteZero),
            "skip" => Ok(MissingCityPolicy::Skip),
            "reject" => Ok(MissingCityPolicy::Reject),
            other => Err(format!("unknown missing-city policy '{}'", other)),
        }
    }
}

fn by_polarity(polarity: Polarity) -> impl Fn(&CityValue, &CityValue) -> Ordering {
    move |a, b| match polarity {
        Polarity::LowerIsBetter => a.value.total_cmp(&b.value),
        Polarity::HigherIsBetter => b.value.total_cmp(&a.value),
    }
}

/// Stable in-place sort, best first.
pub fn sort_by_polarity(values: &mut [CityValue], descriptor: &MetricDescriptor) {
    values.sort_by(by_polarity(descriptor.polarity));
}

/// Every city of the latest snapshot, best first. Untruncated.
pub fn rank_all(series: &MetricSeries, descriptor: &MetricDescriptor) -> Vec<CityValue> {
    let mut ranked = series
        .latest()
        .map(|snap| snap.values.clone())
        .unwrap_or_default();
    sort_by_polarity(&mut ranked, descriptor);
    ranked
}

pub fn top_n(ranking: &[CityValue], n: usize) -> &[CityValue] {
    &ranking[..ranking.len().min(n)]
}

/// 1-based position of `city` in a ranking.
pub fn rank_position(ranking: &[CityValue], city: &str) -> Option<usize> {
    ranking.iter().position(|cv| cv.city == city).map(|i| i + 1)
}

/// Selected cities from the latest snapshot, best first. Selection size is not capped.
pub fn compare_selected(
    series: &MetricSeries,
    descriptor: &MetricDescriptor,
    selected: &[&str],
    policy: MissingCityPolicy,
) -> Result<Vec<CityValue>, RankingError> {
    let latest = series.latest();
    let year = latest.map(|s| s.year).unwrap_or_default();
    let mut out = Vec::with_capacity(selected.len());

    for &name in selected {
        match latest.and_then(|snap| snap.get(name)) {
            Some(value) => out.push(CityValue::new(name, value)),
            None => {
                log(
                    Level::Warn,
                    Domain::Ranking,
                    "missing_city",
                    obj(&[
                        ("city", v_str(name)),
                        ("metric", v_str(series.metric.as_str())),
                        ("policy", v_str(&format!("{:?}", policy))),
                    ]),
                );
                match policy {
                    MissingCityPolicy::SubstituteZero => out.push(CityValue::new(name, 0.0)),
                    MissingCityPolicy::Skip => {}
                    MissingCityPolicy::Reject => {
                        return Err(RankingError::MissingCityInSelection {
                            city: name.to_string(),
                            year,
                        })
                    }
                }
            }
        }
    }

    sort_by_polarity(&mut out, descriptor);
    Ok(out)
}

/// Percentage change between the city's first and last usable values.
///
/// Zero, NaN and missing entries are not usable. With fewer than two usable
/// values the trend is 0.
pub fn growth_trend(series: &MetricSeries, city: &str) -> f64 {
    let usable: Vec<f64> = series
        .values_for(city)
        .into_iter()
        .flatten()
        .filter(|v| *v != 0.0 && !v.is_nan())
        .collect();

    match (usable.first(), usable.last()) {
        (Some(&first), Some(&last)) if usable.len() >= 2 => (last - first) / first * 100.0,
        _ => 0.0,
    }
}

/// Summary of a polarity-sorted selection. All fields are `None` when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionStats {
    pub average: Option<f64>,
    pub range: Option<f64>,
    pub best: Option<CityValue>,
}

impl SelectionStats {
    /// `sorted` must already be ordered best first (as returned by
    /// [`compare_selected`] or [`rank_all`]).
    pub fn from_sorted(sorted: &[CityValue]) -> Self {
        if sorted.is_empty() {
            return Self {
                average: None,
                range: None,
                best: None,
            };
        }
        let sum: f64 = sorted.iter().map(|cv| cv.value).sum();
        let max = sorted.iter().map(|cv| cv.value).fold(f64::NEG_INFINITY, f64::max);
        let min = sorted.iter().map(|cv| cv.value).fold(f64::INFINITY, f64::min);
        Self {
            average: Some(sum / sorted.len() as f64),
            range: Some(max - min),
            best: sorted.first().cloned(),
        }
    }
}

/// Ranking row for display: position plus podium flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCity {
    pub rank: usize,
    pub city: String,
    pub value: f64,
    pub podium: bool,
}

pub fn ranked_rows(ranking: &[CityValue], descriptor: &MetricDescriptor, limit: usize) -> Vec<RankedCity> {
    let rows: Vec<RankedCity> = top_n(ranking, limit)
        .iter()
        .enumerate()
        .map(|(i, cv)| RankedCity {
            rank: i + 1,
            city: cv.city.clone(),
            value: cv.value,
            podium: i < 3,
        })
        .collect();
    if let Some(first) = rows.first() {
        log(
            Level::Debug,
            Domain::Ranking,
            "ranking",
            obj(&[
                ("metric", v_str(descriptor.key.as_str())),
                ("leader", v_str(&first.city)),
                ("leader_value", v_num(first.value)),
                ("rows", v_num(rows.len() as f64)),
            ]),
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricKey;
    use crate::series::YearSnapshot;

    fn series(metric: MetricKey, years: Vec<(i32, Vec<(&str, f64)>)>) -> MetricSeries {
        let snapshots = years
            .into_iter()
            .map(|(year, values)| {
                let mut snap = YearSnapshot::new(year);
                for (city, v) in values {
                    snap.insert(city, v);
                }
                snap
            })
            .collect();
        MetricSeries::new(metric, snapshots)
    }

    fn names(values: &[CityValue]) -> Vec<&str> {
        values.iter().map(|cv| cv.city.as_str()).collect()
    }

    #[test]
    fn test_rank_all_polarity() {
        let aq = series(MetricKey::AirQuality, vec![(2024, vec![("A", 80.0), ("B", 50.0), ("C", 120.0)])]);
        assert_eq!(names(&rank_all(&aq, MetricKey::AirQuality.descriptor())), vec!["B", "A", "C"]);

        let gdp = series(MetricKey::GdpGrowth, vec![(2024, vec![("A", 6.0), ("B", 8.0), ("C", 7.0)])]);
        assert_eq!(names(&rank_all(&gdp, MetricKey::GdpGrowth.descriptor())), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_rank_all_uses_latest_snapshot_only() {
        let s = series(
            MetricKey::GdpGrowth,
            vec![(2023, vec![("A", 9.0), ("B", 1.0)]), (2024, vec![("A", 1.0), ("B", 9.0)])],
        );
        assert_eq!(names(&rank_all(&s, MetricKey::GdpGrowth.descriptor())), vec!["B", "A"]);
    }

    #[test]
    fn test_ties_keep_registry_order() {
        let s = series(
            MetricKey::LiteracyRate,
            vec![(2024, vec![("Z", 90.0), ("M", 95.0), ("A", 90.0), ("K", 90.0)])],
        );
        assert_eq!(
            names(&rank_all(&s, MetricKey::LiteracyRate.descriptor())),
            vec!["M", "Z", "A", "K"]
        );
    }

    #[test]
    fn test_top_n_truncates() {
        let values: Vec<CityValue> = (0..15).map(|i| CityValue::new(&format!("c{}", i), i as f64)).collect();
        assert_eq!(top_n(&values, RANKING_DISPLAY_LIMIT).len(), 10);
        assert_eq!(top_n(&values[..3], RANKING_DISPLAY_LIMIT).len(), 3);
    }

    #[test]
    fn test_compare_selected_policies() {
        let s = series(MetricKey::GdpGrowth, vec![(2024, vec![("A", 5.0), ("B", 7.0)])]);
        let d = MetricKey::GdpGrowth.descriptor();

        let zero = compare_selected(&s, d, &["A", "Z"], MissingCityPolicy::SubstituteZero).unwrap();
        assert_eq!(zero, vec![CityValue::new("A", 5.0), CityValue::new("Z", 0.0)]);

        let skip = compare_selected(&s, d, &["Z", "B", "A"], MissingCityPolicy::Skip).unwrap();
        assert_eq!(names(&skip), vec!["B", "A"]);

        let err = compare_selected(&s, d, &["A", "Z"], MissingCityPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RankingError::MissingCityInSelection {
                city: "Z".to_string(),
                year: 2024
            }
        );
    }

    #[test]
    fn test_compare_selected_empty() {
        let s = series(MetricKey::GdpGrowth, vec![(2024, vec![("A", 5.0)])]);
        let out = compare_selected(&s, MetricKey::GdpGrowth.descriptor(), &[], MissingCityPolicy::Reject).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_growth_trend() {
        let s = series(
            MetricKey::DigitalAdoption,
            vec![
                (2019, vec![("A", 40.0), ("B", 10.0), ("C", 0.0)]),
                (2020, vec![("A", 50.0), ("B", 10.0), ("C", 0.0)]),
                (2021, vec![("A", 60.0), ("B", 10.0), ("C", 5.0)]),
            ],
        );
        assert!((growth_trend(&s, "A") - 50.0).abs() < 1e-9);
        assert_eq!(growth_trend(&s, "B"), 0.0);
        // Only one usable value.
        assert_eq!(growth_trend(&s, "C"), 0.0);
        assert_eq!(growth_trend(&s, "nowhere"), 0.0);
    }

    #[test]
    fn test_growth_trend_skips_leading_zero() {
        let s = series(
            MetricKey::GdpGrowth,
            vec![(2019, vec![("A", 0.0)]), (2020, vec![("A", 2.0)]), (2021, vec![("A", 3.0)])],
        );
        assert!((growth_trend(&s, "A") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_selection_stats() {
        let sorted = vec![CityValue::new("B", 50.0), CityValue::new("A", 80.0), CityValue::new("C", 120.0)];
        let stats = SelectionStats::from_sorted(&sorted);
        assert!((stats.average.unwrap() - 250.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.range, Some(70.0));
        assert_eq!(stats.best.unwrap().city, "B");

        let empty = SelectionStats::from_sorted(&[]);
        assert_eq!(empty.average, None);
        assert_eq!(empty.range, None);
        assert_eq!(empty.best, None);
    }

    #[test]
    fn test_ranked_rows_and_position() {
        let s = series(MetricKey::GdpGrowth, vec![(2024, vec![("A", 1.0), ("B", 4.0), ("C", 3.0), ("D", 2.0)])]);
        let d = MetricKey::GdpGrowth.descriptor();
        let ranking = rank_all(&s, d);
        let rows = ranked_rows(&ranking, d, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].city, "B");
        assert!(rows.iter().all(|r| r.podium));
        assert_eq!(rank_position(&ranking, "A"), Some(4));
        assert_eq!(rank_position(&ranking, "Q"), None);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("zero".parse::<MissingCityPolicy>().unwrap(), MissingCityPolicy::SubstituteZero);
        assert_eq!("reject".parse::<MissingCityPolicy>().unwrap(), MissingCityPolicy::Reject);
        assert!("strict".parse::<MissingCityPolicy>().is_err());
    }
}
