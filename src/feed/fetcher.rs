//! Deadline-bounded fetch with a guaranteed mock fallback.
//!
//! A caller never sees an error from this module: every path ends in a
//! well-formed [`FetchEnvelope`]. Failures only show up as a `medium` quality
//! and a `(Mock Data)` source suffix.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::category::Category;
use super::envelope::FetchEnvelope;
use super::indicators::{fallback_records, IndicatorRecord};
use super::source::IndicatorSource;
use crate::config::FetchConfig;
use crate::logging::{log_fallback, log_live_fetch};

/// Standard per-call budget for a live attempt.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Resolves to the future's result, or `Timeout` if `budget` elapses first.
pub async fn race_with_deadline<T, Fut>(budget: Duration, fut: Fut) -> Result<T, FetchFailure>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(FetchFailure::Transport(e)),
        Err(_) => Err(FetchFailure::Timeout(budget)),
    }
}

/// Races `primary` against `budget`; on any failure serves `fallback()` instead.
///
/// `fallback` must be side-effect free and infallible, there is no further layer.
pub async fn fetch_with_fallback<T, F, Fut, S>(
    primary: F,
    fallback: S,
    source_label: &str,
    budget: Duration,
) -> FetchEnvelope<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
    S: FnOnce() -> T,
{
    let started = Instant::now();
    match race_with_deadline(budget, primary()).await {
        Ok(data) => {
            log_live_fetch(source_label, elapsed_ms(started));
            FetchEnvelope::live(data, source_label)
        }
        Err(failure) => {
            let reason = failure.to_string();
            log_fallback(source_label, &reason, elapsed_ms(started));
            FetchEnvelope::mock(fallback(), source_label, &reason)
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Fetches one category through `source`, falling back to its bundled catalog.
pub async fn fetch_category(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
    category: Category,
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_with_fallback(
        || source.fetch(category),
        || fallback_records(category),
        category.source_label(),
        cfg.budget_for(category),
    )
    .await
}

pub async fn fetch_economic(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_category(cfg, source, Category::Economic).await
}

pub async fn fetch_social(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_category(cfg, source, Category::Social).await
}

pub async fn fetch_environmental(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_category(cfg, source, Category::Environmental).await
}

pub async fn fetch_governance(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_category(cfg, source, Category::Governance).await
}

pub async fn fetch_equality(
    cfg: &FetchConfig,
    source: &(dyn IndicatorSource + Send + Sync),
) -> FetchEnvelope<Vec<IndicatorRecord>> {
    fetch_category(cfg, source, Category::Equality).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::envelope::{DataQuality, FetchStatus};
    use anyhow::anyhow;

    #[tokio::test]
    async fn test_race_resolves_in_budget() {
        let out = race_with_deadline(Duration::from_millis(200), async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_race_times_out() {
        let out: Result<i32, _> = race_with_deadline(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(1)
        })
        .await;
        assert!(matches!(out, Err(FetchFailure::Timeout(d)) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_race_passes_transport_error() {
        let out: Result<i32, _> = race_with_deadline(Duration::from_secs(1), async { Err(anyhow!("refused")) }).await;
        match out {
            Err(FetchFailure::Transport(e)) => assert_eq!(e.to_string(), "refused"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_fallback_on_error() {
        let env = fetch_with_fallback(
            || async { Err::<Vec<i32>, _>(anyhow!("Not implemented")) },
            || vec![1, 2, 3],
            "Economic Equality APIs",
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;
        assert_eq!(env.status, FetchStatus::Success);
        assert_eq!(env.data_quality, DataQuality::Medium);
        assert_eq!(env.source, "Economic Equality APIs (Mock Data)");
        assert_eq!(env.data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_live_in_budget() {
        let env = fetch_with_fallback(
            || async { Ok(vec![9]) },
            || vec![0],
            "Governance APIs",
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;
        assert_eq!(env.data_quality, DataQuality::High);
        assert!(env.source.ends_with("(Live API)"));
        assert_eq!(env.data, vec![9]);
    }
}
