//! Per-category cache of fetched indicator batches.
//!
//! Writes are last-write-wins: a slow refresh that completes after a newer
//! one overwrites it. Each write takes a fresh generation number so readers
//! can tell which write they are looking at.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use super::category::{Category, RefreshPolicy};
use super::envelope::{FetchEnvelope, FetchStatus, Provenance};
use super::fetcher::fetch_category;
use super::indicators::IndicatorRecord;
use super::source::IndicatorSource;
use crate::config::FetchConfig;
use crate::logging::{log, log_cache_write, log_refresh_summary, obj, ts_epoch_ms, v_num, v_str, Domain, Level};

/// Shortest interval a background refresh task will run at.
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(1);

pub type IndicatorEnvelope = FetchEnvelope<Vec<IndicatorRecord>>;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub envelope: IndicatorEnvelope,
    pub updated_at: Instant,
    pub updated_at_ms: u64,
    pub generation: u64,
}

/// Aggregate view over every category, as a dashboard header shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStatus {
    pub loaded: usize,
    pub missing: Vec<Category>,
    pub any_error: bool,
    pub all_live: bool,
    pub last_updated_ms: Option<u64>,
}

pub struct IndicatorCache {
    cfg: FetchConfig,
    source: Arc<dyn IndicatorSource + Send + Sync>,
    entries: Mutex<HashMap<Category, CacheEntry>>,
    policies: HashMap<Category, RefreshPolicy>,
    generation: AtomicU64,
}

impl IndicatorCache {
    pub fn new(cfg: FetchConfig, source: Arc<dyn IndicatorSource + Send + Sync>) -> Self {
        Self {
            cfg,
            source,
            entries: Mutex::new(HashMap::new()),
            policies: Category::ALL.iter().map(|c| (*c, c.refresh_policy())).collect(),
            generation: AtomicU64::new(0),
        }
    }

    /// Overrides the refresh cadence of one category.
    pub fn with_policy(mut self, category: Category, policy: RefreshPolicy) -> Self {
        self.policies.insert(category, policy);
        self
    }

    pub fn policy(&self, category: Category) -> RefreshPolicy {
        self.policies
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.refresh_policy())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Category, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, category: Category) -> Option<CacheEntry> {
        self.lock().get(&category).cloned()
    }

    /// Missing entries count as stale.
    pub fn is_stale(&self, category: Category) -> bool {
        let stale_time = self.policy(category).stale_time;
        match self.lock().get(&category) {
            Some(entry) => entry.updated_at.elapsed() >= stale_time,
            None => true,
        }
    }

    /// Unconditional write. Returns the generation assigned to it.
    pub fn store(&self, category: Category, envelope: IndicatorEnvelope) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log_cache_write(
            category.as_str(),
            generation,
            envelope.data_quality.as_str(),
            envelope.data.len(),
        );
        let entry = CacheEntry {
            envelope,
            updated_at: Instant::now(),
            updated_at_ms: ts_epoch_ms(),
            generation,
        };
        self.lock().insert(category, entry);
        generation
    }

    pub fn invalidate(&self, category: Category) {
        if self.lock().remove(&category).is_some() {
            log(
                Level::Debug,
                Domain::Cache,
                "invalidate",
                obj(&[("category", v_str(category.as_str()))]),
            );
        }
    }

    /// Fetches `category` now and stores whatever comes back.
    pub async fn refresh(&self, category: Category) -> IndicatorEnvelope {
        let envelope = fetch_category(&self.cfg, self.source.as_ref(), category).await;
        self.store(category, envelope.clone());
        envelope
    }

    /// Serves the cached batch while fresh, refreshing otherwise.
    pub async fn get_or_refresh(&self, category: Category) -> IndicatorEnvelope {
        if !self.is_stale(category) {
            if let Some(entry) = self.get(category) {
                return entry.envelope;
            }
        }
        self.refresh(category).await
    }

    /// Refreshes every category concurrently. One slow upstream never delays
    /// the store of another.
    pub async fn refresh_all(&self) -> Vec<(Category, IndicatorEnvelope)> {
        let started = Instant::now();
        let results = join_all(Category::ALL.iter().map(|c| async move { (*c, self.refresh(*c).await) })).await;

        let live = results.iter().filter(|(_, e)| e.provenance == Provenance::Live).count();
        log_refresh_summary(
            results.len(),
            live,
            results.len() - live,
            started.elapsed().as_secs_f64() * 1000.0,
        );
        results
    }

    pub fn status(&self) -> DashboardStatus {
        let entries = self.lock();
        let missing: Vec<Category> = Category::ALL
            .iter()
            .copied()
            .filter(|c| !entries.contains_key(c))
            .collect();
        DashboardStatus {
            loaded: entries.len(),
            any_error: entries.values().any(|e| e.envelope.status == FetchStatus::Error),
            all_live: missing.is_empty() && entries.values().all(|e| e.envelope.is_live()),
            last_updated_ms: entries.values().map(|e| e.updated_at_ms).max(),
            missing,
        }
    }

    /// Background refresh period for `category`, floored at [`MIN_REFETCH_INTERVAL`].
    pub fn refetch_period(&self, category: Category) -> Duration {
        let requested = self.policy(category).refetch_interval;
        if requested >= MIN_REFETCH_INTERVAL {
            return requested;
        }
        log(
            Level::Warn,
            Domain::Cache,
            "refetch_interval_floored",
            obj(&[
                ("category", v_str(category.as_str())),
                ("requested_ms", v_num(requested.as_secs_f64() * 1000.0)),
                ("used_ms", v_num(MIN_REFETCH_INTERVAL.as_secs_f64() * 1000.0)),
            ]),
        );
        MIN_REFETCH_INTERVAL
    }

    /// One background task per category, each refreshing on its own interval.
    /// The first tick fires one interval from now.
    pub fn spawn_auto_refresh(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        Category::ALL
            .iter()
            .map(|category| {
                let category = *category;
                let cache = Arc::clone(&self);
                let period = cache.refetch_period(category);
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    loop {
                        ticker.tick().await;
                        cache.refresh(category).await;
                    }
                })
            })
            .collect()
    }
}
