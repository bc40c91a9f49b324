use anyhow::Result;
use rand::Rng;
use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::logging::{log, obj, v_num, v_str, Domain, Level};

/// Backoff schedule for upstream calls.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of the delay added or removed at random. 0 disables jitter.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// `min(base * 2^attempt, max)`, then jittered.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let doubled = self.base_delay_ms.saturating_mul(1u64 << attempt.min(32));
        let capped = doubled.min(self.max_delay_ms) as f64;

        let spread = capped * self.jitter_factor;
        let offset = if spread > 0.0 {
            rand::thread_rng().gen_range(-spread..=spread)
        } else {
            0.0
        };
        Duration::from_millis((capped + offset).max(0.0) as u64)
    }
}

/// Runs `operation` until it succeeds or the retries run out.
pub async fn retry_async<F, Fut, T>(config: &RetryConfig, operation_name: &str, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_async_when(config, operation_name, operation, |_| true).await
}

/// Like [`retry_async`], but returns at once on errors `should_retry` rejects.
pub async fn retry_async_when<F, Fut, T, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        if attempt >= config.max_retries || !should_retry(&err) {
            return Err(err);
        }

        let delay = config.delay_for_attempt(attempt);
        attempt += 1;
        log(
            Level::Debug,
            Domain::Fetch,
            "retry",
            obj(&[
                ("operation", v_str(operation_name)),
                ("attempt", v_num(attempt as f64)),
                ("of", v_num(config.max_retries as f64)),
                ("error", v_str(&format!("{:#}", err))),
                ("delay_ms", v_num(delay.as_millis() as f64)),
            ]),
        );
        sleep(delay).await;
    }
}

/// Timeouts, throttling and gateway failures are worth another attempt.
pub fn is_retryable_http_error(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502..=504)
}

pub fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
