use anyhow::{anyhow, Result};
use futures_util::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::category::Category;
use super::indicators::IndicatorRecord;
use super::retry::{is_retryable_http_error, is_retryable_network_error, retry_async_when, RetryConfig};
use crate::config::{ApiEndpoints, FetchConfig};

/// Live provider of indicator batches. Implementations may fail freely;
/// the fetch layer turns every failure into a mock fallback.
#[async_trait::async_trait]
pub trait IndicatorSource {
    async fn fetch(&self, category: Category) -> Result<Vec<IndicatorRecord>>;
}

/// Source used when live APIs are disabled. Every call fails immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

#[async_trait::async_trait]
impl IndicatorSource for OfflineSource {
    async fn fetch(&self, category: Category) -> Result<Vec<IndicatorRecord>> {
        Err(anyhow!("network disabled: {} not fetched", category))
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl UpstreamError {
    fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Status { status, .. } => is_retryable_http_error(*status),
            UpstreamError::Network(e) => is_retryable_network_error(e),
            UpstreamError::Decode { .. } => false,
        }
    }
}

/// Upstreams answer either a bare array or `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordPayload {
    Bare(Vec<IndicatorRecord>),
    Wrapped { data: Vec<IndicatorRecord> },
}

impl RecordPayload {
    fn into_records(self) -> Vec<IndicatorRecord> {
        match self {
            RecordPayload::Bare(v) => v,
            RecordPayload::Wrapped { data } => data,
        }
    }
}

pub struct HttpIndicatorSource {
    client: Client,
    endpoints: ApiEndpoints,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl HttpIndicatorSource {
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            client,
            endpoints: cfg.endpoints.clone(),
            api_key: cfg.data_gov_in_api_key.clone(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Upstream URLs queried for `category`. Empty means no live upstream exists.
    pub fn urls_for(&self, category: Category) -> Result<Vec<Url>> {
        let e = &self.endpoints;
        let urls = match category {
            Category::Economic => vec![
                join(&e.rbi, "gdp-data")?,
                join(&e.mospi, "economic-indicators")?,
                join(&e.world_bank, "NY.GDP.MKTP.KD.ZG?format=json&date=2024")?,
            ],
            Category::Social => vec![join(&e.undp, "hdi-data")?, join(&e.mospi, "social-indicators")?],
            Category::Environmental => vec![
                join(&e.cpcb, "realtime-data")?,
                join(&e.world_bank, "EN.ATM.CO2E.PC?format=json&date=2024")?,
            ],
            Category::Governance => {
                let mut infra = join(&e.data_gov_in, "infrastructure-data")?;
                if let Some(key) = &self.api_key {
                    infra.query_pairs_mut().append_pair("api-key", key);
                }
                vec![join(&e.transparency, "cpi-data")?, infra]
            }
            Category::Equality => Vec::new(),
        };
        Ok(urls)
    }

    async fn get_records(&self, url: &Url) -> std::result::Result<Vec<IndicatorRecord>, UpstreamError> {
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        serde_json::from_str::<RecordPayload>(&body)
            .map(RecordPayload::into_records)
            .map_err(|e| UpstreamError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn join(base: &str, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| anyhow!("bad endpoint {}: {}", raw, e))
}

#[async_trait::async_trait]
impl IndicatorSource for HttpIndicatorSource {
    async fn fetch(&self, category: Category) -> Result<Vec<IndicatorRecord>> {
        let urls = self.urls_for(category)?;
        if urls.is_empty() {
            return Err(anyhow!("{} live upstream not implemented", category));
        }

        let calls = urls.iter().map(|url| {
            retry_async_when(
                &self.retry,
                url.as_str(),
                move || async move { self.get_records(url).await.map_err(anyhow::Error::from) },
                |e| e.downcast_ref::<UpstreamError>().map(UpstreamError::is_retryable).unwrap_or(false),
            )
        });
        let records: Vec<IndicatorRecord> = try_join_all(calls).await?.into_iter().flatten().collect();

        if records.is_empty() {
            return Err(anyhow!("{} upstreams returned no records", category));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(key: Option<&str>) -> HttpIndicatorSource {
        let cfg = FetchConfig {
            data_gov_in_api_key: key.map(str::to_string),
            ..Default::default()
        };
        HttpIndicatorSource::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn test_offline_always_fails() {
        for c in Category::ALL {
            assert!(OfflineSource.fetch(c).await.is_err());
        }
    }

    #[test]
    fn test_urls_per_category() {
        let s = source(None);
        assert_eq!(s.urls_for(Category::Economic).unwrap().len(), 3);
        assert_eq!(s.urls_for(Category::Social).unwrap().len(), 2);
        let env = s.urls_for(Category::Environmental).unwrap();
        assert_eq!(env[0].as_str(), "https://api.cpcb.gov.in/air/realtime-data");
        assert!(env[1].query().unwrap().contains("format=json"));
        assert!(s.urls_for(Category::Equality).unwrap().is_empty());
    }

    #[test]
    fn test_api_key_appended() {
        let urls = source(Some("abc123")).urls_for(Category::Governance).unwrap();
        assert_eq!(urls[1].query(), Some("api-key=abc123"));
        let plain = source(None).urls_for(Category::Governance).unwrap();
        assert_eq!(plain[1].query(), None);
    }

    #[tokio::test]
    async fn test_equality_has_no_upstream() {
        let err = source(None).fetch(Category::Equality).await.unwrap_err();
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn test_payload_shapes() {
        let rec = r#"{"id":"x","name":"X","value":1.0,"unit":"%","period":"2024","source":"S","lastUpdated":"t"}"#;
        let bare: RecordPayload = serde_json::from_str(&format!("[{}]", rec)).unwrap();
        assert_eq!(bare.into_records().len(), 1);
        let wrapped: RecordPayload = serde_json::from_str(&format!(r#"{{"data":[{0},{0}]}}"#, rec)).unwrap();
        assert_eq!(wrapped.into_records().len(), 2);
    }

    #[test]
    fn test_status_retry_classification() {
        let transient = UpstreamError::Status { url: "u".into(), status: 503 };
        let permanent = UpstreamError::Status { url: "u".into(), status: 404 };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
    }
}
