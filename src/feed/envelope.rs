use serde::{Deserialize, Serialize};

use crate::logging::ts_now;

pub const LIVE_SUFFIX: &str = " (Live API)";
pub const MOCK_SUFFIX: &str = " (Mock Data)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Low,
    Medium,
    High,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::Low => "low",
            DataQuality::Medium => "medium",
            DataQuality::High => "high",
        }
    }
}

/// Where the payload of an envelope came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Mock,
}

/// Provenance-tagged wrapper around a fetched batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchEnvelope<T> {
    pub data: T,
    pub status: FetchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_updated: String,
    pub source: String,
    pub data_quality: DataQuality,
    pub provenance: Provenance,
}

impl<T> FetchEnvelope<T> {
    pub fn live(data: T, source_label: &str) -> Self {
        Self {
            data,
            status: FetchStatus::Success,
            message: None,
            last_updated: ts_now(),
            source: format!("{}{}", source_label, LIVE_SUFFIX),
            data_quality: DataQuality::High,
            provenance: Provenance::Live,
        }
    }

    /// A handled fallback is still a successful response.
    pub fn mock(data: T, source_label: &str, reason: &str) -> Self {
        Self {
            data,
            status: FetchStatus::Success,
            message: Some(reason.to_string()),
            last_updated: ts_now(),
            source: format!("{}{}", source_label, MOCK_SUFFIX),
            data_quality: DataQuality::Medium,
            provenance: Provenance::Mock,
        }
    }

    pub fn is_live(&self) -> bool {
        self.provenance == Provenance::Live
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchEnvelope<U> {
        FetchEnvelope {
            data: f(self.data),
            status: self.status,
            message: self.message,
            last_updated: self.last_updated,
            source: self.source,
            data_quality: self.data_quality,
            provenance: self.provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_and_mock_labels() {
        let live = FetchEnvelope::live(1, "RBI");
        assert_eq!(live.source, "RBI (Live API)");
        assert_eq!(live.data_quality, DataQuality::High);
        assert!(live.is_live());

        let mock = FetchEnvelope::mock(1, "RBI", "timeout");
        assert_eq!(mock.status, FetchStatus::Success);
        assert_eq!(mock.source, "RBI (Mock Data)");
        assert_eq!(mock.data_quality, DataQuality::Medium);
        assert_eq!(mock.message.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_serialized_field_names() {
        let env = FetchEnvelope::live(vec![1, 2], "UNDP");
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["dataQuality"], "high");
        assert!(v.get("lastUpdated").is_some());
        assert!(v.get("message").is_none());
    }

    #[test]
    fn test_quality_ordering() {
        assert!(DataQuality::High > DataQuality::Medium);
        assert!(DataQuality::Medium > DataQuality::Low);
    }
}
