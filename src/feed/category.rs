use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Indicator batches fetched and cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Economic,
    Social,
    Environmental,
    Governance,
    Equality,
}

/// Refetch cadence and freshness window of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub refetch_interval: Duration,
    pub stale_time: Duration,
}

const fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Economic,
        Category::Social,
        Category::Environmental,
        Category::Governance,
        Category::Equality,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Economic => "complete-economic-data",
            Category::Social => "complete-social-data",
            Category::Environmental => "complete-environmental-data",
            Category::Governance => "complete-governance-data",
            Category::Equality => "economic-equality-data",
        }
    }

    /// Label the envelope's `source` is built from.
    pub fn source_label(&self) -> &'static str {
        match self {
            Category::Economic => "Economic Data APIs",
            Category::Social => "Social Development APIs",
            Category::Environmental => "Environmental APIs",
            Category::Governance => "Governance APIs",
            Category::Equality => "Economic Equality APIs",
        }
    }

    /// Volatile categories refresh faster.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        let (refetch, stale) = match self {
            Category::Economic => (5, 2),
            Category::Social => (15, 10),
            Category::Environmental => (2, 1),
            Category::Governance => (30, 15),
            Category::Equality => (60, 30),
        };
        RefreshPolicy {
            refetch_interval: minutes(refetch),
            stale_time: minutes(stale),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Economic => "economic",
            Category::Social => "social",
            Category::Environmental => "environmental",
            Category::Governance => "governance",
            Category::Equality => "equality",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
