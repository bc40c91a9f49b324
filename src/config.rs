use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::feed::category::Category;
use crate::feed::fetcher::DEFAULT_FETCH_TIMEOUT;
use crate::generator::{year_range, BASE_YEAR};
use crate::ranking::{MissingCityPolicy, RANKING_DISPLAY_LIMIT};

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Upstream base URLs, one per data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoints {
    pub data_gov_in: String,
    pub rbi: String,
    pub mospi: String,
    pub cpcb: String,
    pub world_bank: String,
    pub undp: String,
    pub transparency: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            data_gov_in: "https://api.data.gov.in/resource".to_string(),
            rbi: "https://rbi.org.in/Scripts/api".to_string(),
            mospi: "https://mospi.gov.in/api".to_string(),
            cpcb: "https://api.cpcb.gov.in/air".to_string(),
            world_bank: "https://api.worldbank.org/v2/country/IND/indicator".to_string(),
            undp: "https://hdr.undp.org/api".to_string(),
            transparency: "https://www.transparency.org/api".to_string(),
        }
    }
}

impl ApiEndpoints {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            data_gov_in: env_string("DATA_GOV_IN_BASE", &d.data_gov_in),
            rbi: env_string("RBI_BASE", &d.rbi),
            mospi: env_string("MOSPI_BASE", &d.mospi),
            cpcb: env_string("CPCB_BASE", &d.cpcb),
            world_bank: env_string("WORLD_BANK_BASE", &d.world_bank),
            undp: env_string("UNDP_BASE", &d.undp),
            transparency: env_string("TRANSPARENCY_BASE", &d.transparency),
        }
    }
}

/// Everything a fetch needs, passed explicitly to each call.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoints: ApiEndpoints,
    pub data_gov_in_api_key: Option<String>,
    /// Budget for categories without an override.
    pub timeout: Duration,
    pub category_timeouts: HashMap<Category, Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            data_gov_in_api_key: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
            category_timeouts: HashMap::new(),
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let mut category_timeouts = HashMap::new();
        for category in Category::ALL {
            let key = format!("FETCH_TIMEOUT_MS_{}", category.as_str().to_uppercase());
            if let Some(ms) = std::env::var(&key).ok().and_then(|v| v.parse::<u64>().ok()) {
                category_timeouts.insert(category, Duration::from_millis(ms));
            }
        }
        Self {
            endpoints: ApiEndpoints::from_env(),
            data_gov_in_api_key: std::env::var("DATA_GOV_IN_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout: Duration::from_millis(env_or("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT.as_millis() as u64)),
            category_timeouts,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn budget_for(&self, category: Category) -> Duration {
        self.category_timeouts.get(&category).copied().unwrap_or(self.timeout)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed RNG seed; unset draws a fresh seed per run.
    pub seed: Option<u64>,
    pub year_start: i32,
    pub year_end: i32,
    pub metric: String,
    pub cities: Vec<String>,
    pub top_n: usize,
    pub missing_city_policy: MissingCityPolicy,
    pub live_apis: bool,
    /// 0 = single pass; otherwise keep auto-refresh running this long.
    pub run_secs: u64,
    pub fetch: FetchConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            seed: std::env::var("SEED").ok().and_then(|v| v.parse().ok()),
            year_start: env_or("YEAR_START", BASE_YEAR),
            year_end: env_or("YEAR_END", 2024),
            metric: env_string("METRIC", "gdp_growth"),
            cities: env_string("CITIES", "Mumbai,Delhi,Bangalore")
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            top_n: env_or("TOP_N", RANKING_DISPLAY_LIMIT),
            missing_city_policy: env_or("MISSING_CITY_POLICY", MissingCityPolicy::SubstituteZero),
            live_apis: matches!(std::env::var("LIVE_APIS").as_deref(), Ok("1") | Ok("true")),
            run_secs: env_or("RUN_SECS", 0),
            fetch: FetchConfig::from_env(),
        }
    }

    pub fn years(&self) -> Vec<i32> {
        year_range(self.year_start, self.year_end)
    }

    pub fn selected_cities(&self) -> Vec<&str> {
        self.cities.iter().map(String::as_str).collect()
    }
}
