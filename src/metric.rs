use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}'")]
pub struct UnknownMetric(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    GdpGrowth,
    Population,
    LiteracyRate,
    AirQuality,
    HealthcareIndex,
    DigitalAdoption,
}

impl MetricKey {
    pub const ALL: [MetricKey; 6] = [
        MetricKey::GdpGrowth,
        MetricKey::Population,
        MetricKey::LiteracyRate,
        MetricKey::AirQuality,
        MetricKey::HealthcareIndex,
        MetricKey::DigitalAdoption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::GdpGrowth => "gdp_growth",
            MetricKey::Population => "population",
            MetricKey::LiteracyRate => "literacy_rate",
            MetricKey::AirQuality => "air_quality",
            MetricKey::HealthcareIndex => "healthcare_index",
            MetricKey::DigitalAdoption => "digital_adoption",
        }
    }

    pub fn descriptor(&self) -> &'static MetricDescriptor {
        // DESCRIPTORS is laid out in declaration order.
        &DESCRIPTORS[*self as usize]
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Which direction of a metric counts as better performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Economic,
    Social,
    Environmental,
    Infrastructure,
    Healthcare,
    Innovation,
}

/// Inclusive bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    pub const UNBOUNDED: ValueRange = ValueRange { min: None, max: None };

    pub fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |lo| v.max(lo));
        self.max.map_or(v, |hi| v.min(hi))
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |lo| v >= lo) && self.max.map_or(true, |hi| v <= hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDescriptor {
    pub key: MetricKey,
    pub name: &'static str,
    pub unit: &'static str,
    pub polarity: Polarity,
    pub range: ValueRange,
    /// Half-width of the uniform noise added per value.
    pub noise: f64,
    pub category: Option<MetricCategory>,
}

impl MetricDescriptor {
    pub fn lower_is_better(&self) -> bool {
        self.polarity == Polarity::LowerIsBetter
    }

    pub fn format_value(&self, value: f64) -> String {
        match self.key {
            MetricKey::Population => format!("{:.1}M", value),
            MetricKey::GdpGrowth | MetricKey::LiteracyRate | MetricKey::DigitalAdoption => {
                format!("{:.1}%", value)
            }
            MetricKey::AirQuality => format!("{} AQI", value.round()),
            MetricKey::HealthcareIndex => format!("{:.1}/100", value),
        }
    }
}

pub static DESCRIPTORS: [MetricDescriptor; 6] = [
    MetricDescriptor {
        key: MetricKey::GdpGrowth,
        name: "GDP Growth",
        unit: "%",
        polarity: Polarity::HigherIsBetter,
        range: ValueRange { min: Some(0.0), max: None },
        noise: 1.5,
        category: Some(MetricCategory::Economic),
    },
    MetricDescriptor {
        key: MetricKey::Population,
        name: "Population",
        unit: "millions",
        polarity: Polarity::HigherIsBetter,
        range: ValueRange::UNBOUNDED,
        noise: 0.0,
        category: None,
    },
    MetricDescriptor {
        key: MetricKey::LiteracyRate,
        name: "Literacy Rate",
        unit: "%",
        polarity: Polarity::HigherIsBetter,
        range: ValueRange { min: None, max: Some(100.0) },
        noise: 2.0,
        category: Some(MetricCategory::Social),
    },
    MetricDescriptor {
        key: MetricKey::AirQuality,
        name: "Air Quality",
        unit: "AQI",
        polarity: Polarity::LowerIsBetter,
        range: ValueRange { min: Some(50.0), max: None },
        noise: 15.0,
        category: Some(MetricCategory::Environmental),
    },
    MetricDescriptor {
        key: MetricKey::HealthcareIndex,
        name: "Healthcare Index",
        unit: "/100",
        polarity: Polarity::HigherIsBetter,
        range: ValueRange { min: Some(0.0), max: Some(100.0) },
        noise: 4.0,
        category: Some(MetricCategory::Healthcare),
    },
    MetricDescriptor {
        key: MetricKey::DigitalAdoption,
        name: "Digital Adoption",
        unit: "%",
        polarity: Polarity::HigherIsBetter,
        range: ValueRange { min: None, max: Some(100.0) },
        noise: 3.0,
        category: Some(MetricCategory::Innovation),
    },
];

pub fn descriptor(key: &str) -> Result<&'static MetricDescriptor, UnknownMetric> {
    key.parse::<MetricKey>().map(|k| k.descriptor())
}
