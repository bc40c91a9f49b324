use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cities::City;
use crate::metric::MetricKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityValue {
    pub city: String,
    pub value: f64,
}

impl CityValue {
    pub fn new(city: &str, value: f64) -> Self {
        Self {
            city: city.to_string(),
            value,
        }
    }
}

/// One year of a metric: city name -> value, kept in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub year: i32,
    pub values: Vec<CityValue>,
}

impl YearSnapshot {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: Vec::new(),
        }
    }

    /// Inserts or replaces the value for `city`, keeping first-insertion order.
    pub fn insert(&mut self, city: &str, value: f64) {
        match self.values.iter_mut().find(|cv| cv.city == city) {
            Some(existing) => existing.value = value,
            None => self.values.push(CityValue::new(city, value)),
        }
    }

    pub fn get(&self, city: &str) -> Option<f64> {
        self.values.iter().find(|cv| cv.city == city).map(|cv| cv.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: MetricKey,
    pub snapshots: Vec<YearSnapshot>,
}

impl MetricSeries {
    pub fn new(metric: MetricKey, snapshots: Vec<YearSnapshot>) -> Self {
        Self { metric, snapshots }
    }

    pub fn latest(&self) -> Option<&YearSnapshot> {
        self.snapshots.last()
    }

    pub fn years(&self) -> Vec<i32> {
        self.snapshots.iter().map(|s| s.year).collect()
    }

    pub fn year(&self, year: i32) -> Option<&YearSnapshot> {
        self.snapshots.iter().find(|s| s.year == year)
    }

    /// The city's value per snapshot, `None` where the snapshot lacks the city.
    pub fn values_for(&self, city: &str) -> Vec<Option<f64>> {
        self.snapshots.iter().map(|s| s.get(city)).collect()
    }

    /// True when every city has a value in every snapshot.
    pub fn covers(&self, cities: &[City]) -> bool {
        self.snapshots
            .iter()
            .all(|s| cities.iter().all(|c| s.get(&c.name).is_some()))
    }

    /// SHA-256 over metric, years, cities and exact value bits.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.metric.as_str().as_bytes());
        for snap in &self.snapshots {
            hasher.update(snap.year.to_le_bytes());
            for cv in &snap.values {
                hasher.update(cv.city.as_bytes());
                hasher.update([0u8]);
                hasher.update(cv.value.to_bits().to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}
