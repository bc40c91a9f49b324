//! Simulated development indicators for Indian cities.
//!
//! The crate has three cooperating parts:
//! - [`generator`] builds per-city, per-year metric series from the city registry,
//! - [`ranking`] turns a series into polarity-aware rankings and comparisons,
//! - [`feed`] fetches indicator batches under a deadline and falls back to
//!   bundled mock data, caching the result per category.

pub mod cities;
pub mod config;
pub mod feed;
pub mod generator;
pub mod logging;
pub mod metric;
pub mod ranking;
pub mod series;
