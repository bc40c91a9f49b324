//! National indicator records and the bundled mock catalogs served on fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::Category;
use super::envelope::DataQuality;
use crate::logging::ts_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Good,
    Moderate,
    Poor,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderBreakdown {
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuralUrban {
    pub rural: f64,
    pub urban: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRecord {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub period: String,
    pub source: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<DataQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_breakdown: Option<GenderBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rural_urban: Option<RuralUrban>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state_wise: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_level: Option<AlertLevel>,
}

impl IndicatorRecord {
    pub fn new(id: &str, name: &str, value: f64, unit: &str, period: &str, source: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            period: period.to_string(),
            source: source.to_string(),
            last_updated: ts_now(),
            trend: None,
            reliability: None,
            gender_breakdown: None,
            rural_urban: None,
            state_wise: BTreeMap::new(),
            global_average: None,
            ranking: None,
            location: None,
            alert_level: None,
        }
    }

    pub fn trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn reliability(mut self, quality: DataQuality) -> Self {
        self.reliability = Some(quality);
        self
    }

    pub fn gender(mut self, male: f64, female: f64) -> Self {
        self.gender_breakdown = Some(GenderBreakdown { male, female });
        self
    }

    pub fn rural_urban(mut self, rural: f64, urban: f64) -> Self {
        self.rural_urban = Some(RuralUrban { rural, urban });
        self
    }

    pub fn state_wise(mut self, states: &[(&str, f64)]) -> Self {
        self.state_wise = states.iter().map(|(s, v)| (s.to_string(), *v)).collect();
        self
    }

    pub fn benchmark(mut self, ranking: Option<u32>, global_average: f64) -> Self {
        self.ranking = ranking;
        self.global_average = Some(global_average);
        self
    }

    pub fn located(mut self, location: &str, alert: AlertLevel) -> Self {
        self.location = Some(location.to_string());
        self.alert_level = Some(alert);
        self
    }
}

/// Bundled records for `category`. Pure and infallible; stamped with the current time.
pub fn fallback_records(category: Category) -> Vec<IndicatorRecord> {
    use DataQuality::{High, Medium};
    use Trend::{Down, Stable, Up};

    match category {
        Category::Economic => vec![
            IndicatorRecord::new("gdp_growth", "GDP Growth Rate", 7.2, "%", "Q3 2024", "RBI/MOSPI")
                .trend(Up)
                .reliability(High)
                .state_wise(&[
                    ("Maharashtra", 8.1),
                    ("Tamil Nadu", 7.8),
                    ("Gujarat", 7.5),
                    ("Karnataka", 7.3),
                    ("Uttar Pradesh", 6.9),
                ]),
            IndicatorRecord::new("gni", "Gross National Income", 3.89, "Trillion USD", "2024", "World Bank/RBI")
                .trend(Up)
                .reliability(High),
            IndicatorRecord::new("gdp_per_capita", "GDP per Capita", 2850.0, "USD", "2024", "World Bank")
                .trend(Up)
                .reliability(High),
            IndicatorRecord::new("unemployment_rate", "Unemployment Rate", 6.1, "%", "Oct 2024", "CMIE/Labour Ministry")
                .trend(Down)
                .reliability(Medium),
            IndicatorRecord::new("inflation_rate", "Consumer Price Inflation", 4.8, "%", "Nov 2024", "MOSPI")
                .trend(Stable)
                .reliability(High),
            IndicatorRecord::new("fdi_inflow", "Foreign Direct Investment", 83.57, "Billion USD", "FY 2023-24", "DPIIT")
                .trend(Up)
                .reliability(High),
            IndicatorRecord::new("export_import_ratio", "Export/Import Ratio", 0.67, "ratio", "FY 2023-24", "DGFT")
                .trend(Stable)
                .reliability(High),
            IndicatorRecord::new("public_debt_gdp", "Public Debt as % of GDP", 89.6, "% of GDP", "FY 2023-24", "RBI")
                .trend(Stable)
                .reliability(High),
        ],
        Category::Social => vec![
            IndicatorRecord::new("hdi", "Human Development Index", 0.633, "index", "2023", "UNDP"),
            IndicatorRecord::new("life_expectancy", "Life Expectancy", 70.19, "years", "2021-23", "SRS/Health Ministry")
                .gender(68.7, 71.8),
            IndicatorRecord::new(
                "infant_mortality",
                "Infant Mortality Rate",
                28.0,
                "per 1000 births",
                "2022",
                "SRS/Health Ministry",
            )
            .rural_urban(32.0, 22.0),
            IndicatorRecord::new(
                "literacy_rate",
                "Literacy Rate",
                77.7,
                "%",
                "2021 Census",
                "Registrar General of India",
            )
            .gender(84.7, 70.3)
            .rural_urban(73.5, 87.7),
            IndicatorRecord::new("education_index", "Education Index", 0.614, "index", "2023", "UNDP/Education Ministry"),
            IndicatorRecord::new("gender_inequality_index", "Gender Inequality Index", 0.490, "index", "2023", "UNDP"),
            IndicatorRecord::new(
                "population_growth_rate",
                "Population Growth Rate",
                0.99,
                "% per year",
                "2023",
                "UN Population Division",
            ),
            IndicatorRecord::new("urban_population", "Urban Population", 35.4, "% of total", "2023", "Census/UN-Habitat"),
        ],
        Category::Environmental => vec![
            IndicatorRecord::new(
                "co2_emissions_per_capita",
                "CO2 Emissions per Capita",
                1.91,
                "tons CO2",
                "current",
                "World Bank/Environment Ministry",
            )
            .located("India", AlertLevel::Moderate),
            IndicatorRecord::new("renewable_energy_share", "Renewable Energy Share", 42.5, "% of total", "current", "MNRE")
                .located("India", AlertLevel::Good),
            IndicatorRecord::new("forest_area", "Forest Area", 21.71, "% of land area", "current", "Forest Survey of India")
                .located("India", AlertLevel::Moderate),
            IndicatorRecord::new("aqi_delhi", "Air Quality Index - Delhi", 187.0, "AQI", "current", "CPCB Real-time")
                .located("Delhi", AlertLevel::Poor),
            IndicatorRecord::new("aqi_mumbai", "Air Quality Index - Mumbai", 94.0, "AQI", "current", "CPCB Real-time")
                .located("Mumbai", AlertLevel::Moderate),
            IndicatorRecord::new(
                "environmental_performance_index",
                "Environmental Performance Index",
                27.6,
                "score/100",
                "current",
                "Yale EPI",
            )
            .located("India", AlertLevel::Poor),
        ],
        Category::Governance => vec![
            IndicatorRecord::new(
                "corruption_perceptions_index",
                "Corruption Perceptions Index",
                41.0,
                "score/100",
                "2023",
                "Transparency International",
            )
            .benchmark(Some(93), 43.0),
            IndicatorRecord::new("internet_penetration", "Internet Penetration", 52.4, "% population", "2024", "TRAI"),
            IndicatorRecord::new(
                "mobile_subscriptions",
                "Mobile Phone Subscriptions",
                84.8,
                "per 100 people",
                "Nov 2024",
                "TRAI",
            ),
            IndicatorRecord::new(
                "infrastructure_quality_index",
                "Infrastructure Quality Index",
                4.18,
                "score/7",
                "2023",
                "WEF Global Competitiveness",
            )
            .benchmark(Some(68), 4.5),
            IndicatorRecord::new(
                "political_stability_index",
                "Political Stability Index",
                -0.81,
                "score",
                "2023",
                "World Bank Governance",
            )
            .benchmark(None, 0.0),
        ],
        Category::Equality => vec![
            IndicatorRecord::new(
                "gini_coefficient",
                "Gini Coefficient (Income Inequality)",
                35.7,
                "coefficient",
                "2021-22",
                "NSSO/World Bank",
            ),
            IndicatorRecord::new("poverty_rate", "Poverty Rate ($2.15/day)", 10.2, "% population", "2022", "World Bank"),
            IndicatorRecord::new(
                "social_protection_coverage",
                "Social Protection Coverage",
                24.4,
                "% population",
                "2023",
                "ILO/Social Security Ministry",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_fallback() {
        for c in Category::ALL {
            let records = fallback_records(c);
            assert!(!records.is_empty(), "{} has no fallback", c);
            assert!(records.iter().all(|r| !r.id.is_empty() && !r.last_updated.is_empty()));
        }
    }

    #[test]
    fn test_fallback_catalog_sizes() {
        assert_eq!(fallback_records(Category::Economic).len(), 8);
        assert_eq!(fallback_records(Category::Social).len(), 8);
        assert_eq!(fallback_records(Category::Environmental).len(), 6);
        assert_eq!(fallback_records(Category::Governance).len(), 5);
        assert_eq!(fallback_records(Category::Equality).len(), 3);
    }

    #[test]
    fn test_enrichments_present() {
        let econ = fallback_records(Category::Economic);
        assert_eq!(econ[0].state_wise.get("Maharashtra"), Some(&8.1));
        let social = fallback_records(Category::Social);
        let lit = social.iter().find(|r| r.id == "literacy_rate").unwrap();
        assert_eq!(lit.gender_breakdown.unwrap().female, 70.3);
        assert_eq!(lit.rural_urban.unwrap().urban, 87.7);
    }

    #[test]
    fn test_parse_minimal_record() {
        let json = r#"{"id":"hdi","name":"HDI","value":0.64,"unit":"index","period":"2024",
                       "source":"UNDP","lastUpdated":"2024-12-01T00:00:00Z","trend":"up"}"#;
        let rec: IndicatorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.trend, Some(Trend::Up));
        assert!(rec.state_wise.is_empty());
        assert!(rec.ranking.is_none());
    }
}
