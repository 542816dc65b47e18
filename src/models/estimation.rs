use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Output of one estimation run. Persisted as-is for the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    /// Energy per day (kWh), keyed by `YYYY-MM-DD`, in dataset order
    #[serde(rename = "dailyKWh")]
    #[schema(value_type = Object)]
    pub daily_kwh: KwhSeries,
    /// Energy per month (kWh), keyed by `YYYY-MM`, in order of first appearance
    #[serde(rename = "monthlyKWh")]
    #[schema(value_type = Object)]
    pub monthly_kwh: KwhSeries,
    #[serde(rename = "annualKWh")]
    pub annual_kwh: f64,
    pub avg_daily: f64,
    pub avg_monthly: f64,
    pub advisory: Advisory,
}

/// Orientation advice. Currently an echo of the configured orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub optimal_tilt_deg: f64,
    pub optimal_azimuth_deg: f64,
}

/// Insertion-ordered `label → kWh` map.
///
/// Serialized as a JSON object whose key order is the insertion order.
/// Re-inserting an existing label overwrites the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KwhSeries(IndexMap<String, f64>);

impl KwhSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: f64) {
        self.0.insert(label.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }
}
