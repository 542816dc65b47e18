use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Dataset handed to the estimator ─────────────────────────────────────────

/// One calendar day of historical weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataPoint {
    pub date_time: NaiveDate,
    /// Daily shortwave radiation sum (MJ/m²), `None` when upstream has no value
    #[serde(rename = "shortwaveRadiationMJm2")]
    pub shortwave_radiation_mj_m2: Option<f64>,
    /// Daily mean 2 m temperature (°C)
    pub temperature_c: Option<f64>,
}

/// Daily weather series for one location, in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataset {
    /// Latitude reported by the source (may be snapped to its grid cell)
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<WeatherDataPoint>,
}

// ─── Open-Meteo archive wire types ───────────────────────────────────────────

/// Raw archive response. Everything is optional here; the weather service
/// decides what is acceptable.
#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub daily: Option<ArchiveDaily>,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveDaily {
    pub time: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_series")]
    pub shortwave_radiation_sum: Option<Vec<Option<f64>>>,
    #[serde(default, deserialize_with = "lenient_series")]
    pub temperature_2m_mean: Option<Vec<Option<f64>>>,
}

/// Accepts an array of anything; entries that are not numbers become `None`.
/// A missing or non-array field yields `None` for the whole series.
fn lenient_series<'de, D>(deserializer: D) -> Result<Option<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(items.iter().map(|v| v.as_f64()).collect()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_daily_tolerates_nulls_and_junk() {
        let json = r#"{
            "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
            "shortwave_radiation_sum": [3.2, null, "n/a"],
            "temperature_2m_mean": 5
        }"#;
        let daily: ArchiveDaily = serde_json::from_str(json).unwrap();
        assert_eq!(daily.shortwave_radiation_sum, Some(vec![Some(3.2), None, None]));
        assert_eq!(daily.temperature_2m_mean, None);
    }

    #[test]
    fn test_archive_daily_missing_series() {
        let daily: ArchiveDaily = serde_json::from_str(r#"{"time": []}"#).unwrap();
        assert_eq!(daily.time, Some(vec![]));
        assert!(daily.shortwave_radiation_sum.is_none());
    }

    #[test]
    fn test_point_serializes_with_unit_suffix() {
        let point = WeatherDataPoint {
            date_time: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            shortwave_radiation_mj_m2: Some(20.0),
            temperature_c: None,
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["dateTime"], "2024-06-01");
        assert_eq!(value["shortwaveRadiationMJm2"], 20.0);
        assert!(value["temperatureC"].is_null());
    }
}
