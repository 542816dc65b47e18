use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EstimatorError, Result};

/// Fully-present, bounds-checked PV system configuration.
///
/// Built once from user input and passed by reference into the pipeline.
/// The estimator re-checks it with [`Configuration::validate`] because the
/// fields are public and a caller may assemble one by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Site latitude (−90 … +90)
    pub latitude: f64,
    /// Site longitude (−180 … +180)
    pub longitude: f64,
    /// Installed capacity (kWp), assumed net of panel efficiency
    pub system_capacity_kwp: f64,
    /// Panel tilt from horizontal (0 … 90°)
    pub tilt_deg: f64,
    /// Panel azimuth (−180 … +180°)
    pub azimuth_deg: f64,
    /// Module efficiency (0 … 1]. Kept for later model refinement, not used
    /// by the daily energy formula.
    pub panel_efficiency: f64,
    /// System derating factor (0 … 1]
    pub performance_ratio: f64,
    /// First day of the period (inclusive)
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive)
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

impl Configuration {
    /// Bounds part of the validity predicate. Non-finite numbers are rejected
    /// the same way as missing ones.
    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("systemCapacityKwp", self.system_capacity_kwp),
            ("tiltDeg", self.tilt_deg),
            ("azimuthDeg", self.azimuth_deg),
            ("panelEfficiency", self.panel_efficiency),
            ("performanceRatio", self.performance_ratio),
        ];
        if let Some((field, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{} must be a finite number", field)));
        }

        check_range("latitude", self.latitude, -90.0, 90.0)?;
        check_range("longitude", self.longitude, -180.0, 180.0)?;
        if self.system_capacity_kwp <= 0.0 {
            return Err(invalid("systemCapacityKwp must be > 0".to_string()));
        }
        check_range("tiltDeg", self.tilt_deg, 0.0, 90.0)?;
        check_range("azimuthDeg", self.azimuth_deg, -180.0, 180.0)?;
        check_unit_interval("panelEfficiency", self.panel_efficiency)?;
        check_unit_interval("performanceRatio", self.performance_ratio)?;

        if self.start_date > self.end_date {
            return Err(invalid(format!(
                "startDate {} is after endDate {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

/// Configuration as produced by the input page: any field may still be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationDraft {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub system_capacity_kwp: Option<f64>,
    pub tilt_deg: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub panel_efficiency: Option<f64>,
    pub performance_ratio: Option<f64>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
}

impl ConfigurationDraft {
    /// Presence check followed by the bounds check. Either every field is
    /// usable or the whole draft is rejected; nothing is defaulted.
    pub fn into_configuration(self) -> Result<Configuration> {
        let config = Configuration {
            latitude: require_number("latitude", self.latitude)?,
            longitude: require_number("longitude", self.longitude)?,
            system_capacity_kwp: require_number("systemCapacityKwp", self.system_capacity_kwp)?,
            tilt_deg: require_number("tiltDeg", self.tilt_deg)?,
            azimuth_deg: require_number("azimuthDeg", self.azimuth_deg)?,
            panel_efficiency: require_number("panelEfficiency", self.panel_efficiency)?,
            performance_ratio: require_number("performanceRatio", self.performance_ratio)?,
            start_date: self.start_date.ok_or_else(|| missing("startDate"))?,
            end_date: self.end_date.ok_or_else(|| missing("endDate"))?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&Configuration> for ConfigurationDraft {
    fn from(config: &Configuration) -> Self {
        Self {
            latitude: Some(config.latitude),
            longitude: Some(config.longitude),
            system_capacity_kwp: Some(config.system_capacity_kwp),
            tilt_deg: Some(config.tilt_deg),
            azimuth_deg: Some(config.azimuth_deg),
            panel_efficiency: Some(config.panel_efficiency),
            performance_ratio: Some(config.performance_ratio),
            start_date: Some(config.start_date),
            end_date: Some(config.end_date),
        }
    }
}

fn require_number(field: &str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(missing(field)),
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(format!(
            "{} must be within [{}, {}], got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

// (0, 1]
fn check_unit_interval(field: &str, value: f64) -> Result<()> {
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(format!(
            "{} must be within (0, 1], got {}",
            field, value
        )));
    }
    Ok(())
}

fn missing(field: &str) -> EstimatorError {
    invalid(format!("{} is required", field))
}

fn invalid(message: String) -> EstimatorError {
    EstimatorError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june_draft() -> ConfigurationDraft {
        ConfigurationDraft {
            latitude: Some(51.5),
            longitude: Some(-0.12),
            system_capacity_kwp: Some(4.0),
            tilt_deg: Some(30.0),
            azimuth_deg: Some(0.0),
            panel_efficiency: Some(0.2),
            performance_ratio: Some(0.85),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        }
    }

    fn assert_invalid(draft: ConfigurationDraft, needle: &str) {
        match draft.into_configuration() {
            Err(EstimatorError::InvalidConfig(msg)) => {
                assert!(msg.contains(needle), "message {:?} should mention {:?}", msg, needle)
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_draft_converts() {
        let config = june_draft().into_configuration().unwrap();
        assert_eq!(config.system_capacity_kwp, 4.0);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut draft = june_draft();
        draft.panel_efficiency = None;
        assert_invalid(draft, "panelEfficiency");

        let mut draft = june_draft();
        draft.end_date = None;
        assert_invalid(draft, "endDate");
    }

    #[test]
    fn test_non_finite_counts_as_missing() {
        let mut draft = june_draft();
        draft.latitude = Some(f64::NAN);
        assert_invalid(draft, "latitude is required");
    }

    #[test]
    fn test_bounds_rejected() {
        let mut draft = june_draft();
        draft.latitude = Some(90.5);
        assert_invalid(draft, "latitude");

        let mut draft = june_draft();
        draft.system_capacity_kwp = Some(0.0);
        assert_invalid(draft, "systemCapacityKwp");

        let mut draft = june_draft();
        draft.tilt_deg = Some(-1.0);
        assert_invalid(draft, "tiltDeg");

        let mut draft = june_draft();
        draft.azimuth_deg = Some(181.0);
        assert_invalid(draft, "azimuthDeg");

        let mut draft = june_draft();
        draft.performance_ratio = Some(1.5);
        assert_invalid(draft, "performanceRatio");
    }

    #[test]
    fn test_inclusive_bounds_accepted() {
        let mut draft = june_draft();
        draft.latitude = Some(-90.0);
        draft.longitude = Some(180.0);
        draft.tilt_deg = Some(90.0);
        draft.azimuth_deg = Some(-180.0);
        draft.panel_efficiency = Some(1.0);
        draft.performance_ratio = Some(1.0);
        draft.end_date = draft.start_date;
        assert!(draft.into_configuration().is_ok());
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let mut draft = june_draft();
        draft.start_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        assert_invalid(draft, "after endDate");
    }

    #[test]
    fn test_draft_json_uses_camel_case_and_nulls() {
        let json = r#"{
            "latitude": 51.5, "longitude": -0.12,
            "systemCapacityKwp": 4, "tiltDeg": null, "azimuthDeg": 0,
            "panelEfficiency": 0.2, "performanceRatio": 0.85,
            "startDate": "2024-06-01", "endDate": "2024-06-30"
        }"#;
        let draft: ConfigurationDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.system_capacity_kwp, Some(4.0));
        assert_eq!(draft.tilt_deg, None);
        assert_invalid(draft, "tiltDeg");
    }

    #[test]
    fn test_configuration_json_round_trip_keeps_field_names() {
        let config = june_draft().into_configuration().unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["systemCapacityKwp"], 4.0);
        assert_eq!(value["startDate"], "2024-06-01");
        let back: Configuration = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
