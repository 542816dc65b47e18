//! Presentation helpers for a finished estimation: CSV export and the
//! KPI summary shown after a run.

use std::fmt;

use crate::error::{EstimatorError, Result};
use crate::models::{Configuration, EstimationResult};

/// Flat CSV table for download.
///
/// ```text
/// latitude,longitude,start_date,end_date
/// 51.5,-0.12,2024-06-01,2024-06-30
/// date,kwh
/// 2024-06-01,18.89
/// ```
pub fn export_csv(config: &Configuration, result: &EstimationResult) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let start = config.start_date.format("%Y-%m-%d").to_string();
    let end = config.end_date.format("%Y-%m-%d").to_string();
    writer
        .write_record(["latitude", "longitude", "start_date", "end_date"])
        .map_err(csv_error)?;
    writer
        .write_record([
            config.latitude.to_string(),
            config.longitude.to_string(),
            start,
            end,
        ])
        .map_err(csv_error)?;

    writer.write_record(["date", "kwh"]).map_err(csv_error)?;
    for (date, kwh) in result.daily_kwh.iter() {
        writer
            .write_record([date, format!("{:.2}", kwh).as_str()])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EstimatorError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EstimatorError::Export(e.to_string()))
}

fn csv_error(err: csv::Error) -> EstimatorError {
    EstimatorError::Export(err.to_string())
}

/// Headline figures of a run, as printed by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub annual_kwh: f64,
    pub avg_monthly_kwh: f64,
    pub avg_daily_kwh: f64,
    pub optimal_tilt_deg: f64,
    pub optimal_azimuth_deg: f64,
}

impl ResultSummary {
    pub fn new(config: &Configuration, result: &EstimationResult) -> Self {
        Self {
            latitude: config.latitude,
            longitude: config.longitude,
            start_date: config.start_date.format("%Y-%m-%d").to_string(),
            end_date: config.end_date.format("%Y-%m-%d").to_string(),
            annual_kwh: result.annual_kwh,
            avg_monthly_kwh: result.avg_monthly,
            avg_daily_kwh: result.avg_daily,
            optimal_tilt_deg: result.advisory.optimal_tilt_deg,
            optimal_azimuth_deg: result.advisory.optimal_azimuth_deg,
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "Location: {}, {} | Period: {} → {}",
            self.latitude, self.longitude, self.start_date, self.end_date
        )
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;
        writeln!(f, "Annual energy:       {:.0} kWh", self.annual_kwh)?;
        writeln!(f, "Avg monthly energy:  {:.0} kWh", self.avg_monthly_kwh)?;
        writeln!(f, "Avg daily energy:    {:.1} kWh", self.avg_daily_kwh)?;
        writeln!(f, "Advisory tilt:       {:.0}°", self.optimal_tilt_deg)?;
        write!(f, "Advisory azimuth:    {:.0}°", self.optimal_azimuth_deg)
    }
}
