use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{EstimatorError, Result};
use crate::models::weather::{ArchiveDaily, ArchiveResponse};
use crate::models::{WeatherDataPoint, WeatherDataset};

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com";

const DAILY_VARIABLES: &str = "shortwave_radiation_sum,temperature_2m_mean";

/// Open-Meteo historical archive client.
///
/// One request per call: no retry, no caching. Timeouts are left to the
/// underlying transport and only applied when configured.
#[derive(Clone, Debug)]
pub struct WeatherClient {
    base_url: String,
    client: Client,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| EstimatorError::Fetch {
            status: None,
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Daily irradiance and mean temperature for `[start_date, end_date]`, UTC.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<WeatherDataset> {
        let url = format!("{}/v1/archive", self.base_url);
        let start = start_date.format("%Y-%m-%d").to_string();
        let end = end_date.format("%Y-%m-%d").to_string();
        debug!(
            "Archive request: {} lat={} lon={} {} → {}",
            url, latitude, longitude, start, end
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("start_date", start),
                ("end_date", end),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Archive request failed: {}", e);
                EstimatorError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Archive returned status {}: {}", status, body);
            return Err(EstimatorError::Fetch {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let body = response.text().await?;
        let archive: ArchiveResponse = serde_json::from_str(&body)
            .map_err(|e| EstimatorError::Shape(format!("response is not the expected JSON: {}", e)))?;

        let dataset = into_dataset(archive, latitude, longitude, start_date, end_date)?;
        info!(
            "Fetched {} daily points for ({:.4}, {:.4})",
            dataset.points.len(),
            dataset.latitude,
            dataset.longitude
        );
        Ok(dataset)
    }
}

/// Checks the whole response before building anything, so a malformed
/// payload never yields a partial dataset.
fn into_dataset(
    archive: ArchiveResponse,
    latitude: f64,
    longitude: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<WeatherDataset> {
    let ArchiveDaily {
        time,
        shortwave_radiation_sum,
        temperature_2m_mean,
    } = archive
        .daily
        .ok_or_else(|| shape("missing daily"))?;

    let time = time.ok_or_else(|| shape("missing daily.time"))?;
    if time.is_empty() {
        return Err(shape("daily.time is empty"));
    }
    let radiation =
        shortwave_radiation_sum.ok_or_else(|| shape("missing daily.shortwave_radiation_sum"))?;
    let temperature =
        temperature_2m_mean.ok_or_else(|| shape("missing daily.temperature_2m_mean"))?;

    if radiation.len() != time.len() || temperature.len() != time.len() {
        return Err(shape(&format!(
            "daily arrays have mismatched lengths (time={}, shortwave_radiation_sum={}, temperature_2m_mean={})",
            time.len(),
            radiation.len(),
            temperature.len()
        )));
    }

    let dates = time
        .iter()
        .map(|t| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .map_err(|_| shape(&format!("daily.time entry {:?} is not a YYYY-MM-DD date", t)))
        })
        .collect::<Result<Vec<_>>>()?;

    let points = dates
        .into_iter()
        .zip(radiation)
        .zip(temperature)
        .map(|((date_time, g), t)| WeatherDataPoint {
            date_time,
            shortwave_radiation_mj_m2: g,
            temperature_c: t,
        })
        .collect();

    Ok(WeatherDataset {
        latitude: archive.latitude.unwrap_or(latitude),
        longitude: archive.longitude.unwrap_or(longitude),
        start_date,
        end_date,
        points,
    })
}

fn shape(message: &str) -> EstimatorError {
    EstimatorError::Shape(message.to_string())
}
