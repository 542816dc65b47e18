use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::models::{Configuration, EstimationResult};
use crate::services::pv_model;
use crate::services::weather_service::WeatherClient;
use crate::store::{self, KeyValueStore};

/// Handles shared by the HTTP handlers and the CLI. Holds no per-request
/// data; every estimation fetches fresh weather and runs independently.
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherClient,
    pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
    pub fn new(weather: WeatherClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self { weather, store }
    }

    /// Fetch → estimate → persist. The configuration is validated before
    /// any request goes out.
    pub async fn run_estimation(&self, config: &Configuration) -> Result<EstimationResult> {
        config.validate()?;

        let dataset = self
            .weather
            .fetch(config.latitude, config.longitude, config.start_date, config.end_date)
            .await?;
        let result = pv_model::estimate(&dataset, config)?;
        store::save_result(self.store.as_ref(), &result)?;

        info!(
            "Estimation done for ({}, {}) {} → {}: annual {:.2} kWh",
            config.latitude, config.longitude, config.start_date, config.end_date, result.annual_kwh
        );
        Ok(result)
    }
}
