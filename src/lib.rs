//! PV energy yield estimation from historical daily weather.
//!
//! The pipeline is two steps: [`WeatherClient::fetch`] pulls daily
//! irradiance and temperature from the Open-Meteo archive, then
//! [`pv_model::estimate`] turns that series into daily, monthly and annual
//! energy figures for a [`Configuration`].

pub mod api_docs;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod shared_state;
pub mod store;

pub use error::{EstimatorError, Result};
pub use models::{
    Advisory, Configuration, ConfigurationDraft, EstimationResult, KwhSeries, WeatherDataPoint,
    WeatherDataset,
};
pub use services::pv_model;
pub use services::weather_service::WeatherClient;
