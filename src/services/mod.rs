pub mod export_service;
pub mod pv_model;
pub mod weather_service;
