pub mod configuration;
pub mod estimation;
pub mod weather;

pub use configuration::{Configuration, ConfigurationDraft};
pub use estimation::{Advisory, EstimationResult, KwhSeries};
pub use weather::{WeatherDataPoint, WeatherDataset};
