use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{Router, routing::get, response::Html};
use clap::{Parser, Subcommand};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use pv_yield_estimator::api_docs::ApiDoc;
use pv_yield_estimator::config::AppConfig;
use pv_yield_estimator::routes::estimate_routes::api_routes;
use pv_yield_estimator::services::export_service::{self, ResultSummary};
use pv_yield_estimator::shared_state::AppState;
use pv_yield_estimator::store;
use pv_yield_estimator::{ConfigurationDraft, WeatherClient};

/// PV energy yield estimation from historical weather
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Application configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Run one estimation and print the summary
    Estimate {
        /// JSON file with the system configuration (camelCase fields)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the daily figures as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    // 1. Load configuration
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // 2. Initialize shared state
    let weather = WeatherClient::new(&config.weather.base_url, config.weather.timeout())?;
    let state = AppState::new(weather, config.storage.open());

    match cli.command {
        Command::Serve => serve(&config, state).await,
        Command::Estimate { input, csv } => {
            estimate_once(&state, &input, csv.as_deref(), &mut std::io::stdout()).await
        }
    }
}

async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);
    info!("Weather archive: {}", config.weather.base_url);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .context("HTTP server failed")
}

async fn estimate_once(
    state: &AppState,
    input: &Path,
    csv: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let draft: ConfigurationDraft = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a configuration document", input.display()))?;
    let config = draft.into_configuration()?;

    store::save_configuration(state.store.as_ref(), &config)?;
    let result = state.run_estimation(&config).await?;

    writeln!(out, "{}", ResultSummary::new(&config, &result))?;

    if let Some(path) = csv {
        let table = export_service::export_csv(&config, &result)?;
        std::fs::write(path, table)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("CSV written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pv_yield_estimator::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn draft_json() -> serde_json::Value {
        json!({
            "latitude": 45.07, "longitude": 7.33,
            "systemCapacityKwp": 4, "tiltDeg": 30, "azimuthDeg": 0,
            "panelEfficiency": 0.2, "performanceRatio": 0.85,
            "startDate": "2024-06-01", "endDate": "2024-06-01"
        })
    }

    fn state_for(url: &str) -> AppState {
        AppState::new(WeatherClient::new(url, None).unwrap(), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["pv", "serve", "--config", "c.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("c.json"));
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from([
            "pv", "estimate", "--input", "d.json", "--config", "c.json", "--csv", "out.csv",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("c.json"));
        match cli.command {
            Command::Estimate { input, csv } => {
                assert_eq!(input, PathBuf::from("d.json"));
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
            }
            Command::Serve => panic!("expected estimate"),
        }
    }

    #[test]
    fn test_config_flag_defaults() {
        let cli = Cli::try_parse_from(["pv", "--config", "c.json", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("c.json"));
        let cli = Cli::try_parse_from(["pv", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[tokio::test]
    async fn test_estimate_once_persists_prints_and_writes_csv() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/archive")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "daily": {
                        "time": ["2024-06-01"],
                        "shortwave_radiation_sum": [20.0],
                        "temperature_2m_mean": [18.0]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("draft.json");
        std::fs::write(&input, draft_json().to_string()).unwrap();
        let csv_path = dir.path().join("out.csv");
        let state = state_for(&server.url());

        let mut out = Vec::new();
        estimate_once(&state, &input, Some(&csv_path), &mut out).await.unwrap();
        mock.assert_async().await;

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Location: 45.07, 7.33 | Period: 2024-06-01 → 2024-06-01\n"));
        assert!(printed.contains("Annual energy:       19 kWh"));

        let config = store::load_configuration(state.store.as_ref()).unwrap();
        assert_eq!(config.system_capacity_kwp, 4.0);
        let result = store::load_result(state.store.as_ref()).unwrap();
        assert_eq!(result.annual_kwh, 18.89);

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            csv,
            "latitude,longitude,start_date,end_date\n\
             45.07,7.33,2024-06-01,2024-06-01\n\
             date,kwh\n\
             2024-06-01,18.89\n"
        );
    }

    #[tokio::test]
    async fn test_estimate_once_without_csv_writes_nothing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/archive")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "daily": {
                        "time": ["2024-06-01"],
                        "shortwave_radiation_sum": [20.0],
                        "temperature_2m_mean": [18.0]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("draft.json");
        std::fs::write(&input, draft_json().to_string()).unwrap();
        let state = state_for(&server.url());

        let mut out = Vec::new();
        estimate_once(&state, &input, None, &mut out).await.unwrap();
        assert!(!out.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_estimate_once_rejects_invalid_draft() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("draft.json");
        let mut draft = draft_json();
        draft["performanceRatio"] = json!(1.5);
        std::fs::write(&input, draft.to_string()).unwrap();
        let state = state_for(&server.url());

        let mut out = Vec::new();
        let err = estimate_once(&state, &input, None, &mut out).await.unwrap_err();
        assert!(err.to_string().contains("performance"));
        assert!(out.is_empty());
        assert!(store::load_configuration(state.store.as_ref()).is_none());
        mock.assert_async().await;
    }
}
