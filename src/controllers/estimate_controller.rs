use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::error::EstimatorError;
use crate::models::{Configuration, ConfigurationDraft, EstimationResult};
use crate::services::export_service;
use crate::shared_state::AppState;
use crate::store;

fn error_response(err: EstimatorError) -> Response {
    let status = match &err {
        EstimatorError::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EstimatorError::Fetch { .. } | EstimatorError::Shape(_) => StatusCode::BAD_GATEWAY,
        EstimatorError::Storage(_) | EstimatorError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Request failed ({}): {}", status, err);
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("No {} available", what)})),
    )
        .into_response()
}

/// GET /api/configuration
/// Get the stored configuration
#[utoipa::path(
    get,
    path = "/api/configuration",
    responses(
        (status = 200, description = "Stored configuration", body = Configuration),
        (status = 404, description = "No configuration stored")
    )
)]
pub async fn get_configuration(State(state): State<AppState>) -> impl IntoResponse {
    match store::load_configuration(state.store.as_ref()) {
        Some(config) => Json(config).into_response(),
        None => not_found("configuration"),
    }
}

/// PUT /api/configuration
/// Validate and store a configuration
///
/// Every field must be present and within bounds; nothing is defaulted.
#[utoipa::path(
    put,
    path = "/api/configuration",
    request_body = ConfigurationDraft,
    responses(
        (status = 200, description = "Configuration stored", body = Configuration),
        (status = 422, description = "Missing or out-of-bounds field")
    )
)]
pub async fn put_configuration(
    State(state): State<AppState>,
    Json(draft): Json<ConfigurationDraft>,
) -> impl IntoResponse {
    let config = match draft.into_configuration() {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match store::save_configuration(state.store.as_ref(), &config) {
        Ok(()) => Json(config).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/estimate
/// Run an estimation
///
/// Uses the configuration in the request body when one is sent (and stores
/// it), otherwise the stored configuration. Fetches historical daily weather,
/// computes the energy figures and stores the result.
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body(content = ConfigurationDraft, description = "Optional configuration; the stored one is used when empty"),
    responses(
        (status = 200, description = "Estimation result", body = EstimationResult),
        (status = 404, description = "No configuration supplied or stored"),
        (status = 422, description = "Invalid configuration"),
        (status = 502, description = "Weather source failed or answered unexpectedly")
    )
)]
pub async fn post_estimate(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let config = if body.iter().all(u8::is_ascii_whitespace) {
        match store::load_configuration(state.store.as_ref()) {
            Some(c) => c,
            None => return not_found("configuration"),
        }
    } else {
        let draft: ConfigurationDraft = match serde_json::from_slice(&body) {
            Ok(d) => d,
            Err(e) => {
                return error_response(EstimatorError::InvalidConfig(format!(
                    "unreadable configuration: {}",
                    e
                )));
            }
        };
        let config = match draft.into_configuration() {
            Ok(c) => c,
            Err(e) => return error_response(e),
        };
        if let Err(e) = store::save_configuration(state.store.as_ref(), &config) {
            return error_response(e);
        }
        config
    };

    match state.run_estimation(&config).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/results
/// Get the latest estimation result
#[utoipa::path(
    get,
    path = "/api/results",
    responses(
        (status = 200, description = "Latest estimation result", body = EstimationResult),
        (status = 404, description = "No result stored")
    )
)]
pub async fn get_results(State(state): State<AppState>) -> impl IntoResponse {
    match store::load_result(state.store.as_ref()) {
        Some(result) => Json(result).into_response(),
        None => not_found("estimation result"),
    }
}

/// GET /api/results/export.csv
/// Download the daily figures as CSV
///
/// Header block with location and period, then one `date,kwh` row per day.
#[utoipa::path(
    get,
    path = "/api/results/export.csv",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 404, description = "No result or configuration stored")
    )
)]
pub async fn export_results_csv(State(state): State<AppState>) -> impl IntoResponse {
    let Some(config) = store::load_configuration(state.store.as_ref()) else {
        return not_found("configuration");
    };
    let Some(result) = store::load_result(state.store.as_ref()) else {
        return not_found("estimation result");
    };
    match export_service::export_csv(&config, &result) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"solar-estimate.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
