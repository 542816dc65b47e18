use axum::{routing::{get, post}, Router};
use crate::controllers::estimate_controller::{
    // Configuration
    get_configuration, put_configuration,
    // Pipeline
    post_estimate,
    // Results & export
    get_results, export_results_csv,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/configuration",       get(get_configuration).put(put_configuration))
        .route("/estimate",            post(post_estimate))
        .route("/results",             get(get_results))
        .route("/results/export.csv",  get(export_results_csv))
        .with_state(state)
}
