use utoipa::OpenApi;
use crate::controllers::estimate_controller;
use crate::models::{configuration, estimation};

#[derive(OpenApi)]
#[openapi(
    paths(
        estimate_controller::get_configuration,
        estimate_controller::put_configuration,
        estimate_controller::post_estimate,
        estimate_controller::get_results,
        estimate_controller::export_results_csv
    ),
    components(
        schemas(
            configuration::Configuration,
            configuration::ConfigurationDraft,
            estimation::EstimationResult,
            estimation::Advisory
        )
    ),
    tags(
        (name = "pv-yield-estimator", description = "PV Yield Estimation API")
    )
)]
pub struct ApiDoc;
