//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, EstimateResponse};
use crate::config::ScenarioConfig;
use crate::model::battery::{BatterySpec, catalog};
use crate::model::rate_plan::RatePlan;
use crate::report::EstimateReport;

/// Runs an estimate for the posted scenario.
///
/// `POST /estimate` → 200 + `EstimateResponse` JSON
/// Invalid scenarios → 400 + `ErrorResponse` listing every failed constraint.
pub async fn post_estimate(Json(scenario): Json<ScenarioConfig>) -> impl IntoResponse {
    let errors = scenario.validate();
    if !errors.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                errors: errors.iter().map(ToString::to_string).collect(),
            }),
        ));
    }

    match EstimateReport::from_scenario(&scenario) {
        Ok(report) => Ok(Json(EstimateResponse::from(&report))),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                errors: vec![e.to_string()],
            }),
        )),
    }
}

/// Returns the built-in battery catalog.
///
/// `GET /batteries` → 200 + `Vec<BatterySpec>` JSON
pub async fn get_batteries() -> Json<Vec<BatterySpec>> {
    Json(catalog())
}

/// Returns the built-in rate plans.
///
/// `GET /plans` → 200 + `Vec<RatePlan>` JSON
pub async fn get_plans() -> Json<Vec<RatePlan>> {
    Json(
        RatePlan::BUILTIN
            .iter()
            .filter_map(|name| RatePlan::builtin(name))
            .collect(),
    )
}

/// Returns the server's base scenario.
///
/// `GET /scenario` → 200 + `ScenarioConfig` JSON
pub async fn get_scenario(State(state): State<Arc<AppState>>) -> Json<ScenarioConfig> {
    Json(state.scenario.clone())
}
