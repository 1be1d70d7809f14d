#![cfg(feature = "api")]
//! Integration tests for the REST API surface.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use peakshave::api::{AppState, router};
use peakshave::config::ScenarioConfig;

fn make_app() -> axum::Router {
    router(Arc::new(AppState {
        scenario: ScenarioConfig::baseline(),
    }))
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn estimate_round_trip_with_full_scenario() {
    let app = make_app();

    let scenario = serde_json::to_string(&ScenarioConfig::ulo_arbitrage()).unwrap();
    let req = Request::builder()
        .method("POST")
        .uri("/estimate")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(scenario))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert!(json["annual_savings"].as_f64().unwrap() > 0.0);
    assert!(json["batt_grid_charged_kwh"].as_f64().unwrap() > 0.0);

    // Capped percentages close to 100
    let p = &json["offset_percentages"];
    let sum = p["solar_direct"].as_f64().unwrap()
        + p["solar_charged_battery"].as_f64().unwrap()
        + p["grid_charged_battery"].as_f64().unwrap()
        + p["grid_remaining"].as_f64().unwrap();
    assert!((sum - 100.0).abs() < 0.1);
}

#[tokio::test]
async fn estimate_rejects_invalid_scenario_with_field_paths() {
    let app = make_app();

    let req = Request::builder()
        .method("POST")
        .uri("/estimate")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"site": {"annual_usage_kwh": -5.0}, "plan": {"name": "tiered"}}"#,
        ))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = body_json(resp).await;
    let errors = json["errors"].as_array().unwrap();
    assert!(errors.len() >= 2);
    assert!(
        errors
            .iter()
            .any(|e| e.as_str().unwrap().contains("site.annual_usage_kwh"))
    );
}

#[tokio::test]
async fn batteries_and_plans_list_builtins() {
    let app = make_app();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/batteries")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let batteries = body_json(resp).await;
    assert!(batteries.as_array().unwrap().len() >= 3);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/plans")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let plans = body_json(resp).await;
    let names: Vec<&str> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"tou"));
    assert!(names.contains(&"ulo"));
}
