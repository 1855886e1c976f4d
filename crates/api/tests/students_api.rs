//! HTTP-level tests for the `/students` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_empty, post_json, register};
use serde_json::json;

fn display_names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|s| format!("{} {}", s["first_name"].as_str().unwrap(), s["last_name"].as_str().unwrap()))
        .collect()
}

#[tokio::test]
async fn registered_student_is_listed_in_name_order() {
    let (app, _, _) = build_test_app();
    register(&app, "Cara", "Evans", 3).await;
    let ana = register(&app, "Ana", "Diaz", 7).await;
    register(&app, "Ben", "Adams", 4).await;

    assert_eq!(ana["car_number"], 7);
    assert!(ana["id"].is_i64());

    let json = body_json(get(app.clone(), "/api/v1/students").await).await;
    assert_eq!(display_names(&json), vec!["Ben Adams", "Ana Diaz", "Cara Evans"]);

    let json = body_json(get(app, "/api/v1/students/by-car/7").await).await;
    assert_eq!(display_names(&json), vec!["Ana Diaz"]);
}

#[tokio::test]
async fn invalid_registration_is_a_validation_error() {
    let (app, _, _) = build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/students",
        json!({ "first_name": " ", "last_name": "Diaz", "car_number": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("car_number"), "{message}");
    assert!(message.contains("first_name"), "{message}");

    let json = body_json(get(app, "/api/v1/students").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_filters_by_name() {
    let (app, _, _) = build_test_app();
    register(&app, "Ana", "Diaz", 1).await;
    register(&app, "Ben", "Adams", 2).await;

    let json = body_json(get(app, "/api/v1/students?q=DIA").await).await;
    assert_eq!(display_names(&json), vec!["Ana Diaz"]);
}

#[tokio::test]
async fn unknown_car_has_no_students() {
    let (app, _, _) = build_test_app();
    let response = get(app, "/api/v1/students/by-car/99").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn impossible_car_numbers_have_no_students() {
    let (app, _, _) = build_test_app();
    register(&app, "Ana", "Diaz", 7).await;
    for path in ["/api/v1/students/by-car/0", "/api/v1/students/by-car/-5", "/api/v1/checkins/preview/0"] {
        let response = get(app.clone(), path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn seed_registers_demo_roster() {
    let (app, _, _) = build_test_app();
    let response = post_empty(app.clone(), "/api/v1/students/seed").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 30);

    let json = body_json(get(app, "/api/v1/students/by-car/15").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn store_outage_is_503() {
    let (app, _, store) = build_test_app();
    store.set_offline(true);

    let response = get(app, "/api/v1/students").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORE_UNAVAILABLE");
}
