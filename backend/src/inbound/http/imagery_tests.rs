//! Tests for the satellite imagery HTTP handler.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    SAMPLE_FIELD_ID, ScriptedPorts, sample_boundary_geojson, test_app,
};

#[actix_web::test]
async fn returns_the_field_with_its_thumbnail() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/satellite-image")
        .set_json(json!({ "boundary": sample_boundary_geojson() }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], SAMPLE_FIELD_ID);
    assert_eq!(body["image_url"], "https://img.invalid/sample.png");
}

#[actix_web::test]
async fn provider_failures_surface_as_bad_gateway() {
    let ports = ScriptedPorts::failing_with(crate::domain::Error::upstream(
        "thumbnail provider failure: status 503",
    ));
    let app = actix_test::init_service(test_app(Arc::new(ports))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/satellite-image")
        .set_json(json!({ "boundary": sample_boundary_geojson() }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "upstream_error");
}

#[actix_web::test]
async fn rejects_bodies_without_a_boundary() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/satellite-image")
        .set_json(json!({ "shape": "circle" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
