//! Tests for the field HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{
    SAMPLE_FIELD_ID, ScriptedPorts, sample_boundary_geojson, test_app,
};

#[actix_web::test]
async fn list_fields_returns_a_page_envelope() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/fields?limit=10&offset=0")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["items"][0]["id"], SAMPLE_FIELD_ID);
    assert_eq!(body["items"][0]["boundary"]["type"], "Polygon");
}

#[actix_web::test]
async fn list_fields_rejects_unknown_filter_values() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/fields?filter_by=archived")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "filter_by");
}

#[actix_web::test]
async fn list_fields_rejects_an_unparseable_boundary_filter() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/fields?boundary=%7Bnot-json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "boundary");
}

#[actix_web::test]
async fn get_field_maps_not_found_to_404() {
    let ports = ScriptedPorts::failing_with(
        crate::domain::Error::not_found("field 00000000-0000-0000-0000-000000000999 does not exist"),
    );
    let app = actix_test::init_service(test_app(Arc::new(ports))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/fields/00000000-0000-0000-0000-000000000999")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn create_field_round_trips_the_record() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/fields")
        .set_json(json!({ "boundary": sample_boundary_geojson() }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: FieldResponseBody = actix_test::read_body_json(response).await;
    assert_eq!(body.id.to_string(), SAMPLE_FIELD_ID);
    assert_eq!(body.boundary["type"], "Polygon");
    assert_eq!(body.image_url.as_deref(), Some("https://img.invalid/sample.png"));
    assert!(body.deletion_date.is_none());
}

#[actix_web::test]
async fn create_field_rejects_a_broken_expiration_timestamp() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/fields")
        .set_json(json!({
            "boundary": sample_boundary_geojson(),
            "expiration_time": "yesterday"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "expiration_time");
}

#[actix_web::test]
async fn update_field_returns_the_updated_record() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/fields/{SAMPLE_FIELD_ID}"))
        .set_json(json!({ "image_url": "https://img.invalid/other.png" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], SAMPLE_FIELD_ID);
}

#[actix_web::test]
async fn delete_field_confirms_the_soft_delete() {
    let app = actix_test::init_service(test_app(Arc::new(ScriptedPorts::default()))).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/fields/{SAMPLE_FIELD_ID}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: DeleteFieldResponseBody = actix_test::read_body_json(response).await;
    assert_eq!(body.message, "Field has been deleted successfully");
}
