//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    CreateFieldRequest, FetchFieldImageRequest, FieldCommand, FieldImagery, FieldQuery,
    GetFieldRequest, ListFieldsRequest, ListFieldsResponse, UpdateFieldRequest,
};
use crate::domain::{Boundary, Error, Field, FieldDraft};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{fields, imagery};

pub(crate) const SAMPLE_FIELD_ID: &str = "00000000-0000-0000-0000-000000000101";

pub(crate) fn sample_boundary_geojson() -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]]
    })
}

pub(crate) fn sample_field() -> Field {
    let boundary =
        Boundary::from_geojson(&sample_boundary_geojson()).expect("sample boundary is valid");
    let created: DateTime<Utc> = DateTime::parse_from_rfc3339("2026-07-01T09:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc);
    Field::new(FieldDraft {
        id: SAMPLE_FIELD_ID.parse::<Uuid>().expect("valid UUID"),
        boundary,
        image_url: Some("https://img.invalid/sample.png".to_owned()),
        expiration_time: created,
        creation_date: created,
        deletion_date: None,
    })
    .expect("sample field is valid")
}

/// Port stub answering every use-case with one canned field, or failing with
/// one canned error when `error` is set.
pub(crate) struct ScriptedPorts {
    pub field: Field,
    pub error: Option<Error>,
}

impl Default for ScriptedPorts {
    fn default() -> Self {
        Self {
            field: sample_field(),
            error: None,
        }
    }
}

impl ScriptedPorts {
    pub(crate) fn failing_with(error: Error) -> Self {
        Self {
            field: sample_field(),
            error: Some(error),
        }
    }

    fn answer(&self) -> Result<Field, Error> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.field.clone()),
        }
    }
}

#[async_trait]
impl FieldQuery for ScriptedPorts {
    async fn list_fields(
        &self,
        _request: ListFieldsRequest,
    ) -> Result<ListFieldsResponse, Error> {
        self.answer().map(|field| ListFieldsResponse {
            fields: vec![field],
            total: 1,
        })
    }

    async fn get_field(&self, _request: GetFieldRequest) -> Result<Field, Error> {
        self.answer()
    }
}

#[async_trait]
impl FieldCommand for ScriptedPorts {
    async fn create_field(&self, _request: CreateFieldRequest) -> Result<Field, Error> {
        self.answer()
    }

    async fn update_field(&self, _request: UpdateFieldRequest) -> Result<Field, Error> {
        self.answer()
    }

    async fn delete_field(&self, _id: Uuid) -> Result<Field, Error> {
        self.answer()
    }
}

#[async_trait]
impl FieldImagery for ScriptedPorts {
    async fn find_or_fetch_image(
        &self,
        _request: FetchFieldImageRequest,
    ) -> Result<Field, Error> {
        self.answer()
    }
}

pub(crate) fn test_app(
    ports: Arc<ScriptedPorts>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(ports.clone(), ports.clone(), ports);
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(fields::list_fields)
            .service(fields::get_field)
            .service(fields::create_field)
            .service(fields::update_field)
            .service(fields::delete_field)
            .service(imagery::fetch_satellite_image),
    )
}
