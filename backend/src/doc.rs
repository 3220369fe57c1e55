//! OpenAPI documentation configuration.
//!
//! Generates the OpenAPI specification for the REST API: all field and
//! imagery endpoints, the health probes, and the shared schemas. Swagger UI
//! serves the document in debug builds.

use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hectare API",
        description = "Geospatial field boundary service: polygon CRUD, spatial queries, and cached satellite thumbnails."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::fields::list_fields,
        crate::inbound::http::fields::get_field,
        crate::inbound::http::fields::create_field,
        crate::inbound::http::fields::update_field,
        crate::inbound::http::fields::delete_field,
        crate::inbound::http::imagery::fetch_satellite_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::inbound::http::fields::FieldResponseBody,
        crate::inbound::http::fields::FieldPageBody,
        crate::inbound::http::fields::CreateFieldRequestBody,
        crate::inbound::http::fields::UpdateFieldRequestBody,
        crate::inbound::http::fields::DeleteFieldResponseBody,
        crate::inbound::http::imagery::FetchImageRequestBody,
        crate::domain::Error,
        crate::domain::ErrorCode,
    )),
    tags(
        (name = "fields", description = "CRUD and spatial queries over field boundaries"),
        (name = "satellite", description = "Cached satellite thumbnail workflow"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
