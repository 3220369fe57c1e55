//! Satellite imagery HTTP handler.
//!
//! ```text
//! POST /api/v1/satellite-image
//! ```

use actix_web::{post, web};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::FetchFieldImageRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::fields::FieldResponseBody;
use crate::inbound::http::state::HttpState;

/// Request body identifying the field by its boundary.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FetchImageRequestBody {
    /// Boundary polygon as GeoJSON.
    #[schema(value_type = Object)]
    pub boundary: Value,
}

/// Return the field for this boundary with a fresh satellite thumbnail.
///
/// Looks up an existing record by exact boundary match. A fresh record is
/// returned as-is; a stale or image-less one is refreshed through the
/// external provider; an unknown boundary creates a new record. Provider
/// failures commit nothing.
#[utoipa::path(
    post,
    path = "/api/v1/satellite-image",
    request_body = FetchImageRequestBody,
    responses(
        (status = 200, description = "Field with a fresh thumbnail", body = FieldResponseBody),
        (status = 400, description = "Invalid boundary", body = crate::domain::Error),
        (status = 502, description = "Imagery provider failure", body = crate::domain::Error)
    ),
    tags = ["satellite"],
    operation_id = "fetchSatelliteImage"
)]
#[post("/satellite-image")]
pub async fn fetch_satellite_image(
    state: web::Data<HttpState>,
    payload: web::Json<FetchImageRequestBody>,
) -> ApiResult<web::Json<FieldResponseBody>> {
    let field = state
        .imagery
        .find_or_fetch_image(FetchFieldImageRequest {
            boundary: payload.into_inner().boundary,
        })
        .await?;

    Ok(web::Json(FieldResponseBody::from(field)))
}

#[cfg(test)]
#[path = "imagery_tests.rs"]
mod tests;
