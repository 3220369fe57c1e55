//! Field HTTP handlers.
//!
//! ```text
//! GET    /api/v1/fields
//! GET    /api/v1/fields/{id}
//! POST   /api/v1/fields
//! PATCH  /api/v1/fields/{id}
//! DELETE /api/v1/fields/{id}
//! ```

use actix_web::{delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::Field;
use crate::domain::ports::{
    CreateFieldRequest, GetFieldRequest, ListFieldsRequest, UpdateFieldRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    clamp_page, parse_boundary_param, parse_filter_by, parse_optional_rfc3339,
};

/// One field record as returned to clients. The stored geometry is rendered
/// back to GeoJSON; `expiration_time` stays internal to the imagery workflow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldResponseBody {
    /// Record identifier.
    pub id: Uuid,
    /// Boundary polygon as GeoJSON.
    #[schema(value_type = Object)]
    pub boundary: Value,
    /// Cached thumbnail reference, when one has been fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub creation_date: DateTime<Utc>,
    /// Soft-deletion timestamp, when deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_date: Option<DateTime<Utc>>,
}

impl From<Field> for FieldResponseBody {
    fn from(field: Field) -> Self {
        Self {
            id: field.id(),
            boundary: field.boundary().to_geojson(),
            image_url: field.image_url().map(str::to_owned),
            creation_date: field.creation_date(),
            deletion_date: field.deletion_date(),
        }
    }
}

/// Page envelope for field listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldPageBody {
    /// Records in the requested window, newest first.
    pub items: Vec<FieldResponseBody>,
    /// Size of the full filtered set, independent of the window.
    pub total: i64,
    /// Applied page size.
    pub limit: i64,
    /// Applied page start.
    pub offset: i64,
}

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFieldsQuery {
    /// JSON-encoded GeoJSON polygon restricting results to intersecting
    /// records.
    pub boundary: Option<String>,
    /// Soft-deletion visibility: unset (active only), `deleted`, or `all`.
    pub filter_by: Option<String>,
    /// Page size (default 50, capped at 100).
    pub limit: Option<i64>,
    /// Page start (default 0).
    pub offset: Option<i64>,
}

/// Query parameters for the point lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct GetFieldQuery {
    /// Whether soft-deleted records are visible to this lookup.
    #[serde(default)]
    pub include_deleted: bool,
}

/// Request body for creating a field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFieldRequestBody {
    /// Boundary polygon as GeoJSON.
    #[schema(value_type = Object)]
    pub boundary: Value,
    /// Optional pre-existing thumbnail reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Optional explicit expiry instant (RFC 3339).
    #[serde(default)]
    pub expiration_time: Option<String>,
}

/// Request body for partially updating a field. Absent members are left
/// untouched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFieldRequestBody {
    /// Replacement boundary polygon as GeoJSON.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub boundary: Option<Value>,
    /// Replacement thumbnail reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Replacement expiry instant (RFC 3339).
    #[serde(default)]
    pub expiration_time: Option<String>,
}

/// Confirmation payload for soft deletion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFieldResponseBody {
    /// Human-readable confirmation.
    pub message: String,
}

/// List fields newest-first with pagination, scope, and an optional spatial
/// filter.
#[utoipa::path(
    get,
    path = "/api/v1/fields",
    params(ListFieldsQuery),
    responses(
        (status = 200, description = "One page of fields", body = FieldPageBody),
        (status = 400, description = "Invalid query parameter", body = crate::domain::Error)
    ),
    tags = ["fields"],
    operation_id = "listFields"
)]
#[get("/fields")]
pub async fn list_fields(
    state: web::Data<HttpState>,
    query: web::Query<ListFieldsQuery>,
) -> ApiResult<web::Json<FieldPageBody>> {
    let query = query.into_inner();
    let scope = parse_filter_by(query.filter_by.as_deref())?;
    let boundary = parse_boundary_param(query.boundary.as_deref())?;
    let (limit, offset) = clamp_page(query.limit, query.offset)?;

    let response = state
        .queries
        .list_fields(ListFieldsRequest {
            boundary,
            scope,
            limit,
            offset,
        })
        .await?;

    Ok(web::Json(FieldPageBody {
        items: response
            .fields
            .into_iter()
            .map(FieldResponseBody::from)
            .collect(),
        total: response.total,
        limit,
        offset,
    }))
}

/// Fetch one field by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/fields/{id}",
    params(
        ("id" = Uuid, Path, description = "Field identifier"),
        GetFieldQuery
    ),
    responses(
        (status = 200, description = "The field", body = FieldResponseBody),
        (status = 404, description = "No field under the requested scope", body = crate::domain::Error)
    ),
    tags = ["fields"],
    operation_id = "getField"
)]
#[get("/fields/{id}")]
pub async fn get_field(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
    query: web::Query<GetFieldQuery>,
) -> ApiResult<web::Json<FieldResponseBody>> {
    let field = state
        .queries
        .get_field(GetFieldRequest {
            id: id.into_inner(),
            include_deleted: query.include_deleted,
        })
        .await?;

    Ok(web::Json(FieldResponseBody::from(field)))
}

/// Create a field from a GeoJSON boundary, repairing self-intersections
/// where possible.
#[utoipa::path(
    post,
    path = "/api/v1/fields",
    request_body = CreateFieldRequestBody,
    responses(
        (status = 200, description = "The created field", body = FieldResponseBody),
        (status = 400, description = "Invalid boundary", body = crate::domain::Error)
    ),
    tags = ["fields"],
    operation_id = "createField"
)]
#[post("/fields")]
pub async fn create_field(
    state: web::Data<HttpState>,
    payload: web::Json<CreateFieldRequestBody>,
) -> ApiResult<web::Json<FieldResponseBody>> {
    let payload = payload.into_inner();
    let expiration_time =
        parse_optional_rfc3339(payload.expiration_time.as_deref(), "expiration_time")?;

    let field = state
        .commands
        .create_field(CreateFieldRequest {
            boundary: payload.boundary,
            image_url: payload.image_url,
            expiration_time,
        })
        .await?;

    Ok(web::Json(FieldResponseBody::from(field)))
}

/// Partially update a field; a supplied boundary is revalidated and repaired
/// before assignment.
#[utoipa::path(
    patch,
    path = "/api/v1/fields/{id}",
    params(("id" = Uuid, Path, description = "Field identifier")),
    request_body = UpdateFieldRequestBody,
    responses(
        (status = 200, description = "The updated field", body = FieldResponseBody),
        (status = 400, description = "Invalid boundary", body = crate::domain::Error),
        (status = 404, description = "No such field", body = crate::domain::Error)
    ),
    tags = ["fields"],
    operation_id = "updateField"
)]
#[patch("/fields/{id}")]
pub async fn update_field(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateFieldRequestBody>,
) -> ApiResult<web::Json<FieldResponseBody>> {
    let payload = payload.into_inner();
    let expiration_time =
        parse_optional_rfc3339(payload.expiration_time.as_deref(), "expiration_time")?;

    let field = state
        .commands
        .update_field(UpdateFieldRequest {
            id: id.into_inner(),
            boundary: payload.boundary,
            image_url: payload.image_url,
            expiration_time,
        })
        .await?;

    Ok(web::Json(FieldResponseBody::from(field)))
}

/// Soft-delete a field. The record stays in storage and remains reachable
/// through the `deleted`/`all` scopes.
#[utoipa::path(
    delete,
    path = "/api/v1/fields/{id}",
    params(("id" = Uuid, Path, description = "Field identifier")),
    responses(
        (status = 200, description = "Deletion confirmation", body = DeleteFieldResponseBody),
        (status = 404, description = "No active field with this id", body = crate::domain::Error)
    ),
    tags = ["fields"],
    operation_id = "deleteField"
)]
#[delete("/fields/{id}")]
pub async fn delete_field(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<DeleteFieldResponseBody>> {
    state.commands.delete_field(id.into_inner()).await?;

    Ok(web::Json(DeleteFieldResponseBody {
        message: "Field has been deleted successfully".to_owned(),
    }))
}

#[cfg(test)]
#[path = "fields_tests.rs"]
mod tests;
