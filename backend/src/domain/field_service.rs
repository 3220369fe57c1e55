//! Field domain service.
//!
//! Composes geometry validation/repair, the spatial store, the freshness
//! policy, and the external imagery provider into the CRUD and find-or-fetch
//! use-cases. All time flows through the injected clock; freshness state
//! lives entirely in the persisted record, so the store is the single
//! synchronization point.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use super::boundary::{Boundary, BoundaryError};
use super::error::Error;
use super::field::{DeletionScope, Field};
use super::freshness::{self, Freshness, FreshnessWindow};
use super::geojson_shape;
use super::ports::{
    CreateFieldRequest, FetchFieldImageRequest, FieldChanges, FieldCommand, FieldImagery,
    FieldListQuery, FieldQuery, FieldRepository, FieldRepositoryError, GetFieldRequest,
    ListFieldsRequest, ListFieldsResponse, NewField, ThumbnailSource, ThumbnailSourceError,
    UpdateFieldRequest,
};

fn map_repository_error(error: FieldRepositoryError) -> Error {
    match error {
        FieldRepositoryError::NotFound { id } => {
            Error::not_found(format!("field {id} does not exist")).with_details(json!({ "id": id }))
        }
        FieldRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("field repository unavailable: {message}"))
        }
        FieldRepositoryError::Query { message } => {
            Error::internal(format!("field repository error: {message}"))
        }
    }
}

fn map_boundary_error(error: BoundaryError) -> Error {
    let (field, code) = match &error {
        BoundaryError::InvalidShape { field, .. } => (field.clone(), "invalid_shape"),
        BoundaryError::InvalidGeometry { .. } => ("boundary".to_owned(), "invalid_geometry"),
        BoundaryError::UnfixableSelfIntersection => {
            ("boundary".to_owned(), "unfixable_self_intersection")
        }
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn map_thumbnail_error(error: ThumbnailSourceError) -> Error {
    Error::upstream(format!("thumbnail provider failure: {error}"))
}

/// Validate the GeoJSON shape contract, then parse and repair the geometry.
fn accept_boundary(value: &Value, field: &str) -> Result<Boundary, Error> {
    geojson_shape::validate_polygon_shape(value, field).map_err(map_boundary_error)?;
    Boundary::from_geojson(value).map_err(map_boundary_error)
}

/// Optional-field variant: absent boundaries pass through untouched.
fn accept_optional_boundary(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<Boundary>, Error> {
    match geojson_shape::validate_optional_polygon_shape(value, field)
        .map_err(map_boundary_error)?
    {
        None => Ok(None),
        Some(raw) => Boundary::from_geojson(raw).map_err(map_boundary_error).map(Some),
    }
}

/// Service implementing the field command, query, and imagery driving ports.
#[derive(Clone)]
pub struct FieldService<R, S> {
    repository: Arc<R>,
    thumbnails: Arc<S>,
    clock: Arc<dyn Clock>,
    freshness_window: FreshnessWindow,
}

impl<R, S> FieldService<R, S> {
    /// Create a service over a repository, a thumbnail source, and a clock.
    pub fn new(
        repository: Arc<R>,
        thumbnails: Arc<S>,
        clock: Arc<dyn Clock>,
        freshness_window: FreshnessWindow,
    ) -> Self {
        Self {
            repository,
            thumbnails,
            clock,
            freshness_window,
        }
    }
}

#[async_trait]
impl<R, S> FieldQuery for FieldService<R, S>
where
    R: FieldRepository,
    S: ThumbnailSource,
{
    async fn list_fields(
        &self,
        request: ListFieldsRequest,
    ) -> Result<ListFieldsResponse, Error> {
        let boundary = accept_optional_boundary(request.boundary.as_ref(), "boundary")?;

        let page = self
            .repository
            .list(FieldListQuery {
                boundary,
                scope: request.scope,
                limit: request.limit,
                offset: request.offset,
            })
            .await
            .map_err(map_repository_error)?;

        Ok(ListFieldsResponse {
            fields: page.fields,
            total: page.total,
        })
    }

    async fn get_field(&self, request: GetFieldRequest) -> Result<Field, Error> {
        self.repository
            .get(request.id, DeletionScope::for_lookup(request.include_deleted))
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R, S> FieldCommand for FieldService<R, S>
where
    R: FieldRepository,
    S: ThumbnailSource,
{
    async fn create_field(&self, request: CreateFieldRequest) -> Result<Field, Error> {
        let boundary = accept_boundary(&request.boundary, "boundary")?;
        self.repository
            .create(NewField {
                boundary,
                image_url: request.image_url,
                expiration_time: request.expiration_time,
            })
            .await
            .map_err(map_repository_error)
    }

    async fn update_field(&self, request: UpdateFieldRequest) -> Result<Field, Error> {
        let boundary = accept_optional_boundary(request.boundary.as_ref(), "boundary")?;

        let changes = FieldChanges {
            boundary,
            image_url: request.image_url,
            expiration_time: request.expiration_time,
        };
        if changes.is_empty() {
            // Nothing to write; a partial update of zero fields is a read.
            return self
                .repository
                .get(request.id, DeletionScope::All)
                .await
                .map_err(map_repository_error);
        }

        self.repository
            .update(request.id, changes)
            .await
            .map_err(map_repository_error)
    }

    async fn delete_field(&self, id: Uuid) -> Result<Field, Error> {
        self.repository
            .soft_delete(id)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R, S> FieldImagery for FieldService<R, S>
where
    R: FieldRepository,
    S: ThumbnailSource,
{
    async fn find_or_fetch_image(
        &self,
        request: FetchFieldImageRequest,
    ) -> Result<Field, Error> {
        let boundary = accept_boundary(&request.boundary, "boundary")?;

        let existing = self
            .repository
            .find_by_boundary(&boundary)
            .await
            .map_err(map_repository_error)?;

        let now = self.clock.utc();
        match existing {
            Some(field) => {
                match freshness::evaluate(field.image_url(), field.expiration_time(), now) {
                    Freshness::Fresh => Ok(field),
                    Freshness::Stale => {
                        // Provider failure leaves the record at its prior,
                        // stale state; nothing has been written yet.
                        let image_url = self
                            .thumbnails
                            .fetch_thumbnail(&boundary)
                            .await
                            .map_err(map_thumbnail_error)?;
                        debug!(field_id = %field.id(), "refreshing stale thumbnail");
                        self.repository
                            .update(
                                field.id(),
                                FieldChanges {
                                    boundary: None,
                                    image_url: Some(image_url),
                                    expiration_time: Some(
                                        self.freshness_window.expiry_after(now),
                                    ),
                                },
                            )
                            .await
                            .map_err(map_repository_error)
                    }
                }
            }
            None => {
                // Fetch before create so a provider failure commits nothing.
                let image_url = self
                    .thumbnails
                    .fetch_thumbnail(&boundary)
                    .await
                    .map_err(map_thumbnail_error)?;
                debug!("creating field for previously unseen boundary");
                self.repository
                    .create(NewField {
                        boundary,
                        image_url: Some(image_url),
                        expiration_time: Some(self.freshness_window.expiry_after(now)),
                    })
                    .await
                    .map_err(map_repository_error)
            }
        }
    }
}

#[cfg(test)]
#[path = "field_service_tests.rs"]
mod tests;
