//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe what the domain expects from adapters (the spatial
//! store, the external imagery provider); driving ports are the use-cases
//! exposed to inbound adapters. Each driven trait has its own error enum so
//! adapters map failures into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::boundary::Boundary;
use super::error::Error as ApiError;
use super::field::{DeletionScope, Field};

/// Errors surfaced by the field repository adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldRepositoryError {
    /// No record with this identifier (under the scope that was queried).
    #[error("field {id} does not exist")]
    NotFound {
        /// The missing identifier.
        id: Uuid,
    },
    /// Database connectivity or pool failures.
    #[error("field repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failures that bubble up from the adapter.
    #[error("field repository query failed: {message}")]
    Query { message: String },
}

impl FieldRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Listing parameters for [`FieldRepository::list`].
#[derive(Debug, Clone)]
pub struct FieldListQuery {
    /// Restrict to records whose geometry spatially intersects this one.
    pub boundary: Option<Boundary>,
    /// Soft-deletion visibility.
    pub scope: DeletionScope,
    /// Page size.
    pub limit: i64,
    /// Page start.
    pub offset: i64,
}

/// One page of records plus the total count of the filtered set.
#[derive(Debug, Clone)]
pub struct FieldPage {
    /// Records in the requested window, newest first.
    pub fields: Vec<Field>,
    /// Size of the full filtered set, independent of the window.
    pub total: i64,
}

/// Data for creating a record. The boundary must already be validated.
#[derive(Debug, Clone)]
pub struct NewField {
    /// Validated boundary geometry.
    pub boundary: Boundary,
    /// Thumbnail reference, when the imagery workflow creates the record.
    pub image_url: Option<String>,
    /// Expiry for the thumbnail; storage defaults to the creation instant
    /// (immediately stale) when absent.
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Partial update: only supplied members are written.
#[derive(Debug, Clone, Default)]
pub struct FieldChanges {
    /// Replacement boundary, already validated/repaired.
    pub boundary: Option<Boundary>,
    /// Replacement thumbnail reference.
    pub image_url: Option<String>,
    /// Replacement expiry instant.
    pub expiration_time: Option<DateTime<Utc>>,
}

impl FieldChanges {
    /// Whether the change set carries no updates at all.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_none() && self.image_url.is_none() && self.expiration_time.is_none()
    }
}

/// Persistence port over geometry-bearing field records.
///
/// Implementations must support polygon equality and polygon intersection
/// predicates; every mutation is atomic at single-record granularity.
#[async_trait]
pub trait FieldRepository: Send + Sync {
    /// List records newest-first with an optional spatial filter.
    async fn list(&self, query: FieldListQuery) -> Result<FieldPage, FieldRepositoryError>;

    /// Point lookup honouring the deletion scope.
    async fn get(&self, id: Uuid, scope: DeletionScope) -> Result<Field, FieldRepositoryError>;

    /// Look up the active record whose stored geometry equals `boundary`
    /// under the store's spatial equality predicate.
    async fn find_by_boundary(
        &self,
        boundary: &Boundary,
    ) -> Result<Option<Field>, FieldRepositoryError>;

    /// Insert a record, assigning identifier and creation date.
    async fn create(&self, field: NewField) -> Result<Field, FieldRepositoryError>;

    /// Partially update a record, looked up across all scopes.
    async fn update(
        &self,
        id: Uuid,
        changes: FieldChanges,
    ) -> Result<Field, FieldRepositoryError>;

    /// Soft-delete an active record; deleting twice fails with `NotFound`.
    async fn soft_delete(&self, id: Uuid) -> Result<Field, FieldRepositoryError>;
}

/// Errors surfaced by the external thumbnail provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThumbnailSourceError {
    /// The provider did not answer within the configured timeout.
    #[error("thumbnail provider timed out: {message}")]
    Timeout { message: String },
    /// Connection-level failure reaching the provider.
    #[error("thumbnail provider transport failure: {message}")]
    Transport { message: String },
    /// The provider answered with a failure status.
    #[error("thumbnail provider rejected the request: {message}")]
    Upstream { message: String },
    /// The provider's response could not be decoded.
    #[error("thumbnail provider response could not be decoded: {message}")]
    Decode { message: String },
}

impl ThumbnailSourceError {
    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for upstream rejections.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// External imagery provider: given a boundary, return a thumbnail URL.
///
/// The call may be slow; adapters own the timeout and any retry policy. The
/// core never retries.
#[async_trait]
pub trait ThumbnailSource: Send + Sync {
    /// Fetch a thumbnail URL for the given boundary.
    async fn fetch_thumbnail(&self, boundary: &Boundary) -> Result<String, ThumbnailSourceError>;
}

/// Listing request from an inbound adapter; the boundary filter is still raw
/// GeoJSON at this point.
#[derive(Debug, Clone)]
pub struct ListFieldsRequest {
    /// Optional GeoJSON polygon to intersect against.
    pub boundary: Option<Value>,
    /// Soft-deletion visibility.
    pub scope: DeletionScope,
    /// Page size.
    pub limit: i64,
    /// Page start.
    pub offset: i64,
}

/// One page of records plus the total count.
#[derive(Debug, Clone)]
pub struct ListFieldsResponse {
    /// Records in the requested window.
    pub fields: Vec<Field>,
    /// Size of the full filtered set.
    pub total: i64,
}

/// Point-lookup request.
#[derive(Debug, Clone, Copy)]
pub struct GetFieldRequest {
    /// Record identifier.
    pub id: Uuid,
    /// Whether soft-deleted records are visible to this lookup.
    pub include_deleted: bool,
}

/// Creation request carrying raw GeoJSON.
#[derive(Debug, Clone)]
pub struct CreateFieldRequest {
    /// GeoJSON polygon.
    pub boundary: Value,
    /// Optional pre-existing thumbnail reference.
    pub image_url: Option<String>,
    /// Optional explicit expiry instant.
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Partial-update request carrying raw GeoJSON.
#[derive(Debug, Clone)]
pub struct UpdateFieldRequest {
    /// Record identifier.
    pub id: Uuid,
    /// Replacement GeoJSON polygon, revalidated before assignment.
    pub boundary: Option<Value>,
    /// Replacement thumbnail reference.
    pub image_url: Option<String>,
    /// Replacement expiry instant.
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Find-or-fetch request for the imagery workflow.
#[derive(Debug, Clone)]
pub struct FetchFieldImageRequest {
    /// GeoJSON polygon identifying the field.
    pub boundary: Value,
}

/// Read use-cases driving the HTTP layer.
#[async_trait]
pub trait FieldQuery: Send + Sync {
    /// List records with pagination, scope, and an optional spatial filter.
    async fn list_fields(&self, request: ListFieldsRequest)
    -> Result<ListFieldsResponse, ApiError>;

    /// Fetch one record by identifier.
    async fn get_field(&self, request: GetFieldRequest) -> Result<Field, ApiError>;
}

/// Write use-cases driving the HTTP layer.
#[async_trait]
pub trait FieldCommand: Send + Sync {
    /// Validate, repair, and persist a new record.
    async fn create_field(&self, request: CreateFieldRequest) -> Result<Field, ApiError>;

    /// Partially update a record, revalidating any supplied boundary.
    async fn update_field(&self, request: UpdateFieldRequest) -> Result<Field, ApiError>;

    /// Soft-delete an active record.
    async fn delete_field(&self, id: Uuid) -> Result<Field, ApiError>;
}

/// The find-or-fetch imagery use-case.
#[async_trait]
pub trait FieldImagery: Send + Sync {
    /// Return the record for this boundary with a fresh thumbnail, fetching
    /// or refreshing through the external provider as needed.
    async fn find_or_fetch_image(&self, request: FetchFieldImageRequest)
    -> Result<Field, ApiError>;
}
