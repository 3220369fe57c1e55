//! PostgreSQL-backed `FieldRepository` implementation using Diesel ORM.
//!
//! Spatial predicates run in PostGIS (`ST_Equals`, `ST_Intersects`); rows are
//! rebuilt through the validated domain constructors on the way out.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    FieldChanges, FieldListQuery, FieldPage, FieldRepository, FieldRepositoryError, NewField,
};
use crate::domain::{Boundary, DeletionScope, Field, FieldDraft};

use super::geometry_sql::{from_pg_polygon, st_equals, st_intersects, to_pg_polygon};
use super::models::{FieldChangeset, FieldRow, NewFieldRow};
use super::pool::{DbPool, PoolError};
use super::schema::fields;

/// Diesel-backed implementation of the field repository port.
#[derive(Clone)]
pub struct DieselFieldRepository {
    pool: DbPool,
}

impl DieselFieldRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> FieldRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    FieldRepositoryError::connection(message)
}

/// Map common Diesel error variants to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> FieldRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => FieldRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => FieldRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FieldRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => FieldRepositoryError::query("database error"),
        _ => FieldRepositoryError::query("database error"),
    }
}

/// Convert a database row into a validated domain field.
fn row_to_field(row: FieldRow) -> Result<Field, FieldRepositoryError> {
    let FieldRow {
        id,
        boundary,
        image_url,
        expiration_time,
        creation_date,
        deletion_date,
    } = row;

    let boundary = from_pg_polygon(&boundary)?;

    Field::new(FieldDraft {
        id,
        boundary,
        image_url,
        expiration_time,
        creation_date,
        deletion_date,
    })
    .map_err(|err| FieldRepositoryError::query(err.to_string()))
}

#[async_trait]
impl FieldRepository for DieselFieldRepository {
    async fn list(&self, query: FieldListQuery) -> Result<FieldPage, FieldRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let filter = query.boundary.as_ref().map(to_pg_polygon);

        // The count runs over the same filters but without the window, so
        // `total` reflects the full filtered set.
        let mut count_query = fields::table
            .select(diesel::dsl::count_star())
            .into_boxed();
        let mut rows_query = fields::table.select(FieldRow::as_select()).into_boxed();

        match query.scope {
            DeletionScope::ActiveOnly => {
                count_query = count_query.filter(fields::deletion_date.is_null());
                rows_query = rows_query.filter(fields::deletion_date.is_null());
            }
            DeletionScope::DeletedOnly => {
                count_query = count_query.filter(fields::deletion_date.is_not_null());
                rows_query = rows_query.filter(fields::deletion_date.is_not_null());
            }
            DeletionScope::All => {}
        }

        if let Some(geometry) = filter {
            count_query = count_query.filter(st_intersects(fields::boundary, geometry.clone()));
            rows_query = rows_query.filter(st_intersects(fields::boundary, geometry));
        }

        let total: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<FieldRow> = rows_query
            .order(fields::creation_date.desc())
            .limit(query.limit)
            .offset(query.offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let fields = rows
            .into_iter()
            .map(row_to_field)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FieldPage { fields, total })
    }

    async fn get(&self, id: Uuid, scope: DeletionScope) -> Result<Field, FieldRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = fields::table
            .select(FieldRow::as_select())
            .into_boxed()
            .filter(fields::id.eq(id));
        match scope {
            DeletionScope::ActiveOnly => {
                query = query.filter(fields::deletion_date.is_null());
            }
            DeletionScope::DeletedOnly => {
                query = query.filter(fields::deletion_date.is_not_null());
            }
            DeletionScope::All => {}
        }

        let row = query
            .first::<FieldRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.ok_or(FieldRepositoryError::NotFound { id })
            .and_then(row_to_field)
    }

    async fn find_by_boundary(
        &self,
        boundary: &Boundary,
    ) -> Result<Option<Field>, FieldRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = fields::table
            .select(FieldRow::as_select())
            .filter(fields::deletion_date.is_null())
            .filter(st_equals(fields::boundary, to_pg_polygon(boundary)))
            .order(fields::creation_date.desc())
            .first::<FieldRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_field).transpose()
    }

    async fn create(&self, field: NewField) -> Result<Field, FieldRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFieldRow {
            id: Uuid::new_v4(),
            boundary: to_pg_polygon(&field.boundary),
            image_url: field.image_url.as_deref(),
            expiration_time: field.expiration_time,
        };

        let row: FieldRow = diesel::insert_into(fields::table)
            .values(&new_row)
            .returning(FieldRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_field(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: FieldChanges,
    ) -> Result<Field, FieldRepositoryError> {
        if changes.is_empty() {
            return self.get(id, DeletionScope::All).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = FieldChangeset {
            boundary: changes.boundary.as_ref().map(to_pg_polygon),
            image_url: changes.image_url.as_deref(),
            expiration_time: changes.expiration_time,
        };

        let row = diesel::update(fields::table.filter(fields::id.eq(id)))
            .set(&changeset)
            .returning(FieldRow::as_returning())
            .get_result::<FieldRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.ok_or(FieldRepositoryError::NotFound { id })
            .and_then(row_to_field)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Field, FieldRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The active-only filter makes a second delete miss, so an already
        // deleted id reports NotFound rather than succeeding twice.
        let row = diesel::update(
            fields::table
                .filter(fields::id.eq(id))
                .filter(fields::deletion_date.is_null()),
        )
        .set(fields::deletion_date.eq(diesel::dsl::now))
        .returning(FieldRow::as_returning())
        .get_result::<FieldRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.ok_or(FieldRepositoryError::NotFound { id })
            .and_then(row_to_field)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::{TimeDelta, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::domain::{BOUNDARY_SRID, Boundary};
    use postgis_diesel::types::{Point, Polygon as PgPolygon};

    #[fixture]
    fn valid_row() -> FieldRow {
        let square = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]]
        });
        let boundary = Boundary::from_geojson(&square).expect("valid square");
        let created = Utc::now();
        FieldRow {
            id: Uuid::new_v4(),
            boundary: to_pg_polygon(&boundary),
            image_url: Some("https://img.invalid/a.png".to_owned()),
            expiration_time: created,
            creation_date: created,
            deletion_date: None,
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let pool_err = PoolError::checkout("connection refused");
        let repo_err = map_pool_error(pool_err);

        assert!(matches!(repo_err, FieldRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, FieldRepositoryError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_conversion_accepts_a_valid_row(valid_row: FieldRow) {
        let field = row_to_field(valid_row).expect("valid row converts");
        assert_eq!(field.image_url(), Some("https://img.invalid/a.png"));
        assert!(!field.is_deleted());
    }

    #[rstest]
    fn row_conversion_rejects_inverted_timestamps(mut valid_row: FieldRow) {
        valid_row.deletion_date = Some(valid_row.creation_date - TimeDelta::seconds(1));

        let error = row_to_field(valid_row).expect_err("invalid timestamps should fail");
        assert!(matches!(error, FieldRepositoryError::Query { .. }));
        assert!(error.to_string().contains("deletion"));
    }

    #[rstest]
    fn row_conversion_rejects_corrupted_geometry(mut valid_row: FieldRow) {
        valid_row.boundary = PgPolygon {
            rings: vec![vec![
                Point::new(0.0, 0.0, Some(BOUNDARY_SRID)),
                Point::new(4.0, 4.0, Some(BOUNDARY_SRID)),
                Point::new(4.0, 0.0, Some(BOUNDARY_SRID)),
                Point::new(0.0, 4.0, Some(BOUNDARY_SRID)),
                Point::new(0.0, 0.0, Some(BOUNDARY_SRID)),
            ]],
            srid: Some(BOUNDARY_SRID),
        };

        let error = row_to_field(valid_row).expect_err("bowtie must not leave the adapter");
        assert!(matches!(error, FieldRepositoryError::Query { .. }));
        assert!(error.to_string().contains("stored geometry rejected"));
    }
}
