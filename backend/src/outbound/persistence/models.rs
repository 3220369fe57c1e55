//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use postgis_diesel::types::{Point, Polygon};
use uuid::Uuid;

use super::schema::fields;

/// Row struct for reading from the fields table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = fields)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FieldRow {
    pub id: Uuid,
    pub boundary: Polygon<Point>,
    pub image_url: Option<String>,
    pub expiration_time: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub deletion_date: Option<DateTime<Utc>>,
}

/// Insertable struct for creating new field records. `creation_date` and a
/// missing `expiration_time` fall back to the column defaults (`now()`).
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = fields)]
pub(crate) struct NewFieldRow<'a> {
    pub id: Uuid,
    pub boundary: Polygon<Point>,
    pub image_url: Option<&'a str>,
    pub expiration_time: Option<DateTime<Utc>>,
}

/// Changeset for partial updates; `None` members are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = fields)]
pub(crate) struct FieldChangeset<'a> {
    pub boundary: Option<Polygon<Point>>,
    pub image_url: Option<&'a str>,
    pub expiration_time: Option<DateTime<Utc>>,
}
