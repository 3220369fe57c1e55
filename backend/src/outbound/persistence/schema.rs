//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation. Regenerate or update by hand when
//! migrations change.

diesel::table! {
    use diesel::sql_types::*;
    use postgis_diesel::sql_types::Geometry;

    /// Field records: one polygon boundary plus cached thumbnail metadata.
    fields (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Polygon geometry in EPSG:4326, indexed with GiST.
        boundary -> Geometry,
        /// Cached thumbnail reference, when fetched.
        image_url -> Nullable<Text>,
        /// Instant after which the thumbnail is stale; defaults to `now()`.
        expiration_time -> Timestamptz,
        /// Record creation timestamp, server-assigned.
        creation_date -> Timestamptz,
        /// Soft-deletion marker.
        deletion_date -> Nullable<Timestamptz>,
    }
}
