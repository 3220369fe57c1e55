//! Outbound persistence adapters backed by PostgreSQL/PostGIS.

mod diesel_field_repository;
mod geometry_sql;
mod models;
mod pool;
mod schema;

pub use diesel_field_repository::DieselFieldRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
