//! Domain core: boundary geometry, the field aggregate, freshness policy,
//! ports, and the orchestrating service.
//!
//! Everything in here is transport- and storage-agnostic. Inbound adapters
//! speak to the driving ports in [`ports`]; outbound adapters implement the
//! driven ports. Geometry enters as GeoJSON, lives as a validated
//! [`Boundary`], and is rendered back to GeoJSON at the edge.

pub mod boundary;
pub mod boundary_validity;
pub mod error;
pub mod field;
pub mod field_service;
pub mod freshness;
pub mod geojson_shape;
pub mod ports;

pub use self::boundary::{BOUNDARY_SRID, Boundary, BoundaryError};
pub use self::error::{Error, ErrorCode};
pub use self::field::{DeletionScope, Field, FieldDraft, FieldValidationError};
pub use self::field_service::FieldService;
pub use self::freshness::{Freshness, FreshnessWindow};
