//! Validated field boundary geometry.
//!
//! [`Boundary`] is the only geometry type the rest of the crate handles. Its
//! constructors guarantee the wrapped polygon is simple and non-self-
//! intersecting, so invalid geometry can never reach storage. Input arrives
//! as GeoJSON, storage speaks native geometry, and responses render back to
//! GeoJSON; the canonical textual form is well-known text in EPSG:4326.

use std::cmp::Ordering;

use geo::{Area, BooleanOps, LineString, Polygon};
use serde_json::{Value, json};
use thiserror::Error;
use wkt::ToWkt;

use super::boundary_validity;

/// Spatial reference for every boundary handled by the service.
pub const BOUNDARY_SRID: u32 = 4326;

/// Errors raised while turning client geometry into a [`Boundary`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The value does not have the GeoJSON Polygon shape at all.
    #[error("{field}: {message}")]
    InvalidShape {
        /// Name of the offending input field.
        field: String,
        /// What was wrong with the value's structure.
        message: String,
    },
    /// Structurally parseable, but topologically broken beyond repair scope.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry {
        /// The validity explanation produced by classification.
        reason: String,
    },
    /// A self-intersection survived the single dissolve attempt.
    #[error("geometry is self-intersecting and could not be repaired")]
    UnfixableSelfIntersection,
}

impl BoundaryError {
    /// Helper for structural shape violations.
    pub fn invalid_shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Helper for topological defects.
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

/// A validated simple polygon in EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary(Polygon<f64>);

impl Boundary {
    /// Decode, validate, and (when possible) repair a GeoJSON polygon.
    ///
    /// A topologically valid polygon passes through untouched. A polygon that
    /// is invalid *only* because of ring intersections gets exactly one
    /// repair attempt: a zero-distance dissolve that rebuilds the covered
    /// area, keeping the largest valid lobe. Anything else is rejected with
    /// the classifier's explanation.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::InvalidGeometry`] when decoding fails or the defect
    /// is not a self-intersection, [`BoundaryError::UnfixableSelfIntersection`]
    /// when the dissolve still yields no valid polygon.
    pub fn from_geojson(value: &Value) -> Result<Self, BoundaryError> {
        let geometry: geojson::Geometry = serde_json::from_value(value.clone())
            .map_err(|err| BoundaryError::invalid_geometry(format!("GeoJSON decode: {err}")))?;
        let polygon = Polygon::<f64>::try_from(geometry.value)
            .map_err(|err| BoundaryError::invalid_geometry(format!("GeoJSON decode: {err}")))?;

        let polygon = normalize(polygon);
        match boundary_validity::check(&polygon) {
            None => Ok(Self(polygon)),
            Some(defect) if defect.is_repairable() => dissolve(&polygon),
            Some(defect) => Err(BoundaryError::invalid_geometry(defect.to_string())),
        }
    }

    /// Revalidate a polygon coming back from storage. No repair is attempted:
    /// storage only ever receives valid geometry, so a defect here means the
    /// stored row was corrupted outside this service.
    ///
    /// # Errors
    ///
    /// [`BoundaryError::InvalidGeometry`] carrying the classification.
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self, BoundaryError> {
        let polygon = normalize(polygon);
        match boundary_validity::check(&polygon) {
            None => Ok(Self(polygon)),
            Some(defect) => Err(BoundaryError::invalid_geometry(defect.to_string())),
        }
    }

    /// Borrow the underlying polygon.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.0
    }

    /// Canonical well-known-text form, paired with [`BOUNDARY_SRID`].
    pub fn wkt_string(&self) -> String {
        self.0.wkt_string()
    }

    /// Render the boundary back to a GeoJSON Polygon value for responses.
    pub fn to_geojson(&self) -> Value {
        let ring = |line: &LineString<f64>| -> Vec<[f64; 2]> {
            line.coords().map(|c| [c.x, c.y]).collect()
        };
        let mut rings = vec![ring(self.0.exterior())];
        rings.extend(self.0.interiors().iter().map(ring));
        json!({ "type": "Polygon", "coordinates": rings })
    }
}

/// Drop repeated consecutive vertices so downstream segment checks never see
/// zero-length edges. Ring closure is preserved.
fn normalize(polygon: Polygon<f64>) -> Polygon<f64> {
    let (mut exterior, mut interiors) = polygon.into_inner();
    exterior.0.dedup();
    for ring in &mut interiors {
        ring.0.dedup();
    }
    Polygon::new(exterior, interiors)
}

/// One zero-distance dissolve attempt: a self-union resolves crossings by
/// reconstructing the covered area. A bowtie splits into its lobes; only the
/// largest valid lobe is kept, mirroring the data loss a zero buffer accepts.
fn dissolve(polygon: &Polygon<f64>) -> Result<Boundary, BoundaryError> {
    let parts = polygon.union(polygon);
    parts
        .0
        .into_iter()
        .map(normalize)
        .filter(|part| boundary_validity::check(part).is_none())
        .max_by(|a, b| {
            a.unsigned_area()
                .partial_cmp(&b.unsigned_area())
                .unwrap_or(Ordering::Equal)
        })
        .map(Boundary)
        .ok_or(BoundaryError::UnfixableSelfIntersection)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn square_geojson() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]]
        })
    }

    fn bowtie_geojson() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 4.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]]]
        })
    }

    #[rstest]
    fn valid_polygon_passes_through_unchanged() {
        let boundary = Boundary::from_geojson(&square_geojson()).expect("valid polygon");
        let expected = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (4.0, 0.0),
                (4.0, 4.0),
                (0.0, 4.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        assert_eq!(
            boundary.polygon(),
            &expected,
            "a valid polygon must not be rewritten by the repair path"
        );
        assert!(boundary.wkt_string().starts_with("POLYGON"));
    }

    #[rstest]
    fn bowtie_is_repaired_into_a_valid_polygon() {
        let repaired = Boundary::from_geojson(&bowtie_geojson()).expect("bowtie repairs");

        assert!(
            boundary_validity::check(repaired.polygon()).is_none(),
            "repair must produce a valid polygon"
        );
        let original = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (4.0, 4.0),
                (4.0, 0.0),
                (0.0, 4.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        assert_ne!(
            repaired.polygon(),
            &original,
            "repair must change the geometry"
        );
        assert!(repaired.polygon().unsigned_area() > 0.0);
    }

    #[rstest]
    fn collapsed_ring_is_rejected_with_a_typed_error() {
        let collapsed = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [0.0, 0.0]]]
        });
        let error = Boundary::from_geojson(&collapsed).expect_err("no area to recover");
        assert!(matches!(
            error,
            BoundaryError::UnfixableSelfIntersection | BoundaryError::InvalidGeometry { .. }
        ));
    }

    #[rstest]
    fn non_finite_coordinates_are_not_repaired() {
        let broken = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, null], [0.0, 0.0]]]
        });
        let error = Boundary::from_geojson(&broken).expect_err("broken coordinates");
        assert!(matches!(error, BoundaryError::InvalidGeometry { .. }));
    }

    #[rstest]
    fn too_few_points_are_rejected_from_geojson() {
        let stub = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        });
        let error = Boundary::from_geojson(&stub).expect_err("degenerate ring");
        assert!(matches!(error, BoundaryError::InvalidGeometry { .. }));
    }

    #[rstest]
    fn stored_geometry_defects_carry_the_explanation() {
        let stub = Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]), vec![]);
        let error = Boundary::from_polygon(stub).expect_err("undersized ring");
        let BoundaryError::InvalidGeometry { reason } = error else {
            panic!("expected InvalidGeometry, got {error:?}");
        };
        assert!(reason.contains("at least four positions"), "got: {reason}");
    }

    #[rstest]
    fn geojson_round_trip_preserves_the_polygon() {
        let boundary = Boundary::from_geojson(&square_geojson()).expect("valid polygon");
        let round_tripped =
            Boundary::from_geojson(&boundary.to_geojson()).expect("rendered GeoJSON stays valid");
        assert_eq!(boundary, round_tripped);
    }

    #[rstest]
    fn repeated_vertices_are_normalized_away() {
        let stuttering = json!({
            "type": "Polygon",
            "coordinates": [[
                [0.0, 0.0], [0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [4.0, 4.0],
                [0.0, 4.0], [0.0, 0.0]
            ]]
        });
        let boundary = Boundary::from_geojson(&stuttering).expect("duplicates are dropped");
        assert_eq!(boundary.polygon().exterior().0.len(), 5);
    }
}
