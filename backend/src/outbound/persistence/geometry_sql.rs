//! PostGIS glue: spatial predicates and geometry conversions.
//!
//! The domain's [`Boundary`] travels to the database as an EWKB polygon via
//! `postgis_diesel`; rows coming back are revalidated through
//! [`Boundary::from_polygon`], so corruption introduced outside this service
//! surfaces as a typed error instead of leaking invalid geometry.

use geo::{Coord, LineString, Polygon as GeoPolygon};
use postgis_diesel::sql_types::Geometry;
use postgis_diesel::types::{Point, Polygon as PgPolygon};

use crate::domain::ports::FieldRepositoryError;
use crate::domain::{BOUNDARY_SRID, Boundary};

diesel::define_sql_function! {
    /// PostGIS spatial equality predicate.
    #[sql_name = "ST_Equals"]
    fn st_equals(left: Geometry, right: Geometry) -> diesel::sql_types::Bool;
}

diesel::define_sql_function! {
    /// PostGIS spatial intersection predicate.
    #[sql_name = "ST_Intersects"]
    fn st_intersects(left: Geometry, right: Geometry) -> diesel::sql_types::Bool;
}

/// Convert a validated boundary to its database representation.
pub(crate) fn to_pg_polygon(boundary: &Boundary) -> PgPolygon<Point> {
    let ring = |line: &LineString<f64>| -> Vec<Point> {
        line.coords()
            .map(|c| Point::new(c.x, c.y, Some(BOUNDARY_SRID)))
            .collect()
    };

    let polygon = boundary.polygon();
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));

    PgPolygon {
        rings,
        srid: Some(BOUNDARY_SRID),
    }
}

/// Convert a stored polygon back to a validated boundary.
pub(crate) fn from_pg_polygon(polygon: &PgPolygon<Point>) -> Result<Boundary, FieldRepositoryError> {
    let mut rings = polygon.rings.iter().map(|ring| {
        LineString::from(
            ring.iter()
                .map(|point| Coord {
                    x: point.x,
                    y: point.y,
                })
                .collect::<Vec<_>>(),
        )
    });

    let exterior = rings
        .next()
        .ok_or_else(|| FieldRepositoryError::query("stored geometry has no rings"))?;
    let interiors: Vec<_> = rings.collect();

    Boundary::from_polygon(GeoPolygon::new(exterior, interiors))
        .map_err(|err| FieldRepositoryError::query(format!("stored geometry rejected: {err}")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn boundary() -> Boundary {
        let square = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]]
        });
        Boundary::from_geojson(&square).expect("valid square")
    }

    #[rstest]
    fn conversion_tags_the_fixed_srid() {
        let stored = to_pg_polygon(&boundary());
        assert_eq!(stored.srid, Some(BOUNDARY_SRID));
        assert_eq!(stored.rings.len(), 1);
        assert_eq!(stored.rings[0].len(), 5);
    }

    #[rstest]
    fn round_trip_preserves_the_boundary() {
        let original = boundary();
        let restored =
            from_pg_polygon(&to_pg_polygon(&original)).expect("stored geometry stays valid");
        assert_eq!(restored, original);
    }

    #[rstest]
    fn empty_geometry_is_rejected() {
        let empty = PgPolygon {
            rings: Vec::new(),
            srid: Some(BOUNDARY_SRID),
        };
        let error = from_pg_polygon(&empty).expect_err("no rings");
        assert!(matches!(error, FieldRepositoryError::Query { .. }));
    }
}
