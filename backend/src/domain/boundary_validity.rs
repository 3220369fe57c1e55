//! Polygon validity classification.
//!
//! The repair path in [`crate::domain::Boundary`] needs to know *why* a
//! polygon is invalid before deciding whether a repair attempt is worthwhile:
//! self-intersections can be dissolved, everything else is a hard reject.
//! This module walks every ring pair and reports the first defect found.

use std::fmt;

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Area, Coord, Line, LineString, Polygon};

/// Which ring of the polygon a defect was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingRole {
    /// The outer shell.
    Exterior,
    /// An inner hole, identified by its position in the interiors list.
    Interior(usize),
}

impl fmt::Display for RingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exterior => write!(f, "exterior ring"),
            Self::Interior(index) => write!(f, "interior ring {index}"),
        }
    }
}

/// First defect found while validating a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidity {
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate(RingRole),
    /// A ring has fewer than four positions (including the closing one).
    TooFewPoints(RingRole),
    /// A ring crosses or touches itself away from adjacent vertices.
    SelfIntersection(RingRole),
    /// Two distinct rings cross or overlap each other.
    RingsIntersect(RingRole, RingRole),
    /// The shell encloses no area at all.
    ZeroArea,
}

impl Invalidity {
    /// Whether a zero-distance dissolve has a chance of fixing the defect.
    pub fn is_repairable(self) -> bool {
        matches!(self, Self::SelfIntersection(_) | Self::RingsIntersect(..))
    }
}

impl fmt::Display for Invalidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteCoordinate(role) => {
                write!(f, "non-finite coordinate in {role}")
            }
            Self::TooFewPoints(role) => {
                write!(f, "{role} must contain at least four positions")
            }
            Self::SelfIntersection(role) => write!(f, "self-intersection in {role}"),
            Self::RingsIntersect(a, b) => write!(f, "{a} intersects {b}"),
            Self::ZeroArea => write!(f, "polygon encloses no area"),
        }
    }
}

/// Classify the first defect in `polygon`, or `None` when it is valid.
///
/// Defects are reported in a fixed order: broken coordinates and undersized
/// rings first (never repairable), then ring intersections (repairable), then
/// degenerate area. The area check runs last on purpose: a bowtie has zero
/// signed area yet is a self-intersection, not a degenerate shell.
pub fn check(polygon: &Polygon<f64>) -> Option<Invalidity> {
    let rings = ring_table(polygon);

    for (role, ring) in &rings {
        if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Some(Invalidity::NonFiniteCoordinate(*role));
        }
        if ring.0.len() < 4 {
            return Some(Invalidity::TooFewPoints(*role));
        }
    }

    for (role, ring) in &rings {
        if ring_self_intersects(ring) {
            return Some(Invalidity::SelfIntersection(*role));
        }
    }

    for (index, (role_a, ring_a)) in rings.iter().enumerate() {
        for (role_b, ring_b) in rings.iter().skip(index + 1) {
            if rings_cross(ring_a, ring_b) {
                return Some(Invalidity::RingsIntersect(*role_a, *role_b));
            }
        }
    }

    if polygon.unsigned_area() <= f64::EPSILON {
        return Some(Invalidity::ZeroArea);
    }

    None
}

fn ring_table(polygon: &Polygon<f64>) -> Vec<(RingRole, &LineString<f64>)> {
    let mut rings = vec![(RingRole::Exterior, polygon.exterior())];
    rings.extend(
        polygon
            .interiors()
            .iter()
            .enumerate()
            .map(|(index, ring)| (RingRole::Interior(index), ring)),
    );
    rings
}

fn segments(ring: &LineString<f64>) -> Vec<Line<f64>> {
    // Zero-length segments from repeated vertices would read as collinear
    // overlaps; the ring is deduplicated upstream, but guard anyway.
    ring.lines().filter(|line| line.start != line.end).collect()
}

/// Does the ring cross or touch itself anywhere other than the shared vertex
/// of two adjacent segments?
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let segments = segments(ring);
    let count = segments.len();
    if count < 3 {
        return false;
    }

    for i in 0..count {
        for j in (i + 1)..count {
            let adjacent = j == i + 1 || (i == 0 && j == count - 1);
            let Some(hit) = line_intersection(segments[i], segments[j]) else {
                continue;
            };
            match hit {
                LineIntersection::Collinear { .. } => return true,
                LineIntersection::SinglePoint {
                    intersection,
                    is_proper,
                } => {
                    if is_proper || !adjacent {
                        return true;
                    }
                    let shared = shared_vertex(&segments, i, j);
                    if intersection != shared {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn shared_vertex(segments: &[Line<f64>], i: usize, j: usize) -> Coord<f64> {
    if j == i + 1 {
        segments[i].end
    } else {
        // Closing pair: the last segment ends where the first one starts.
        segments[i].start
    }
}

/// Do two distinct rings properly cross or overlap? A single improper touch
/// point is permitted (a hole may touch the shell at one vertex).
fn rings_cross(ring_a: &LineString<f64>, ring_b: &LineString<f64>) -> bool {
    for seg_a in segments(ring_a) {
        for seg_b in segments(ring_b) {
            match line_intersection(seg_a, seg_b) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper {
                        return true;
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use geo::polygon;
    use rstest::rstest;

    use super::*;

    fn bowtie() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 4.0, y: 0.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[rstest]
    fn accepts_a_simple_square() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ];
        assert_eq!(check(&square), None);
    }

    #[rstest]
    fn accepts_a_square_with_a_contained_hole() {
        let with_hole = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
                (4.0, 4.0),
            ])],
        );
        assert_eq!(check(&with_hole), None);
    }

    #[rstest]
    fn classifies_a_bowtie_as_self_intersection() {
        assert_eq!(
            check(&bowtie()),
            Some(Invalidity::SelfIntersection(RingRole::Exterior))
        );
        assert!(check(&bowtie()).is_some_and(Invalidity::is_repairable));
    }

    #[rstest]
    fn classifies_a_collapsed_ring_as_self_intersection() {
        // All vertices on one line: the closing edge folds back over the ring.
        let collapsed = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(matches!(
            check(&collapsed),
            Some(Invalidity::SelfIntersection(RingRole::Exterior))
        ));
    }

    #[rstest]
    fn rejects_non_finite_coordinates() {
        let broken = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ];
        assert_eq!(
            check(&broken),
            Some(Invalidity::NonFiniteCoordinate(RingRole::Exterior))
        );
    }

    #[rstest]
    fn rejects_rings_with_too_few_points() {
        let stub = Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), vec![]);
        assert_eq!(
            check(&stub),
            Some(Invalidity::TooFewPoints(RingRole::Exterior))
        );
    }

    #[rstest]
    fn classifies_a_hole_crossing_the_shell() {
        let crossing_hole = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (8.0, 4.0),
                (12.0, 4.0),
                (12.0, 6.0),
                (8.0, 6.0),
                (8.0, 4.0),
            ])],
        );
        assert_eq!(
            check(&crossing_hole),
            Some(Invalidity::RingsIntersect(
                RingRole::Exterior,
                RingRole::Interior(0)
            ))
        );
    }

    #[rstest]
    #[case(Invalidity::SelfIntersection(RingRole::Exterior), true)]
    #[case(
        Invalidity::RingsIntersect(RingRole::Exterior, RingRole::Interior(0)),
        true
    )]
    #[case(Invalidity::ZeroArea, false)]
    #[case(Invalidity::TooFewPoints(RingRole::Interior(1)), false)]
    fn repairability_follows_the_defect_kind(
        #[case] invalidity: Invalidity,
        #[case] repairable: bool,
    ) {
        assert_eq!(invalidity.is_repairable(), repairable);
    }

    #[rstest]
    fn explanations_name_the_offending_ring() {
        let message = Invalidity::SelfIntersection(RingRole::Interior(2)).to_string();
        assert!(message.contains("interior ring 2"));
    }
}
