//! Projection of points onto traced paths and measurement along them.
//!
//! Projection works in planar longitude/latitude space, which is what the
//! operator sees on the map. Lengths along a path are great-circle distances
//! in metres.

use geo::{Closest, ClosestPoint, Coord, Haversine, Length, Line, LineString, Point};

/// Result of projecting a point onto a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProjection {
    /// Closest point on the path.
    pub point: Coord<f64>,
    /// Index of the segment holding [`PathProjection::point`].
    pub segment: usize,
    /// Planar distance from the segment start to the projected point.
    pub offset: f64,
    /// Planar distance from the query point to the projected point.
    pub distance: f64,
}

impl PathProjection {
    fn precedes(&self, other: &Self) -> bool {
        (self.segment, self.offset) < (other.segment, other.offset)
    }
}

/// Project `point` onto the closest location of `path`.
///
/// Every segment is considered; when two segments are equally close, the one
/// appearing first in path order wins. A single-coordinate path projects onto
/// that coordinate and an empty path yields `None`.
///
/// # Examples
///
/// ```
/// use geo::{Coord, LineString};
/// use bal_core::geometry::project_onto_path;
///
/// let path = LineString::from(vec![(2.30, 48.85), (2.40, 48.85)]);
/// let projection = project_onto_path(Coord { x: 2.35, y: 48.86 }, &path)
///     .expect("non-empty path");
/// assert!((projection.point.x - 2.35).abs() < 1e-9);
/// assert!((projection.point.y - 48.85).abs() < 1e-9);
/// ```
#[must_use]
pub fn project_onto_path(point: Coord<f64>, path: &LineString<f64>) -> Option<PathProjection> {
    let first = path.0.first().copied()?;
    let nearest = path
        .lines()
        .enumerate()
        .map(|(segment, line)| project_onto_segment(point, line, segment))
        .reduce(|best, candidate| {
            if candidate.distance < best.distance {
                candidate
            } else {
                best
            }
        });
    Some(nearest.unwrap_or(PathProjection {
        point: first,
        segment: 0,
        offset: 0.0,
        distance: planar_distance(point, first),
    }))
}

/// Great-circle length, in metres, of `path` between `from` and `to`.
///
/// Both points are first projected onto the path, so callers may pass
/// coordinates that only approximately lie on it. The order of `from` and
/// `to` does not matter. Returns `None` for an empty path.
#[must_use]
pub fn distance_along(path: &LineString<f64>, from: Coord<f64>, to: Coord<f64>) -> Option<f64> {
    let from = project_onto_path(from, path)?;
    let to = project_onto_path(to, path)?;
    let (start, end) = if to.precedes(&from) {
        (to, from)
    } else {
        (from, to)
    };
    Some(Haversine.length(&slice_path(path, &start, &end)))
}

fn slice_path(path: &LineString<f64>, start: &PathProjection, end: &PathProjection) -> LineString<f64> {
    let inner = path
        .0
        .iter()
        .skip(start.segment + 1)
        .take(end.segment - start.segment)
        .copied();
    std::iter::once(start.point)
        .chain(inner)
        .chain(std::iter::once(end.point))
        .collect()
}

fn project_onto_segment(point: Coord<f64>, line: Line<f64>, segment: usize) -> PathProjection {
    let projected = match line.closest_point(&Point::from(point)) {
        Closest::Intersection(hit) | Closest::SinglePoint(hit) => hit.0,
        // Zero-length segment.
        Closest::Indeterminate => line.start,
    };
    PathProjection {
        point: projected,
        segment,
        offset: planar_distance(line.start, projected),
        distance: planar_distance(point, projected),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "planar distance needs coordinate differences"
)]
fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
