#![expect(
    clippy::float_arithmetic,
    reason = "properties compare floating-point distances"
)]

//! Property-based tests for path projection, suggestions and selection
//! toggling.
//!
//! # Invariants tested
//!
//! - **Projection bounds:** a projection onto a straight path stays within
//!   the path's bounding box and is never farther than either endpoint.
//! - **Symmetry:** distance along a path ignores the order of its endpoints.
//! - **Additivity:** the distance to a point never exceeds the full length.
//! - **Suggestion format:** suggestions are non-negative whole numbers.
//! - **Toggle round trip:** toggling a parcel twice restores the selection.

use std::collections::BTreeSet;

use bal_core::test_support::street;
use bal_core::{ParcelId, distance_along, project_onto_path, suggest_numero, toggled};
use geo::{Coord, LineString};
use proptest::prelude::*;

fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (2.0_f64..3.0, 48.0_f64..49.0).prop_map(|(x, y)| Coord { x, y })
}

fn path_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((2.0_f64..3.0, 48.0_f64..49.0), 2..6)
}

fn planar(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the projected point is at least as close as every vertex.
    #[test]
    fn projection_is_no_farther_than_any_vertex(
        point in coord_strategy(),
        vertices in path_strategy(),
    ) {
        let path = LineString::from(vertices);
        let projection = project_onto_path(point, &path).expect("non-empty path");
        for vertex in path.coords() {
            prop_assert!(projection.distance <= planar(point, *vertex) + 1e-9);
        }
    }

    /// Property: distance along a path is symmetric in its endpoints.
    #[test]
    fn distance_along_is_symmetric(
        from in coord_strategy(),
        to in coord_strategy(),
        vertices in path_strategy(),
    ) {
        let path = LineString::from(vertices);
        let forward = distance_along(&path, from, to).expect("non-empty path");
        let backward = distance_along(&path, to, from).expect("non-empty path");
        prop_assert!((forward - backward).abs() < 1e-6);
    }

    /// Property: no sub-path is longer than the whole path.
    #[test]
    fn distance_along_is_bounded_by_path_length(
        point in coord_strategy(),
        vertices in path_strategy(),
    ) {
        let path = LineString::from(vertices);
        let start = path.0.first().copied().expect("non-empty path");
        let end = path.0.last().copied().expect("non-empty path");
        let total = distance_along(&path, start, end).expect("non-empty path");
        let partial = distance_along(&path, start, point).expect("non-empty path");
        prop_assert!(partial <= total + 1e-3);
    }

    /// Property: suggestions are plain non-negative integers.
    #[test]
    fn suggestion_is_a_whole_number(
        marker in coord_strategy(),
        vertices in path_strategy(),
    ) {
        let suggestion = suggest_numero(marker, &street("v1", Some(vertices)))
            .expect("traced street");
        prop_assert!(suggestion.chars().all(|c| c.is_ascii_digit()));
    }

    /// Property: toggling a parcel twice restores the exact membership.
    #[test]
    fn toggle_twice_is_identity(
        ids in prop::collection::btree_set("[0-9]{1,3}", 0..8),
        target in "[0-9]{1,3}",
    ) {
        let selected: BTreeSet<ParcelId> =
            ids.iter().map(|id| ParcelId::from(id.as_str())).collect();
        let parcel = ParcelId::from(target.as_str());
        let twice = toggled(&toggled(&selected, &parcel), &parcel);
        prop_assert_eq!(twice, selected);
    }
}
