use crate::{
    model::{Slot, Way},
    util::planar_distance,
};
use geo::Point;
use rayon::prelude::*;
use rstar::{primitives::GeomWithData, RTree};
use tracing::{debug, warn};

/// Value stored for the distance of an endpoint to itself.
pub const SELF_DISTANCE: f64 = -1.0;

/// Endpoint counts above which the full matrix is worth a warning.
const LARGE_MATRIX: usize = 20_000;

/// Index of an endpoint among the `2 * N` endpoints of `N` ways.
pub fn endpoint_index(way: usize, slot: Slot) -> usize {
    2 * way + slot.index()
}

/// Inverse of [`endpoint_index`].
pub fn endpoint_slot(index: usize) -> (usize, Slot) {
    let slot = if index % 2 == 0 { Slot::First } else { Slot::Second };
    (index / 2, slot)
}

/// Raw projected endpoints of a way set, ordered by [`endpoint_index`].
fn endpoint_points(ways: &[Way]) -> Vec<Point<f64>> {
    ways.iter()
        .flat_map(|way| Slot::BOTH.map(|slot| way.endpoint(slot).raw.planar()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointPair {
    /// Always lower than `b`.
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

/// Source of endpoint pairs for clustering.
pub trait PairSource {
    fn endpoint_count(&self) -> usize;

    /// All pairs `a < b` with `distance <= radius` accepted by `predicate`,
    /// ordered by `(a, b)`.
    fn pairs_where<P>(&self, radius: f64, predicate: P) -> Vec<EndpointPair>
    where
        P: Fn(f64) -> bool + Sync;
}

/// Symmetric all-pairs endpoint distances.
///
/// Only the lower triangle (diagonal included) is stored; the diagonal holds
/// [`SELF_DISTANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_ways(ways: &[Way]) -> Self {
        Self::from_points(&endpoint_points(ways))
    }

    pub fn from_points(points: &[Point<f64>]) -> Self {
        let size = points.len();
        if size > LARGE_MATRIX {
            warn!(
                endpoints = size,
                entries = size * (size + 1) / 2,
                "building a large distance matrix, consider the rtree strategy"
            );
        }
        let values: Vec<f64> = (0..size)
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..=row).map(move |column| {
                    if row == column {
                        SELF_DISTANCE
                    } else {
                        planar_distance(points[row], points[column])
                    }
                })
            })
            .collect();
        debug!(endpoints = size, "distance matrix built");
        DistanceMatrix { size, values }
    }

    /// Distance between endpoints `i` and `j`, in either order.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (row, column) = if i >= j { (i, j) } else { (j, i) };
        self.values[row * (row + 1) / 2 + column]
    }
}

impl PairSource for DistanceMatrix {
    fn endpoint_count(&self) -> usize {
        self.size
    }

    fn pairs_where<P>(&self, radius: f64, predicate: P) -> Vec<EndpointPair>
    where
        P: Fn(f64) -> bool + Sync,
    {
        (0..self.size)
            .into_par_iter()
            .flat_map_iter(|a| {
                let predicate = &predicate;
                (a + 1..self.size).filter_map(move |b| {
                    let distance = self.get(a, b);
                    (distance <= radius && predicate(distance)).then_some(EndpointPair { a, b, distance })
                })
            })
            .collect()
    }
}

/// R-tree over projected endpoints. Yields the same pairs as
/// [`DistanceMatrix`] without materialising every distance.
pub struct EndpointIndex {
    points: Vec<Point<f64>>,
    tree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl EndpointIndex {
    pub fn from_ways(ways: &[Way]) -> Self {
        Self::from_points(endpoint_points(ways))
    }

    pub fn from_points(points: Vec<Point<f64>>) -> Self {
        let tree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(index, point)| GeomWithData::new([point.x(), point.y()], index))
                .collect(),
        );
        EndpointIndex { points, tree }
    }
}

impl PairSource for EndpointIndex {
    fn endpoint_count(&self) -> usize {
        self.points.len()
    }

    fn pairs_where<P>(&self, radius: f64, predicate: P) -> Vec<EndpointPair>
    where
        P: Fn(f64) -> bool + Sync,
    {
        // Widened so rounding in the squared radius never loses a boundary pair.
        let query_radius_2 = radius * radius * (1. + 1e-9);
        (0..self.points.len())
            .into_par_iter()
            .flat_map_iter(|a| {
                let origin = self.points[a];
                let mut pairs: Vec<EndpointPair> = self
                    .tree
                    .locate_within_distance([origin.x(), origin.y()], query_radius_2)
                    .filter(|candidate| candidate.data > a)
                    .filter_map(|candidate| {
                        let b = candidate.data;
                        let distance = planar_distance(origin, self.points[b]);
                        (distance <= radius && predicate(distance)).then_some(EndpointPair { a, b, distance })
                    })
                    .collect();
                pairs.sort_by_key(|pair| pair.b);
                pairs
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    fn points() -> Vec<Point<f64>> {
        vec![
            point! { x: 0., y: 0. },
            point! { x: 0., y: 0. },
            point! { x: 0.3, y: 0.4 },
            point! { x: 5., y: 5. },
            point! { x: 5.1, y: 5. },
        ]
    }

    #[test]
    fn matrix_is_symmetric_with_sentinel_diagonal() {
        let points = points();
        let matrix = DistanceMatrix::from_points(&points);
        assert_eq!(matrix.endpoint_count(), 5);
        for i in 0..points.len() {
            assert_eq!(matrix.get(i, i), SELF_DISTANCE);
            for j in 0..points.len() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(0, 1), 0.);
        assert!((matrix.get(0, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn matrix_rows_are_packed_in_order() {
        let points: Vec<_> = (0..40)
            .map(|i| point! { x: f64::from(i) * 0.7, y: f64::from(i % 7) })
            .collect();
        let matrix = DistanceMatrix::from_points(&points);
        assert_eq!(matrix.values.len(), 40 * 41 / 2);
        let mut offset = 0;
        for row in 0..points.len() {
            for column in 0..=row {
                let expected = if row == column {
                    SELF_DISTANCE
                } else {
                    planar_distance(points[row], points[column])
                };
                assert_eq!(matrix.values[offset], expected);
                offset += 1;
            }
        }
    }

    #[test]
    fn pairs_are_ordered_and_exclude_self() {
        let matrix = DistanceMatrix::from_points(&points());
        let stacked = matrix.pairs_where(0., |d| d == 0.);
        assert_eq!(stacked.iter().map(|p| (p.a, p.b)).collect::<Vec<_>>(), vec![(0, 1)]);

        let near = matrix.pairs_where(1., |d| d > 0. && d < 1.);
        assert_eq!(
            near.iter().map(|p| (p.a, p.b)).collect::<Vec<_>>(),
            vec![(0, 2), (1, 2), (3, 4)]
        );
    }

    #[test]
    fn index_matches_matrix() {
        let matrix = DistanceMatrix::from_points(&points());
        let index = EndpointIndex::from_points(points());
        assert_eq!(index.endpoint_count(), matrix.endpoint_count());
        for radius in [0., 0.2, 0.5, 1., 10.] {
            assert_eq!(
                index.pairs_where(radius, |d| d < radius || d == 0.),
                matrix.pairs_where(radius, |d| d < radius || d == 0.),
            );
        }
    }

    #[test]
    fn endpoint_indices_round_trip() {
        assert_eq!(endpoint_index(3, Slot::Second), 7);
        assert_eq!(endpoint_slot(7), (3, Slot::Second));
        assert_eq!(endpoint_slot(0), (0, Slot::First));
    }
}
