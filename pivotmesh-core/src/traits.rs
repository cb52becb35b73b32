//! Core traits for pivotmesh

use crate::point::Point3d;

/// Trait for nearest neighbor search functionality
///
/// Distances are reported squared, as produced by the underlying index.
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point, closest first
    fn find_k_nearest(&self, query: &Point3d, k: usize) -> Vec<(usize, f64)>;

    /// Find all neighbors within a given radius of a query point
    ///
    /// Results are complete and sorted by ascending distance; ties keep
    /// a stable order for a fixed input.
    fn find_radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<(usize, f64)>;
}
