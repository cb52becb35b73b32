//! k-d tree backed nearest neighbor search

use kiddo::{KdTree as KiddoTree, SquaredEuclidean};
use pivotmesh_core::{NearestNeighborSearch, Point3d};

/// A k-d tree over a fixed set of 3D points.
///
/// Built once from the input points and read-only afterwards. Stored
/// items are the indices of the points in construction order.
pub struct KdTree {
    tree: KiddoTree<f64, 3>,
    len: usize,
}

impl KdTree {
    /// Build a k-d tree from a slice of points
    pub fn new(points: &[Point3d]) -> Self {
        let mut tree = KiddoTree::new();
        for (i, point) in points.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], i as u64);
        }
        Self {
            tree,
            len: points.len(),
        }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no points
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3d, k: usize) -> Vec<(usize, f64)> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|n| (n.item as usize, n.distance))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<(usize, f64)> {
        self.tree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], radius * radius)
            .into_iter()
            .map(|n| (n.item as usize, n.distance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn grid_points() -> Vec<Point3d> {
        let mut points = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                points.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        points
    }

    #[test]
    fn test_k_nearest_returns_self_first() {
        let points = grid_points();
        let tree = KdTree::new(&points);

        let neighbors = tree.find_k_nearest(&points[4], 3);
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].0, 4);
        assert_eq!(neighbors[0].1, 0.0);
    }

    #[test]
    fn test_radius_search_is_complete() {
        let points = grid_points();
        let tree = KdTree::new(&points);

        // Around the grid center, radius 1.1 picks up the center and its
        // four axis-aligned neighbors.
        let neighbors = tree.find_radius_neighbors(&Point3::new(1.0, 1.0, 0.0), 1.1);
        assert_eq!(neighbors.len(), 5);
        for &(_, d2) in &neighbors {
            assert!(d2 <= 1.1 * 1.1);
        }
    }

    #[test]
    fn test_radius_search_sorted_by_distance() {
        let points = grid_points();
        let tree = KdTree::new(&points);

        let neighbors = tree.find_radius_neighbors(&Point3::new(0.0, 0.0, 0.0), 3.0);
        assert_eq!(neighbors.len(), 9);
        for pair in neighbors.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn test_radius_search_squared_distances() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let tree = KdTree::new(&points);

        let neighbors = tree.find_radius_neighbors(&Point3::new(0.0, 0.0, 0.0), 2.5);
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[1].1, 4.0);
    }

    #[test]
    fn test_empty_index() {
        let tree = KdTree::new(&[]);
        assert!(tree.is_empty());
        assert!(tree
            .find_radius_neighbors(&Point3::new(0.0, 0.0, 0.0), 1.0)
            .is_empty());
    }
}
