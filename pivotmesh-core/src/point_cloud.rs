//! Point cloud data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with oriented normals
pub type NormalPointCloud3d = PointCloud<NormalPoint3d>;

/// A point cloud with oriented normals and colors
pub type ColoredNormalPointCloud3d = PointCloud<ColoredNormalPoint3d>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<T> {
        self.points.iter_mut()
    }

    /// Clear all points from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Reserve capacity for additional points
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut PointCloud<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter_mut()
    }
}

impl<T> Extend<T> for PointCloud<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl PointCloud<NormalPoint3d> {
    /// Whether every stored normal is usable (non-zero length).
    ///
    /// An empty cloud vacuously has normals, so undersized inputs flow
    /// through reconstruction and come back as an empty mesh instead of
    /// an error.
    pub fn has_normals(&self) -> bool {
        self.points.iter().all(|p| p.normal.norm_squared() > 0.0)
    }

    /// Collect the point positions into a vector
    pub fn positions(&self) -> Vec<Point3d> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Collect the point normals into a vector
    pub fn normals(&self) -> Vec<Vector3d> {
        self.points.iter().map(|p| p.normal).collect()
    }
}

impl PointCloud<ColoredNormalPoint3d> {
    /// Whether every stored normal is usable (non-zero length).
    pub fn has_normals(&self) -> bool {
        self.points.iter().all(|p| p.normal.norm_squared() > 0.0)
    }

    /// Collect the point positions into a vector
    pub fn positions(&self) -> Vec<Point3d> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Collect the point normals into a vector
    pub fn normals(&self) -> Vec<Vector3d> {
        self.points.iter().map(|p| p.normal).collect()
    }

    /// Collect the point colors into a vector
    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.points.iter().map(|p| p.color).collect()
    }
}
