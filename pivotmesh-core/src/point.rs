//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A point with an oriented normal vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPoint3d {
    pub position: Point3d,
    pub normal: Vector3d,
}

/// A point with an oriented normal and color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredNormalPoint3d {
    pub position: Point3d,
    pub normal: Vector3d,
    pub color: [u8; 3],
}

impl NormalPoint3d {
    /// Create a new oriented point
    pub fn new(position: Point3d, normal: Vector3d) -> Self {
        Self { position, normal }
    }
}

impl ColoredNormalPoint3d {
    /// Create a new oriented, colored point
    pub fn new(position: Point3d, normal: Vector3d, color: [u8; 3]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

impl Default for NormalPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            normal: Vector3d::new(0.0, 0.0, 1.0),
        }
    }
}

impl Default for ColoredNormalPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            normal: Vector3d::new(0.0, 0.0, 1.0),
            color: [255, 255, 255],
        }
    }
}

impl From<ColoredNormalPoint3d> for NormalPoint3d {
    fn from(point: ColoredNormalPoint3d) -> Self {
        Self {
            position: point.position,
            normal: point.normal,
        }
    }
}
