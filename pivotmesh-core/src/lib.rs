//! Core data structures and traits for pivotmesh
//!
//! This crate provides fundamental types for oriented point clouds and
//! triangle meshes, along with the traits shared by the other pivotmesh
//! crates.

pub mod error;
pub mod mesh;
pub mod point;
pub mod point_cloud;
pub mod traits;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use point_cloud::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
