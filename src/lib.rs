//! # PivotMesh
//!
//! Surface reconstruction for oriented 3D point clouds.
//!
//! This is the umbrella crate that provides convenient access to all
//! pivotmesh functionality. You can use this crate to get everything in
//! one place, or use individual crates for more granular control over
//! dependencies.
//!
//! ## Features
//!
//! - **Core**: Point cloud and triangle mesh data structures
//! - **Spatial**: k-d tree radius and k-nearest neighbor queries
//! - **Reconstruction**: Ball pivoting surface reconstruction
//!
//! ## Quick Start
//!
//! ```rust
//! use pivotmesh::prelude::*;
//! use pivotmesh::{Point3, Vector3};
//!
//! // An oriented point cloud: positions plus unit normals
//! let cloud: PointCloud<NormalPoint3d> = vec![
//!     NormalPoint3d::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
//!     NormalPoint3d::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
//!     NormalPoint3d::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
//! ]
//! .into_iter()
//! .collect();
//!
//! // Roll a unit ball over the samples
//! let mesh = ball_pivoting_reconstruction(&cloud, &[1.0]).unwrap();
//! assert_eq!(mesh.face_count(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables spatial and reconstruction
//! - `spatial`: Spatial indexing
//! - `reconstruction`: Surface reconstruction

// Re-export core functionality
pub use pivotmesh_core::*;

// Re-export sub-crates
#[cfg(feature = "spatial")]
pub use pivotmesh_spatial as spatial;

#[cfg(feature = "reconstruction")]
pub use pivotmesh_reconstruction as reconstruction;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pivotmesh_core::*;

    #[cfg(feature = "spatial")]
    pub use pivotmesh_spatial::*;

    #[cfg(feature = "reconstruction")]
    pub use pivotmesh_reconstruction::*;
}
