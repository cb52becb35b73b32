//! Spatial indexing for pivotmesh
//!
//! Provides the radius and k-nearest neighbor queries the reconstruction
//! algorithms rely on, behind the [`NearestNeighborSearch`] trait from
//! `pivotmesh-core`.
//!
//! [`NearestNeighborSearch`]: pivotmesh_core::NearestNeighborSearch

pub mod kdtree;

pub use kdtree::*;
