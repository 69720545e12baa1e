/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structures and their KKR representation
//!
//! This module provides the structure descriptor handed to the Voronoi step,
//! the element table used for nuclear charges, space-group detection and
//! high-symmetry k-point paths for band-structure runs.

pub mod database;
pub mod errors;
pub mod kpoints;
pub mod site;
pub mod special_points;
#[allow(clippy::module_inception)]
pub mod structure;
pub mod symmetry;
pub mod vector;

pub use errors::{Result, StructureError};
pub use kpoints::{CellType, ExplicitPath, KpointsPath};
pub use site::Site;
pub use special_points::BravaisLattice;
pub use structure::{reciprocal_vectors, KkrGeometry, StructureDescriptor};
pub use symmetry::Symmetry;
pub use vector::Vector3D;
