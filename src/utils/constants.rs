/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical constants and fixed conventions used by the KKR and Voronoi codes

/// Bohr radius in Angstroms
pub const BOHR_RADIUS: f64 = 0.52917721067;

/// Conversion factor from Angstroms to Bohr radii
pub const ANG_TO_BOHR: f64 = 1.0 / BOHR_RADIUS;

/// Rydberg energy in eV
pub const RY_TO_EV: f64 = 13.6056980659;
