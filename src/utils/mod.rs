/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions shared by the calculation plugins and parsers

pub mod constants;
pub mod conversions;
pub mod errors;
pub mod table;

pub use conversions::{angstrom_to_bohr, bohr_to_angstrom, ev_to_ry, ry_to_ev};
pub use errors::{Result, UtilsError};
