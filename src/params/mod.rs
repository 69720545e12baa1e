/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Inputcard parameters
//!
//! This module provides the known-keyword schema, validated parameter sets,
//! the inputcard reader/writer and the patches applied between workflow steps.

pub mod errors;
pub mod inputcard;
pub mod keywords;
pub mod parameter_set;
pub mod patch;
pub mod value;

pub use errors::{ParamError, ParameterDeficiencies, Result};
pub use keywords::KeyScope;
pub use parameter_set::ParameterSet;
pub use patch::{patch_energy_window, EnergyWindow};
pub use value::{ParamValue, ValueKind};
