/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure keywords of the inputcard

use super::errors::Result;
use crate::params::{ParamValue, ParameterSet};
use crate::structure::StructureDescriptor;

/// Inputcard keywords describing the crystal structure
pub fn structure_parameters(structure: &StructureDescriptor) -> Result<ParameterSet> {
    let geometry = structure.kkr_geometry()?;
    let matrix = |rows: &[[f64; 3]]| ParamValue::Matrix(rows.iter().map(|r| r.to_vec()).collect());

    Ok(ParameterSet::from_map([
        ("ALATBASIS", ParamValue::Float(geometry.alat)),
        ("BRAVAIS", matrix(&geometry.bravais)),
        ("NAEZ", ParamValue::Int(geometry.naez as i64)),
        ("CARTESIAN", ParamValue::Bool(true)),
        ("<RBASIS>", matrix(&geometry.rbasis)),
        ("<ZATOM>", ParamValue::FloatArray(geometry.zatom)),
    ])?)
}
