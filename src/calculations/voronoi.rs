/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Voronoi preprocessing calculation
//!
//! Takes a structure and a parameter set and produces the shape functions and
//! starting potential a KKR run restarts from.

use super::calcinfo::CalcInfo;
use super::errors::{CalcError, Result};
use super::geometry::structure_parameters;
use super::INPUTCARD;
use crate::params::{inputcard, KeyScope};
use crate::parsers::voronoi::VORONOI_STDOUT;
use crate::provenance::{CalcInputs, CalculationKind, Code, ProvenanceGraph};
use log::{debug, info};

pub const ATOMINFO: &str = "atominfo.dat";
pub const RADII: &str = "radii.dat";
pub const SHAPEFUN: &str = "shapefun";
pub const VERTICES: &str = "vertices.dat";
/// Starting potential written by the Voronoi code
pub const OUT_POTENTIAL_VORONOI: &str = "output.pot";

/// Files retrieved after a Voronoi run
pub const RETRIEVE_LIST: [&str; 6] = [
    VORONOI_STDOUT,
    ATOMINFO,
    RADII,
    SHAPEFUN,
    VERTICES,
    OUT_POTENTIAL_VORONOI,
];

/// Prepare a Voronoi calculation
///
/// Needs a structure, a parameter set and a `kkr.voro` code. A parent folder
/// or k-points are not Voronoi inputs and are rejected.
pub fn prepare_voronoi(graph: &ProvenanceGraph, inputs: &CalcInputs, code: &Code) -> Result<CalcInfo> {
    if code.kind != CalculationKind::Voronoi {
        return Err(CalcError::InputValidation(format!(
            "code {} is a {} code, expected {}",
            code.label,
            code.kind,
            CalculationKind::Voronoi
        )));
    }
    let parameters_id = inputs.parameters.ok_or_else(|| {
        CalcError::InputValidation("No parameters specified for this calculation".to_string())
    })?;
    let structure_id = inputs.structure.ok_or_else(|| {
        CalcError::InputValidation("No structure specified for this calculation".to_string())
    })?;

    let mut unknown = Vec::new();
    if inputs.parent_folder.is_some() {
        unknown.push("parent_folder");
    }
    if inputs.kpoints.is_some() {
        unknown.push("kpoints");
    }
    if !unknown.is_empty() {
        return Err(CalcError::InputValidation(format!("Unknown inputs: {:?}", unknown)));
    }

    let structure = graph.structure(structure_id)?;
    let user = graph.parameters(parameters_id)?;
    let (params, added) = user
        .merged_with(&structure_parameters(structure)?)
        .fill_defaults(KeyScope::Full);
    if !added.is_empty() {
        debug!("Filled defaults for {:?}", added);
    }
    params.validate(KeyScope::Full)?;

    let mut info = CalcInfo::new(CalculationKind::Voronoi, VORONOI_STDOUT);
    info.files
        .insert(INPUTCARD.to_string(), inputcard::render(&params));
    info.retrieve_list = RETRIEVE_LIST.iter().map(|s| s.to_string()).collect();

    info!(
        "Prepared Voronoi calculation for {} site(s) with code {}",
        structure.sites().len(),
        code.label
    );
    Ok(info)
}
