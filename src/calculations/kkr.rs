/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! KKR Green's-function calculation
//!
//! A KKR run always restarts from the folder of a parent run: either the
//! Voronoi step that generated the starting potential or an earlier KKR run.
//! The crystal structure is not an input of its own; it comes from the Voronoi
//! parent directly or is resolved through the chain of parent folders.

use super::calcinfo::CalcInfo;
use super::errors::{CalcError, Result};
use super::geometry::structure_parameters;
use super::voronoi::{OUT_POTENTIAL_VORONOI, SHAPEFUN};
use super::INPUTCARD;
use crate::params::patch::with_run_option;
use crate::params::{inputcard, KeyScope, ParamValue};
use crate::parsers::bandstructure::{QDOS_PREFIX, QVEC_FILE};
use crate::parsers::kkr::{KKR_OUTPUT_LOG, KKR_STDOUT};
use crate::provenance::{
    find_parent_structure, CalcInputs, CalculationKind, CalculationRecord, Code, FolderId,
    ProvenanceGraph,
};
use crate::structure::StructureDescriptor;
use log::{debug, info};
use std::path::PathBuf;

/// Potential file read by the KKR code
pub const POTENTIAL: &str = "potential";
pub const SCOEF: &str = "scoef";
pub const NONCO_ANGLES_OUT: &str = "nonco_angles_out.dat";
/// Potential written by the KKR code
pub const OUT_POTENTIAL: &str = "out_potential";
pub const OUTPUT_0_INIT: &str = "output.0.txt";
pub const OUT_TIMING_000: &str = "out_timing.000.txt";

/// Files retrieved after every KKR run
pub const RETRIEVE_LIST: [&str; 10] = [
    KKR_STDOUT,
    INPUTCARD,
    POTENTIAL,
    SHAPEFUN,
    SCOEF,
    NONCO_ANGLES_OUT,
    OUT_POTENTIAL,
    OUTPUT_0_INIT,
    KKR_OUTPUT_LOG,
    OUT_TIMING_000,
];

/// Files copied from a parent run of the given kind
pub fn copy_list(parent: CalculationKind) -> [&'static str; 2] {
    match parent {
        CalculationKind::Voronoi => [SHAPEFUN, OUT_POTENTIAL_VORONOI],
        CalculationKind::Kkr => [SHAPEFUN, OUT_POTENTIAL],
    }
}

/// Name a copied parent file gets in the new working folder
fn copy_target(name: &str) -> &str {
    if name == OUT_POTENTIAL_VORONOI || name == OUT_POTENTIAL {
        POTENTIAL
    } else {
        name
    }
}

/// The parent record of a KKR run and the structure behind it
struct Parent<'g> {
    record: &'g CalculationRecord,
    folder: FolderId,
    structure: &'g StructureDescriptor,
}

fn resolve_parent(graph: &ProvenanceGraph, folder: FolderId) -> Result<Parent<'_>> {
    let producer = graph.producer_of(folder)?;
    let record = graph.record(producer)?;
    if !record.status.is_finished_ok() {
        return Err(CalcError::InputValidation(format!(
            "parent calculation {} has status {:?}",
            producer, record.status
        )));
    }

    let structure_id = match record.kind {
        CalculationKind::Voronoi => {
            info!("Parent is Voronoi calculation {}", producer);
            record.inputs.structure.ok_or_else(|| {
                CalcError::InputValidation(format!(
                    "Voronoi parent {} has no structure input",
                    producer
                ))
            })?
        }
        CalculationKind::Kkr => {
            info!("Parent is KKR calculation {}, resolving structure", producer);
            find_parent_structure(graph, folder)?.structure
        }
    };

    Ok(Parent {
        record,
        folder,
        structure: graph.structure(structure_id)?,
    })
}

/// Prepare a KKR calculation
pub fn prepare_kkr(graph: &ProvenanceGraph, inputs: &CalcInputs, code: &Code) -> Result<CalcInfo> {
    if code.kind != CalculationKind::Kkr {
        return Err(CalcError::InputValidation(format!(
            "code {} is a {} code, expected {}",
            code.label,
            code.kind,
            CalculationKind::Kkr
        )));
    }
    let parameters_id = inputs.parameters.ok_or_else(|| {
        CalcError::InputValidation("No parameters specified for this calculation".to_string())
    })?;
    let parent_folder = inputs.parent_folder.ok_or_else(|| {
        CalcError::InputValidation(
            "Voronoi files needed for KKR calculation, provide a parent folder".to_string(),
        )
    })?;
    if inputs.structure.is_some() {
        return Err(CalcError::InputValidation(
            "Unknown inputs: [\"structure\"]; the structure is taken from the parent".to_string(),
        ));
    }

    let parent = resolve_parent(graph, parent_folder)?;

    let mut params = graph
        .parameters(parameters_id)?
        .merged_with(&structure_parameters(parent.structure)?);

    if parent.record.kind == CalculationKind::Voronoi {
        let emin = parent
            .record
            .results()
            .and_then(|r| r.emin())
            .ok_or_else(|| {
                CalcError::InputValidation(format!(
                    "Voronoi parent {} has no EMIN in its results",
                    parent.record.id
                ))
            })?;
        info!("Overwriting EMIN with value from Voronoi output: {}", emin);
        params = params.with_value("EMIN", ParamValue::Float(emin))?;
    }

    if inputs.kpoints.is_some() {
        params = with_run_option(&params, "qdos")?;
    }

    let (params, added) = params.fill_defaults(KeyScope::Full);
    if !added.is_empty() {
        debug!("Filled defaults for {:?}", added);
    }
    params.validate(KeyScope::Full)?;

    let mut info = CalcInfo::new(CalculationKind::Kkr, KKR_STDOUT);
    info.files
        .insert(INPUTCARD.to_string(), inputcard::render(&params));

    let source_dir: PathBuf = match &parent.record.outputs.retrieved {
        Some(dir) => dir.clone(),
        None => graph.folder(parent.folder)?.path.clone(),
    };
    for name in copy_list(parent.record.kind) {
        info.local_copy_list
            .push((source_dir.join(name), copy_target(name).to_string()));
    }

    info.retrieve_list = RETRIEVE_LIST.iter().map(|s| s.to_string()).collect();
    if let Some(kpoints) = &inputs.kpoints {
        info.files.insert(QVEC_FILE.to_string(), kpoints.to_qvec());
        info.retrieve_list.push(QVEC_FILE.to_string());
        info.retrieve_list.push(format!("{}*", QDOS_PREFIX));
    }

    info!(
        "Prepared KKR calculation from {} with code {}",
        parent.folder, code.label
    );
    Ok(info)
}
