/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Calculation plugins
//!
//! Preparing a calculation validates its inputs against the provenance graph,
//! renders the `inputcard` and builds the [`CalcInfo`] manifest: which files to
//! write, which to copy from the parent folder and which to retrieve after the
//! run.

pub mod calcinfo;
pub mod errors;
pub mod geometry;
pub mod kkr;
pub mod voronoi;

pub use calcinfo::CalcInfo;
pub use errors::{CalcError, Result};
pub use kkr::prepare_kkr;
pub use voronoi::prepare_voronoi;

use crate::provenance::{
    CalcInputs, CalculationKind, Code, FolderId, ParamSetId, ProvenanceGraph, RecordId,
    StructureId,
};
use crate::structure::KpointsPath;

/// Main input file of both codes
pub const INPUTCARD: &str = "inputcard";

/// Prepare a calculation of the given kind
pub fn prepare_for_submission(
    graph: &ProvenanceGraph,
    kind: CalculationKind,
    inputs: &CalcInputs,
    code: &Code,
) -> Result<CalcInfo> {
    match kind {
        CalculationKind::Voronoi => prepare_voronoi(graph, inputs, code),
        CalculationKind::Kkr => prepare_kkr(graph, inputs, code),
    }
}

/// Collects the inputs of a new calculation before it is stored
#[derive(Debug, Clone)]
pub struct CalculationBuilder {
    kind: CalculationKind,
    label: String,
    inputs: CalcInputs,
}

impl CalculationBuilder {
    pub fn new(kind: CalculationKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            inputs: CalcInputs::default(),
        }
    }

    pub fn voronoi(label: &str) -> Self {
        Self::new(CalculationKind::Voronoi, label)
    }

    pub fn kkr(label: &str) -> Self {
        Self::new(CalculationKind::Kkr, label)
    }

    pub fn structure(mut self, structure: StructureId) -> Self {
        self.inputs.structure = Some(structure);
        self
    }

    pub fn parameters(mut self, parameters: ParamSetId) -> Self {
        self.inputs.parameters = Some(parameters);
        self
    }

    pub fn code(mut self, code: &Code) -> Self {
        self.inputs.code = Some(code.label.clone());
        self
    }

    pub fn kpoints(mut self, kpoints: KpointsPath) -> Self {
        self.inputs.kpoints = Some(kpoints);
        self
    }

    /// Restart from a remote folder; only one parent is allowed
    pub fn parent_folder(mut self, folder: FolderId) -> Result<Self> {
        if let Some(existing) = self.inputs.parent_folder {
            return Err(CalcError::InputValidation(format!(
                "Cannot set several parent folders ({} is already set)",
                existing
            )));
        }
        self.inputs.parent_folder = Some(folder);
        Ok(self)
    }

    /// Restart from the unique output folder of `parent`
    pub fn use_parent_calculation(self, graph: &ProvenanceGraph, parent: RecordId) -> Result<Self> {
        graph.record(parent)?;
        let folder = graph.output_folder_of(parent)?;
        self.parent_folder(folder)
    }

    pub fn kind(&self) -> CalculationKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inputs(&self) -> &CalcInputs {
        &self.inputs
    }

    /// Validate against the graph and build the submission manifest
    pub fn prepare(&self, graph: &ProvenanceGraph, code: &Code) -> Result<CalcInfo> {
        prepare_for_submission(graph, self.kind, &self.inputs, code)
    }

    /// Store the calculation as a pending record
    pub fn store(self, graph: &mut ProvenanceGraph) -> Result<RecordId> {
        Ok(graph.add_calculation(self.kind, &self.label, self.inputs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_parent_rejected() {
        let builder = CalculationBuilder::kkr("restart")
            .parent_folder(FolderId(0))
            .unwrap();
        assert!(matches!(
            builder.parent_folder(FolderId(1)),
            Err(CalcError::InputValidation(_))
        ));
    }
}
