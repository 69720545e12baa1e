/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Provenance graph of calculations, folders, structures and parameters

pub mod errors;
pub mod graph;
pub mod ids;
pub mod record;
pub mod resolver;

pub use errors::{ProvenanceError, Result, WalkStop};
pub use graph::ProvenanceGraph;
pub use ids::{FolderId, ParamSetId, RecordId, StructureId, WorkflowId};
pub use record::{
    CalcInputs, CalcOutputs, CalcResults, CalcStatus, CalculationKind, CalculationRecord, Code,
    JobReport, RemoteFolderHandle, WorkflowRecord,
};
pub use resolver::{find_parent_structure, find_parent_structure_within, ResolvedStructure, MAX_PARENT_HOPS};
