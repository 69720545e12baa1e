/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Arena-indexed provenance graph
//!
//! Records, folders, structures and parameter sets live in flat vectors and
//! refer to each other by index. Nodes are only ever appended; the one change a
//! record goes through is the attachment of its outputs when the job reaches a
//! terminal status.

use super::errors::{ProvenanceError, Result};
use super::ids::{FolderId, ParamSetId, RecordId, StructureId, WorkflowId};
use super::record::{
    CalcInputs, CalcOutputs, CalcStatus, CalculationKind, CalculationRecord, JobReport,
    RemoteFolderHandle, WorkflowRecord,
};
use crate::params::ParameterSet;
use crate::structure::StructureDescriptor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// The provenance store of one process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceGraph {
    #[serde(default)]
    records: Vec<CalculationRecord>,
    #[serde(default)]
    folders: Vec<RemoteFolderHandle>,
    #[serde(default)]
    structures: Vec<StructureDescriptor>,
    #[serde(default)]
    parameters: Vec<ParameterSet>,
    #[serde(default)]
    workflows: Vec<WorkflowRecord>,
}

fn unknown(kind: &'static str, id: usize) -> ProvenanceError {
    ProvenanceError::UnknownId { kind, id }
}

impl ProvenanceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph from a JSON file and check its references
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let graph: ProvenanceGraph = serde_json::from_reader(reader)?;
        graph.check_references()?;
        debug!(
            "Loaded provenance graph with {} records and {} folders",
            graph.records.len(),
            graph.folders.len()
        );
        Ok(graph)
    }

    /// Load a graph, or start an empty one when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save the graph as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Verify that every stored id points into the arena
    pub fn check_references(&self) -> Result<()> {
        for (index, record) in self.records.iter().enumerate() {
            if record.id.index() != index {
                return Err(unknown("record", record.id.index()));
            }
            self.check_inputs(&record.inputs)?;
            if let Some(folder) = record.outputs.remote_folder {
                self.folder(folder)?;
            }
        }
        for (index, folder) in self.folders.iter().enumerate() {
            if folder.id.index() != index {
                return Err(unknown("folder", folder.id.index()));
            }
            for producer in &folder.producers {
                self.record(*producer)?;
            }
        }
        for workflow in &self.workflows {
            self.record(workflow.last_calc)?;
            self.folder(workflow.remote_folder)?;
        }
        Ok(())
    }

    fn check_inputs(&self, inputs: &CalcInputs) -> Result<()> {
        if let Some(id) = inputs.structure {
            self.structure(id)?;
        }
        if let Some(id) = inputs.parameters {
            self.parameters(id)?;
        }
        if let Some(id) = inputs.parent_folder {
            self.folder(id)?;
        }
        Ok(())
    }

    /// Store a structure
    pub fn add_structure(&mut self, structure: StructureDescriptor) -> StructureId {
        self.structures.push(structure);
        StructureId(self.structures.len() - 1)
    }

    pub fn structure(&self, id: StructureId) -> Result<&StructureDescriptor> {
        self.structures
            .get(id.index())
            .ok_or_else(|| unknown("structure", id.index()))
    }

    /// Store a parameter set
    pub fn add_parameters(&mut self, parameters: ParameterSet) -> ParamSetId {
        self.parameters.push(parameters);
        ParamSetId(self.parameters.len() - 1)
    }

    pub fn parameters(&self, id: ParamSetId) -> Result<&ParameterSet> {
        self.parameters
            .get(id.index())
            .ok_or_else(|| unknown("parameter set", id.index()))
    }

    /// Create a pending calculation record
    pub fn add_calculation(
        &mut self,
        kind: CalculationKind,
        label: &str,
        inputs: CalcInputs,
    ) -> Result<RecordId> {
        self.check_inputs(&inputs)?;
        let id = RecordId(self.records.len());
        self.records.push(CalculationRecord {
            id,
            kind,
            label: label.to_string(),
            inputs,
            outputs: CalcOutputs::default(),
            status: CalcStatus::Pending,
            stdout: String::new(),
            stderr: String::new(),
        });
        debug!("Created {} record {}", kind, id);
        Ok(id)
    }

    pub fn record(&self, id: RecordId) -> Result<&CalculationRecord> {
        self.records
            .get(id.index())
            .ok_or_else(|| unknown("record", id.index()))
    }

    fn record_mut(&mut self, id: RecordId) -> Result<&mut CalculationRecord> {
        let record = self
            .records
            .get_mut(id.index())
            .ok_or_else(|| unknown("record", id.index()))?;
        if record.status.is_terminal() {
            return Err(ProvenanceError::AlreadyFinished(id));
        }
        Ok(record)
    }

    /// All records in creation order
    pub fn records(&self) -> impl Iterator<Item = &CalculationRecord> {
        self.records.iter()
    }

    /// Number of calculation records
    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// Register a folder that no calculation of this graph produced
    pub fn add_folder(&mut self, computer: &str, path: impl Into<PathBuf>) -> FolderId {
        let id = FolderId(self.folders.len());
        self.folders.push(RemoteFolderHandle {
            id,
            computer: computer.to_string(),
            path: path.into(),
            producers: Vec::new(),
        });
        id
    }

    pub fn folder(&self, id: FolderId) -> Result<&RemoteFolderHandle> {
        self.folders
            .get(id.index())
            .ok_or_else(|| unknown("folder", id.index()))
    }

    /// Create the working folder of a calculation
    pub fn add_output_folder(
        &mut self,
        record: RecordId,
        computer: &str,
        path: impl Into<PathBuf>,
    ) -> Result<FolderId> {
        let folder = self.add_folder(computer, path);
        self.attach_output_folder(record, folder)?;
        Ok(folder)
    }

    /// Declare `record` the producer of `folder`
    ///
    /// Fails when the folder already has a producer or the record already has
    /// an output folder.
    pub fn attach_output_folder(&mut self, record: RecordId, folder: FolderId) -> Result<()> {
        let handle = self.folder(folder)?;
        if !handle.producers.is_empty() {
            return Err(ProvenanceError::UniquenessViolation(format!(
                "{} is already produced by {:?}",
                folder, handle.producers
            )));
        }
        let rec = self.record_mut(record)?;
        if let Some(existing) = rec.outputs.remote_folder {
            return Err(ProvenanceError::UniquenessViolation(format!(
                "{} already has the output folder {}",
                record, existing
            )));
        }
        rec.outputs.remote_folder = Some(folder);
        self.folders[folder.index()].producers.push(record);
        Ok(())
    }

    /// Mark a pending record as running
    pub fn mark_running(&mut self, id: RecordId) -> Result<()> {
        self.record_mut(id)?.status = CalcStatus::Running;
        Ok(())
    }

    /// Attach the outputs of a finished job; allowed exactly once
    pub fn finish(&mut self, id: RecordId, report: JobReport) -> Result<CalcStatus> {
        let record = self.record_mut(id)?;
        let status = report.status();
        record.status = status;
        record.outputs.retrieved = report.retrieved;
        record.outputs.results = report.results;
        record.stdout = report.stdout;
        record.stderr = report.stderr;
        debug!("{} finished with {:?}", id, status);
        Ok(status)
    }

    /// The single calculation that produced a folder
    pub fn producer_of(&self, folder: FolderId) -> Result<RecordId> {
        match self.folder(folder)?.producers.as_slice() {
            [producer] => Ok(*producer),
            [] => Err(ProvenanceError::UniquenessViolation(format!(
                "{} has no producing calculation",
                folder
            ))),
            many => Err(ProvenanceError::UniquenessViolation(format!(
                "{} has {} producing calculations {:?}",
                folder,
                many.len(),
                many
            ))),
        }
    }

    /// The single output folder of a calculation
    pub fn output_folder_of(&self, record: RecordId) -> Result<FolderId> {
        self.record(record)?;
        let folders: Vec<FolderId> = self
            .folders
            .iter()
            .filter(|f| f.producers.contains(&record))
            .map(|f| f.id)
            .collect();
        match folders.as_slice() {
            [folder] => Ok(*folder),
            [] => Err(ProvenanceError::NotExistent(format!(
                "{} has no output remote folder",
                record
            ))),
            many => Err(ProvenanceError::UniquenessViolation(format!(
                "{} has {} output remote folders {:?}",
                record,
                many.len(),
                many
            ))),
        }
    }

    /// Remember a finished workflow
    pub fn add_workflow(&mut self, workflow: WorkflowRecord) -> Result<WorkflowId> {
        self.record(workflow.last_calc)?;
        self.folder(workflow.remote_folder)?;
        self.workflows.push(workflow);
        Ok(WorkflowId(self.workflows.len() - 1))
    }

    /// Register the folder a finished workflow returns
    ///
    /// The returned folder points at the output of `last_calc` but has no
    /// producer of its own; it resolves through the workflow record.
    pub fn return_folder(&mut self, name: &str, last_calc: RecordId) -> Result<FolderId> {
        let output = self.output_folder_of(last_calc)?;
        let handle = self.folder(output)?;
        let (computer, path) = (handle.computer.clone(), handle.path.clone());
        let returned = self.add_folder(&computer, path);
        self.add_workflow(WorkflowRecord {
            name: name.to_string(),
            last_calc,
            remote_folder: returned,
        })?;
        Ok(returned)
    }

    /// The most recent workflow that returned `folder`
    pub fn workflow_returning(&self, folder: FolderId) -> Option<&WorkflowRecord> {
        self.workflows
            .iter()
            .rev()
            .find(|w| w.remote_folder == folder)
    }
}
