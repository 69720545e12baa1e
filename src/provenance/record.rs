/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Calculation records, remote folders and codes

use super::ids::{FolderId, ParamSetId, RecordId, StructureId};
use crate::parsers::{KkrOutput, VoronoiOutput};
use crate::structure::KpointsPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Plugin kind of a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationKind {
    /// Voronoi preprocessing: generates shape functions and starting potentials
    Voronoi,
    /// KKR Green's-function solver
    Kkr,
}

impl CalculationKind {
    /// Plugin name used by codes
    pub fn plugin_name(self) -> &'static str {
        match self {
            CalculationKind::Voronoi => "kkr.voro",
            CalculationKind::Kkr => "kkr.kkr",
        }
    }

    /// Parse a plugin name
    pub fn from_plugin_name(name: &str) -> Option<Self> {
        match name {
            "kkr.voro" => Some(CalculationKind::Voronoi),
            "kkr.kkr" => Some(CalculationKind::Kkr),
            _ => None,
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plugin_name())
    }
}

/// An executable registered for one plugin kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub label: String,
    pub kind: CalculationKind,
    pub executable: PathBuf,
}

impl Code {
    pub fn new(label: &str, kind: CalculationKind, executable: impl Into<PathBuf>) -> Self {
        Self {
            label: label.to_string(),
            kind,
            executable: executable.into(),
        }
    }
}

/// Lifecycle status of a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcStatus {
    Pending,
    Running,
    FinishedOk,
    Failed { exit_status: Option<i32> },
}

impl CalcStatus {
    /// Whether the job will not change any more
    pub fn is_terminal(self) -> bool {
        matches!(self, CalcStatus::FinishedOk | CalcStatus::Failed { .. })
    }

    pub fn is_finished_ok(self) -> bool {
        self == CalcStatus::FinishedOk
    }
}

/// Named inputs of a calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcInputs {
    pub structure: Option<StructureId>,
    pub parameters: Option<ParamSetId>,
    pub parent_folder: Option<FolderId>,
    pub code: Option<String>,
    pub kpoints: Option<KpointsPath>,
}

/// Parsed results of a finished calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalcResults {
    Voronoi(VoronoiOutput),
    Kkr(KkrOutput),
}

impl CalcResults {
    /// Fermi energy in Ry, KKR results only
    pub fn fermi_energy(&self) -> Option<f64> {
        match self {
            CalcResults::Kkr(out) => out.fermi_energy,
            CalcResults::Voronoi(_) => None,
        }
    }

    /// Bottom of the contour in Ry, Voronoi results only
    pub fn emin(&self) -> Option<f64> {
        match self {
            CalcResults::Voronoi(out) => out.emin,
            CalcResults::Kkr(_) => None,
        }
    }

    pub fn as_kkr(&self) -> Option<&KkrOutput> {
        match self {
            CalcResults::Kkr(out) => Some(out),
            CalcResults::Voronoi(_) => None,
        }
    }
}

/// Named outputs of a calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcOutputs {
    pub remote_folder: Option<FolderId>,
    pub retrieved: Option<PathBuf>,
    pub results: Option<CalcResults>,
}

/// Everything a finished job reports back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReport {
    pub exit_status: Option<i32>,
    pub retrieved: Option<PathBuf>,
    pub results: Option<CalcResults>,
    pub stdout: String,
    pub stderr: String,
}

impl JobReport {
    /// Terminal status implied by the report
    pub fn status(&self) -> CalcStatus {
        match self.exit_status {
            Some(0) => CalcStatus::FinishedOk,
            other => CalcStatus::Failed { exit_status: other },
        }
    }
}

/// A node of the provenance graph describing one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: RecordId,
    pub kind: CalculationKind,
    pub label: String,
    pub inputs: CalcInputs,
    pub outputs: CalcOutputs,
    pub status: CalcStatus,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl CalculationRecord {
    /// Parsed results, if any
    pub fn results(&self) -> Option<&CalcResults> {
        self.outputs.results.as_ref()
    }
}

/// A working directory on some computer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFolderHandle {
    pub id: FolderId,
    pub computer: String,
    pub path: PathBuf,
    /// Records that list this folder as their output; at most one is valid
    pub producers: Vec<RecordId>,
}

/// A finished workflow that returned a remote folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub name: String,
    pub last_calc: RecordId,
    pub remote_folder: FolderId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_names() {
        assert_eq!(CalculationKind::Kkr.plugin_name(), "kkr.kkr");
        assert_eq!(
            CalculationKind::from_plugin_name("kkr.voro"),
            Some(CalculationKind::Voronoi)
        );
        assert_eq!(CalculationKind::from_plugin_name("kkr.kkrimp"), None);
    }

    #[test]
    fn test_report_status() {
        let mut report = JobReport {
            exit_status: Some(0),
            ..Default::default()
        };
        assert_eq!(report.status(), CalcStatus::FinishedOk);
        report.exit_status = Some(3);
        assert!(matches!(
            report.status(),
            CalcStatus::Failed {
                exit_status: Some(3)
            }
        ));
        report.exit_status = None;
        assert!(report.status().is_terminal());
    }
}
