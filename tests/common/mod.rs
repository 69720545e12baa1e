/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use kkr_rs::calculations::CalcInfo;
use kkr_rs::params::{ParamValue, ParameterSet};
use kkr_rs::provenance::{
    CalcInputs, CalcResults, CalculationKind, Code, FolderId, JobReport, ProvenanceGraph, RecordId,
    StructureId,
};
use kkr_rs::parsers::{KkrOutput, VoronoiOutput};
use kkr_rs::scheduler::{parse_results, JobHandle, JobScheduler, SchedulerError, SchedulerOptions};
use kkr_rs::structure::{StructureDescriptor, Vector3D};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn cu_fcc() -> StructureDescriptor {
    let a = 0.5 * 6.83 * 0.52917721067;
    let mut cu = StructureDescriptor::with_label(
        [
            Vector3D::new(a, a, 0.0),
            Vector3D::new(a, 0.0, a),
            Vector3D::new(0.0, a, a),
        ],
        "Cu bulk",
    );
    cu.append_atom(Vector3D::origin(), "Cu").unwrap();
    cu
}

/// Mandatory calculation keywords without defaults
pub fn calc_parameters() -> ParameterSet {
    ParameterSet::from_map([
        ("LMAX", ParamValue::Int(2)),
        ("NSPIN", ParamValue::Int(1)),
        ("RMAX", ParamValue::Float(7.0)),
        ("GMAX", ParamValue::Float(65.0)),
    ])
    .unwrap()
}

pub fn voronoi_code() -> Code {
    Code::new("voronoi", CalculationKind::Voronoi, "/opt/kkr/voronoi.exe")
}

pub fn kkr_code() -> Code {
    Code::new("kkrhost", CalculationKind::Kkr, "/opt/kkr/kkr.x")
}

pub fn options() -> SchedulerOptions {
    SchedulerOptions {
        withmpi: false,
        ..Default::default()
    }
}

/// A finished Voronoi run followed by a finished KKR run with a Fermi energy
///
/// Returns the graph and the output folder of the KKR run.
pub fn converged_graph(fermi_energy: f64) -> (ProvenanceGraph, FolderId, RecordId) {
    converged_graph_for(cu_fcc(), fermi_energy)
}

/// Same as [`converged_graph`] for another structure
pub fn converged_graph_for(
    structure: StructureDescriptor,
    fermi_energy: f64,
) -> (ProvenanceGraph, FolderId, RecordId) {
    let mut graph = ProvenanceGraph::new();
    let structure = graph.add_structure(structure);
    let params = graph.add_parameters(calc_parameters());

    let voro = graph
        .add_calculation(
            CalculationKind::Voronoi,
            "voronoi",
            CalcInputs {
                structure: Some(structure),
                parameters: Some(params),
                ..Default::default()
            },
        )
        .unwrap();
    let voro_folder = graph.add_output_folder(voro, "localhost", "/w/voro").unwrap();
    graph
        .finish(
            voro,
            JobReport {
                exit_status: Some(0),
                results: Some(CalcResults::Voronoi(VoronoiOutput {
                    emin: Some(-0.5),
                    ..Default::default()
                })),
                ..Default::default()
            },
        )
        .unwrap();

    let kkr = graph
        .add_calculation(
            CalculationKind::Kkr,
            "scf",
            CalcInputs {
                parameters: Some(params),
                parent_folder: Some(voro_folder),
                ..Default::default()
            },
        )
        .unwrap();
    let folder = graph.add_output_folder(kkr, "localhost", "/w/scf").unwrap();
    graph
        .finish(
            kkr,
            JobReport {
                exit_status: Some(0),
                results: Some(CalcResults::Kkr(KkrOutput {
                    fermi_energy: Some(fermi_energy),
                    nspin: Some(1),
                    ..Default::default()
                })),
                ..Default::default()
            },
        )
        .unwrap();
    (graph, folder, kkr)
}

/// Chain of `length` records: a Voronoi run with the structure, then KKR runs
pub fn chain(length: usize) -> (ProvenanceGraph, StructureId, FolderId) {
    let mut graph = ProvenanceGraph::new();
    let structure = graph.add_structure(cu_fcc());
    let voro = graph
        .add_calculation(
            CalculationKind::Voronoi,
            "voronoi",
            CalcInputs {
                structure: Some(structure),
                ..Default::default()
            },
        )
        .unwrap();
    let mut folder = graph.add_output_folder(voro, "localhost", "/w/0").unwrap();
    for i in 1..length {
        let calc = graph
            .add_calculation(
                CalculationKind::Kkr,
                "kkr",
                CalcInputs {
                    parent_folder: Some(folder),
                    ..Default::default()
                },
            )
            .unwrap();
        folder = graph
            .add_output_folder(calc, "localhost", format!("/w/{}", i))
            .unwrap();
    }
    (graph, structure, folder)
}

/// What a scripted job leaves behind
#[derive(Debug, Clone)]
pub struct ScriptedJob {
    pub exit_status: Option<i32>,
    /// Files the "binary" writes into its working folder
    pub files: Vec<(String, String)>,
    pub stderr: String,
}

impl ScriptedJob {
    pub fn ok(files: &[(&str, &str)]) -> Self {
        Self {
            exit_status: Some(0),
            files: files
                .iter()
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_status: i32, stdout_name: &str, stdout: &str, stderr: &str) -> Self {
        Self {
            exit_status: Some(exit_status),
            files: vec![(stdout_name.to_string(), stdout.to_string())],
            stderr: stderr.to_string(),
        }
    }
}

/// Scheduler that replays scripted outcomes instead of running binaries
pub struct ScriptedScheduler {
    root: TempDir,
    script: VecDeque<ScriptedJob>,
    pub submitted: Vec<CalcInfo>,
    pub waits: usize,
}

impl ScriptedScheduler {
    pub fn new(script: Vec<ScriptedJob>) -> Self {
        Self {
            root: TempDir::new().unwrap(),
            script: script.into(),
            submitted: Vec::new(),
            waits: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn workdir(&self, job_id: usize) -> PathBuf {
        self.root.path().join(format!("job-{}", job_id))
    }
}

impl JobScheduler for ScriptedScheduler {
    fn submit(
        &mut self,
        record: RecordId,
        info: &CalcInfo,
        _code: &Code,
        _options: &SchedulerOptions,
    ) -> kkr_rs::scheduler::Result<JobHandle> {
        let job_id = self.submitted.len();
        let workdir = self.workdir(job_id);
        fs::create_dir_all(&workdir)?;
        for (name, content) in &info.files {
            fs::write(workdir.join(name), content)?;
        }
        self.submitted.push(info.clone());
        Ok(JobHandle {
            job_id,
            record,
            computer: "localhost".to_string(),
            workdir,
        })
    }

    fn wait(&mut self, job: &JobHandle) -> kkr_rs::scheduler::Result<JobReport> {
        self.waits += 1;
        let script = self
            .script
            .pop_front()
            .ok_or(SchedulerError::UnknownJob(job.job_id))?;
        let info = &self.submitted[job.job_id];
        for (name, content) in &script.files {
            fs::write(job.workdir.join(name), content)?;
        }
        let retrieved = self.root.path().join("retrieved").join(job.job_id.to_string());
        info.retrieve(&job.workdir, &retrieved)?;

        let stdout = fs::read_to_string(job.workdir.join(&info.stdout_name)).unwrap_or_default();
        let results = match script.exit_status {
            Some(0) => parse_results(info.kind, &retrieved).ok(),
            _ => None,
        };
        Ok(JobReport {
            exit_status: script.exit_status,
            retrieved: Some(retrieved),
            results,
            stdout,
            stderr: script.stderr,
        })
    }
}
