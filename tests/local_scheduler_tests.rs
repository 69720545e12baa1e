/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

#![cfg(unix)]

mod common;

use common::{calc_parameters, cu_fcc, options};
use kkr_rs::calculations::CalculationBuilder;
use kkr_rs::params::KeyScope;
use kkr_rs::provenance::{CalcStatus, CalculationKind, Code, ProvenanceGraph, RecordId};
use kkr_rs::scheduler::{LocalScheduler, SchedulerOptions};
use kkr_rs::workflow::driver::{await_job, submit_calculation};
use kkr_rs::workflow::WorkflowEnv;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

fn fake_binary(dir: &Path, body: &str) -> Code {
    let path = dir.join("voronoi.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    Code::new("voronoi", CalculationKind::Voronoi, path)
}

fn run_voronoi(
    dir: &TempDir,
    body: &str,
    options: &SchedulerOptions,
) -> (ProvenanceGraph, RecordId, CalcStatus) {
    let code = fake_binary(dir.path(), body);
    let mut graph = ProvenanceGraph::new();
    let structure = graph.add_structure(cu_fcc());
    let params = graph.add_parameters(calc_parameters().fill_defaults(KeyScope::Calculation).0);
    let mut scheduler = LocalScheduler::new(dir.path().join("runs"));

    let builder = CalculationBuilder::voronoi("voronoi")
        .structure(structure)
        .parameters(params)
        .code(&code);
    let (record, status) = {
        let mut env = WorkflowEnv::new(&mut graph, &mut scheduler);
        let submission = submit_calculation(&mut env, builder, &code, options).unwrap();
        let status = await_job(&mut env, &submission).unwrap();
        (submission.record, status)
    };
    (graph, record, status)
}

#[test]
fn test_local_run_is_parsed_and_retrieved() {
    let body = "test -f inputcard || exit 9\n\
                echo '  EMIN= -0.4'\n\
                echo '  site 1:    13 atoms in cluster'\n\
                touch shapefun output.pot scratch.tmp";
    let dir = TempDir::new().unwrap();
    let (graph, record, status) = run_voronoi(&dir, body, &options());
    assert_eq!(status, CalcStatus::FinishedOk);

    let record = graph.record(record).unwrap();
    assert_eq!(record.results().and_then(|r| r.emin()), Some(-0.4));
    let retrieved = record.outputs.retrieved.as_ref().unwrap();
    assert!(retrieved.join("out_voronoi").exists());
    assert!(retrieved.join("shapefun").exists());
    assert!(!retrieved.join("scratch.tmp").exists());
    assert!(record.stdout.contains("EMIN"));
}

#[test]
fn test_local_failure_captures_stderr() {
    let dir = TempDir::new().unwrap();
    let (graph, record, status) = run_voronoi(&dir, "echo 'cannot read potential' >&2\nexit 3", &options());
    assert_eq!(
        status,
        CalcStatus::Failed {
            exit_status: Some(3)
        }
    );
    let record = graph.record(record).unwrap();
    assert!(record.stderr.contains("cannot read potential"));
    assert!(record.results().is_none());
}

#[test]
fn test_walltime_kills_job() {
    let options = SchedulerOptions {
        max_wallclock_seconds: 1,
        ..options()
    };
    let dir = TempDir::new().unwrap();
    let (_, _, status) = run_voronoi(&dir, "sleep 30", &options);
    assert_eq!(status, CalcStatus::Failed { exit_status: None });
}
