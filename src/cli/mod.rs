/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command-line interface
//!
//! Every subcommand loads the provenance store named in the run
//! configuration, does its work against it and saves it back.

pub mod config;
pub mod errors;

pub use config::RunConfig;
pub use errors::ConfigError;

use crate::calculations::CalculationBuilder;
use crate::params::{inputcard, patch_energy_window, EnergyWindow, ParameterSet};
use crate::provenance::{
    find_parent_structure_within, CalculationKind, FolderId, ProvenanceGraph, RecordId, MAX_PARENT_HOPS,
};
use crate::scheduler::LocalScheduler;
use crate::structure::{KpointsPath, StructureDescriptor};
use crate::workflow::driver::{await_job, submit_calculation};
use crate::workflow::{
    run_workflow, BandStructureInputs, BandStructureWorkflow, ScfInputs, ScfParameters,
    ScfWorkflow, WorkflowEnv, WorkflowOutcome,
};
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kkr-rs", version, about = "Run KKR and Voronoi calculations and workflows")]
pub struct Cli {
    /// Run configuration (YAML)
    #[arg(short, long, global = true, default_value = "kkr.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Voronoi calculation for a structure
    Voronoi {
        /// Structure descriptor (JSON)
        #[arg(long)]
        structure: PathBuf,
        /// Parameter set (JSON)
        #[arg(long)]
        parameters: PathBuf,
        #[arg(long, default_value = "voronoi calculation")]
        label: String,
    },

    /// Run a KKR calculation continuing from a parent folder or calculation
    Kkr {
        /// Parent remote folder id
        #[arg(long, conflicts_with = "parent_calc", required_unless_present = "parent_calc")]
        parent_folder: Option<usize>,
        /// Parent calculation id; its unique output folder is used
        #[arg(long)]
        parent_calc: Option<usize>,
        /// Parameter set (JSON)
        #[arg(long)]
        parameters: PathBuf,
        /// K-point path (JSON); switches the run to qdos mode
        #[arg(long)]
        kpoints: Option<PathBuf>,
        #[arg(long, default_value = "KKR calculation")]
        label: String,
    },

    /// Find the structure behind a remote folder
    FindStructure {
        /// Remote folder id
        folder: usize,
        #[arg(long, default_value_t = MAX_PARENT_HOPS)]
        max_hops: usize,
    },

    /// Band-structure workflow starting from a converged remote folder
    Bands {
        /// Remote folder id
        remote: usize,
        /// Energy window (JSON), relative to the Fermi energy in eV
        #[arg(long)]
        window: Option<PathBuf>,
        /// K-point path (JSON); generated from the structure if absent
        #[arg(long)]
        kpoints: Option<PathBuf>,
        #[arg(long)]
        label: Option<String>,
        /// Write the result record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Self-consistency workflow
    Scf {
        /// Structure descriptor (JSON); a Voronoi step runs first
        #[arg(long, conflicts_with = "remote", required_unless_present = "remote")]
        structure: Option<PathBuf>,
        /// Remote folder id of a previous calculation
        #[arg(long)]
        remote: Option<usize>,
        /// Calculation parameters (JSON)
        #[arg(long)]
        parameters: Option<PathBuf>,
        /// Workflow parameters (JSON)
        #[arg(long)]
        wf_parameters: Option<PathBuf>,
        #[arg(long)]
        label: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an energy window around a Fermi energy to a parameter set
    Patch {
        /// Parameter set (JSON)
        parameters: PathBuf,
        /// Fermi energy in Ry
        #[arg(long)]
        fermi_energy: f64,
        #[arg(long)]
        window: Option<PathBuf>,
        /// Print an inputcard instead of JSON
        #[arg(long)]
        inputcard: bool,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
    );
    serde_json::from_reader(reader).with_context(|| format!("cannot parse {}", path.display()))
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!("Result written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn emit_outcome<T: Serialize>(outcome: WorkflowOutcome<T>, output: Option<&Path>) -> anyhow::Result<()> {
    match outcome {
        WorkflowOutcome::Success(results) => emit(&results, output),
        WorkflowOutcome::Failed(failure) => {
            if !failure.stderr.is_empty() {
                eprintln!("{}", failure.stderr);
            }
            bail!("{}", failure)
        }
    }
}

/// Run one subcommand against the configured store
pub fn run(cli: Cli, config: &RunConfig) -> anyhow::Result<()> {
    if let Commands::Patch {
        parameters,
        fermi_energy,
        window,
        inputcard: as_inputcard,
    } = &cli.command
    {
        let base = ParameterSet::from_json_file(parameters)?;
        let window: EnergyWindow = match window {
            Some(path) => read_json(path)?,
            None => EnergyWindow::default(),
        };
        let patched = patch_energy_window(&base, &window, *fermi_energy)?;
        if *as_inputcard {
            print!("{}", inputcard::render(&patched));
        } else {
            emit(&patched, None)?;
        }
        return Ok(());
    }

    let mut graph = ProvenanceGraph::load_or_default(&config.store)?;
    let mut scheduler = LocalScheduler::new(&config.workdir);
    let result = dispatch(cli.command, config, &mut graph, &mut scheduler);
    graph
        .save(&config.store)
        .with_context(|| format!("cannot save {}", config.store.display()))?;
    result
}

fn dispatch(
    command: Commands,
    config: &RunConfig,
    graph: &mut ProvenanceGraph,
    scheduler: &mut LocalScheduler,
) -> anyhow::Result<()> {
    match command {
        Commands::Voronoi {
            structure,
            parameters,
            label,
        } => {
            let code = config.voronoi_code()?.clone();
            let structure = graph.add_structure(StructureDescriptor::from_json_file(&structure)?);
            let parameters = graph.add_parameters(ParameterSet::from_json_file(&parameters)?);
            let builder = CalculationBuilder::voronoi(&label)
                .structure(structure)
                .parameters(parameters)
                .code(&code);
            run_single(graph, scheduler, builder, config)
        }
        Commands::Kkr {
            parent_folder,
            parent_calc,
            parameters,
            kpoints,
            label,
        } => {
            let code = config.kkr_code()?.clone();
            let parameters = graph.add_parameters(ParameterSet::from_json_file(&parameters)?);
            let mut builder = CalculationBuilder::kkr(&label).parameters(parameters).code(&code);
            builder = match (parent_folder, parent_calc) {
                (Some(folder), _) => builder.parent_folder(FolderId(folder))?,
                (None, Some(record)) => builder.use_parent_calculation(graph, RecordId(record))?,
                (None, None) => bail!("a parent folder or parent calculation is required"),
            };
            if let Some(path) = kpoints {
                builder = builder.kpoints(read_json::<KpointsPath>(&path)?);
            }
            run_single(graph, scheduler, builder, config)
        }
        Commands::FindStructure { folder, max_hops } => {
            let resolved = find_parent_structure_within(graph, FolderId(folder), max_hops)?;
            info!(
                "Structure found at {} after {} hop(s)",
                resolved.voronoi, resolved.hops
            );
            emit(graph.structure(resolved.structure)?, None)
        }
        Commands::Bands {
            remote,
            window,
            kpoints,
            label,
            output,
        } => {
            let inputs = BandStructureInputs {
                remote_data: Some(FolderId(remote)),
                kkr: config.kkr.clone(),
                wf_parameters: match window {
                    Some(path) => read_json(&path)?,
                    None => EnergyWindow::default(),
                },
                options: config.options.clone(),
                kpoints: kpoints.map(|path| read_json(&path)).transpose()?,
                label,
                description: None,
            };
            let mut env = WorkflowEnv::new(graph, scheduler);
            let outcome = run_workflow(BandStructureWorkflow::new(inputs), &mut env)?;
            emit_outcome(outcome, output.as_deref())
        }
        Commands::Scf {
            structure,
            remote,
            parameters,
            wf_parameters,
            label,
            output,
        } => {
            let structure = structure
                .map(|path| StructureDescriptor::from_json_file(&path))
                .transpose()?
                .map(|s| graph.add_structure(s));
            let inputs = ScfInputs {
                structure,
                remote_data: remote.map(FolderId),
                calc_parameters: parameters
                    .map(|path| ParameterSet::from_json_file(&path))
                    .transpose()?,
                voronoi: config.voronoi.clone(),
                kkr: config.kkr.clone(),
                wf_parameters: match wf_parameters {
                    Some(path) => read_json(&path)?,
                    None => ScfParameters::default(),
                },
                options: config.options.clone(),
                label,
                description: None,
            };
            let mut env = WorkflowEnv::new(graph, scheduler);
            let outcome = run_workflow(ScfWorkflow::new(inputs), &mut env)?;
            emit_outcome(outcome, output.as_deref())
        }
        Commands::Patch { .. } => Err(anyhow!("patch does not use the provenance store")),
    }
}

fn run_single(
    graph: &mut ProvenanceGraph,
    scheduler: &mut LocalScheduler,
    builder: CalculationBuilder,
    config: &RunConfig,
) -> anyhow::Result<()> {
    let code = match builder.kind() {
        CalculationKind::Voronoi => config.voronoi_code()?.clone(),
        CalculationKind::Kkr => config.kkr_code()?.clone(),
    };
    let mut env = WorkflowEnv::new(graph, scheduler);
    let submission = submit_calculation(&mut env, builder, &code, &config.options)
        .context("submitting the calculation")?;
    let status = await_job(&mut env, &submission)?;
    let record = env.graph.record(submission.record)?;
    if !status.is_finished_ok() {
        if !record.stderr.is_empty() {
            eprintln!("{}", record.stderr);
        }
        bail!("{} finished with status {:?}", submission.record, status);
    }
    emit(record, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["kkr-rs", "bands", "3", "--label", "Cu bands"]);
        match cli.command {
            Commands::Bands { remote, label, .. } => {
                assert_eq!(remote, 3);
                assert_eq!(label.as_deref(), Some("Cu bands"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from("kkr.yaml"));
    }

    #[test]
    fn test_kkr_requires_a_parent() {
        assert!(Cli::try_parse_from(["kkr-rs", "kkr", "--parameters", "p.json"]).is_err());
        assert!(Cli::try_parse_from([
            "kkr-rs",
            "kkr",
            "--parameters",
            "p.json",
            "--parent-folder",
            "1",
            "--parent-calc",
            "2"
        ])
        .is_err());
    }

    #[test]
    fn test_scf_start_is_exclusive() {
        assert!(Cli::try_parse_from(["kkr-rs", "scf"]).is_err());
        assert!(Cli::try_parse_from(["kkr-rs", "scf", "--remote", "4", "-c", "run.yaml"]).is_ok());
    }
}
