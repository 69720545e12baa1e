/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Band-structure workflow
//!
//! Starts from the remote folder of a converged KKR run (or of an SCF workflow
//! that returned it), builds a straight-line energy contour around the Fermi
//! energy and runs a single qdos calculation along a k-point path.

use super::driver::{
    await_job, resolve_remote, submit_calculation, Submission, Workflow, WorkflowEnv,
};
use super::errors::{ExitCode, Result, WorkflowFailure};
use super::state::Event;
use crate::calculations::CalculationBuilder;
use crate::params::{patch_energy_window, EnergyWindow, KeyScope, ParamError, ParameterSet};
use crate::parsers::{parse_bandstructure, BandStructureData};
use crate::provenance::{find_parent_structure, CalculationKind, Code, FolderId, RecordId};
use crate::scheduler::SchedulerOptions;
use crate::structure::{CellType, ExplicitPath, KpointsPath, StructureError};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const WORKFLOW_NAME: &str = "kkr_bs_wc";
pub const WORKFLOW_VERSION: &str = "0.1.0";
const DEFAULT_LABEL: &str = "kkr_BandStructure_wc";
const DEFAULT_DESCRIPTION: &str =
    "Workflow for a band structure calculation starting from a converged KKR calculation";
/// Points per segment of a generated k-point path
pub const KPOINTS_PER_SEGMENT: usize = 50;

/// Inputs of the band-structure workflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandStructureInputs {
    pub remote_data: Option<FolderId>,
    pub kkr: Option<Code>,
    #[serde(default)]
    pub wf_parameters: EnergyWindow,
    #[serde(default)]
    pub options: SchedulerOptions,
    pub kpoints: Option<KpointsPath>,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Result record of a successful band-structure run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStructureResults {
    pub workflow_name: String,
    pub workflow_version: String,
    pub options: SchedulerOptions,
    pub bs_params: EnergyWindow,
    pub bs_wf_label: String,
    pub bs_wf_description: String,
    pub nspin: Option<i64>,
    /// Cell the generated k-point path was derived from; `None` for given k-points
    pub structure_type: Option<CellType>,
    pub successful: bool,
    pub list_of_errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Fermi energy of the parent calculation in Ry
    pub fermi_energy: f64,
    pub bs_calc: RecordId,
    /// Folder returned by this workflow
    pub remote_folder: FolderId,
    pub bs_data: BandStructureData,
}

#[derive(Debug, Default)]
struct Context {
    remote: Option<FolderId>,
    parent: Option<RecordId>,
    code: Option<Code>,
    kpoints: Option<KpointsPath>,
    structure_type: Option<CellType>,
    base_params: Option<ParameterSet>,
    params: Option<ParameterSet>,
    fermi_energy: Option<f64>,
    submission: Option<Submission>,
    awaited: bool,
    bs_data: Option<BandStructureData>,
    nspin: Option<i64>,
    successful: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Driver of one band-structure run
pub struct BandStructureWorkflow {
    inputs: BandStructureInputs,
    ctx: Context,
}

fn fail(code: ExitCode, message: impl Into<String>) -> Result<Event> {
    Ok(Event::fail(WorkflowFailure::new(code, message)))
}

impl BandStructureWorkflow {
    pub fn new(inputs: BandStructureInputs) -> Self {
        Self {
            inputs,
            ctx: Context {
                successful: true,
                ..Default::default()
            },
        }
    }
}

impl Workflow for BandStructureWorkflow {
    type Output = BandStructureResults;

    fn name(&self) -> &'static str {
        WORKFLOW_NAME
    }

    fn validate_inputs(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        info!(
            "Using options {:?} and window {:?}",
            self.inputs.options, self.inputs.wf_parameters
        );
        let Some(remote) = self.inputs.remote_data else {
            return fail(ExitCode::NoInputRemoteData, "remote_data is mandatory");
        };
        let Some((remote, parent)) = resolve_remote(env.graph, remote) else {
            return fail(
                ExitCode::InvalidRemoteDataType,
                format!("{} has no unique producer and no workflow returned it", remote),
            );
        };

        let kpoints = match &self.inputs.kpoints {
            Some(kpoints) => kpoints.clone(),
            None => {
                let structure = match find_parent_structure(env.graph, remote) {
                    Ok(found) => env.graph.structure(found.structure)?,
                    Err(err) => return fail(ExitCode::NoKpointsExtracted, err.to_string()),
                };
                match ExplicitPath::new(structure, KPOINTS_PER_SEGMENT) {
                    Ok(path) => {
                        if path.cell_type == CellType::ConventionalUnitCell {
                            let warning = "WARNING: the structure of the parent calculation is not a \
                                           primitive cell, the bands are folded"
                                .to_string();
                            warn!("{}", warning);
                            self.ctx.warnings.push(warning);
                        }
                        self.ctx.structure_type = Some(path.cell_type);
                        path.kpoints
                    }
                    Err(err @ StructureError::UnsupportedLattice { .. }) => {
                        return fail(ExitCode::IncorrectKpointsExtracted, err.to_string())
                    }
                    Err(err) => return fail(ExitCode::NoKpointsExtracted, err.to_string()),
                }
            }
        };
        if kpoints.is_empty() {
            return fail(ExitCode::NoKpointsExtracted, "k-point path is empty");
        }

        match &self.inputs.kkr {
            Some(code) if code.kind == CalculationKind::Kkr => self.ctx.code = Some(code.clone()),
            Some(code) => {
                return fail(
                    ExitCode::KkrCodeNotCorrect,
                    format!("code {} uses plugin {}", code.label, code.kind),
                )
            }
            None => return fail(ExitCode::KkrCodeNotCorrect, "no kkr code given"),
        }

        let parent_record = env.graph.record(parent)?;
        let Some(params_id) = parent_record.inputs.parameters else {
            return fail(
                ExitCode::InvalidRemoteDataType,
                format!("parent calculation {} has no parameters", parent),
            );
        };

        self.ctx.base_params = Some(env.graph.parameters(params_id)?.clone());
        self.ctx.fermi_energy = parent_record.results().and_then(|r| r.fermi_energy());
        self.ctx.remote = Some(remote);
        self.ctx.parent = Some(parent);
        self.ctx.kpoints = Some(kpoints);
        Ok(Event::InputsValid)
    }

    fn compute_parameters(&mut self, _env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let Some(base) = self.ctx.base_params.as_ref() else {
            return fail(ExitCode::CalcParametersInvalid, "no parent parameters");
        };

        let window = &self.inputs.wf_parameters;
        if window.npt2 <= 0 || !window.emin.is_finite() || !window.emax.is_finite() || window.tempr < 0.0 {
            return fail(
                ExitCode::CalcParametersInvalid,
                format!("invalid band-structure window {:?}", window),
            );
        }

        let (filled, added) = base.fill_defaults(KeyScope::Calculation);
        let missing = filled.missing_keys(KeyScope::Calculation);
        if !missing.is_empty() {
            return Ok(Event::fail(
                WorkflowFailure::new(
                    ExitCode::CalcParametersIncomplete,
                    format!("calc_parameters misses keys: {:?}", missing),
                )
                .with_errors(missing.iter().map(|k| k.to_string()).collect()),
            ));
        }
        if !added.is_empty() {
            info!("Updated KKR parameters with default values: {:?}", added);
        }

        let Some(fermi_energy) = self.ctx.fermi_energy else {
            return fail(
                ExitCode::InvalidRemoteDataType,
                "parent calculation has no Fermi energy in its results",
            );
        };

        match patch_energy_window(&filled, window, fermi_energy) {
            Ok(params) => {
                self.ctx.params = Some(params);
                Ok(Event::ParametersReady)
            }
            Err(ParamError::InvalidParameter(report)) if !report.missing.is_empty() => {
                fail(ExitCode::CalcParametersIncomplete, report.to_string())
            }
            Err(err) => fail(ExitCode::CalcParametersInvalid, err.to_string()),
        }
    }

    fn submit_job(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let (Some(remote), Some(params), Some(kpoints), Some(code)) = (
            self.ctx.remote,
            self.ctx.params.clone(),
            self.ctx.kpoints.clone(),
            self.ctx.code.clone(),
        ) else {
            return fail(ExitCode::BsCalcFailed, "submission context incomplete");
        };

        let params_id = env.graph.add_parameters(params);
        let builder = match CalculationBuilder::kkr("KKR BS calc.").parent_folder(remote) {
            Ok(builder) => builder.parameters(params_id).code(&code).kpoints(kpoints),
            Err(err) => return fail(ExitCode::BsCalcFailed, err.to_string()),
        };

        match submit_calculation(env, builder, &code, &self.inputs.options) {
            Ok(submission) => {
                self.ctx.submission = Some(submission);
                Ok(Event::Submitted)
            }
            Err(err) => fail(ExitCode::BsCalcFailed, err.to_string()),
        }
    }

    fn await_completion(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let Some(submission) = self.ctx.submission.clone().filter(|_| !self.ctx.awaited) else {
            return fail(ExitCode::BsCalcFailed, "no job to wait for");
        };
        self.ctx.awaited = true;
        match await_job(env, &submission) {
            Ok(_) => Ok(Event::JobTerminated),
            Err(err) => fail(ExitCode::BsCalcFailed, err.to_string()),
        }
    }

    fn collect_results(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let Some(submission) = self.ctx.submission.as_ref() else {
            return fail(ExitCode::BsCalcFailed, "no submitted job");
        };
        let record = env.graph.record(submission.record)?;

        if !record.status.is_finished_ok() {
            let error = format!(
                "ERROR BS calculation failed somehow it is in state {:?}",
                record.status
            );
            self.ctx.successful = false;
            self.ctx.errors.push(error.clone());
            return Ok(Event::fail(
                WorkflowFailure::new(ExitCode::BsCalcFailed, error)
                    .with_output(&record.stdout, &record.stderr)
                    .with_errors(self.ctx.errors.clone()),
            ));
        }

        self.ctx.nspin = record.results().and_then(|r| r.as_kkr()).and_then(|r| r.nspin);
        if self.ctx.nspin.is_none() {
            let error = "ERROR: nspin not extracted".to_string();
            warn!("{}", error);
            self.ctx.successful = false;
            self.ctx.errors.push(error);
        }

        let Some(retrieved) = record.outputs.retrieved.clone() else {
            return Ok(Event::fail(
                WorkflowFailure::new(ExitCode::BsCalcFailed, "No band structure retrieved folder found")
                    .with_output(&record.stdout, &record.stderr),
            ));
        };
        let labels = self
            .ctx
            .kpoints
            .as_ref()
            .map(|k| k.labels().to_vec())
            .unwrap_or_default();
        let fermi_energy = self.ctx.fermi_energy.unwrap_or_default();

        match parse_bandstructure(&retrieved, fermi_energy, &labels) {
            Ok(data) => {
                self.ctx.bs_data = Some(data);
                Ok(Event::Done)
            }
            Err(err) => Ok(Event::fail(
                WorkflowFailure::new(ExitCode::BsCalcFailed, format!("band structure parsing failed: {}", err))
                    .with_output(&record.stdout, &record.stderr),
            )),
        }
    }

    fn finish(self, env: &mut WorkflowEnv<'_>) -> Result<BandStructureResults> {
        let Context {
            submission,
            bs_data,
            fermi_energy,
            nspin,
            structure_type,
            successful,
            errors,
            warnings,
            ..
        } = self.ctx;
        let (Some(submission), Some(bs_data)) = (submission, bs_data) else {
            return Err(crate::provenance::ProvenanceError::NotExistent(
                "band-structure run finished without data".to_string(),
            )
            .into());
        };

        let remote_folder = env.graph.return_folder(WORKFLOW_NAME, submission.record)?;
        info!("INFO: done with BS_workflow!");

        Ok(BandStructureResults {
            workflow_name: WORKFLOW_NAME.to_string(),
            workflow_version: WORKFLOW_VERSION.to_string(),
            options: self.inputs.options,
            bs_params: self.inputs.wf_parameters,
            bs_wf_label: self.inputs.label.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            bs_wf_description: self
                .inputs
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            nspin,
            structure_type,
            successful,
            list_of_errors: errors,
            warnings,
            fermi_energy: fermi_energy.unwrap_or_default(),
            bs_calc: submission.record,
            remote_folder,
            bs_data,
        })
    }
}
