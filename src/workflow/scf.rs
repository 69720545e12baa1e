/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Self-consistency workflow
//!
//! Optionally runs the Voronoi step for a bare structure, then resubmits the
//! KKR code from the previous folder until the rms error of the potential
//! drops below `convergence_criterion` or `kkr_runmax` runs were made.

use super::driver::{
    await_job, resolve_remote, submit_calculation, Submission, Workflow, WorkflowEnv,
};
use super::errors::{ExitCode, Result, WorkflowFailure};
use super::state::Event;
use crate::calculations::CalculationBuilder;
use crate::params::{KeyScope, ParamValue, ParameterSet};
use crate::provenance::{
    CalculationKind, Code, FolderId, ProvenanceError, RecordId, StructureId,
};
use crate::scheduler::SchedulerOptions;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const WORKFLOW_NAME: &str = "kkr_scf_wc";
pub const WORKFLOW_VERSION: &str = "0.1.0";

/// Mixing scheme numbers of the `IMIX` keyword
const IMIX_STRAIGHT: i64 = 0;
const IMIX_BROYDEN: i64 = 5;

/// Tunables of the convergence loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfParameters {
    /// rms error below which the potential counts as converged
    pub convergence_criterion: f64,
    /// Maximum number of KKR runs
    pub kkr_runmax: usize,
    /// Self-consistency iterations per KKR run
    pub nsteps: i64,
    /// Straight mixing factor
    pub strmix: f64,
    /// Broyden mixing factor used once close to convergence
    pub brymix: f64,
    /// rms error below which Broyden mixing is switched on
    pub threshold_switch_high_accuracy: f64,
    /// Check the energy contour against the final Fermi energy
    pub check_dos: bool,
}

impl Default for ScfParameters {
    fn default() -> Self {
        Self {
            convergence_criterion: 1e-8,
            kkr_runmax: 5,
            nsteps: 50,
            strmix: 0.01,
            brymix: 0.01,
            threshold_switch_high_accuracy: 1e-3,
            check_dos: false,
        }
    }
}

/// Inputs of the SCF workflow; give either `structure` or `remote_data`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScfInputs {
    pub structure: Option<StructureId>,
    pub remote_data: Option<FolderId>,
    pub calc_parameters: Option<ParameterSet>,
    pub voronoi: Option<Code>,
    pub kkr: Option<Code>,
    #[serde(default)]
    pub wf_parameters: ScfParameters,
    #[serde(default)]
    pub options: SchedulerOptions,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Result record of a successful SCF run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScfResults {
    pub workflow_name: String,
    pub workflow_version: String,
    pub label: String,
    pub description: String,
    pub wf_parameters: ScfParameters,
    pub options: SchedulerOptions,
    pub voronoi_step_success: bool,
    pub kkr_step_success: bool,
    pub successful: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub convergence_reached: bool,
    pub convergence_value: f64,
    pub convergence_values_all_steps: Vec<f64>,
    pub charge_neutrality: Option<f64>,
    pub used_higher_accuracy: bool,
    pub number_of_kkr_runs: usize,
    /// Fermi energy of the last run in Ry
    pub fermi_energy: Option<f64>,
    pub last_calc: RecordId,
    /// Output folder of the last calculation
    pub last_remote_folder: FolderId,
    /// Folder returned by this workflow, resolving to `last_calc`
    pub remote_folder: FolderId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Voronoi,
    Kkr,
}

#[derive(Debug)]
struct Context {
    phase: Phase,
    params: ParameterSet,
    voronoi_code: Option<Code>,
    kkr_code: Option<Code>,
    last_remote: Option<FolderId>,
    last_calc: Option<RecordId>,
    submission: Option<Submission>,
    awaited: bool,
    kkr_runs: usize,
    voronoi_step_success: bool,
    kkr_step_success: bool,
    convergence_values_all_steps: Vec<f64>,
    convergence_value: Option<f64>,
    charge_neutrality: Option<f64>,
    fermi_energy: Option<f64>,
    high_accuracy: bool,
    used_higher_accuracy: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Driver of one SCF run
pub struct ScfWorkflow {
    inputs: ScfInputs,
    ctx: Context,
}

fn fail(code: ExitCode, message: impl Into<String>) -> Result<Event> {
    Ok(Event::fail(WorkflowFailure::new(code, message)))
}

impl ScfWorkflow {
    pub fn new(inputs: ScfInputs) -> Self {
        Self {
            inputs,
            ctx: Context {
                phase: Phase::Kkr,
                params: ParameterSet::new(),
                voronoi_code: None,
                kkr_code: None,
                last_remote: None,
                last_calc: None,
                submission: None,
                awaited: false,
                kkr_runs: 0,
                voronoi_step_success: false,
                kkr_step_success: false,
                convergence_values_all_steps: Vec::new(),
                convergence_value: None,
                charge_neutrality: None,
                fermi_energy: None,
                high_accuracy: false,
                used_higher_accuracy: false,
                errors: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    fn failure(&self, code: ExitCode, message: impl Into<String>) -> WorkflowFailure {
        WorkflowFailure::new(code, message).with_errors(self.ctx.errors.clone())
    }

    /// Parameters of the next KKR run
    fn kkr_run_parameters(&self) -> crate::params::Result<ParameterSet> {
        let wf = &self.inputs.wf_parameters;
        let mixing = if self.ctx.high_accuracy {
            vec![
                ("IMIX", ParamValue::Int(IMIX_BROYDEN)),
                ("BRYMIX", ParamValue::Float(wf.brymix)),
            ]
        } else {
            vec![("IMIX", ParamValue::Int(IMIX_STRAIGHT))]
        };
        self.ctx
            .params
            .with_values(
                [
                    ("NSTEPS", ParamValue::Int(wf.nsteps)),
                    ("STRMIX", ParamValue::Float(wf.strmix)),
                    ("QBOUND", ParamValue::Float(wf.convergence_criterion)),
                ]
                .into_iter()
                .chain(mixing),
            )
    }
}

impl Workflow for ScfWorkflow {
    type Output = ScfResults;

    fn name(&self) -> &'static str {
        WORKFLOW_NAME
    }

    fn validate_inputs(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let wf = &self.inputs.wf_parameters;
        info!("Using workflow parameters {:?}", wf);
        if !(wf.convergence_criterion > 0.0) || wf.kkr_runmax == 0 || wf.nsteps < 1 {
            return fail(ExitCode::ScfInvalidInput, format!("invalid workflow parameters {:?}", wf));
        }

        match (self.inputs.structure, self.inputs.remote_data) {
            (Some(structure), None) => {
                let checked = env
                    .graph
                    .structure(structure)
                    .map_err(|err| err.to_string())
                    .and_then(|s| s.validate().map_err(|err| err.to_string()));
                if let Err(message) = checked {
                    return fail(ExitCode::ScfInvalidInput, message);
                }
                match &self.inputs.voronoi {
                    Some(code) if code.kind == CalculationKind::Voronoi => {
                        self.ctx.voronoi_code = Some(code.clone())
                    }
                    _ => {
                        return fail(
                            ExitCode::ScfVoronoiCodeNotCorrect,
                            "a structure needs a code with plugin kkr.voro",
                        )
                    }
                }
                self.ctx.phase = Phase::Voronoi;
            }
            (None, Some(remote)) => {
                let Some((remote, producer)) = resolve_remote(env.graph, remote) else {
                    return fail(
                        ExitCode::ScfInvalidInput,
                        format!("{} has no unique producer and no workflow returned it", remote),
                    );
                };
                self.ctx.last_remote = Some(remote);
                self.ctx.last_calc = Some(producer);
                self.ctx.phase = Phase::Kkr;
            }
            _ => {
                return fail(
                    ExitCode::ScfInvalidInput,
                    "give exactly one of structure and remote_data",
                )
            }
        }

        match &self.inputs.kkr {
            Some(code) if code.kind == CalculationKind::Kkr => self.ctx.kkr_code = Some(code.clone()),
            _ => return fail(ExitCode::ScfKkrCodeNotCorrect, "no code with plugin kkr.kkr given"),
        }

        let params = match (&self.inputs.calc_parameters, self.ctx.last_calc) {
            (Some(params), _) => params.clone(),
            (None, Some(parent)) => match env.graph.record(parent)?.inputs.parameters {
                Some(id) => env.graph.parameters(id)?.clone(),
                None => {
                    return fail(
                        ExitCode::ScfCalcParametersInvalid,
                        format!("no calc_parameters given and {} has none", parent),
                    )
                }
            },
            (None, None) => return fail(ExitCode::ScfCalcParametersInvalid, "no calc_parameters given"),
        };

        let (params, added) = params.fill_defaults(KeyScope::Calculation);
        if !added.is_empty() {
            info!("Updated calc_parameters with default values: {:?}", added);
        }
        if let Err(err) = params.validate(KeyScope::Calculation) {
            return fail(ExitCode::ScfCalcParametersInvalid, err.to_string());
        }
        self.ctx.params = params;
        Ok(Event::InputsValid)
    }

    fn compute_parameters(&mut self, _env: &mut WorkflowEnv<'_>) -> Result<Event> {
        if self.ctx.phase == Phase::Kkr {
            match self.kkr_run_parameters() {
                Ok(params) => self.ctx.params = params,
                Err(err) => return fail(ExitCode::ScfCalcParametersInvalid, err.to_string()),
            }
        }
        Ok(Event::ParametersReady)
    }

    fn submit_job(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let params_id = env.graph.add_parameters(self.ctx.params.clone());
        let options = self.inputs.options.clone();

        let (builder, code, exit) = match self.ctx.phase {
            Phase::Voronoi => {
                let (Some(structure), Some(code)) = (self.inputs.structure, self.ctx.voronoi_code.clone())
                else {
                    return fail(ExitCode::ScfVoronoiFailed, "Voronoi step lacks its inputs");
                };
                let builder = CalculationBuilder::voronoi("voronoi step")
                    .structure(structure)
                    .parameters(params_id)
                    .code(&code);
                (builder, code, ExitCode::ScfVoronoiFailed)
            }
            Phase::Kkr => {
                let (Some(remote), Some(code)) = (self.ctx.last_remote, self.ctx.kkr_code.clone()) else {
                    return fail(ExitCode::ScfKkrFailed, "KKR step lacks its inputs");
                };
                let label = format!("KKR run {}", self.ctx.kkr_runs + 1);
                let builder = match CalculationBuilder::kkr(&label).parent_folder(remote) {
                    Ok(builder) => builder.parameters(params_id).code(&code),
                    Err(err) => return fail(ExitCode::ScfKkrFailed, err.to_string()),
                };
                (builder, code, ExitCode::ScfKkrFailed)
            }
        };

        match submit_calculation(env, builder, &code, &options) {
            Ok(submission) => {
                self.ctx.submission = Some(submission);
                self.ctx.awaited = false;
                Ok(Event::Submitted)
            }
            Err(err) => {
                let message = err.to_string();
                self.ctx.errors.push(message.clone());
                Ok(Event::fail(self.failure(exit, message)))
            }
        }
    }

    fn await_completion(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let exit = match self.ctx.phase {
            Phase::Voronoi => ExitCode::ScfVoronoiFailed,
            Phase::Kkr => ExitCode::ScfKkrFailed,
        };
        let Some(submission) = self.ctx.submission.clone().filter(|_| !self.ctx.awaited) else {
            return fail(exit, "no job to wait for");
        };
        self.ctx.awaited = true;
        match await_job(env, &submission) {
            Ok(_) => Ok(Event::JobTerminated),
            Err(err) => fail(exit, err.to_string()),
        }
    }

    fn collect_results(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event> {
        let Some(submission) = self.ctx.submission.take() else {
            return fail(ExitCode::ScfKkrFailed, "no submitted job");
        };
        let record = env.graph.record(submission.record)?;
        self.ctx.last_calc = Some(record.id);

        match self.ctx.phase {
            Phase::Voronoi => {
                let emin = record.results().and_then(|r| r.emin());
                if !record.status.is_finished_ok() || emin.is_none() {
                    let error = format!("Voronoi calculation {} failed ({:?})", record.id, record.status);
                    self.ctx.errors.push(error.clone());
                    return Ok(Event::fail(
                        self.failure(ExitCode::ScfVoronoiFailed, error)
                            .with_output(&record.stdout, &record.stderr),
                    ));
                }
                self.ctx.voronoi_step_success = true;
                self.ctx.last_remote = Some(env.graph.output_folder_of(record.id)?);
                if let Some(emin) = emin {
                    self.ctx.params = self.ctx.params.with_value("EMIN", ParamValue::Float(emin))?;
                }
                self.ctx.phase = Phase::Kkr;
                info!("Voronoi step done, starting KKR runs");
                Ok(Event::RunAgain)
            }
            Phase::Kkr => {
                self.ctx.kkr_runs += 1;
                let output = record.results().and_then(|r| r.as_kkr()).cloned();
                let Some(output) = output.filter(|_| record.status.is_finished_ok()) else {
                    self.ctx.kkr_step_success = false;
                    let error = format!("KKR calculation {} failed ({:?})", record.id, record.status);
                    self.ctx.errors.push(error.clone());
                    return Ok(Event::fail(
                        self.failure(ExitCode::ScfKkrFailed, error)
                            .with_output(&record.stdout, &record.stderr),
                    ));
                };
                let Some(rms) = output.convergence_value else {
                    let error = format!("no rms error found in the output of {}", record.id);
                    self.ctx.errors.push(error.clone());
                    return Ok(Event::fail(
                        self.failure(ExitCode::ScfKkrFailed, error)
                            .with_output(&record.stdout, &record.stderr),
                    ));
                };

                self.ctx.kkr_step_success = true;
                self.ctx.last_remote = Some(env.graph.output_folder_of(record.id)?);
                self.ctx
                    .convergence_values_all_steps
                    .extend(output.convergence_values_all_iterations.iter().copied());
                self.ctx.convergence_value = Some(rms);
                self.ctx.charge_neutrality = output.charge_neutrality;
                self.ctx.fermi_energy = output.fermi_energy;
                info!(
                    "KKR run {} finished with rms error {:e} (criterion {:e})",
                    self.ctx.kkr_runs, rms, self.inputs.wf_parameters.convergence_criterion
                );

                if rms < self.inputs.wf_parameters.convergence_criterion {
                    return Ok(Event::Done);
                }
                if self.ctx.kkr_runs >= self.inputs.wf_parameters.kkr_runmax {
                    let error = format!(
                        "not converged after {} KKR runs, last rms error {:e}",
                        self.ctx.kkr_runs, rms
                    );
                    self.ctx.errors.push(error.clone());
                    return Ok(Event::fail(self.failure(ExitCode::ScfNotConverged, error)));
                }
                if !self.ctx.high_accuracy && rms < self.inputs.wf_parameters.threshold_switch_high_accuracy {
                    info!("Switching to Broyden mixing for the remaining runs");
                    self.ctx.high_accuracy = true;
                    self.ctx.used_higher_accuracy = true;
                }
                Ok(Event::RunAgain)
            }
        }
    }

    fn finish(mut self, env: &mut WorkflowEnv<'_>) -> Result<ScfResults> {
        let (Some(last_calc), Some(last_remote_folder)) = (self.ctx.last_calc, self.ctx.last_remote) else {
            return Err(ProvenanceError::NotExistent("SCF run finished without a calculation".to_string()).into());
        };

        if self.inputs.wf_parameters.check_dos {
            match (self.ctx.params.get_f64("EMIN"), self.ctx.fermi_energy) {
                (Some(emin), Some(ef)) if emin >= ef => {
                    let warning = format!("EMIN ({}) is not below the Fermi energy ({})", emin, ef);
                    warn!("{}", warning);
                    self.ctx.warnings.push(warning);
                }
                (_, None) => {
                    let warning = "check_dos: no Fermi energy to check the contour against".to_string();
                    warn!("{}", warning);
                    self.ctx.warnings.push(warning);
                }
                _ => {}
            }
        }

        let remote_folder = env.graph.return_folder(WORKFLOW_NAME, last_calc)?;

        Ok(ScfResults {
            workflow_name: WORKFLOW_NAME.to_string(),
            workflow_version: WORKFLOW_VERSION.to_string(),
            label: self.inputs.label.unwrap_or_else(|| "kkr_scf_wc".to_string()),
            description: self
                .inputs
                .description
                .unwrap_or_else(|| "KKR self-consistency workflow".to_string()),
            wf_parameters: self.inputs.wf_parameters,
            options: self.inputs.options,
            voronoi_step_success: self.ctx.voronoi_step_success,
            kkr_step_success: self.ctx.kkr_step_success,
            successful: self.ctx.errors.is_empty(),
            errors: self.ctx.errors,
            warnings: self.ctx.warnings,
            convergence_reached: true,
            convergence_value: self.ctx.convergence_value.unwrap_or_default(),
            convergence_values_all_steps: self.ctx.convergence_values_all_steps,
            charge_neutrality: self.ctx.charge_neutrality,
            used_higher_accuracy: self.ctx.used_higher_accuracy,
            number_of_kkr_runs: self.ctx.kkr_runs,
            fermi_energy: self.ctx.fermi_energy,
            last_calc,
            last_remote_folder,
            remote_folder,
        })
    }
}
