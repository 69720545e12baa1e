/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Generic state-machine driver and job helpers shared by the workflows

use super::errors::{Result, WorkflowFailure};
use super::state::{transition, Event, WorkflowState};
use crate::calculations::CalculationBuilder;
use crate::provenance::{
    CalcStatus, Code, FolderId, JobReport, ProvenanceGraph, RecordId,
};
use crate::scheduler::{JobHandle, JobScheduler, SchedulerOptions};
use log::{debug, error, info};

/// Mutable surroundings of a running workflow
pub struct WorkflowEnv<'a> {
    pub graph: &'a mut ProvenanceGraph,
    pub scheduler: &'a mut dyn JobScheduler,
}

impl<'a> WorkflowEnv<'a> {
    pub fn new(graph: &'a mut ProvenanceGraph, scheduler: &'a mut dyn JobScheduler) -> Self {
        Self { graph, scheduler }
    }
}

/// How a workflow run ended
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome<T> {
    Success(T),
    Failed(WorkflowFailure),
}

impl<T> WorkflowOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            WorkflowOutcome::Success(results) => Some(results),
            WorkflowOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&WorkflowFailure> {
        match self {
            WorkflowOutcome::Success(_) => None,
            WorkflowOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// The effects of the states of one workflow
///
/// Each effect inspects and updates the workflow's own context and returns the
/// event that [`transition`] turns into the next state.
pub trait Workflow {
    type Output;

    fn name(&self) -> &'static str;
    fn validate_inputs(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event>;
    fn compute_parameters(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event>;
    fn submit_job(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event>;
    fn await_completion(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event>;
    fn collect_results(&mut self, env: &mut WorkflowEnv<'_>) -> Result<Event>;
    /// Build the result record once `Success` is reached
    fn finish(self, env: &mut WorkflowEnv<'_>) -> Result<Self::Output>;
}

/// Drive a workflow from `Start` to a terminal state
pub fn run_workflow<W: Workflow>(mut workflow: W, env: &mut WorkflowEnv<'_>) -> Result<WorkflowOutcome<W::Output>> {
    let mut state = WorkflowState::Start;
    info!("Started workflow {}", workflow.name());

    loop {
        let event = match state {
            WorkflowState::Start => Event::Started,
            WorkflowState::ValidateInputs => workflow.validate_inputs(env)?,
            WorkflowState::ComputeDerivedParameters => workflow.compute_parameters(env)?,
            WorkflowState::SubmitJob => workflow.submit_job(env)?,
            WorkflowState::AwaitCompletion => workflow.await_completion(env)?,
            WorkflowState::CollectResults => workflow.collect_results(env)?,
            WorkflowState::Success => {
                info!("Workflow {} finished successfully", workflow.name());
                return Ok(WorkflowOutcome::Success(workflow.finish(env)?));
            }
            WorkflowState::Failed => break,
        };

        let next = transition(state, &event);
        debug!("{}: {:?} --{:?}--> {:?}", workflow.name(), state, event, next);

        if next == WorkflowState::Failed {
            let failure = match event {
                Event::Fail(failure) => *failure,
                other => WorkflowFailure {
                    exit_code: None,
                    message: format!("illegal transition from {:?} on {:?}", state, other),
                    errors: Vec::new(),
                    stdout: String::new(),
                    stderr: String::new(),
                },
            };
            error!("Workflow {} failed: {}", workflow.name(), failure);
            return Ok(WorkflowOutcome::Failed(failure));
        }
        state = next;
    }

    Ok(WorkflowOutcome::Failed(WorkflowFailure {
        exit_code: None,
        message: "driver entered Failed without an event".to_string(),
        errors: Vec::new(),
        stdout: String::new(),
        stderr: String::new(),
    }))
}

/// A job that was stored, prepared and handed to the scheduler
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: RecordId,
    pub job: JobHandle,
}

/// Prepare, store and submit one calculation
///
/// A record that was already stored when the scheduler refuses the job is
/// finished as failed with the scheduler error as stderr.
pub fn submit_calculation(
    env: &mut WorkflowEnv<'_>,
    builder: CalculationBuilder,
    code: &Code,
    options: &SchedulerOptions,
) -> Result<Submission> {
    let info = builder.prepare(env.graph, code)?;
    let label = builder.label().to_string();
    let record = builder.store(env.graph)?;
    env.graph.mark_running(record)?;

    let job = match env.scheduler.submit(record, &info, code, options) {
        Ok(job) => job,
        Err(err) => {
            let report = JobReport {
                exit_status: None,
                stderr: format!("submission of {} failed: {}", label, err),
                ..Default::default()
            };
            if let Err(finish_err) = env.graph.finish(record, report) {
                error!("Could not record failed submission: {}", finish_err);
            }
            return Err(err.into());
        }
    };

    env.graph.add_output_folder(record, &job.computer, &job.workdir)?;
    info!("Submitted {} ({}) as {}", label, info.kind, record);
    Ok(Submission { record, job })
}

/// The folder to continue from and the calculation that produced it
///
/// A folder with a single producer is used as is. A folder returned by a
/// workflow has no producer; it stands for the output folder of the
/// workflow's last calculation.
pub fn resolve_remote(graph: &ProvenanceGraph, remote: FolderId) -> Option<(FolderId, RecordId)> {
    if let Ok(producer) = graph.producer_of(remote) {
        return Some((remote, producer));
    }
    let workflow = graph.workflow_returning(remote)?;
    info!(
        "{} was returned by workflow {}, using its last calculation {}",
        remote, workflow.name, workflow.last_calc
    );
    let folder = graph.output_folder_of(workflow.last_calc).ok()?;
    Some((folder, workflow.last_calc))
}

/// Wait for a submitted job and attach its outputs to the record
pub fn await_job(env: &mut WorkflowEnv<'_>, submission: &Submission) -> Result<CalcStatus> {
    let report = env.scheduler.wait(&submission.job)?;
    let status = env.graph.finish(submission.record, report)?;
    info!("{} reached terminal status {:?}", submission.record, status);
    Ok(status)
}
