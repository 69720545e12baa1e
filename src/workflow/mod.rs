/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Workflow drivers
//!
//! Both workflows run on the same explicit state machine
//! ([`state::transition`]) driven by [`driver::run_workflow`]. Failures before
//! or after a job end in `Failed` with an [`ExitCode`]; a failed job also
//! carries its captured stdout and stderr.

pub mod bandstructure;
pub mod driver;
pub mod errors;
pub mod scf;
pub mod state;

pub use bandstructure::{BandStructureInputs, BandStructureResults, BandStructureWorkflow};
pub use driver::{run_workflow, Workflow, WorkflowEnv, WorkflowOutcome};
pub use errors::{ExitCode, Result, WorkflowError, WorkflowFailure};
pub use scf::{ScfInputs, ScfParameters, ScfResults, ScfWorkflow};
pub use state::{transition, Event, WorkflowState};
