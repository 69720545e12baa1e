/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Workflow states and the transition function
//!
//! ```text
//! Start → ValidateInputs → ComputeDerivedParameters → SubmitJob
//!       → AwaitCompletion → CollectResults → Success | Failed
//!                                ↘ ComputeDerivedParameters (next run)
//! ```

use super::errors::WorkflowFailure;
use serde::{Deserialize, Serialize};

/// State of a workflow driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Start,
    ValidateInputs,
    ComputeDerivedParameters,
    SubmitJob,
    /// The only state that blocks on the scheduler
    AwaitCompletion,
    CollectResults,
    Success,
    Failed,
}

impl WorkflowState {
    /// Whether the driver stops here
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Success | WorkflowState::Failed)
    }
}

/// Outcome of the effect of one state
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started,
    InputsValid,
    ParametersReady,
    Submitted,
    JobTerminated,
    /// Another job is needed with updated parameters
    RunAgain,
    Done,
    Fail(Box<WorkflowFailure>),
}

impl Event {
    pub fn fail(failure: WorkflowFailure) -> Self {
        Event::Fail(Box::new(failure))
    }
}

/// Next state for a state and the event its effect produced
///
/// Any pair not listed goes to `Failed`.
pub fn transition(state: WorkflowState, event: &Event) -> WorkflowState {
    use WorkflowState::*;
    match (state, event) {
        (Start, Event::Started) => ValidateInputs,
        (ValidateInputs, Event::InputsValid) => ComputeDerivedParameters,
        (ComputeDerivedParameters, Event::ParametersReady) => SubmitJob,
        (SubmitJob, Event::Submitted) => AwaitCompletion,
        (AwaitCompletion, Event::JobTerminated) => CollectResults,
        (CollectResults, Event::RunAgain) => ComputeDerivedParameters,
        (CollectResults, Event::Done) => Success,
        _ => Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::errors::ExitCode;
    use rstest::rstest;

    #[rstest]
    #[case(WorkflowState::Start, Event::Started, WorkflowState::ValidateInputs)]
    #[case(WorkflowState::ValidateInputs, Event::InputsValid, WorkflowState::ComputeDerivedParameters)]
    #[case(WorkflowState::SubmitJob, Event::Submitted, WorkflowState::AwaitCompletion)]
    #[case(WorkflowState::AwaitCompletion, Event::JobTerminated, WorkflowState::CollectResults)]
    #[case(WorkflowState::CollectResults, Event::RunAgain, WorkflowState::ComputeDerivedParameters)]
    #[case(WorkflowState::CollectResults, Event::Done, WorkflowState::Success)]
    fn test_legal_transitions(
        #[case] state: WorkflowState,
        #[case] event: Event,
        #[case] expected: WorkflowState,
    ) {
        assert_eq!(transition(state, &event), expected);
    }

    #[rstest]
    #[case(WorkflowState::Start, Event::Done)]
    #[case(WorkflowState::ValidateInputs, Event::Submitted)]
    #[case(WorkflowState::AwaitCompletion, Event::Done)]
    #[case(WorkflowState::Success, Event::Started)]
    fn test_illegal_pairs_fail(#[case] state: WorkflowState, #[case] event: Event) {
        assert_eq!(transition(state, &event), WorkflowState::Failed);
    }

    #[test]
    fn test_fail_from_any_state() {
        let event = Event::fail(WorkflowFailure::new(ExitCode::BsCalcFailed, "boom"));
        for state in [
            WorkflowState::ValidateInputs,
            WorkflowState::ComputeDerivedParameters,
            WorkflowState::SubmitJob,
            WorkflowState::CollectResults,
        ] {
            assert_eq!(transition(state, &event), WorkflowState::Failed);
        }
    }
}
