/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Job submission
//!
//! Workflows hand prepared calculations to a [`JobScheduler`] and block in
//! [`JobScheduler::wait`] until the job is terminal. The crate ships a local
//! subprocess runner; batch systems plug in behind the same trait.

pub mod errors;
pub mod local;
pub mod options;

pub use errors::{Result, SchedulerError};
pub use local::LocalScheduler;
pub use options::SchedulerOptions;

use crate::calculations::CalcInfo;
use crate::parsers::{self, KkrOutput, VoronoiOutput};
use crate::provenance::{CalcResults, CalculationKind, Code, JobReport, RecordId};
use std::path::{Path, PathBuf};

/// A job that was handed to a scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: usize,
    pub record: RecordId,
    /// Computer the working folder lives on
    pub computer: String,
    pub workdir: PathBuf,
}

/// Runs prepared calculations
pub trait JobScheduler {
    /// Stage the files of `info` and start the job
    fn submit(
        &mut self,
        record: RecordId,
        info: &CalcInfo,
        code: &Code,
        options: &SchedulerOptions,
    ) -> Result<JobHandle>;

    /// Block until the job is terminal and report its outcome
    fn wait(&mut self, job: &JobHandle) -> Result<JobReport>;
}

/// Parse the retrieved files of a job of the given kind
pub fn parse_results<P: AsRef<Path>>(kind: CalculationKind, retrieved: P) -> parsers::Result<CalcResults> {
    Ok(match kind {
        CalculationKind::Voronoi => CalcResults::Voronoi(VoronoiOutput::from_folder(retrieved)?),
        CalculationKind::Kkr => CalcResults::Kkr(KkrOutput::from_folder(retrieved)?),
    })
}
