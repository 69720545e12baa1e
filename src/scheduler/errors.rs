/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for job execution

use crate::calculations::CalcError;
use std::io;
use thiserror::Error;

/// Errors that can occur while submitting or waiting for a job
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Unknown job {0}")]
    UnknownJob(usize),

    #[error("Staging error: {0}")]
    Staging(#[from] CalcError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
