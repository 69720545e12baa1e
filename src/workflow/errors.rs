/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Exit codes and error types of the workflow drivers

use crate::calculations::CalcError;
use crate::params::ParamError;
use crate::parsers::ParserError;
use crate::provenance::ProvenanceError;
use crate::scheduler::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Enumerable reasons a workflow ends in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitCode {
    // band structure
    NoInputRemoteData,
    KkrCodeNotCorrect,
    CalcParametersInvalid,
    CalcParametersIncomplete,
    BsCalcFailed,
    NoKpointsExtracted,
    IncorrectKpointsExtracted,
    InvalidRemoteDataType,
    // self-consistency
    ScfInvalidInput,
    ScfVoronoiCodeNotCorrect,
    ScfKkrCodeNotCorrect,
    ScfCalcParametersInvalid,
    ScfVoronoiFailed,
    ScfKkrFailed,
    ScfNotConverged,
}

impl ExitCode {
    /// Numeric exit status
    pub fn code(self) -> u32 {
        match self {
            ExitCode::NoInputRemoteData => 161,
            ExitCode::KkrCodeNotCorrect => 162,
            ExitCode::CalcParametersInvalid => 163,
            ExitCode::CalcParametersIncomplete => 164,
            ExitCode::BsCalcFailed => 165,
            ExitCode::NoKpointsExtracted => 166,
            ExitCode::IncorrectKpointsExtracted => 167,
            ExitCode::InvalidRemoteDataType => 168,
            ExitCode::ScfInvalidInput => 201,
            ExitCode::ScfVoronoiCodeNotCorrect => 202,
            ExitCode::ScfKkrCodeNotCorrect => 203,
            ExitCode::ScfCalcParametersInvalid => 204,
            ExitCode::ScfVoronoiFailed => 205,
            ExitCode::ScfKkrFailed => 206,
            ExitCode::ScfNotConverged => 207,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExitCode::NoInputRemoteData => "ERROR_NO_INPUT_REMOTE_DATA",
            ExitCode::KkrCodeNotCorrect => "ERROR_KKRCODE_NOT_CORRECT",
            ExitCode::CalcParametersInvalid => "ERROR_CALC_PARAMETERS_INVALID",
            ExitCode::CalcParametersIncomplete => "ERROR_CALC_PARAMETERS_INCOMPLETE",
            ExitCode::BsCalcFailed => "ERROR_BS_CALC_FAILED",
            ExitCode::NoKpointsExtracted => "ERROR_NO_KPOINTS_EXTRACTED",
            ExitCode::IncorrectKpointsExtracted => "ERROR_INCORRECT_KPOINTS_EXTRACTED",
            ExitCode::InvalidRemoteDataType => "ERROR_INVALID_REMOTE_DATA_TYPE",
            ExitCode::ScfInvalidInput => "ERROR_INVALID_INPUT",
            ExitCode::ScfVoronoiCodeNotCorrect => "ERROR_VORONOICODE_NOT_CORRECT",
            ExitCode::ScfKkrCodeNotCorrect => "ERROR_KKRCODE_NOT_CORRECT",
            ExitCode::ScfCalcParametersInvalid => "ERROR_CALC_PARAMETERS_INVALID",
            ExitCode::ScfVoronoiFailed => "ERROR_VORONOI_CALC_FAILED",
            ExitCode::ScfKkrFailed => "ERROR_KKR_CALC_FAILED",
            ExitCode::ScfNotConverged => "ERROR_NOT_CONVERGED",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ExitCode::NoInputRemoteData => "No remote_data was provided as input",
            ExitCode::KkrCodeNotCorrect => "The code you provided for kkr does not use the plugin kkr.kkr",
            ExitCode::CalcParametersInvalid => {
                "calc_parameters given are not consistent, did you give an unknown keyword?"
            }
            ExitCode::CalcParametersIncomplete => "calc_parameters not complete",
            ExitCode::BsCalcFailed => "KKR band structure calculation failed",
            ExitCode::NoKpointsExtracted => "No k-points can be extracted from the structure",
            ExitCode::IncorrectKpointsExtracted => {
                "no k-point path can be derived for the lattice of the structure"
            }
            ExitCode::InvalidRemoteDataType => {
                "remote_data is neither the output of a KKR/Voronoi calculation nor of an SCF workflow"
            }
            ExitCode::ScfInvalidInput => "Give exactly one of structure or remote_data, and sane workflow parameters",
            ExitCode::ScfVoronoiCodeNotCorrect => "The code you provided for voronoi does not use the plugin kkr.voro",
            ExitCode::ScfKkrCodeNotCorrect => "The code you provided for kkr does not use the plugin kkr.kkr",
            ExitCode::ScfCalcParametersInvalid => "calc_parameters invalid or incomplete",
            ExitCode::ScfVoronoiFailed => "Voronoi calculation failed",
            ExitCode::ScfKkrFailed => "KKR calculation failed",
            ExitCode::ScfNotConverged => "Maximum number of KKR runs reached without convergence",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code(), self.label(), self.message())
    }
}

/// Diagnostic of a workflow that ended in `Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFailure {
    /// `None` only for an illegal state transition
    pub exit_code: Option<ExitCode>,
    pub message: String,
    pub errors: Vec<String>,
    /// Captured stdout of the failed job, if a job failed
    pub stdout: String,
    /// Captured stderr of the failed job, if a job failed
    pub stderr: String,
}

impl WorkflowFailure {
    pub fn new(exit_code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            message: message.into(),
            errors: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn with_output(mut self, stdout: &str, stderr: &str) -> Self {
        self.stdout = stdout.to_string();
        self.stderr = stderr.to_string();
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

impl fmt::Display for WorkflowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors that abort a workflow driver outside of its state machine
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for workflow drivers
pub type Result<T> = std::result::Result<T, WorkflowError>;
