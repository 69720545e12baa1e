/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for calculation preparation

use crate::params::ParamError;
use crate::provenance::ProvenanceError;
use crate::structure::StructureError;
use std::io;
use thiserror::Error;

/// Errors that can occur while preparing a calculation for submission
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Input validation error: {0}")]
    InputValidation(String),

    #[error("Provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for calculation preparation
pub type Result<T> = std::result::Result<T, CalcError>;
