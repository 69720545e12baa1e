/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for output parsing

use crate::utils::UtilsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing calculation outputs
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Missing output file: {0}")]
    MissingFile(PathBuf),

    #[error("No qdos files found in {0}")]
    NoQdosFiles(PathBuf),

    #[error("Inconsistent band-structure data: {0}")]
    Inconsistent(String),

    #[error("Table error in {file}: {source}")]
    Table {
        file: String,
        #[source]
        source: UtilsError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParserError>;
