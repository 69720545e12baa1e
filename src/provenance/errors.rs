/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the provenance graph

use super::ids::{FolderId, RecordId};
use std::io;
use thiserror::Error;

/// Why an ancestor walk stopped without a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStop {
    /// A record with neither a structure nor a parent folder was reached
    ChainEnds,
    /// A folder was visited twice
    Cycle,
    /// The hop bound was exceeded
    HopLimit,
}

/// Errors that can occur while building or querying the provenance graph
#[derive(Error, Debug)]
pub enum ProvenanceError {
    #[error("Unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: usize },

    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    #[error("No structure found after {hops} hops (stopped at {folder}: {stop:?})")]
    StructureNotFound {
        hops: usize,
        folder: FolderId,
        stop: WalkStop,
    },

    #[error("Not existent: {0}")]
    NotExistent(String),

    #[error("Record {0} already reached a terminal status; its outputs cannot change")]
    AlreadyFinished(RecordId),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for provenance operations
pub type Result<T> = std::result::Result<T, ProvenanceError>;
