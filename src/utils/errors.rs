/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors that can occur in the utils module
#[derive(Error, Debug)]
pub enum UtilsError {
    /// A token could not be read as a number
    #[error("Cannot parse '{token}' as a number on line {line}")]
    Number { token: String, line: usize },

    /// Rows of a numeric table have different widths
    #[error("Ragged table: line {line} has {found} columns, expected {expected}")]
    RaggedTable {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Table shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// A specialized Result type for utils operations
pub type Result<T> = std::result::Result<T, UtilsError>;
