/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for parameter handling

use super::value::ValueKind;
use std::fmt;
use std::io;
use thiserror::Error;

/// Everything wrong with a parameter set, collected in one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDeficiencies {
    /// Keys not in the keyword schema
    pub unknown: Vec<String>,
    /// Mandatory keys without a value
    pub missing: Vec<String>,
    /// Keys whose value does not fit the schema type
    pub mistyped: Vec<(String, ValueKind)>,
}

impl ParameterDeficiencies {
    /// True when nothing was found
    pub fn is_empty(&self) -> bool {
        self.unknown.is_empty() && self.missing.is_empty() && self.mistyped.is_empty()
    }

    /// Merge another report into this one
    pub fn extend(&mut self, other: ParameterDeficiencies) {
        self.unknown.extend(other.unknown);
        self.missing.extend(other.missing);
        self.mistyped.extend(other.mistyped);
    }

    /// `Ok(())` when empty, the collected error otherwise
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ParamError::InvalidParameter(self))
        }
    }
}

impl fmt::Display for ParameterDeficiencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.unknown.is_empty() {
            parts.push(format!("unknown keys [{}]", self.unknown.join(", ")));
        }
        if !self.missing.is_empty() {
            parts.push(format!("missing keys [{}]", self.missing.join(", ")));
        }
        if !self.mistyped.is_empty() {
            let typed: Vec<String> = self
                .mistyped
                .iter()
                .map(|(k, kind)| format!("{} (expected {})", k, kind))
                .collect();
            parts.push(format!("wrong types [{}]", typed.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Errors that can occur while building, patching or reading parameters
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Invalid parameters: {0}")]
    InvalidParameter(ParameterDeficiencies),

    #[error("Inputcard parse error on line {line}: {message}")]
    Inputcard { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ParamError {
    /// The collected deficiencies, if this is a validation error
    pub fn deficiencies(&self) -> Option<&ParameterDeficiencies> {
        match self {
            ParamError::InvalidParameter(d) => Some(d),
            _ => None,
        }
    }
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, ParamError>;
