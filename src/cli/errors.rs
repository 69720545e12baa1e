/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for configuration loading

use std::io;
use thiserror::Error;

/// Errors that can occur while reading the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("No {0} code configured")]
    MissingCode(&'static str),
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;
