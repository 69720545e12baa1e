/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the structure module

/// Error types for the structure module
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Degenerate cell: lattice vectors span a volume of {0:e}")]
    DegenerateCell(f64),

    #[error("Only bulk structures (periodic in all three directions) are supported, got pbc = {0:?}")]
    NotBulk([bool; 3]),

    #[error("Symmetry analysis failed: {0}")]
    Symmetry(String),

    #[error("No special k-point table for space group {space_group} ({lattice})")]
    UnsupportedLattice {
        space_group: i32,
        lattice: &'static str,
    },

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
