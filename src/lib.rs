/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # kkr-rs
//!
//! Calculation plugins and workflow drivers for the KKR Green's-function DFT
//! code and its Voronoi preprocessor.
//!
//! The crate turns structures and parameter sets into `inputcard` files, runs
//! the external binaries through a [`scheduler::JobScheduler`], parses their
//! output and records every step in an arena-indexed
//! [`provenance::ProvenanceGraph`]. Band-structure and self-consistency
//! workflows are driven by the state machine in [`workflow`].

pub mod calculations;
pub mod cli;
pub mod params;
pub mod parsers;
pub mod provenance;
pub mod scheduler;
pub mod structure;
pub mod utils;
pub mod workflow;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_metadata() {
        assert!(!VERSION.is_empty());
        assert_eq!(AUTHORS, "Ameyanagi");
    }
}
