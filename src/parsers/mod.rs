/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Output parsers
//!
//! Turn the raw files retrieved from a finished job back into structured
//! results that are stored on the calculation record.

pub mod bandstructure;
pub mod errors;
pub mod kkr;
pub mod voronoi;

pub use bandstructure::{parse_bandstructure, BandStructureData};
pub use errors::{ParserError, Result};
pub use kkr::KkrOutput;
pub use voronoi::VoronoiOutput;
