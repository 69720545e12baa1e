/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Ancestor structure resolution
//!
//! KKR runs restart from the folder of an earlier run and do not carry the
//! crystal structure themselves. The structure is found by walking back
//! through parent folders until the Voronoi run that consumed it.

use super::errors::{ProvenanceError, Result, WalkStop};
use super::graph::ProvenanceGraph;
use super::ids::{FolderId, RecordId, StructureId};
use log::debug;
use std::collections::HashSet;

/// Upper bound on the number of parent folders visited
pub const MAX_PARENT_HOPS: usize = 100;

/// Result of a successful walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStructure {
    pub structure: StructureId,
    /// The calculation that consumed the structure
    pub voronoi: RecordId,
    /// Number of parent links followed
    pub hops: usize,
}

/// Find the structure behind a remote folder
pub fn find_parent_structure(graph: &ProvenanceGraph, folder: FolderId) -> Result<ResolvedStructure> {
    find_parent_structure_within(graph, folder, MAX_PARENT_HOPS)
}

/// Find the structure behind a remote folder, following at most `max_hops`
/// parent links
pub fn find_parent_structure_within(
    graph: &ProvenanceGraph,
    start: FolderId,
    max_hops: usize,
) -> Result<ResolvedStructure> {
    let mut folder = start;
    let mut visited = HashSet::new();
    let mut hops = 0;

    loop {
        if !visited.insert(folder) {
            return Err(ProvenanceError::StructureNotFound {
                hops,
                folder,
                stop: WalkStop::Cycle,
            });
        }

        let producer = graph.producer_of(folder)?;
        let record = graph.record(producer)?;
        if let Some(structure) = record.inputs.structure {
            debug!("Structure {} found at {} after {} hops", structure, producer, hops);
            return Ok(ResolvedStructure {
                structure,
                voronoi: producer,
                hops,
            });
        }

        let Some(parent) = record.inputs.parent_folder else {
            return Err(ProvenanceError::StructureNotFound {
                hops,
                folder,
                stop: WalkStop::ChainEnds,
            });
        };

        if hops == max_hops {
            return Err(ProvenanceError::StructureNotFound {
                hops,
                folder,
                stop: WalkStop::HopLimit,
            });
        }
        hops += 1;
        folder = parent;
    }
}
