/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Stable identifiers of the provenance arena

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Position in the arena
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifies a calculation record
    RecordId,
    "calc"
);
arena_id!(
    /// Identifies a remote folder
    FolderId,
    "folder"
);
arena_id!(
    /// Identifies a stored structure
    StructureId,
    "structure"
);
arena_id!(
    /// Identifies a stored parameter set
    ParamSetId,
    "params"
);
arena_id!(
    /// Identifies a finished workflow run
    WorkflowId,
    "workflow"
);
