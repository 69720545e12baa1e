/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Atomic site of a crystal structure

use super::database;
use super::errors::{Result, StructureError};
use super::vector::Vector3D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One occupied site of the unit cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Element symbol of the occupying species
    symbol: String,
    /// Kind name, distinguishing e.g. two magnetic Fe sublattices
    #[serde(default)]
    kind_name: String,
    /// Cartesian position in Angstroms
    position: Vector3D,
}

impl Site {
    /// Create a new site, validating the element symbol
    pub fn new(symbol: &str, position: Vector3D) -> Result<Self> {
        if database::atomic_number_from_symbol(symbol).is_none() {
            return Err(StructureError::UnknownElement(symbol.to_string()));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            kind_name: symbol.to_string(),
            position,
        })
    }

    /// Create a site with an explicit kind name
    pub fn with_kind(symbol: &str, kind_name: &str, position: Vector3D) -> Result<Self> {
        let mut site = Self::new(symbol, position)?;
        site.kind_name = kind_name.to_string();
        Ok(site)
    }

    /// Get the element symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the kind name (falls back to the symbol)
    pub fn kind_name(&self) -> &str {
        if self.kind_name.is_empty() {
            &self.symbol
        } else {
            &self.kind_name
        }
    }

    /// Get the Cartesian position in Angstroms
    pub fn position(&self) -> &Vector3D {
        &self.position
    }

    /// Nuclear charge of the occupying species
    pub fn atomic_number(&self) -> Result<u32> {
        database::atomic_number_from_symbol(&self.symbol)
            .ok_or_else(|| StructureError::UnknownElement(self.symbol.clone()))
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.symbol, self.kind_name(), self.position)
    }
}
