/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Process-wide run configuration
//!
//! Read once from YAML and handed to the command that runs:
//!
//! ```yaml
//! workdir: runs
//! store: provenance.json
//! voronoi:
//!   label: voronoi
//!   kind: Voronoi
//!   executable: /opt/kkr/voronoi.exe
//! kkr:
//!   label: kkrhost
//!   kind: Kkr
//!   executable: /opt/kkr/kkr.x
//! options:
//!   withmpi: false
//! ```

use super::errors::{ConfigError, Result};
use crate::provenance::Code;
use crate::scheduler::SchedulerOptions;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root of the job folders
    pub workdir: PathBuf,
    /// JSON file holding the provenance graph
    pub store: PathBuf,
    pub voronoi: Option<Code>,
    pub kkr: Option<Code>,
    /// Default resources of every job
    pub options: SchedulerOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("kkr-runs"),
            store: PathBuf::from("kkr-provenance.json"),
            voronoi: None,
            kkr: None,
            options: SchedulerOptions::default(),
        }
    }
}

impl RunConfig {
    /// Read a configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Read the file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_yaml_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn voronoi_code(&self) -> Result<&Code> {
        self.voronoi.as_ref().ok_or(ConfigError::MissingCode("voronoi"))
    }

    pub fn kkr_code(&self) -> Result<&Code> {
        self.kkr.as_ref().ok_or(ConfigError::MissingCode("kkr"))
    }
}
