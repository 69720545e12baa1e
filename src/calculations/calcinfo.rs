/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Submission manifest of a prepared calculation

use super::errors::Result;
use crate::provenance::CalculationKind;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a scheduler needs to run one prepared job
#[derive(Debug, Clone, PartialEq)]
pub struct CalcInfo {
    pub kind: CalculationKind,
    /// Generated files, by name
    pub files: BTreeMap<String, String>,
    /// (source path, name in the working folder) pairs copied before the run
    pub local_copy_list: Vec<(PathBuf, String)>,
    /// Names to retrieve after the run; a trailing `*` matches any suffix
    pub retrieve_list: Vec<String>,
    /// File the code's stdout is redirected to
    pub stdout_name: String,
    pub cmdline_params: Vec<String>,
}

impl CalcInfo {
    pub fn new(kind: CalculationKind, stdout_name: &str) -> Self {
        Self {
            kind,
            files: BTreeMap::new(),
            local_copy_list: Vec::new(),
            retrieve_list: Vec::new(),
            stdout_name: stdout_name.to_string(),
            cmdline_params: Vec::new(),
        }
    }

    /// Whether a file of the working folder is on the retrieve list
    pub fn retrieves(&self, name: &str) -> bool {
        self.retrieve_list.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == pattern,
        })
    }

    /// Write the generated files and copy the parent files into `workdir`
    pub fn stage<P: AsRef<Path>>(&self, workdir: P) -> Result<()> {
        let workdir = workdir.as_ref();
        fs::create_dir_all(workdir)?;
        for (name, content) in &self.files {
            fs::write(workdir.join(name), content)?;
        }
        for (source, name) in &self.local_copy_list {
            debug!("Copying {} to {}", source.display(), name);
            fs::copy(source, workdir.join(name))?;
        }
        Ok(())
    }

    /// Copy the retrieved files of `workdir` into `target`
    ///
    /// Missing optional files are skipped; returns the names that were copied.
    pub fn retrieve<P: AsRef<Path>, Q: AsRef<Path>>(&self, workdir: P, target: Q) -> Result<Vec<String>> {
        let target = target.as_ref();
        fs::create_dir_all(target)?;
        let mut copied = Vec::new();
        for entry in fs::read_dir(workdir.as_ref())? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_file() && self.retrieves(name) {
                fs::copy(&path, target.join(name))?;
                copied.push(name.to_string());
            }
        }
        copied.sort();
        Ok(copied)
    }
}
