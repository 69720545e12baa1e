/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Resource options of a submitted job

use serde::{Deserialize, Serialize};

/// Resources and run mode of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Wall-clock limit in seconds
    pub max_wallclock_seconds: u64,
    pub num_machines: u32,
    /// MPI ranks per machine; `None` leaves the choice to the launcher
    pub num_mpiprocs_per_machine: Option<u32>,
    /// Run through the MPI launcher
    pub withmpi: bool,
    pub queue_name: String,
    /// Launcher command, e.g. `mpirun -np`; the rank count is appended when known
    pub mpirun_command: Vec<String>,
    /// Extra lines for batch schedulers
    pub custom_scheduler_commands: String,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            max_wallclock_seconds: 36000,
            num_machines: 1,
            num_mpiprocs_per_machine: None,
            withmpi: true,
            queue_name: String::new(),
            mpirun_command: vec!["mpirun".to_string(), "-np".to_string()],
            custom_scheduler_commands: String::new(),
        }
    }
}

impl SchedulerOptions {
    /// Total number of MPI ranks, when fixed
    pub fn tot_num_mpiprocs(&self) -> Option<u32> {
        self.num_mpiprocs_per_machine.map(|n| n * self.num_machines)
    }

    /// Launcher prefix placed before the executable
    pub fn launcher(&self) -> Vec<String> {
        if !self.withmpi {
            return Vec::new();
        }
        let mut command = self.mpirun_command.clone();
        match self.tot_num_mpiprocs() {
            Some(n) => command.push(n.to_string()),
            // `-np` without a count is not valid
            None => {
                if command.last().is_some_and(|arg| arg == "-np") {
                    command.pop();
                }
            }
        }
        command
    }
}
