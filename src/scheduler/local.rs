/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Local subprocess runner

use super::errors::{Result, SchedulerError};
use super::options::SchedulerOptions;
use super::{parse_results, JobHandle, JobScheduler};
use crate::calculations::CalcInfo;
use crate::provenance::{CalculationKind, Code, JobReport, RecordId};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

/// File the runner redirects the job's stderr to
pub const STDERR_FILE: &str = "_scheduler-stderr.txt";
/// Subdirectory of the root that receives retrieved files
const RETRIEVED_DIR: &str = "retrieved";
const POLL_INTERVAL: Duration = Duration::from_millis(200);

struct RunningJob {
    child: Child,
    kind: CalculationKind,
    info: CalcInfo,
    started: Instant,
    walltime: Duration,
}

/// Runs every job as a child process in its own folder under `root`
pub struct LocalScheduler {
    root: PathBuf,
    computer: String,
    next_id: usize,
    running: HashMap<usize, RunningJob>,
}

impl LocalScheduler {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            computer: "localhost".to_string(),
            next_id: 0,
            running: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, record: RecordId) -> PathBuf {
        self.root.join(format!("calc-{:05}", record.index()))
    }

    fn retrieved_dir(&self, record: RecordId) -> PathBuf {
        self.root
            .join(RETRIEVED_DIR)
            .join(format!("calc-{:05}", record.index()))
    }

    fn build_command(info: &CalcInfo, code: &Code, options: &SchedulerOptions) -> Command {
        let launcher = options.launcher();
        let mut command = match launcher.split_first() {
            Some((program, args)) => {
                let mut command = Command::new(program);
                command.args(args).arg(&code.executable);
                command
            }
            None => Command::new(&code.executable),
        };
        command.args(&info.cmdline_params);
        command
    }
}

impl JobScheduler for LocalScheduler {
    fn submit(
        &mut self,
        record: RecordId,
        info: &CalcInfo,
        code: &Code,
        options: &SchedulerOptions,
    ) -> Result<JobHandle> {
        let workdir = self.job_dir(record);
        info.stage(&workdir)?;

        let mut command = Self::build_command(info, code, options);
        command
            .current_dir(&workdir)
            .stdout(File::create(workdir.join(&info.stdout_name))?)
            .stderr(File::create(workdir.join(STDERR_FILE))?);

        debug!("Running {:?} in {}", command, workdir.display());
        let child = command.spawn().map_err(|source| SchedulerError::Spawn {
            program: code.executable.display().to_string(),
            source,
        })?;

        let job_id = self.next_id;
        self.next_id += 1;
        self.running.insert(
            job_id,
            RunningJob {
                child,
                kind: info.kind,
                info: info.clone(),
                started: Instant::now(),
                walltime: Duration::from_secs(options.max_wallclock_seconds),
            },
        );
        info!("Submitted {} as local job {}", record, job_id);

        Ok(JobHandle {
            job_id,
            record,
            computer: self.computer.clone(),
            workdir,
        })
    }

    fn wait(&mut self, job: &JobHandle) -> Result<JobReport> {
        let mut running = self
            .running
            .remove(&job.job_id)
            .ok_or(SchedulerError::UnknownJob(job.job_id))?;

        let exit_status = loop {
            if let Some(status) = running.child.try_wait()? {
                break status.code();
            }
            if running.started.elapsed() > running.walltime {
                warn!("Job {} exceeded its wall-clock limit, killing it", job.job_id);
                running.child.kill()?;
                running.child.wait()?;
                break None;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = fs::read_to_string(job.workdir.join(&running.info.stdout_name)).unwrap_or_default();
        let mut stderr = fs::read_to_string(job.workdir.join(STDERR_FILE)).unwrap_or_default();

        let retrieved = self.retrieved_dir(job.record);
        let names = running.info.retrieve(&job.workdir, &retrieved)?;
        debug!("Retrieved {:?}", names);

        let results = if exit_status == Some(0) {
            match parse_results(running.kind, &retrieved) {
                Ok(results) => Some(results),
                Err(err) => {
                    error!("Parsing job {} failed: {}", job.job_id, err);
                    stderr.push_str(&format!("\nparser error: {}\n", err));
                    None
                }
            }
        } else {
            None
        };

        info!("Local job {} ended with exit status {:?}", job.job_id, exit_status);
        Ok(JobReport {
            exit_status,
            retrieved: Some(retrieved),
            results,
            stdout,
            stderr,
        })
    }
}
