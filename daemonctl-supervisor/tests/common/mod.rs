#![allow(dead_code)]

use async_trait::async_trait;
use daemonctl_core::{ProcessControl, Result};
use daemonctl_logging::JobLogger;
use daemonctl_supervisor::{CronTask, Job, JobParams};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// In-memory process table.
#[derive(Default)]
pub struct FakeControl {
    alive: Mutex<HashSet<u32>>,
    terminated: Mutex<Vec<u32>>,
    stubborn: AtomicBool,
}

impl FakeControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_alive(pids: &[u32]) -> Arc<Self> {
        let control = Self::default();
        control.alive.lock().extend(pids.iter().copied());
        Arc::new(control)
    }

    /// Ignore termination requests from now on.
    pub fn make_stubborn(&self) {
        self.stubborn.store(true, Ordering::SeqCst);
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().clone()
    }
}

#[async_trait]
impl ProcessControl for FakeControl {
    fn exists(&self, pid: u32) -> Result<bool> {
        Ok(self.alive.lock().contains(&pid))
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        self.terminated.lock().push(pid);
        if !self.stubborn.load(Ordering::SeqCst) {
            self.alive.lock().remove(&pid);
        }
        Ok(())
    }

    async fn describe(&self, pid: u32) -> Result<String> {
        if self.alive.lock().contains(&pid) {
            Ok(format!("{} S 0:01 fake-job", pid))
        } else {
            Ok(String::new())
        }
    }
}

/// What a [`RecordingJob`] saw while it ran.
#[derive(Debug, Default)]
pub struct JobTrace {
    pub inits: Vec<JobParams>,
    pub steps: u32,
    pub statuses_seen: Vec<String>,
}

pub struct RecordingJob {
    trace: Arc<Mutex<JobTrace>>,
    status_file: Option<PathBuf>,
    fail_on_step: Option<u32>,
    fail_init: bool,
}

impl RecordingJob {
    pub fn new() -> (Self, Arc<Mutex<JobTrace>>) {
        let trace = Arc::new(Mutex::new(JobTrace::default()));
        (
            Self {
                trace: trace.clone(),
                status_file: None,
                fail_on_step: None,
                fail_init: false,
            },
            trace,
        )
    }

    /// Record the status file content at every step.
    pub fn watching(mut self, status_file: &Path) -> Self {
        self.status_file = Some(status_file.to_path_buf());
        self
    }

    pub fn failing_on_step(mut self, step: u32) -> Self {
        self.fail_on_step = Some(step);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

#[async_trait]
impl Job for RecordingJob {
    async fn init(&mut self, params: &JobParams, _log: &JobLogger) -> anyhow::Result<()> {
        self.trace.lock().inits.push(params.clone());
        if self.fail_init {
            anyhow::bail!("init refused");
        }
        Ok(())
    }

    async fn step(&mut self, _log: &JobLogger) -> anyhow::Result<()> {
        let step = {
            let mut trace = self.trace.lock();
            trace.steps += 1;
            if let Some(path) = &self.status_file {
                let seen = std::fs::read_to_string(path).unwrap_or_default();
                trace.statuses_seen.push(seen);
            }
            trace.steps
        };
        if self.fail_on_step == Some(step) {
            anyhow::bail!("step {} exploded", step);
        }
        Ok(())
    }
}

/// Cron task with a fixed answer to "is it time yet".
pub struct CountingTask {
    pub due: bool,
    pub runs: Arc<Mutex<u32>>,
}

impl CountingTask {
    pub fn new(due: bool) -> (Self, Arc<Mutex<u32>>) {
        let runs = Arc::new(Mutex::new(0));
        (
            Self {
                due,
                runs: runs.clone(),
            },
            runs,
        )
    }
}

#[async_trait]
impl CronTask for CountingTask {
    fn check_job_time(&self) -> bool {
        self.due
    }

    async fn do_job(&mut self, _log: &JobLogger) -> anyhow::Result<()> {
        *self.runs.lock() += 1;
        Ok(())
    }
}

pub struct JobFiles {
    pub dir: TempDir,
    pub pid: PathBuf,
    pub status: PathBuf,
    pub log: PathBuf,
}

impl JobFiles {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            pid: dir.path().join("job.pid"),
            status: dir.path().join("job.status"),
            log: dir.path().join("job.log"),
            dir,
        }
    }

    pub fn log_content(&self) -> String {
        std::fs::read_to_string(&self.log).unwrap_or_default()
    }

    pub fn status_content(&self) -> Option<String> {
        std::fs::read_to_string(&self.status).ok()
    }

    pub fn pid_content(&self) -> Option<String> {
        std::fs::read_to_string(&self.pid).ok()
    }
}
