use daemonctl_core::{
    Error, PidFile, ProcessControl, ProcessTracker, Result, Status, StatusStore, SupervisorConfig,
};
use daemonctl_logging::JobLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::cron::{CronJob, CronTask};
use crate::lock::StartLock;
use crate::{Job, JobParams};

/// The loop exits this long before its restart TTL runs out.
pub const RESTART_GRACE: Duration = Duration::from_secs(5);

/// Reported by `status_report` when no PID is on record.
pub const NO_PID_REPORT: &str = "Not running (no PID)";

/// What a call to [`Supervisor::start`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Another instance is alive, the job is disabled, or a concurrent start
    /// holds the start lock. Nothing was written.
    Skipped,
    /// The RUNNING status did not read back, so the loop never ran.
    Preempted,
    /// The loop ran and exited normally.
    Completed,
}

pub struct SupervisorBuilder {
    pid_file: PathBuf,
    status_file: PathBuf,
    log_file: Option<PathBuf>,
    config: SupervisorConfig,
    control: Option<Arc<dyn ProcessControl>>,
}

impl SupervisorBuilder {
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn config(mut self, config: SupervisorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn control(mut self, control: Arc<dyn ProcessControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub async fn build(self, job: impl Job + 'static) -> Result<Supervisor> {
        let pid_file = PidFile::new(self.pid_file)?;
        let status = StatusStore::new(self.status_file)?;
        let logger = JobLogger::open(self.log_file.as_deref(), job.kind()).await?;
        let control = self.control.unwrap_or_else(crate::create_process_control);
        let lock_path = StartLock::path_for(pid_file.path());

        Ok(Supervisor {
            tracker: ProcessTracker::new(pid_file, control),
            status,
            logger,
            config: self.config,
            job: Box::new(job),
            lock_path,
            #[cfg(test)]
            on_claim: None,
        })
    }

    /// Build a supervisor that runs `task` at most once per start.
    /// Loop timing is pinned to [`SupervisorConfig::cron`]; only the stop
    /// grace of the configured value is kept.
    pub async fn build_cron(mut self, task: impl CronTask + 'static) -> Result<Supervisor> {
        self.config = SupervisorConfig::cron().with_stop_grace(self.config.stop_grace);
        self.build(CronJob::new(task)).await
    }
}

/// Keeps at most one live instance of a job across every process that
/// points at the same PID and status files.
pub struct Supervisor {
    tracker: ProcessTracker,
    status: StatusStore,
    logger: JobLogger,
    config: SupervisorConfig,
    job: Box<dyn Job>,
    lock_path: PathBuf,
    /// Runs between the RUNNING write and its read-back.
    #[cfg(test)]
    on_claim: Option<Box<dyn Fn(&Path) + Send + Sync>>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("tracker", &self.tracker)
            .field("status", &self.status)
            .field("logger", &self.logger)
            .field("config", &self.config)
            .field("job", &self.job.kind())
            .finish()
    }
}

impl Supervisor {
    pub fn builder(pid_file: impl Into<PathBuf>, status_file: impl Into<PathBuf>) -> SupervisorBuilder {
        SupervisorBuilder {
            pid_file: pid_file.into(),
            status_file: status_file.into(),
            log_file: None,
            config: SupervisorConfig::default(),
            control: None,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn logger(&self) -> &JobLogger {
        &self.logger
    }

    pub fn pid_file(&self) -> &Path {
        self.tracker.pid_file().path()
    }

    pub fn status_file(&self) -> &Path {
        self.status.path()
    }

    pub async fn pid(&self) -> Result<Option<u32>> {
        self.tracker.read_pid().await
    }

    pub async fn is_running(&self) -> Result<bool> {
        self.tracker.is_running().await
    }

    pub async fn status(&self) -> Result<Status> {
        self.status.get().await
    }

    /// Claim the job for this process and run its loop until the restart
    /// TTL expires.
    ///
    /// Returns without doing anything if a live PID is on record or the job
    /// is disabled. Job errors are logged and returned as [`Error::Job`];
    /// the status is then left at RUNNING.
    pub async fn start(&mut self, params: &JobParams) -> Result<StartOutcome> {
        let Some(lock) = StartLock::try_acquire(&self.lock_path)? else {
            debug!("Start lock {:?} is held by another invocation", self.lock_path);
            self.logger.log("Daemon should not be running").await;
            return Ok(StartOutcome::Skipped);
        };

        if self.tracker.is_running().await? || self.status.get().await? == Status::Disabled {
            self.logger.log("Daemon should not be running").await;
            return Ok(StartOutcome::Skipped);
        }

        self.status.set(Status::Running).await?;
        #[cfg(test)]
        if let Some(hook) = &self.on_claim {
            hook(self.status.path());
        }
        if self.status.get().await? != Status::Running {
            drop(lock);
            self.logger.log("Daemon already running").await;
            self.status.set(Status::Finished).await?;
            return Ok(StartOutcome::Preempted);
        }

        let pid = std::process::id();
        self.tracker.write_pid(pid).await?;
        drop(lock);

        info!(job = %self.job.kind(), pid, "Supervised job starting");
        self.logger.log(format!("Starting PID: {}", pid)).await;

        if let Err(e) = self.job.init(params, &self.logger).await {
            return Err(self.job_failed(e).await);
        }
        self.run_loop().await?;

        self.logger.log(format!("Finishing PID: {}", pid)).await;
        self.status.set(Status::Finished).await?;
        info!(job = %self.job.kind(), pid, "Supervised job finished");
        Ok(StartOutcome::Completed)
    }

    async fn run_loop(&mut self) -> Result<()> {
        // None once the deadline is past what the clock can represent.
        let deadline = self
            .config
            .restart_ttl
            .map(|ttl| Instant::now().checked_add(ttl));

        loop {
            self.logger.log("Loop..").await;
            if let Err(e) = self.job.step(&self.logger).await {
                return Err(self.job_failed(e).await);
            }

            if let Some(Some(deadline)) = deadline
                && deadline.saturating_duration_since(Instant::now()) <= RESTART_GRACE
            {
                self.logger.log("Daemon restarting").await;
                return Ok(());
            }

            if let Some(interval) = self.config.check_interval {
                time::sleep(interval).await;
            }
        }
    }

    async fn job_failed(&self, e: anyhow::Error) -> Error {
        warn!(job = %self.job.kind(), "Supervised job failed: {:#}", e);
        self.logger.log(format!("Job failed: {:#}", e)).await;
        Error::Job(e)
    }

    /// Terminate the recorded process, then check once that it is gone.
    pub async fn stop(&self) -> Result<()> {
        let Some(pid) = self.tracker.read_pid().await? else {
            return Ok(());
        };
        if !self.tracker.is_running().await? {
            return Ok(());
        }

        self.logger.log(format!("Stopping PID: {}", pid)).await;
        self.tracker.terminate(pid)?;

        if !self.config.stop_grace.is_zero() {
            time::sleep(self.config.stop_grace).await;
        }

        if self.tracker.is_running().await? {
            return Err(Error::ProcessControl(format!(
                "Failed to kill process with PID: {}",
                pid
            )));
        }
        info!(job = %self.job.kind(), pid, "Supervised job stopped");
        Ok(())
    }

    /// Stop, then start again with empty parameters.
    pub async fn restart(&mut self) -> Result<StartOutcome> {
        self.stop().await?;
        self.start(&JobParams::new()).await
    }

    pub async fn enable(&self) -> Result<()> {
        self.status.set(Status::Enabled).await
    }

    pub async fn disable(&self) -> Result<()> {
        self.status.set(Status::Disabled).await?;
        self.stop().await
    }

    /// The OS process-table line for the recorded PID.
    pub async fn status_report(&self) -> Result<String> {
        Ok(self
            .tracker
            .report()
            .await?
            .unwrap_or_else(|| NO_PID_REPORT.to_string()))
    }
}
