pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use loader::ConfigLoader;

pub const DEFAULT_CONFIG_FILE: &str = "daemonctl.json";

/// Loop and stop timing for one supervised job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Pause after every loop cycle. `None` runs cycles back to back.
    pub check_interval: Option<Duration>,
    /// How long a loop lives before it exits for a restart. `None` loops
    /// forever, zero exits after the first cycle.
    pub restart_ttl: Option<Duration>,
    /// Wait between the termination request and the liveness re-check in
    /// `stop`.
    pub stop_grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            check_interval: Some(Duration::from_secs(1)),
            restart_ttl: None,
            stop_grace: Duration::from_millis(500),
        }
    }
}

impl SupervisorConfig {
    /// One cycle per invocation, no sleeping.
    pub fn cron() -> Self {
        Self {
            check_interval: None,
            restart_ttl: Some(Duration::ZERO),
            ..Self::default()
        }
    }

    pub fn with_check_interval(mut self, interval: Option<Duration>) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_restart_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.restart_ttl = ttl;
        self
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }
}

fn default_check_interval_secs() -> Option<f64> {
    Some(1.0)
}

/// Registry entry describing one job and the files that track it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub pid_file: PathBuf,
    pub status_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Absent means one second, `null` means no pause.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: Option<f64>,
    #[serde(default)]
    pub restart_ttl_secs: Option<f64>,
    /// Wait between the termination request and the liveness re-check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_grace_secs: Option<f64>,
}

impl JobDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        pid_file: impl Into<PathBuf>,
        status_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            source: None,
            pid_file: pid_file.into(),
            status_file: status_file.into(),
            log_file: None,
            command: None,
            args: Vec::new(),
            cwd: None,
            check_interval_secs: default_check_interval_secs(),
            restart_ttl_secs: None,
            stop_grace_secs: None,
        }
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn supervisor_config(&self) -> crate::Result<SupervisorConfig> {
        let defaults = SupervisorConfig::default();
        let stop_grace = secs_to_duration(&self.name, "stop_grace_secs", self.stop_grace_secs)?
            .unwrap_or(defaults.stop_grace);

        Ok(defaults
            .with_stop_grace(stop_grace)
            .with_check_interval(secs_to_duration(
                &self.name,
                "check_interval_secs",
                self.check_interval_secs,
            )?)
            .with_restart_ttl(secs_to_duration(
                &self.name,
                "restart_ttl_secs",
                self.restart_ttl_secs,
            )?))
    }

    /// Rebase relative paths onto `base`, normally the config file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        };

        rebase(&mut self.pid_file);
        rebase(&mut self.status_file);
        if let Some(path) = self.log_file.as_mut() {
            rebase(path);
        }
        if let Some(path) = self.source.as_mut() {
            rebase(path);
        }
        if let Some(path) = self.cwd.as_mut() {
            rebase(path);
        }
    }
}

fn secs_to_duration(job: &str, field: &str, secs: Option<f64>) -> crate::Result<Option<Duration>> {
    match secs {
        None => Ok(None),
        Some(secs) => Duration::try_from_secs_f64(secs).map(Some).map_err(|_| {
            crate::Error::Config(format!(
                "Job '{}': {} must be a non-negative number of seconds within range, got {}",
                job, field, secs
            ))
        }),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default)]
    pub jobs: Vec<JobDescriptor>,
}

impl JobsConfig {
    pub fn resolve_paths(&mut self, base: &Path) {
        for job in &mut self.jobs {
            job.resolve_paths(base);
        }
    }
}
