use anyhow::{Context, bail};
use async_trait::async_trait;
use daemonctl_core::{Error, JobDescriptor, ProcessBuilder, Result};
use daemonctl_logging::JobLogger;
use std::path::PathBuf;

use crate::{CronTask, Job, JobParams};

pub const PARAM_ENV_PREFIX: &str = "DAEMONCTL_PARAM_";

/// An external command run to completion once per invocation.
#[derive(Debug, Clone)]
pub struct ExecCommand {
    command: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ExecCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn from_descriptor(job: &JobDescriptor) -> Result<Self> {
        let command = job
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("Job '{}': \"command\" must be given", job.name))
            })?;

        Ok(Self {
            command: command.to_string(),
            args: job.args.clone(),
            cwd: job.cwd.clone(),
            env: Vec::new(),
        })
    }

    /// Export every parameter as `DAEMONCTL_PARAM_<KEY>`.
    pub fn apply_params(&mut self, params: &JobParams) {
        self.env = params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (param_env_name(key), value)
            })
            .collect();
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    pub async fn run(&self, log: &JobLogger) -> anyhow::Result<()> {
        let mut builder = ProcessBuilder::new(&self.command)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(cwd) = &self.cwd {
            builder = builder.current_dir(cwd);
        }

        let mut child = builder.spawn()?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for `{}`", self.command))?;

        if !status.success() {
            bail!("`{}` exited with {}", self.command, status);
        }
        log.log(format!("`{}` completed", self.command)).await;
        Ok(())
    }
}

fn param_env_name(key: &str) -> String {
    let key: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", PARAM_ENV_PREFIX, key)
}

/// Runs its command on every loop cycle.
#[derive(Debug, Clone)]
pub struct ExecJob {
    command: ExecCommand,
}

impl ExecJob {
    pub fn new(command: ExecCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Job for ExecJob {
    async fn init(&mut self, params: &JobParams, _log: &JobLogger) -> anyhow::Result<()> {
        self.command.apply_params(params);
        Ok(())
    }

    async fn step(&mut self, log: &JobLogger) -> anyhow::Result<()> {
        self.command.run(log).await
    }
}

/// Runs its command once per cron invocation.
#[derive(Debug, Clone)]
pub struct ExecTask {
    command: ExecCommand,
}

impl ExecTask {
    pub fn new(command: ExecCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl CronTask for ExecTask {
    async fn init(&mut self, params: &JobParams, _log: &JobLogger) -> anyhow::Result<()> {
        self.command.apply_params(params);
        Ok(())
    }

    async fn do_job(&mut self, log: &JobLogger) -> anyhow::Result<()> {
        self.command.run(log).await
    }
}
