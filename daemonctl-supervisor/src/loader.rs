use daemonctl_core::{Error, JobDescriptor, JobRegistry, ProcessControl, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::exec::{ExecCommand, ExecJob, ExecTask};
use crate::{CronJob, CronTask, Job, Supervisor};

pub const EXEC_JOB: &str = "exec";
pub const CRON_EXEC_JOB: &str = "cron-exec";

type BoxedFactory = Box<dyn Fn(&JobDescriptor) -> Result<Box<dyn Job>> + Send + Sync>;

enum Factory {
    /// Looping job; timing comes from the descriptor.
    Looping(BoxedFactory),
    /// Cron job; timing is pinned to one cycle per start.
    Cron(BoxedFactory),
}

/// Turns registry entries into ready-to-run supervisors.
pub struct JobLoader {
    factories: HashMap<String, Factory>,
    control: Arc<dyn ProcessControl>,
}

impl Default for JobLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl JobLoader {
    /// A loader with no job types registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            control: crate::create_process_control(),
        }
    }

    /// A loader that knows the `exec` and `cron-exec` job types.
    pub fn with_builtin_jobs() -> Self {
        let mut loader = Self::new();
        loader
            .register(EXEC_JOB, |job| {
                Ok(ExecJob::new(ExecCommand::from_descriptor(job)?))
            })
            .register_cron(CRON_EXEC_JOB, |job| {
                Ok(ExecTask::new(ExecCommand::from_descriptor(job)?))
            });
        loader
    }

    pub fn with_process_control(mut self, control: Arc<dyn ProcessControl>) -> Self {
        self.control = control;
        self
    }

    pub fn register<F, J>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&JobDescriptor) -> Result<J> + Send + Sync + 'static,
        J: Job + 'static,
    {
        let factory: BoxedFactory =
            Box::new(move |job| factory(job).map(|j| Box::new(j) as Box<dyn Job>));
        self.factories.insert(kind.into(), Factory::Looping(factory));
        self
    }

    pub fn register_cron<F, T>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&JobDescriptor) -> Result<T> + Send + Sync + 'static,
        T: CronTask + 'static,
    {
        let factory: BoxedFactory =
            Box::new(move |job| factory(job).map(|t| Box::new(CronJob::new(t)) as Box<dyn Job>));
        self.factories.insert(kind.into(), Factory::Cron(factory));
        self
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub async fn load(&self, job: &JobDescriptor) -> Result<Supervisor> {
        if let Some(source) = &job.source
            && !source.exists()
        {
            return Err(Error::Config(format!(
                "Job '{}': source {} does not exist",
                job.name,
                source.display()
            )));
        }

        let factory = self.factories.get(&job.kind).ok_or_else(|| {
            Error::Config(format!("Job '{}': unknown type '{}'", job.name, job.kind))
        })?;

        let (built, config) = match factory {
            Factory::Looping(build) => (build(job)?, job.supervisor_config()?),
            Factory::Cron(build) => {
                let stop_grace = job.supervisor_config()?.stop_grace;
                (
                    build(job)?,
                    daemonctl_core::SupervisorConfig::cron().with_stop_grace(stop_grace),
                )
            }
        };
        debug!("Loaded job '{}' of type '{}'", job.name, job.kind);

        let mut builder = Supervisor::builder(&job.pid_file, &job.status_file)
            .config(config)
            .control(self.control.clone());
        if let Some(log_file) = &job.log_file {
            builder = builder.log_file(log_file);
        }
        builder.build(built).await
    }

    pub async fn load_by_name(&self, registry: &JobRegistry, name: &str) -> Result<Supervisor> {
        let job = registry.get_or_err(name)?;
        self.load(job).await
    }
}
