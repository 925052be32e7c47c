use async_trait::async_trait;
use daemonctl_logging::{JobLogger, short_type_name};

use crate::{Job, JobParams};

/// Work that runs at most once per invocation of a cron-style supervisor.
#[async_trait]
pub trait CronTask: Send + Sync {
    fn kind(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    async fn init(&mut self, _params: &JobParams, _log: &JobLogger) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether this invocation is due. Defaults to always.
    fn check_job_time(&self) -> bool {
        true
    }

    async fn do_job(&mut self, log: &JobLogger) -> anyhow::Result<()>;
}

/// Adapts a [`CronTask`] into a [`Job`] whose single step runs the task
/// when it is due and logs a skip otherwise.
///
/// Pair it with [`SupervisorConfig::cron`](daemonctl_core::SupervisorConfig::cron)
/// so the loop exits after that step; [`SupervisorBuilder::build_cron`](crate::SupervisorBuilder::build_cron)
/// does both.
#[derive(Debug)]
pub struct CronJob<T> {
    task: T,
}

impl<T: CronTask> CronJob<T> {
    pub fn new(task: T) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn into_inner(self) -> T {
        self.task
    }
}

#[async_trait]
impl<T: CronTask> Job for CronJob<T> {
    fn kind(&self) -> &str {
        self.task.kind()
    }

    async fn init(&mut self, params: &JobParams, log: &JobLogger) -> anyhow::Result<()> {
        self.task.init(params, log).await
    }

    async fn step(&mut self, log: &JobLogger) -> anyhow::Result<()> {
        if self.task.check_job_time() {
            self.task.do_job(log).await
        } else {
            log.log("CRON time not come yet").await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Window {
        due: bool,
        runs: u32,
    }

    #[async_trait]
    impl CronTask for Window {
        fn check_job_time(&self) -> bool {
            self.due
        }

        async fn do_job(&mut self, _log: &JobLogger) -> anyhow::Result<()> {
            self.runs += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_step_runs_when_due() {
        let log = JobLogger::disabled("Window");
        let mut job = CronJob::new(Window { due: true, runs: 0 });

        job.step(&log).await.unwrap();
        job.step(&log).await.unwrap();
        assert_eq!(job.task().runs, 2);
    }

    #[tokio::test]
    async fn test_step_skips_when_not_due() {
        let log = JobLogger::disabled("Window");
        let mut job = CronJob::new(Window { due: false, runs: 0 });

        job.step(&log).await.unwrap();
        assert_eq!(job.into_inner().runs, 0);
    }

    #[test]
    fn test_kind_comes_from_task() {
        let job = CronJob::new(Window { due: true, runs: 0 });
        assert_eq!(Job::kind(&job), "Window");
    }
}
