use async_trait::async_trait;
use daemonctl_logging::{JobLogger, short_type_name};

/// Parameters handed to [`Job::init`] by whoever starts the supervisor.
pub type JobParams = serde_json::Map<String, serde_json::Value>;

/// The unit of work a [`Supervisor`](crate::Supervisor) drives.
///
/// `init` runs once per start, `step` once per loop cycle. Errors from
/// either end the loop and are returned from `start`.
#[async_trait]
pub trait Job: Send + Sync {
    /// Tag used in the job log.
    fn kind(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    async fn init(&mut self, _params: &JobParams, _log: &JobLogger) -> anyhow::Result<()> {
        Ok(())
    }

    async fn step(&mut self, log: &JobLogger) -> anyhow::Result<()>;
}

#[async_trait]
impl<J: Job + ?Sized> Job for Box<J> {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    async fn init(&mut self, params: &JobParams, log: &JobLogger) -> anyhow::Result<()> {
        (**self).init(params, log).await
    }

    async fn step(&mut self, log: &JobLogger) -> anyhow::Result<()> {
        (**self).step(log).await
    }
}
