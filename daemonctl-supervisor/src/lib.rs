#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UnixProcessControl as PlatformProcessControl;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsProcessControl as PlatformProcessControl;

pub mod cron;
mod daemon;
pub mod exec;
mod job;
pub mod loader;
mod lock;

pub use cron::{CronJob, CronTask};
pub use daemon::{NO_PID_REPORT, RESTART_GRACE, StartOutcome, Supervisor, SupervisorBuilder};
pub use job::{Job, JobParams};
pub use loader::JobLoader;
pub use lock::StartLock;

use daemonctl_core::ProcessControl;
use std::sync::Arc;
use tracing::trace;

pub fn create_process_control() -> Arc<dyn ProcessControl> {
    trace!("Creating platform-specific process control");
    Arc::new(PlatformProcessControl::new())
}
