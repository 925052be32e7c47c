use anyhow::{Context, Result};
use daemonctl_core::config::ConfigLoader;
use daemonctl_core::JobRegistry;
use daemonctl_supervisor::{JobLoader, Supervisor};
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Standard success indicator for all commands
pub const SUCCESS_ICON: &str = "✓";
/// Standard running indicator for status displays
pub const RUNNING_ICON: &str = "●";
/// Standard stopped indicator for status displays
pub const STOPPED_ICON: &str = "○";

/// Load the job registry from `config`, or from the first `daemonctl.json`
/// found in the default search paths.
pub async fn load_registry(config: Option<&Path>) -> Result<JobRegistry> {
    let loader = ConfigLoader::new();
    let jobs = match config {
        Some(path) => loader
            .load_file(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => loader.load().await.context("Failed to load config")?,
    };
    debug!("Registry holds {} job(s)", jobs.jobs.len());
    Ok(JobRegistry::from_config(jobs)?)
}

pub async fn load_supervisor(registry: &JobRegistry, name: &str) -> Result<Supervisor> {
    validate_job_name(name)?;
    let loader = JobLoader::with_builtin_jobs();
    Ok(loader.load_by_name(registry, name).await?)
}

/// Drive `fut` until it completes or the process is asked to terminate.
///
/// Returns `None` on SIGTERM or SIGINT. `fut` is dropped first, which kills
/// any child it spawned.
pub async fn until_shutdown<F: Future>(fut: F) -> Result<Option<F::Output>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            output = fut => Ok(Some(output)),
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                Ok(None)
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                Ok(None)
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            output = fut => Ok(Some(output)),
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
                Ok(None)
            }
        }
    }
}

/// Validate a job name
pub fn validate_job_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Job name cannot be empty");
    }

    if name.len() > 255 {
        anyhow::bail!("Job name too long (max 255 characters)");
    }

    if name.contains(['/', '\\', '\0']) {
        anyhow::bail!("Job name contains invalid characters");
    }

    Ok(())
}
