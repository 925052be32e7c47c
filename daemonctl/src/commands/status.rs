use crate::cli::StatusArgs;
use crate::common::{RUNNING_ICON, STOPPED_ICON, load_registry, validate_job_name};
use colored::Colorize;
use daemonctl_core::{JobDescriptor, PidFile, ProcessTracker, StatusStore};
use daemonctl_supervisor::{NO_PID_REPORT, create_process_control};
use serde_json::json;
use std::path::Path;

pub async fn execute(config: Option<&Path>, args: StatusArgs) -> anyhow::Result<()> {
    let registry = load_registry(config).await?;

    let jobs: Vec<&JobDescriptor> = match &args.name {
        Some(name) => {
            validate_job_name(name)?;
            vec![registry.get_or_err(name)?]
        }
        None => registry.jobs().iter().collect(),
    };

    if jobs.is_empty() {
        if args.json {
            println!("[]");
        } else {
            println!("No jobs configured");
        }
        return Ok(());
    }

    let mut entries = Vec::with_capacity(jobs.len());
    for job in jobs {
        entries.push(describe(job).await?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let running = entry["running"].as_bool().unwrap_or(false);
        let icon = if running {
            RUNNING_ICON.green()
        } else {
            STOPPED_ICON.dimmed()
        };
        println!(
            "{} {} [{}] {}",
            icon,
            entry["name"].as_str().unwrap_or_default().bold(),
            entry["type"].as_str().unwrap_or_default(),
            entry["status"].as_str().unwrap_or_default()
        );
        println!("    {}", entry["report"].as_str().unwrap_or_default());
    }
    Ok(())
}

/// Reads the job's state files without touching them or its log.
async fn describe(job: &JobDescriptor) -> anyhow::Result<serde_json::Value> {
    let tracker = ProcessTracker::new(PidFile::new(&job.pid_file)?, create_process_control());
    let status = StatusStore::new(&job.status_file)?.get().await?;
    let pid = tracker.read_pid().await?;
    let running = tracker.is_running().await?;
    let report = tracker
        .report()
        .await?
        .unwrap_or_else(|| NO_PID_REPORT.to_string());

    Ok(json!({
        "name": job.name,
        "type": job.kind,
        "status": status.as_str(),
        "pid": pid,
        "running": running,
        "report": report,
    }))
}
