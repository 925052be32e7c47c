use crate::common::load_registry;
use colored::Colorize;
use std::path::Path;

pub async fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let registry = load_registry(config).await?;

    if registry.jobs().is_empty() {
        println!("No jobs configured");
        return Ok(());
    }

    println!("Jobs:");
    for job in registry.jobs() {
        println!(
            "  - {} [{}] {}",
            job.name.bold(),
            job.kind,
            job.pid_file.display()
        );
    }
    Ok(())
}
