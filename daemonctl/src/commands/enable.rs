use crate::cli::JobArgs;
use crate::common::{SUCCESS_ICON, load_registry, load_supervisor};
use colored::Colorize;
use std::path::Path;

pub async fn execute(config: Option<&Path>, args: JobArgs) -> anyhow::Result<()> {
    let registry = load_registry(config).await?;
    let supervisor = load_supervisor(&registry, &args.name).await?;

    supervisor.enable().await?;
    println!("{} Enabled job {}", SUCCESS_ICON.green(), args.name);
    Ok(())
}
