use crate::cli::JobArgs;
use crate::common::{load_registry, load_supervisor, until_shutdown};
use std::path::Path;

pub async fn execute(config: Option<&Path>, args: JobArgs) -> anyhow::Result<()> {
    let registry = load_registry(config).await?;
    let mut supervisor = load_supervisor(&registry, &args.name).await?;

    let outcome = until_shutdown(supervisor.restart()).await?;
    match outcome {
        Some(outcome) => super::report_outcome(&args.name, outcome?),
        None => super::report_terminated(&args.name, &supervisor).await,
    }
    Ok(())
}
