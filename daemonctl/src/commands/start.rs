use crate::cli::StartArgs;
use crate::common::{load_registry, load_supervisor, until_shutdown};
use daemonctl_supervisor::JobParams;
use std::path::Path;

pub async fn execute(config: Option<&Path>, args: StartArgs) -> anyhow::Result<()> {
    let registry = load_registry(config).await?;
    let mut supervisor = load_supervisor(&registry, &args.name).await?;

    let params: JobParams = args
        .params
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect();

    let outcome = until_shutdown(supervisor.start(&params)).await?;
    match outcome {
        Some(outcome) => super::report_outcome(&args.name, outcome?),
        None => super::report_terminated(&args.name, &supervisor).await,
    }
    Ok(())
}
