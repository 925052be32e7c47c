mod cli;
mod commands;
mod common;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        cli::Command::Start(args) => commands::start::execute(config, args).await,
        cli::Command::Stop(args) => commands::stop::execute(config, args).await,
        cli::Command::Restart(args) => commands::restart::execute(config, args).await,
        cli::Command::Enable(args) => commands::enable::execute(config, args).await,
        cli::Command::Disable(args) => commands::disable::execute(config, args).await,
        cli::Command::Status(args) => commands::status::execute(config, args).await,
        cli::Command::List => commands::list::execute(config).await,
    }
}
