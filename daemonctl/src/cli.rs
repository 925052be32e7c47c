use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daemonctl")]
#[command(about = "Single-instance supervisor for cron-launched jobs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Job config file (defaults to daemonctl.json in . or ./config)
    #[arg(short, long, global = true, env = "DAEMONCTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Claim a job for this process and run its loop
    Start(StartArgs),

    /// Terminate the recorded process of a job
    Stop(JobArgs),

    /// Stop a job, then start it again in the foreground
    Restart(JobArgs),

    /// Mark a job as enabled
    Enable(JobArgs),

    /// Mark a job as disabled and stop it
    Disable(JobArgs),

    /// Show status of jobs
    Status(StatusArgs),

    /// List all registered jobs
    List,
}

#[derive(Parser)]
pub struct StartArgs {
    /// Job name
    pub name: String,

    /// Job parameter (KEY=VALUE), repeatable
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Parser)]
pub struct JobArgs {
    /// Job name
    pub name: String,
}

#[derive(Parser)]
pub struct StatusArgs {
    /// Job name (optional - shows all jobs if not specified)
    pub name: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_start_simple() {
        let cli = Cli::parse_from(["daemonctl", "start", "mailer"]);
        match cli.command {
            Command::Start(args) => {
                assert_eq!(args.name, "mailer");
                assert!(args.params.is_empty());
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_start_with_params() {
        let cli = Cli::parse_from([
            "daemonctl",
            "start",
            "mailer",
            "--param",
            "queue=mail",
            "-p",
            "filter=a=b",
        ]);
        match cli.command {
            Command::Start(args) => {
                assert_eq!(
                    args.params,
                    vec![
                        ("queue".to_string(), "mail".to_string()),
                        ("filter".to_string(), "a=b".to_string()),
                    ]
                );
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_param() {
        assert!(Cli::try_parse_from(["daemonctl", "start", "mailer", "-p", "queue"]).is_err());
        assert!(Cli::try_parse_from(["daemonctl", "start", "mailer", "-p", "=mail"]).is_err());
    }

    #[test]
    fn test_cli_config_is_global() {
        let cli = Cli::parse_from(["daemonctl", "stop", "mailer", "--config", "jobs.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("jobs.json")));
        match cli.command {
            Command::Stop(args) => assert_eq!(args.name, "mailer"),
            _ => panic!("Expected Stop command"),
        }
    }

    #[test]
    fn test_cli_status_no_args() {
        let cli = Cli::parse_from(["daemonctl", "status"]);
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.name, None);
                assert!(!args.json);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_job_commands_require_name() {
        for command in ["start", "stop", "restart", "enable", "disable"] {
            assert!(Cli::try_parse_from(["daemonctl", command]).is_err());
        }
    }

    #[test]
    fn test_cli_list() {
        let cli = Cli::parse_from(["daemonctl", "list"]);
        match cli.command {
            Command::List => {}
            _ => panic!("Expected List command"),
        }
    }
}
