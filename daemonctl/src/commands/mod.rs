pub mod disable;
pub mod enable;
pub mod list;
pub mod restart;
pub mod start;
pub mod status;
pub mod stop;

use colored::Colorize;
use daemonctl_supervisor::{StartOutcome, Supervisor};

use crate::common::{STOPPED_ICON, SUCCESS_ICON};

/// Print what a start or restart ended up doing.
pub(crate) fn report_outcome(name: &str, outcome: StartOutcome) {
    match outcome {
        StartOutcome::Completed => {
            println!("{} Job {} finished", SUCCESS_ICON.green(), name)
        }
        StartOutcome::Skipped => {
            println!("{} Job {} should not be running", STOPPED_ICON.yellow(), name)
        }
        StartOutcome::Preempted => {
            println!("{} Job {} already running", STOPPED_ICON.yellow(), name)
        }
    }
}

/// Note a start or restart cut short by a termination signal.
pub(crate) async fn report_terminated(name: &str, supervisor: &Supervisor) {
    supervisor.logger().log("Daemon terminated").await;
    println!("{} Job {} terminated", STOPPED_ICON.yellow(), name);
}
