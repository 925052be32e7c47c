pub mod config;
pub mod error;
pub mod pid;
pub mod process;
pub mod registry;
pub mod status;

pub use config::{ConfigLoader, JobDescriptor, JobsConfig, SupervisorConfig};
pub use error::{Error, Result};
pub use pid::PidFile;
pub use process::{ProcessBuilder, ProcessControl, ProcessTracker};
pub use registry::JobRegistry;
pub use status::{Status, StatusStore};
