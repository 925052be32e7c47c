use std::fmt;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Lifecycle token persisted in a job's status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    Finished,
    Dead,
    Enabled,
    Disabled,
    /// Content the store found but does not recognise. Kept verbatim.
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Running => "run",
            Status::Finished => "finish",
            Status::Dead => "dead",
            Status::Enabled => "enabled",
            Status::Disabled => "disabled",
            Status::Other(raw) => raw,
        }
    }

    pub fn parse(token: &str) -> Self {
        match token {
            "run" => Status::Running,
            "finish" => Status::Finished,
            "dead" => Status::Dead,
            "enabled" => Status::Enabled,
            "disabled" => Status::Disabled,
            other => Status::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File-backed status token.
///
/// A missing file reads as [`Status::Dead`]. Writes overwrite the file in
/// place, so a concurrent reader may observe a stale or empty value.
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(crate::Error::Config("Status file not given".to_string()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> crate::Result<Status> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Status::parse(content.trim())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Status::Dead),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set(&self, status: Status) -> crate::Result<()> {
        trace!("Writing status '{}' to {:?}", status, self.path);
        tokio::fs::write(&self.path, status.as_str())
            .await
            .map_err(|e| crate::Error::file_write(&self.path, e))
    }
}
