use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open file '{}' for writing: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Job {0} is not registered")]
    NotFound(String),

    #[error("Process control error: {0}")]
    ProcessControl(String),

    #[error("Job failed: {0:#}")]
    Job(#[source] anyhow::Error),

    #[cfg(unix)]
    #[error("Unix error: {0}")]
    Unix(#[from] nix::errno::Errno),

    #[cfg(windows)]
    #[error("Windows error: {0}")]
    Windows(u32),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
