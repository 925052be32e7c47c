use chrono::{DateTime, Local};
use daemonctl_core::Result;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Per-job event log.
///
/// Every message is emitted as a `tracing` event; when a log file is
/// configured it is also appended there as
/// `<date time> <fraction> [<tag>] <message>`.
pub struct JobLogger {
    tag: String,
    path: Option<PathBuf>,
    sink: Option<Mutex<File>>,
}

impl std::fmt::Debug for JobLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobLogger")
            .field("tag", &self.tag)
            .field("path", &self.path)
            .field("sink", &self.sink.as_ref().map(|_| "<File>"))
            .finish()
    }
}

impl JobLogger {
    /// A logger with no file sink.
    pub fn disabled(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            path: None,
            sink: None,
        }
    }

    pub async fn open(path: Option<&Path>, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        let Some(path) = path else {
            return Ok(Self::disabled(tag));
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| daemonctl_core::Error::file_write(path, e))?;

        Ok(Self {
            tag,
            path: Some(path.to_path_buf()),
            sink: Some(Mutex::new(file)),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write failures are reported through `tracing` and otherwise ignored.
    pub async fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(job = %self.tag, "{}", message);

        let Some(sink) = &self.sink else {
            return;
        };

        let line = format_line(Local::now(), &self.tag, message);
        let mut file = sink.lock().await;
        let written = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("Failed to append to job log {:?}: {}", self.path, e);
        }
    }
}

pub fn format_line(now: DateTime<Local>, tag: &str, message: &str) -> String {
    let fraction = f64::from(now.timestamp_subsec_micros()) / 1_000_000.0;
    format!(
        "{} {:.6} [{}] {}\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        fraction,
        tag,
        message
    )
}
