use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// PID record shared by every invocation that points at the same file.
///
/// The first PID found on disk is cached for the lifetime of this value;
/// a missing or malformed file is re-read on the next call.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    cached: RwLock<Option<u32>>,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(crate::Error::Config("PID file not given".to_string()));
        }
        Ok(Self {
            path,
            cached: RwLock::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, pid: u32) -> crate::Result<()> {
        tokio::fs::write(&self.path, pid.to_string())
            .await
            .map_err(|e| crate::Error::file_write(&self.path, e))?;
        *self.cached.write() = Some(pid);
        debug!("Recorded PID {} in {:?}", pid, self.path);
        Ok(())
    }

    pub async fn read(&self) -> crate::Result<Option<u32>> {
        if let Some(pid) = *self.cached.read() {
            return Ok(Some(pid));
        }

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let pid = parse_pid(&content);
        if pid.is_none() {
            trace!("Ignoring malformed PID file {:?}", self.path);
        }
        if let Some(pid) = pid {
            *self.cached.write() = Some(pid);
        }
        Ok(pid)
    }
}

/// Digits only, optionally followed by one newline. Zero is not a usable PID.
pub fn parse_pid(content: &str) -> Option<u32> {
    let digits = content.strip_suffix('\n').unwrap_or(content);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|pid| *pid != 0)
}
