use async_trait::async_trait;
use daemonctl_core::{Error, ProcessControl, Result};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::debug;

/// Signal-based process control for POSIX systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcessControl;

impl UnixProcessControl {
    pub fn new() -> Self {
        Self
    }
}

fn to_nix_pid(pid: u32) -> Result<Pid> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| Error::ProcessControl(format!("PID {} is out of range", pid)))
}

#[async_trait]
impl ProcessControl for UnixProcessControl {
    /// Zombies still count as existing until their parent reaps them.
    fn exists(&self, pid: u32) -> Result<bool> {
        match signal::kill(to_nix_pid(pid)?, None) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            // Exists, owned by someone else
            Err(Errno::EPERM) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        debug!("Sending SIGTERM to PID {}", pid);
        match signal::kill(to_nix_pid(pid)?, Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn describe(&self, pid: u32) -> Result<String> {
        let output = Command::new("ps")
            .args(["-o", "pid=", "-o", "stat=", "-o", "time=", "-o", "command="])
            .args(["-p", &pid.to_string()])
            .output()
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
