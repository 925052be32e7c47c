use async_trait::async_trait;
use daemonctl_core::{Error, ProcessControl, Result};
use tokio::process::Command;
use tracing::debug;
use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_ACCESS_DENIED, GetLastError, HANDLE, STILL_ACTIVE,
};
use windows_sys::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
    TerminateProcess,
};

/// Handle-based process control for Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsProcessControl;

impl WindowsProcessControl {
    pub fn new() -> Self {
        Self
    }
}

struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

#[async_trait]
impl ProcessControl for WindowsProcessControl {
    fn exists(&self, pid: u32) -> Result<bool> {
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                return match GetLastError() {
                    ERROR_ACCESS_DENIED => Ok(true),
                    _ => Ok(false),
                };
            }
            let handle = OwnedHandle(handle);

            let mut code: u32 = 0;
            if GetExitCodeProcess(handle.0, &mut code) == 0 {
                return Err(Error::Windows(GetLastError()));
            }
            Ok(code == STILL_ACTIVE as u32)
        }
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        debug!("Terminating PID {}", pid);
        unsafe {
            let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
            if handle.is_null() {
                return Err(Error::Windows(GetLastError()));
            }
            let handle = OwnedHandle(handle);

            if TerminateProcess(handle.0, 1) == 0 {
                return Err(Error::Windows(GetLastError()));
            }
        }
        Ok(())
    }

    async fn describe(&self, pid: u32) -> Result<String> {
        let output = Command::new("tasklist")
            .args(["/NH", "/FI", &format!("PID eq {}", pid)])
            .output()
            .await?;
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        // tasklist reports "INFO: No tasks are running ..." when nothing matched
        if text.starts_with("INFO:") {
            return Ok(String::new());
        }
        Ok(text)
    }
}
