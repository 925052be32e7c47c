use daemonctl_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Exclusive advisory lock held around the start guard.
///
/// The OS drops the lock when the holder exits, so a crashed invocation
/// never leaves a stale lock behind. The lock file itself stays on disk.
pub struct StartLock {
    path: PathBuf,
    #[cfg(unix)]
    _guard: nix::fcntl::Flock<File>,
    #[cfg(windows)]
    _guard: File,
}

impl std::fmt::Debug for StartLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartLock").field("path", &self.path).finish()
    }
}

impl StartLock {
    /// `<pid file>.lock`
    pub fn path_for(pid_file: &Path) -> PathBuf {
        let mut name = pid_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// `Ok(None)` when another invocation holds the lock.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| Error::file_write(path, e))?;

        let guard = match Self::lock(file)? {
            Some(guard) => guard,
            None => {
                trace!("Start lock {:?} is held elsewhere", path);
                return Ok(None);
            }
        };

        trace!("Acquired start lock {:?}", path);
        Ok(Some(Self {
            path: path.to_path_buf(),
            _guard: guard,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn lock(file: File) -> Result<Option<nix::fcntl::Flock<File>>> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => Ok(Some(guard)),
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => Ok(None),
            Err((_, errno)) => Err(errno.into()),
        }
    }

    #[cfg(windows)]
    fn lock(file: File) -> Result<Option<File>> {
        use std::os::windows::io::AsRawHandle;
        use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, GetLastError, HANDLE};
        use windows_sys::Win32::Storage::FileSystem::{
            LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx,
        };
        use windows_sys::Win32::System::IO::OVERLAPPED;

        unsafe {
            let mut overlapped: OVERLAPPED = std::mem::zeroed();
            let locked = LockFileEx(
                file.as_raw_handle() as HANDLE,
                LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
                0,
                1,
                0,
                &mut overlapped,
            );
            if locked == 0 {
                return match GetLastError() {
                    ERROR_LOCK_VIOLATION => Ok(None),
                    code => Err(Error::Windows(code)),
                };
            }
        }
        Ok(Some(file))
    }
}
