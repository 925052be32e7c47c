use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::{Child, Command};

use crate::PidFile;

/// Platform boundary for process liveness and termination.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Whether a process with this id currently exists.
    fn exists(&self, pid: u32) -> crate::Result<bool>;

    /// Ask the process to terminate. Does not wait for it to exit.
    fn terminate(&self, pid: u32) -> crate::Result<()>;

    /// The raw process-table line for `pid`, or an empty string.
    async fn describe(&self, pid: u32) -> crate::Result<String>;
}

/// PID record plus liveness queries against the OS.
pub struct ProcessTracker {
    pid_file: PidFile,
    control: Arc<dyn ProcessControl>,
}

impl std::fmt::Debug for ProcessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessTracker")
            .field("pid_file", &self.pid_file)
            .field("control", &"<ProcessControl>")
            .finish()
    }
}

impl ProcessTracker {
    pub fn new(pid_file: PidFile, control: Arc<dyn ProcessControl>) -> Self {
        Self { pid_file, control }
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    pub async fn write_pid(&self, pid: u32) -> crate::Result<()> {
        self.pid_file.write(pid).await
    }

    pub async fn read_pid(&self) -> crate::Result<Option<u32>> {
        self.pid_file.read().await
    }

    /// Best effort: the process may exit, or the PID be reused, right after
    /// this returns.
    pub async fn is_running(&self) -> crate::Result<bool> {
        match self.read_pid().await? {
            Some(pid) => self.control.exists(pid),
            None => Ok(false),
        }
    }

    pub fn terminate(&self, pid: u32) -> crate::Result<()> {
        self.control.terminate(pid)
    }

    /// `None` when no PID is on record.
    pub async fn report(&self) -> crate::Result<Option<String>> {
        match self.read_pid().await? {
            Some(pid) => Ok(Some(self.control.describe(pid).await?)),
            None => Ok(None),
        }
    }
}

pub struct ProcessBuilder {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<std::path::PathBuf>,
}

impl ProcessBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in vars {
            self.env
                .push((k.as_ref().to_string(), v.as_ref().to_string()));
        }
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Splits the command string into program and arguments, e.g.
    /// `"sh -c 'exit 3'"`, when no explicit arguments were given.
    fn program_and_args(&self) -> (String, Vec<String>) {
        let (program, mut parsed_args) = if self.command.contains(' ') && self.args.is_empty() {
            match shell_words::split(&self.command) {
                Ok(parts) if !parts.is_empty() => {
                    let mut parts = parts.into_iter();
                    let program = parts.next().unwrap_or_default();
                    (program, parts.collect())
                }
                _ => (self.command.clone(), Vec::new()),
            }
        } else {
            (self.command.clone(), Vec::new())
        };
        parsed_args.extend(self.args.iter().cloned());
        (program, parsed_args)
    }

    pub fn spawn(self) -> crate::Result<Child> {
        let (program, args) = self.program_and_args();

        tracing::debug!("Spawning process: command='{}', args={:?}", program, args);

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in self.env {
            cmd.env(key, value);
        }

        cmd.spawn().map_err(|e| {
            crate::Error::ProcessControl(format!("failed to spawn {}: {}", program, e))
        })
    }
}
