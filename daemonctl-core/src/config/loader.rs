use super::{DEFAULT_CONFIG_FILE, JobsConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Job config loader with auto-discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("."), PathBuf::from("./config")],
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// First `daemonctl.json` found in the search paths, or an empty config.
    pub async fn load(&self) -> crate::Result<JobsConfig> {
        for dir in &self.search_paths {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                return self.load_file(&candidate).await;
            }
        }

        debug!("No {} found in {:?}", DEFAULT_CONFIG_FILE, self.search_paths);
        Ok(JobsConfig::default())
    }

    /// Load a specific config file. Relative job paths resolve against the
    /// file's directory.
    pub async fn load_file(&self, path: &Path) -> crate::Result<JobsConfig> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: JobsConfig = serde_json::from_str(&content).map_err(|e| {
            crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);

        debug!("Loaded {} job(s) from {:?}", config.jobs.len(), path);
        Ok(config)
    }
}
