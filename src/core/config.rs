use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the optional settings file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "webext-build.toml";

/// Layout of the extension project and how to reach the bundler.
///
/// Every field has a default, so a missing settings file (or a partial one)
/// still describes the standard `src/` → `dist/` layout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    pub source_dir: String,
    pub out_dir: String,
    pub manifest: String,
    pub service_worker: String,
    /// Extensions probed, in order, for each module's `index` file.
    pub entry_extensions: Vec<String>,
    /// Program plus leading arguments; `build --config <file>` is appended.
    pub bundler_command: Vec<String>,
    pub retry_delay_ms: u64,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            out_dir: "dist".to_string(),
            manifest: "manifest.json".to_string(),
            service_worker: "service-worker".to_string(),
            entry_extensions: ["mts", "ts", "tsx", "mjs", "js", "jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            bundler_command: vec!["npx".to_string(), "vite".to_string()],
            retry_delay_ms: 1000,
        }
    }
}

impl BuildSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub struct ConfigManager {
    config_path: PathBuf,
    project_root: PathBuf,
}

impl ConfigManager {
    /// Discovers the project root from the current directory.
    pub fn new() -> io::Result<Self> {
        let current_dir = std::env::current_dir()?;
        let defaults = BuildSettings::default();
        let project_root = find_project_root(&current_dir, &defaults)
            .unwrap_or_else(|| current_dir.clone());
        Ok(Self::new_at(project_root))
    }

    /// Uses `project_root` as is.
    pub fn new_at(project_root: PathBuf) -> Self {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        Self {
            config_path,
            project_root,
        }
    }

    pub fn set_config_path(&mut self, path: PathBuf) {
        self.config_path = path;
    }

    pub fn get_project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_settings(&self) -> Result<BuildSettings, ConfigError> {
        if !self.config_path.exists() {
            debug!(
                "No settings file at {}, using defaults",
                self.config_path.display()
            );
            return Ok(BuildSettings::default());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
            path: self.config_path.clone(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })
    }
}

/// Walks up from `start` to the first directory holding `<source_dir>/<manifest>`.
pub fn find_project_root(start: &Path, settings: &BuildSettings) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        if dir.join(&settings.source_dir).join(&settings.manifest).is_file() {
            return Some(dir.to_path_buf());
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}
