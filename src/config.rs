use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub const CONFIG_FILE: &str = "proctor.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Controls how "run all" schedules tests.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Delay between consecutive tests of a staggered run, in milliseconds.
    pub stagger_ms: u64,
    /// Suite opened when none is named on the command line.
    pub suite: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 300,
            suite: "basics".to_string(),
        }
    }
}

impl RunConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show per-test execution time in the test list.
    pub show_timings: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_timings: true }
    }
}

impl Config {
    /// Load `proctor.toml` from `dir`, falling back to defaults if absent or invalid.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_else(|err| {
            warn!(%err, "using default configuration");
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.run.stagger(), Duration::from_millis(300));
        assert_eq!(config.run.suite, "basics");
        assert!(config.display.show_timings);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[run]\nstagger_ms = 50\n").unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.run.stagger_ms, 50);
        assert_eq!(config.run.suite, "basics");
        assert!(config.display.show_timings);
    }

    #[test]
    fn invalid_file_is_an_error_but_load_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[run]\nstagger_ms = \"soon\"\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(Config::load(dir.path()).run.stagger_ms, 300);
    }
}
