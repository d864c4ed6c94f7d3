//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml` in the data directory.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::task::Priority;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Login rules
    #[serde(default)]
    pub session: SessionConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Dashboard display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Session-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Shortest accepted username, in characters
    #[serde(default = "default_min_username_len")]
    pub min_username_len: usize,
}

fn default_min_username_len() -> usize {
    2
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_username_len: default_min_username_len(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TasksConfig {
    /// Priority preselected for new tasks
    #[serde(default = "default_priority")]
    pub default_priority: String,
}

fn default_priority() -> String {
    Priority::Medium.as_str().to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
        }
    }
}

impl TasksConfig {
    /// Parsed default priority; medium when the value does not parse.
    pub fn priority(&self) -> Priority {
        self.default_priority.parse().unwrap_or_default()
    }
}

/// Display configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Tasks due within this many hours are shown as "due soon"
    #[serde(default = "default_due_soon_hours")]
    pub due_soon_hours: u32,
}

fn default_due_soon_hours() -> u32 {
    24
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            due_soon_hours: default_due_soon_hours(),
        }
    }
}

impl DisplayConfig {
    pub fn due_soon_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.due_soon_hours))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let min = self.session.min_username_len;
        if min == 0 {
            return Err(Error::InvalidConfig(
                "session.min_username_len must be >= 1".to_string(),
            ));
        }
        if min > 64 {
            return Err(Error::InvalidConfig(
                "session.min_username_len must be <= 64".to_string(),
            ));
        }

        self.tasks
            .default_priority
            .parse::<Priority>()
            .map_err(|_| {
                Error::InvalidConfig(format!(
                    "tasks.default_priority '{}' (expected low|medium|high)",
                    self.tasks.default_priority
                ))
            })?;

        if self.display.due_soon_hours == 0 {
            return Err(Error::InvalidConfig(
                "display.due_soon_hours must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
