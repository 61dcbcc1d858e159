//! User configuration (`cellcraft.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "cellcraft.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Task bank to use instead of the built-in one.
    pub task_bank: Option<PathBuf>,
    /// Print the scenario and hints when a task starts.
    pub show_hints: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            task_bank: None,
            show_hints: true,
        }
    }
}

impl Config {
    /// Load the config. An explicit path must exist and parse; the default
    /// location is optional and a broken file there is reported and ignored.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Config::from_file(path);
        }

        let Some(path) = default_config_path() else {
            return Ok(Config::default());
        };
        if !path.exists() {
            return Ok(Config::default());
        }
        match Config::from_file(&path) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("ignoring {}: {:#}", path.display(), err);
                Ok(Config::default())
            }
        }
    }

    fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Config::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellcraft")?;
    Some(proj.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
        assert!(Config::default().show_hints);
    }

    #[test]
    fn test_parse() {
        let config = Config::from_toml_str(
            r#"
task_bank = "/tmp/tasks.toml"
show_hints = false
"#,
        )
        .unwrap();
        assert_eq!(config.task_bank, Some(PathBuf::from("/tmp/tasks.toml")));
        assert!(!config.show_hints);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml_str("theme = \"dark\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let missing = std::env::temp_dir().join("cellcraft-no-such-config.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
