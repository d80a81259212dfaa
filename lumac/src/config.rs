//! Optional `lumac.toml` configuration.
//!
//! The compilation pipeline itself takes no configuration (§5's
//! single-session model is config-free); everything here is a driver knob.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LumacError, Result};

pub const CONFIG_FILE_NAME: &str = "lumac.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub verbose: bool,

    /// Whether the REPL prints the pretty-printed form of each line before
    /// its bytecode, useful for eyeballing precedence resolution live.
    #[serde(default = "default_true")]
    pub echo_parsed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self { verbose: false, echo_parsed: true }
    }
}

impl Config {
    /// Searches the current directory first, then `~/.config/lumac/`,
    /// falling back to defaults if neither has a config file.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        let cwd = PathBuf::from(CONFIG_FILE_NAME);
        if cwd.exists() {
            return Some(cwd);
        }
        dirs::home_dir()
            .map(|dir| dir.join(".config").join("lumac").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LumacError::Config(format!("configuration file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LumacError::Config(format!("failed to parse configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_echo_parsed_input() {
        let config = Config::default();
        assert!(config.echo_parsed);
        assert!(!config.verbose);
    }

    #[test]
    fn loads_from_a_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lumac.toml");
        std::fs::write(&path, "verbose = true\necho_parsed = false\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.verbose);
        assert!(!config.echo_parsed);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(Config::load_from_path(Path::new("/nonexistent/lumac.toml")).is_err());
    }
}
