// Console configuration.
// A small JSON file under the user config dir, overridable from the
// environment.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnipError};

/// Connection settings for one snip server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server address; a missing scheme is treated as https.
    #[serde(default)]
    pub server: String,
    /// Admin password. When absent the console prompts on startup.
    #[serde(default)]
    pub password: Option<String>,
}

impl Config {
    /// Load the config file if present, then apply `SNIP_SERVER` and
    /// `SNIP_PASSWORD` overrides from the environment.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        if let Ok(server) = std::env::var("SNIP_SERVER") {
            config.server = server;
        }
        if let Ok(password) = std::env::var("SNIP_PASSWORD") {
            config.password = Some(password);
        }
        if config.server.trim().is_empty() {
            return Err(SnipError::Other(
                "no server configured; set SNIP_SERVER or write config.json".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Path to the config file (~/.config/snip/config.json on Linux).
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "snip").map(|dirs| dirs.config_dir().join("config.json"))
}

/// Path to the log file, under the data dir so it survives cache cleanup.
pub fn log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "snip").map(|dirs| dirs.data_dir().join("snip.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "server": "https://sn.ip", "password": "hunter2" }"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server, "https://sn.ip");
        assert_eq!(config.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_from_file_minimal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "server": "sn.ip" }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server, "sn.ip");
        assert!(config.password.is_none());
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
