//! Runtime configuration, read from the environment
//!
//! | Variable             | Default                              |
//! |----------------------|--------------------------------------|
//! | `CIRCLE_CONTENT_DIR` | `./content`                          |
//! | `CIRCLE_DATASET`     | dataset compiled into the binary     |
//! | `CIRCLE_DB`          | `<data dir>/base-india-circle/submissions.db` |
//! | `CIRCLE_PORT`        | `3100`                               |

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3100;
pub const DEFAULT_CONTENT_DIR: &str = "content";
const APP_DIR: &str = "base-india-circle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root holding `projects/` and `founders/` override files
    pub content_dir: PathBuf,
    /// External dataset file; `None` uses the embedded one
    pub dataset: Option<PathBuf>,
    pub db_path: PathBuf,
    pub port: u16,
}

/// Per-user data directory for the submission store
pub fn get_data_dir() -> PathBuf {
    // XDG data dir on Linux, ~/Library/Application Support on macOS
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            dataset: None,
            db_path: get_data_dir().join("submissions.db"),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("CIRCLE_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("CIRCLE_DATASET") {
            config.dataset = Some(PathBuf::from(path));
        }
        if let Some(path) = get("CIRCLE_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(port) = get("CIRCLE_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("CIRCLE_PORT is not a port number: {:?}", port))?;
        }

        Ok(config)
    }
}
