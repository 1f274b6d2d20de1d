//! On-disk configuration (`~/.askweb/config.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AskwebError;

/// Every field is optional; unset fields fall through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_iterations: Option<usize>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub verbose: Option<bool>,
    pub search: SearchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
    pub base_url: Option<String>,
    pub region: Option<String>,
    pub max_results: Option<usize>,
}

impl ConfigFile {
    /// Read and parse `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, AskwebError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&contents)?))
    }

    pub fn default_path() -> Option<PathBuf> {
        default_askweb_dir().map(|dir| dir.join("config.toml"))
    }
}

fn default_askweb_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".askweb"))
}
