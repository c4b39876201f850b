//! User configuration loaded from `<config_dir>/config.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE, ENV_CONFIG_DIR};
use crate::env_signals::EnvSource;
use crate::error::ConfigError;

/// How generated identities are labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    /// `suffix@scope`
    #[default]
    Plain,
    /// `agent-suffix@scope`, where `agent` names the detected host.
    Tagged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub style: NamingStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub naming: NamingConfig,

    /// Extra agent-host process name patterns.
    #[serde(default)]
    pub agent_hosts: Vec<String>,

    /// Extra environment variables that mark an agent session.
    #[serde(default)]
    pub agent_env: Vec<String>,

    /// Default log filter when `MURMUR_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl Config {
    /// Load `config.yaml` from `dir`. A missing file yields defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Built-in agent-host patterns followed by configured ones, lowercased.
    pub fn host_patterns(&self) -> Vec<String> {
        crate::constants::AGENT_HOST_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(self.agent_hosts.iter().map(|p| p.trim().to_lowercase()))
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Order: `MURMUR_CONFIG_DIR` -> `$HOME/.config/murmur`.
pub fn config_directory(env: &dyn EnvSource) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env.var(ENV_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    let home = env
        .var("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(home.join(".config").join("murmur"))
}
