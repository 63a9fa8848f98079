//! `replay-debugger.toml` config loading.
//!
//! Lookup order: an explicit path, `./replay-debugger.toml`, then
//! `<config dir>/replay-debugger/config.toml`. Missing files fall back to
//! defaults; a file that exists but does not parse is an error naming the
//! offending key.

use crate::runtime::DEFAULT_MAX_MODULE_BYTES;
use crate::{DebuggerError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "replay-debugger.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    pub server: ServerConfig,
    pub sandbox: SandboxConfig,
    pub container: ContainerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the control server listens on.
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    /// Byte budget of a freestanding sandbox namespace.
    pub max_module_bytes: usize,
    /// Drop the root call's own intercepted record on the container path.
    pub dedupe_root_step: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    pub web_listener: bool,
    /// Lend the host's running container instead of starting a fresh one.
    pub reuse_running: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8081)),
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_module_bytes: DEFAULT_MAX_MODULE_BYTES,
            dedupe_root_step: true,
        }
    }
}

impl ReplayConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let deserializer = toml::Deserializer::new(text);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            DebuggerError::ConfigError(format!("{} at `{}`", e.inner().message(), e.path()))
        })
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DebuggerError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| match e {
            DebuggerError::ConfigError(msg) => {
                DebuggerError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `explicit` when given, otherwise from the first default
    /// location that exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        for candidate in Self::default_locations() {
            if candidate.is_file() {
                return Self::load_file(&candidate);
            }
        }
        debug!("No configuration file found; using defaults");
        Ok(Self::default())
    }

    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("replay-debugger").join("config.toml"));
        }
        locations
    }
}
