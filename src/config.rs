use crate::backend::BackendKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const APP_NAME: &str = "davidgnome";
pub const DEFAULT_BACKEND: &str = "ollama";

/// The whole config file: `{"backend": "ollama"}`.
///
/// The name stays a plain string here so an unknown backend is reported when
/// it is resolved at startup instead of being silently replaced by the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Config {
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            backend: kind.as_str().to_string(),
        }
    }

    pub fn backend_kind(&self) -> Result<BackendKind, crate::error::BackendError> {
        self.backend.parse()
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME).join("config.json"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn load_config() -> Config {
    match get_config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            tracing::warn!(error = %e, "using default backend");
            Config::default()
        }
    }
}

/// Any problem reading the file means "use the default backend".
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match try_load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
            Config::default()
        }
    }
}

fn try_load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
