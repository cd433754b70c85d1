use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_HTTP_PORT: u16 = 8000;
const DEFAULT_HOST: &str = "0.0.0.0";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_HTTP_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;

    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_HTTP_PORT),
    })
}

const DEFAULT_LOG_LEVEL: &str = "info";
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct LogConfig {
    /// An `EnvFilter` directive such as `info` or `geolocweb=debug,tower_http=info`
    #[serde(default = "default_log_level")]
    pub(crate) level: String,
    /// Emit one JSON object per line instead of human-readable output
    #[serde(default)]
    pub(crate) json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    pub(crate) database: String,
    #[serde(default)]
    pub(crate) log: LogConfig,
    /// Origins that browsers may call the API from. Empty disables CORS
    #[serde(default)]
    pub(crate) cors_origins: Vec<String>,
}

impl EnvConfig {
    fn parse_all(contents: &str) -> Result<HashMap<String, EnvConfig>> {
        serde_yaml::from_str(contents).with_context(|| "Couldn't parse configuration yaml")
    }

    /// Loads the configuration for environment `envname` from the yaml file at `path`
    pub(crate) fn load<P: AsRef<Path>>(path: P, envname: &str) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, envname, "Loading configuration");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse_all(&contents)?
            .remove(envname)
            .ok_or_else(|| anyhow!("No environment '{envname}' in '{}'", path.display()))
    }
}

/// The configuration file used when none is given on the command line
pub(crate) fn default_config_path() -> Result<PathBuf> {
    ProjectDirs::from("org", "geoloc", "geolocweb")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .ok_or_else(|| anyhow!("Unable to determine the configuration directory"))
}
