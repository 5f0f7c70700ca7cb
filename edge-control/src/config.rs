//! Configuration management for edge-control.
//!
//! All settings are read once from the process environment at start-up.
//! Unset variables fall back to defaults; malformed values are rejected
//! with [`Error::Config`] rather than silently replaced.

use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// Selects the temperature source variant.
pub const ENV_SOURCE: &str = "TEMP_SOURCE";
/// Base URL of the temperature daemon.
pub const ENV_DAEMON_URL: &str = "TEMP_DAEMON_URL";
/// Daemon request timeout in milliseconds.
pub const ENV_DAEMON_TIMEOUT_MS: &str = "TEMP_DAEMON_TIMEOUT_MS";
/// API listen address.
pub const ENV_LISTEN: &str = "EDGE_LISTEN";
/// Directory holding the static client assets.
pub const ENV_CLIENT_DIR: &str = "EDGE_CLIENT_DIR";

pub const DEFAULT_DAEMON_URL: &str = "http://localhost:7070";
pub const DEFAULT_DAEMON_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
pub const DEFAULT_CLIENT_DIR: &str = "client";

/// Where temperature readings come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceMode {
    /// Local random walk, no hardware needed
    #[default]
    Simulated,
    /// Proxy to the external temperature daemon
    Daemon,
}

/// Main configuration structure for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Temperature source selection
    pub source: SourceMode,

    /// Temperature daemon configuration
    pub daemon: DaemonConfig,

    /// API server configuration
    pub api: ApiConfig,
}

/// Temperature daemon connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// Base URL; readings are fetched from `{url}/read`
    pub url: String,

    /// Upper bound on a single daemon request
    pub timeout: Duration,
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Listen address
    pub listen: SocketAddr,

    /// Static client asset directory
    pub client_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match get(ENV_SOURCE) {
            Some(raw) => parse(ENV_SOURCE, raw.trim())?,
            None => SourceMode::default(),
        };

        let url = get(ENV_DAEMON_URL).unwrap_or_else(|| DEFAULT_DAEMON_URL.to_string());
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "{ENV_DAEMON_URL} must be an http(s) URL, got '{url}'"
            )));
        }

        let timeout = match get(ENV_DAEMON_TIMEOUT_MS) {
            Some(raw) => match parse::<u64>(ENV_DAEMON_TIMEOUT_MS, raw.trim())? {
                0 => {
                    return Err(Error::Config(format!(
                        "{ENV_DAEMON_TIMEOUT_MS} must be greater than zero"
                    )))
                }
                ms => Duration::from_millis(ms),
            },
            None => DEFAULT_DAEMON_TIMEOUT,
        };

        let listen = parse(
            ENV_LISTEN,
            get(ENV_LISTEN).as_deref().unwrap_or(DEFAULT_LISTEN).trim(),
        )?;

        let client_dir = get(ENV_CLIENT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENT_DIR));

        Ok(Self {
            source,
            daemon: DaemonConfig { url, timeout },
            api: ApiConfig { listen, client_dir },
        })
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("invalid {key} '{raw}': {e}")))
}
