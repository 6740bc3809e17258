//! Environment-driven configuration.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `COURIER_API_BASE` | Backend base URL | required |
//! | `COURIER_DATA_DIR` | Directory of the local state file | `<config dir>/courier` |
//! | `COURIER_TIMEOUT_MS` | Request timeout in milliseconds | `30000` |
//! | `COURIER_TRANSPORT` | `proxy` or `direct` | `proxy` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

/// Backend base URL.
pub const API_BASE_VAR: &str = "COURIER_API_BASE";
/// Local state directory.
pub const DATA_DIR_VAR: &str = "COURIER_DATA_DIR";
/// Request timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "COURIER_TIMEOUT_MS";
/// Transport selection.
pub const TRANSPORT_VAR: &str = "COURIER_TRANSPORT";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable has an unusable value.
    #[error("{key} is invalid: {message}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No data directory was given and the platform has none.
    #[error("could not determine a data directory; set COURIER_DATA_DIR")]
    NoDataDir,
}

/// How requests reach their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Through the backend proxy endpoint.
    #[default]
    Proxy,
    /// Straight from this process.
    Direct,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proxy => f.write_str("proxy"),
            Self::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(Self::Proxy),
            "direct" => Ok(Self::Direct),
            other => Err(ConfigError::Invalid {
                key: TRANSPORT_VAR,
                message: format!("expected `proxy` or `direct`, got `{other}`"),
            }),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL.
    pub api_base: Url,
    /// Directory of the local state file.
    pub data_dir: PathBuf,
    /// Request timeout.
    pub timeout: Duration,
    /// Transport selection.
    pub transport: TransportMode,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through a lookup function.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or invalid variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_base = get(API_BASE_VAR).ok_or(ConfigError::Missing(API_BASE_VAR))?;
        let api_base = Url::parse(raw_base.trim()).map_err(|e| ConfigError::Invalid {
            key: API_BASE_VAR,
            message: e.to_string(),
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: API_BASE_VAR,
                message: format!("unsupported scheme `{}`", api_base.scheme()),
            });
        }

        let data_dir = match get(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join("courier"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let timeout = match get(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or_else(|| ConfigError::Invalid {
                    key: TIMEOUT_VAR,
                    message: format!("expected a positive number of milliseconds, got `{raw}`"),
                })?,
            None => DEFAULT_TIMEOUT,
        };

        let transport = get(TRANSPORT_VAR)
            .map(|raw| raw.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_base,
            data_dir,
            timeout,
            transport,
        })
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn api_base_str(&self) -> &str {
        self.api_base.as_str().trim_end_matches('/')
    }
}
