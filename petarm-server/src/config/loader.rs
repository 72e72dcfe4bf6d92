//! Configuration loading
//!
//! Reads the TOML config from disk. A missing file is not an error: the
//! server starts with defaults so a bare install works. A file that exists
//! but doesn't parse is fatal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use log::{debug, info, warn};

use super::types::ServerConfig;

/// Config file used when neither the command line nor the environment names one
pub const DEFAULT_CONFIG_PATH: &str = "petarm.toml";

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "PETARM_CONFIG";

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read
    Io { path: PathBuf, source: io::Error },
    /// TOML parsing or validation failed
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "failed to read {}", path.display()),
            Self::Parse { path, .. } => write!(f, "invalid config in {}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// The file did not exist; built-in defaults
    Defaults(PathBuf),
}

/// Configuration plus its origin
///
/// Loading happens before logging is set up (the config decides log
/// levels), so reporting is deferred to [`LoadedConfig::log_summary`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServerConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Log where the config came from and its key settings
    pub fn log_summary(&self) {
        match &self.source {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults(path) => {
                warn!("{} not found, using built-in defaults", path.display())
            }
        }

        let config = &self.config;
        debug!("  listen: {}", config.server.listen);
        debug!("  static files: {}", config.server.static_dir.display());
        debug!("  bus: {} (debug: {})", config.bus.device.display(), config.bus.debug);
        debug!(
            "  settle: {} ms, default pose: {:?}",
            config.arm.settle_ms, config.arm.default_pose
        );
    }
}

/// Pick the config file: explicit argument, then `PETARM_CONFIG`, then
/// `petarm.toml` in the working directory
pub fn config_path(arg: Option<OsString>, env: Option<OsString>) -> PathBuf {
    arg.or(env)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Parse a TOML config string
pub fn parse_config(text: &str) -> Result<ServerConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Load the config file at `path`
pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(LoadedConfig {
                config: ServerConfig::default(),
                source: ConfigSource::Defaults(path.to_path_buf()),
            });
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(path.to_path_buf()),
    })
}
