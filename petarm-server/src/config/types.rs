//! Configuration type definitions

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use petarm_core::ArmConfig;
use petarm_hal_linux::DEFAULT_I2C_DEVICE;
use serde::{Deserialize, Serialize};

/// Port the front-end expects the API on
pub const DEFAULT_PORT: u16 = 8000;

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP listener
    pub server: HttpConfig,
    /// I2C bus and PWM chip
    pub bus: BusConfig,
    /// Arm controller
    pub arm: ArmConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Address and port to listen on
    pub listen: SocketAddr,
    /// Directory served for every path not handled by the API
    pub static_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            static_dir: PathBuf::from("app"),
        }
    }
}

/// Bus configuration
///
/// The PCA9685 address is fixed at 0x40 and not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// i2c-dev node the PWM chip is attached to
    pub device: PathBuf,
    /// Trace every register access
    pub debug: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_I2C_DEVICE),
            debug: false,
        }
    }
}
