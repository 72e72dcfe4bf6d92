//! I2C bus over `/dev/i2c-N`

use core::fmt;
use std::path::{Path, PathBuf};

use embedded_hal::i2c::{Error as _, I2c};
use linux_embedded_hal::i2cdev::linux::LinuxI2CError;
use linux_embedded_hal::{I2CError, I2cdev};
use log::debug;

use petarm_hal::{I2cAddress, I2cBus};

/// Bus wired to the 40-pin header on a Raspberry Pi
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";

/// Errors from the Linux I2C bus
#[derive(Debug)]
pub enum LinuxI2cError {
    /// The character device could not be opened
    Open {
        path: PathBuf,
        source: LinuxI2CError,
    },
    /// A transfer failed (NACK, arbitration loss, ioctl error)
    Bus(I2CError),
}

impl fmt::Display for LinuxI2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
            Self::Bus(e) => write!(f, "i2c transfer failed: {} ({:?})", e.kind(), e),
        }
    }
}

impl std::error::Error for LinuxI2cError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Bus(_) => None,
        }
    }
}

impl From<I2CError> for LinuxI2cError {
    fn from(e: I2CError) -> Self {
        Self::Bus(e)
    }
}

/// I2C master backed by a Linux i2c-dev character device
pub struct LinuxI2c {
    dev: I2cdev,
}

impl LinuxI2c {
    /// Open the given i2c-dev node (for example `/dev/i2c-1`)
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LinuxI2cError> {
        let path = path.as_ref().to_path_buf();
        let dev = I2cdev::new(&path).map_err(|source| LinuxI2cError::Open {
            path: path.clone(),
            source,
        })?;
        debug!("Opened I2C bus {}", path.display());
        Ok(Self { dev })
    }
}

impl I2cBus for LinuxI2c {
    type Error = LinuxI2cError;

    fn write(&mut self, address: I2cAddress, data: &[u8]) -> Result<(), Self::Error> {
        self.dev.write(address.get(), data)?;
        Ok(())
    }

    fn read(&mut self, address: I2cAddress, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.dev.read(address.get(), buf)?;
        Ok(())
    }

    fn write_read(
        &mut self,
        address: I2cAddress,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.dev.write_read(address.get(), write_data, read_buf)?;
        Ok(())
    }
}
