//! Linux HAL for petarm
//!
//! Implements the [`petarm_hal`] traits on top of the Linux userspace
//! drivers exposed by `linux-embedded-hal`. This is the platform used on a
//! Raspberry Pi, where the PWM controller sits on the header I2C bus.

#![deny(unsafe_code)]

pub mod i2c;

pub use i2c::{LinuxI2c, LinuxI2cError, DEFAULT_I2C_DEVICE};

/// Blocking delay backed by `std::thread::sleep`
pub use linux_embedded_hal::Delay;
