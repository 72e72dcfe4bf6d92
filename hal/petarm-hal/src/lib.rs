//! Petarm Hardware Abstraction Layer
//!
//! This crate defines the bus traits that platform HALs implement, so the
//! PWM driver and arm controller can run against real hardware or a test
//! double without change.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  petarm-server / petarm-core            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  petarm-drivers (PCA9685)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  petarm-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  petarm-hal-linux (/dev/i2c-N)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

pub use i2c::{I2cAddress, I2cBus};
