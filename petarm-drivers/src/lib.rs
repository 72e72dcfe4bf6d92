//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in petarm-core:
//!
//! - PWM controllers ([`pwm::Pca9685`], 16-channel, I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod pwm;

pub use pwm::{Pca9685, Pca9685Error};
