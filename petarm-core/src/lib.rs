//! Board-agnostic core logic for the petarm robot arm
//!
//! This crate contains all arm logic that does not depend on a specific
//! PWM chip or bus:
//!
//! - Axis naming, channel mapping and pose types
//! - Angle clamping and angle-to-pulse mapping
//! - The [`traits::ServoOutput`] seam implemented by PWM drivers
//! - [`arm::ArmController`], the named-axis motion API
//! - The pick gesture choreography
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod arm;
pub mod config;
pub mod gesture;
pub mod traits;

#[cfg(test)]
mod testing;

pub use arm::{ArmController, ArmError, Axis, Channel, ChannelMap, Pose};
pub use config::ArmConfig;
pub use gesture::{GestureStep, PickRequest};
