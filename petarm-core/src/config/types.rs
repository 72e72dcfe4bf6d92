//! Configuration type definitions

use crate::arm::{ChannelMap, Pose, DEFAULT_SETTLE_MS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Arm controller configuration
///
/// Fixed once the controller is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ArmConfig {
    /// Pose applied at construction and on every reset
    pub default_pose: Pose,
    /// Axis to PWM channel wiring
    pub channels: ChannelMap,
    /// Time to wait after each command for the servo to get there (ms)
    ///
    /// There is no position feedback, so this is the only thing keeping
    /// commands from outrunning the hardware. Tests use 0.
    pub settle_ms: u32,
    /// Log every command with its angle and pulse width
    pub debug: bool,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            default_pose: Pose::HOME,
            channels: ChannelMap::STOCK,
            settle_ms: DEFAULT_SETTLE_MS,
            debug: false,
        }
    }
}

impl ArmConfig {
    /// Same config with a different default pose
    pub fn with_default_pose(mut self, pose: Pose) -> Self {
        self.default_pose = pose;
        self
    }

    /// Same config with a different settle delay
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }
}
