//! One commanded angle per axis

use super::{clamp_angle, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Angles (degrees, 0-180) for every axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct Pose {
    pub x: u8,
    pub y: u8,
    pub grab: u8,
    pub rotate: u8,
}

impl Pose {
    /// Resting pose of the stock arm: shoulder up, reach out, base centered
    pub const HOME: Self = Self {
        x: 170,
        y: 100,
        grab: 0,
        rotate: 90,
    };

    /// Angle recorded for `axis`
    pub fn get(&self, axis: Axis) -> u8 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Grab => self.grab,
            Axis::Rotate => self.rotate,
        }
    }

    /// Record `deg` for `axis`, clamped to the servo range
    pub fn set(&mut self, axis: Axis, deg: u8) {
        let deg = clamp_angle(deg as i32);
        match axis {
            Axis::X => self.x = deg,
            Axis::Y => self.y = deg,
            Axis::Grab => self.grab = deg,
            Axis::Rotate => self.rotate = deg,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::HOME
    }
}
