//! Pick gesture
//!
//! The one multi-step choreography the arm performs: swing the base to a
//! start angle, lower the shoulder, sweep the base across, lift again.
//!
//! ```text
//!   rotate := 45 + start*90      swing over the start point
//!   y      -= 40                 lower
//!   rotate += end*90             sweep
//!   y      += 40                 lift
//! ```
//!
//! A failed step aborts the rest; the arm stays wherever the last
//! successful step left it.

use embedded_hal::delay::DelayNs;

use crate::arm::{ArmController, ArmError, Axis};
use crate::traits::ServoOutput;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base angle for `start = 0`
pub const SWING_OFFSET_DEG: i32 = 45;

/// Base travel across the full normalized range
pub const SWEEP_RANGE_DEG: f32 = 90.0;

/// How far the shoulder drops during the sweep
pub const LOWER_DEG: i32 = 40;

/// A single controller call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GestureStep {
    /// Absolute move
    Set { axis: Axis, deg: i32 },
    /// Relative move from the axis's current angle
    Move { axis: Axis, delta_deg: i32 },
}

impl GestureStep {
    /// Run this step with the controller's settle delay
    pub fn apply<S, D>(&self, arm: &mut ArmController<S, D>) -> Result<(), ArmError<S::Error>>
    where
        S: ServoOutput,
        D: DelayNs,
    {
        match *self {
            Self::Set { axis, deg } => arm.set(axis, deg),
            Self::Move { axis, delta_deg } => arm.move_by(axis, delta_deg),
        }
    }
}

/// Pick request: normalized start and end positions across the sweep
///
/// Both values are expected in `[0, 1]` but are not checked: the angles
/// they produce go through the controller's angle clamp like any other
/// command. NaN counts as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PickRequest {
    pub start: f32,
    pub end: f32,
}

impl PickRequest {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// The four steps of this gesture, in order
    pub fn plan(&self) -> [GestureStep; 4] {
        // `as` truncates toward zero and saturates, NaN becomes 0
        let swing = SWING_OFFSET_DEG.saturating_add((self.start * SWEEP_RANGE_DEG) as i32);
        let sweep = (self.end * SWEEP_RANGE_DEG) as i32;

        [
            GestureStep::Set {
                axis: Axis::Rotate,
                deg: swing,
            },
            GestureStep::Move {
                axis: Axis::Y,
                delta_deg: -LOWER_DEG,
            },
            GestureStep::Move {
                axis: Axis::Rotate,
                delta_deg: sweep,
            },
            GestureStep::Move {
                axis: Axis::Y,
                delta_deg: LOWER_DEG,
            },
        ]
    }

    /// Perform the gesture, blocking for every step's settle delay
    pub fn run<S, D>(&self, arm: &mut ArmController<S, D>) -> Result<(), ArmError<S::Error>>
    where
        S: ServoOutput,
        D: DelayNs,
    {
        debug!("Pick gesture start={} end={}", self.start, self.end);
        for step in self.plan() {
            step.apply(arm)?;
        }
        Ok(())
    }
}
