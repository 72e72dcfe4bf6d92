//! Arm controller: safe named-axis motion on top of a PWM output

use core::fmt;

use embedded_hal::delay::DelayNs;

use super::{angle_to_pulse_us, clamp_angle, Axis, Pose, SERVO_FREQUENCY_HZ};
use crate::config::ArmConfig;
use crate::traits::ServoOutput;

/// Settle time after each command unless configured otherwise (ms)
pub const DEFAULT_SETTLE_MS: u32 = 500;

/// Errors from arm operations
///
/// The only failure is the output (bus) failing. Out-of-range angles are
/// clamped, not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmError<E> {
    /// The PWM output failed; the arm stays at its last successful command
    Output(E),
}

impl<E: fmt::Display> fmt::Display for ArmError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(e) => write!(f, "servo output failed: {e}"),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for ArmError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Output(e) => Some(e),
        }
    }
}

/// Named-axis servo controller
///
/// Owns the PWM output and the delay provider. Every command blocks for its
/// settle delay before returning, so commands are never issued faster than
/// the servos can follow. Not `Sync`-safe by itself: callers sharing one
/// controller between threads must serialize access.
pub struct ArmController<S, D> {
    output: S,
    delay: D,
    config: ArmConfig,
    position: Pose,
}

impl<S, D> ArmController<S, D>
where
    S: ServoOutput,
    D: DelayNs,
{
    /// Program the output to 50 Hz and drive every axis to the default pose
    pub fn new(mut output: S, mut delay: D, config: ArmConfig) -> Result<Self, ArmError<S::Error>> {
        info!("Configuring servo PWM at {} Hz", SERVO_FREQUENCY_HZ);
        output
            .set_frequency(SERVO_FREQUENCY_HZ, &mut delay)
            .map_err(ArmError::Output)?;

        let mut arm = Self {
            output,
            delay,
            config,
            position: config.default_pose,
        };
        arm.reset()?;
        Ok(arm)
    }

    /// Drive every axis to the configured default pose
    ///
    /// Axes move one at a time in [`Axis::RESET_ORDER`].
    pub fn reset(&mut self) -> Result<(), ArmError<S::Error>> {
        debug!("Resetting arm to default pose");
        for axis in Axis::RESET_ORDER {
            let deg = self.config.default_pose.get(axis);
            self.set(axis, deg as i32)?;
        }
        Ok(())
    }

    /// Move `axis` to an absolute angle, then wait the configured settle time
    pub fn set(&mut self, axis: Axis, deg: i32) -> Result<(), ArmError<S::Error>> {
        self.set_with_delay(axis, deg, self.config.settle_ms)
    }

    /// Move `axis` to an absolute angle, then wait `delay_ms`
    ///
    /// The angle is clamped to 0-180° first. The position is only recorded
    /// once the output accepted the command.
    pub fn set_with_delay(
        &mut self,
        axis: Axis,
        deg: i32,
        delay_ms: u32,
    ) -> Result<(), ArmError<S::Error>> {
        let deg = clamp_angle(deg);
        let pulse_us = angle_to_pulse_us(deg);
        if self.config.debug {
            debug!("{}: {} deg (pulse: {} us)", axis.name(), deg, pulse_us);
        }

        let channel = self.config.channels.channel(axis);
        self.output
            .set_pulse_us(channel, pulse_us)
            .map_err(ArmError::Output)?;
        self.position.set(axis, deg);

        if delay_ms > 0 {
            self.delay.delay_ms(delay_ms);
        }
        Ok(())
    }

    /// Move `axis` by `delta_deg` from its last commanded angle
    pub fn move_by(&mut self, axis: Axis, delta_deg: i32) -> Result<(), ArmError<S::Error>> {
        self.move_by_with_delay(axis, delta_deg, self.config.settle_ms)
    }

    /// Move `axis` by `delta_deg`, then wait `delay_ms`
    ///
    /// The target is clamped like an absolute move.
    pub fn move_by_with_delay(
        &mut self,
        axis: Axis,
        delta_deg: i32,
        delay_ms: u32,
    ) -> Result<(), ArmError<S::Error>> {
        let current = self.position.get(axis) as i32;
        self.set_with_delay(axis, current.saturating_add(delta_deg), delay_ms)
    }

    /// Last commanded angle of `axis`
    pub fn position(&self, axis: Axis) -> u8 {
        self.position.get(axis)
    }

    /// Last commanded angle of every axis
    pub fn pose(&self) -> Pose {
        self.position
    }

    /// Configuration the controller was built with
    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// Give back the output and delay provider
    ///
    /// The chip keeps its last programmed state.
    pub fn release(self) -> (S, D) {
        (self.output, self.delay)
    }
}
