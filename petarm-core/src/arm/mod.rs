//! Named-axis servo control
//!
//! [`ArmController`] is the only component that talks to the PWM output.
//! Everything it sends to hardware passes through [`clamp_angle`].

mod angle;
mod axis;
mod controller;
mod pose;

pub use angle::{
    angle_to_pulse_us, clamp_angle, MAX_ANGLE_DEG, MAX_PULSE_US, MIN_ANGLE_DEG, MIN_PULSE_US,
    SERVO_FREQUENCY_HZ, SERVO_PERIOD_US,
};
pub use axis::{Axis, Channel, ChannelAssignment, ChannelMap, DuplicateChannel, InvalidChannel};
pub use controller::{ArmController, ArmError, DEFAULT_SETTLE_MS};
pub use pose::Pose;
