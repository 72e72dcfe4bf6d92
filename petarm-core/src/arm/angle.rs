//! Angle and pulse-width math for standard hobby servos

/// Lowest angle a servo may be commanded to
pub const MIN_ANGLE_DEG: u8 = 0;

/// Highest angle a servo may be commanded to
pub const MAX_ANGLE_DEG: u8 = 180;

/// Pulse width at [`MIN_ANGLE_DEG`]
pub const MIN_PULSE_US: u16 = 500;

/// Pulse width at [`MAX_ANGLE_DEG`]
pub const MAX_PULSE_US: u16 = 2500;

/// PWM frequency expected by hobby servos
pub const SERVO_FREQUENCY_HZ: u16 = 50;

/// PWM period at [`SERVO_FREQUENCY_HZ`]
pub const SERVO_PERIOD_US: u32 = 1_000_000 / SERVO_FREQUENCY_HZ as u32;

/// Clamp a requested angle into the servo's safe range
///
/// Out-of-range requests are corrected, never rejected.
pub fn clamp_angle(deg: i32) -> u8 {
    deg.clamp(MIN_ANGLE_DEG as i32, MAX_ANGLE_DEG as i32) as u8
}

/// Pulse width in microseconds for an angle
///
/// Linear from 500 µs at 0° to 2500 µs at 180° (about 11.1 µs per degree),
/// truncated to whole microseconds.
pub fn angle_to_pulse_us(deg: u8) -> u16 {
    let deg = deg.min(MAX_ANGLE_DEG) as u32;
    let span = (MAX_PULSE_US - MIN_PULSE_US) as u32;
    MIN_PULSE_US + (deg * span / MAX_ANGLE_DEG as u32) as u16
}
