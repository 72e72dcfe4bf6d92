//! Hardware abstraction traits
//!
//! These traits define the interface between the arm logic and
//! chip-specific PWM drivers.

pub mod servo;

pub use servo::ServoOutput;
