//! Long-running tasks
//!
//! The arm task runs on its own OS thread because every controller call
//! blocks for the servo settle delay.

pub mod arm;

pub use arm::spawn_arm_task;
