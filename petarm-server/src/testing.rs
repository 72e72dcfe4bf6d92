//! Test doubles for running a real controller without hardware

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use petarm_core::traits::ServoOutput;
use petarm_core::{ArmConfig, ArmController, Channel};

/// Error returned by [`SharedServo`] once broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusDown;

impl fmt::Display for BusDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bus down")
    }
}

/// Servo output whose log and failure switch stay reachable from the test
/// after the controller has moved to the worker thread
#[derive(Debug, Clone, Default)]
pub struct SharedServo {
    pub pulses: Arc<Mutex<Vec<(Channel, u16)>>>,
    pub broken: Arc<AtomicBool>,
}

impl SharedServo {
    pub fn pulses(&self) -> Vec<(Channel, u16)> {
        self.pulses.lock().unwrap().clone()
    }

    pub fn break_bus(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl ServoOutput for SharedServo {
    type Error = BusDown;

    fn set_frequency<D: DelayNs>(&mut self, _freq_hz: u16, _delay: &mut D) -> Result<(), BusDown> {
        Ok(())
    }

    fn set_pulse_us(&mut self, channel: Channel, pulse_us: u16) -> Result<(), BusDown> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(BusDown);
        }
        self.pulses.lock().unwrap().push((channel, pulse_us));
        Ok(())
    }
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Controller at the home pose with no settle delay
pub fn test_arm(servo: &SharedServo) -> ArmController<SharedServo, NoDelay> {
    let config = ArmConfig::default().with_settle_ms(0);
    ArmController::new(servo.clone(), NoDelay, config).unwrap()
}
