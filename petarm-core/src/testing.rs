//! Test doubles for the output and delay seams

use embedded_hal::delay::DelayNs;

use crate::arm::Channel;
use crate::traits::ServoOutput;

/// Error returned by [`FakeServo`] once its fault point is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFault;

/// Records every frequency and pulse command
#[derive(Debug, Default)]
pub struct FakeServo {
    pub frequency_hz: Option<u16>,
    pub pulses: Vec<(Channel, u16)>,
    /// Fail pulse commands once this many have been accepted
    pub fail_after: Option<usize>,
}

impl ServoOutput for FakeServo {
    type Error = OutputFault;

    fn set_frequency<D: DelayNs>(
        &mut self,
        freq_hz: u16,
        _delay: &mut D,
    ) -> Result<(), Self::Error> {
        self.frequency_hz = Some(freq_hz);
        Ok(())
    }

    fn set_pulse_us(&mut self, channel: Channel, pulse_us: u16) -> Result<(), Self::Error> {
        if self.fail_after.is_some_and(|n| self.pulses.len() >= n) {
            return Err(OutputFault);
        }
        self.pulses.push((channel, pulse_us));
        Ok(())
    }
}

/// Records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub calls_ms: Vec<u32>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls_ms.push(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.calls_ms.push(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls_ms.push(ms);
    }
}
