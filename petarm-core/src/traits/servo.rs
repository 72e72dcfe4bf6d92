//! Servo PWM output trait

use embedded_hal::delay::DelayNs;

use crate::arm::Channel;

/// Multi-channel PWM output that can drive hobby servos
///
/// Implemented by PWM controller drivers. All channels share one
/// frequency; each channel carries its own pulse width.
pub trait ServoOutput {
    /// Error type for output operations (normally the bus error)
    type Error;

    /// Program the chip-wide PWM frequency
    ///
    /// `delay` is used for any oscillator settling the chip requires.
    fn set_frequency<D: DelayNs>(&mut self, freq_hz: u16, delay: &mut D)
        -> Result<(), Self::Error>;

    /// Drive `channel` with a pulse of `pulse_us` microseconds per period
    fn set_pulse_us(&mut self, channel: Channel, pulse_us: u16) -> Result<(), Self::Error>;
}

impl<S: ServoOutput> ServoOutput for &mut S {
    type Error = S::Error;

    fn set_frequency<D: DelayNs>(
        &mut self,
        freq_hz: u16,
        delay: &mut D,
    ) -> Result<(), Self::Error> {
        (**self).set_frequency(freq_hz, delay)
    }

    fn set_pulse_us(&mut self, channel: Channel, pulse_us: u16) -> Result<(), Self::Error> {
        (**self).set_pulse_us(channel, pulse_us)
    }
}
