//! PCA9685 16-channel, 12-bit PWM controller (I2C)
//!
//! Every channel counts 4096 ticks per PWM period and switches its output
//! on at the `ON` tick and off at the `OFF` tick. The period is shared by
//! all channels and set through the prescaler on the 25 MHz internal
//! oscillator.
//!
//! # Register Protocol
//!
//! Each register is one byte, written as `[reg, value]` and read back with
//! a write of `[reg]` followed by a one-byte read (repeated start). Channel
//! `n` owns four registers starting at `LED0_ON_L + 4n`:
//!
//! | Offset | Register  | Content            |
//! |--------|-----------|--------------------|
//! | +0     | `ON_L`    | on tick, bits 0-7  |
//! | +1     | `ON_H`    | on tick, bits 8-11 |
//! | +2     | `OFF_L`   | off tick, bits 0-7 |
//! | +3     | `OFF_H`   | off tick, bits 8-11|
//!
//! # Frequency Changes
//!
//! `PRESCALE` only accepts writes while the oscillator is stopped, so the
//! sequence is: sleep, write prescale, restore mode, wait 5 ms for the
//! oscillator, restart.

use core::fmt;

use embedded_hal::delay::DelayNs;
use petarm_core::arm::{Channel, SERVO_PERIOD_US};
use petarm_core::traits::ServoOutput;
use petarm_hal::{I2cAddress, I2cBus};

/// PCA9685 register addresses
pub mod reg {
    /// Mode register 1
    pub const MODE1: u8 = 0x00;
    /// Channel 0 on tick, low byte
    pub const LED0_ON_L: u8 = 0x06;
    /// Channel 0 on tick, high nibble
    pub const LED0_ON_H: u8 = 0x07;
    /// Channel 0 off tick, low byte
    pub const LED0_OFF_L: u8 = 0x08;
    /// Channel 0 off tick, high nibble
    pub const LED0_OFF_H: u8 = 0x09;
    /// Oscillator prescaler
    pub const PRESCALE: u8 = 0xFE;

    /// Register stride between consecutive channels
    pub const CHANNEL_STRIDE: u8 = 4;
}

/// MODE1 bits
pub mod mode1 {
    /// Restart a PWM cycle after sleep
    pub const RESTART: u8 = 0x80;
    /// Low-power mode, oscillator off
    pub const SLEEP: u8 = 0x10;
}

/// Factory address with all address pins low
pub const DEFAULT_ADDRESS: I2cAddress = match I2cAddress::new(0x40) {
    Some(address) => address,
    None => panic!("0x40 is a 7-bit address"),
};

/// Internal oscillator frequency
pub const OSCILLATOR_HZ: f32 = 25_000_000.0;

/// Counter resolution per PWM period
pub const TICKS_PER_PERIOD: u32 = 4096;

/// Largest tick value the 12-bit counter holds
pub const MAX_TICK: u16 = 4095;

/// Smallest prescale the chip accepts
pub const PRESCALE_MIN: u8 = 3;

/// Largest prescale the chip accepts
pub const PRESCALE_MAX: u8 = 255;

/// Oscillator start-up time after leaving sleep
pub const OSCILLATOR_SETTLE_MS: u32 = 5;

/// Prescale value for a PWM frequency
///
/// `round(25 MHz / (4096 * freq)) - 1`, held to the chip's 3-255 range.
pub fn prescale_for(freq_hz: u16) -> u8 {
    let estimate = OSCILLATOR_HZ / TICKS_PER_PERIOD as f32 / freq_hz.max(1) as f32 - 1.0;
    // +0.5 then truncate rounds the (always positive) estimate
    let rounded = estimate + 0.5;
    rounded.clamp(PRESCALE_MIN as f32, PRESCALE_MAX as f32) as u8
}

/// Ticks covering `pulse_us` of a `period_us` PWM period (truncated)
pub fn pulse_to_ticks(pulse_us: u16, period_us: u32) -> u16 {
    let ticks = pulse_us as u32 * TICKS_PER_PERIOD / period_us.max(1);
    ticks.min(MAX_TICK as u32) as u16
}

/// `[ON_L, ON_H, OFF_L, OFF_H]` register addresses of `channel`
pub fn channel_registers(channel: Channel) -> [u8; 4] {
    let base = reg::CHANNEL_STRIDE * channel.get();
    [
        reg::LED0_ON_L + base,
        reg::LED0_ON_H + base,
        reg::LED0_OFF_L + base,
        reg::LED0_OFF_H + base,
    ]
}

/// PCA9685 communication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pca9685Error<E> {
    /// The bus transfer failed; chip state is undefined
    Bus(E),
}

impl<E: fmt::Display> fmt::Display for Pca9685Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "PCA9685 bus error: {e}"),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for Pca9685Error<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Bus(e) => Some(e),
        }
    }
}

/// PCA9685 driver
///
/// Owns the bus for the driver's lifetime. There is no teardown: dropping
/// the driver leaves the chip running with its last programmed outputs.
pub struct Pca9685<B> {
    bus: B,
    address: I2cAddress,
    debug: bool,
    period_us: u32,
}

impl<B: I2cBus> Pca9685<B> {
    /// Take over the chip at `address` and wake it
    ///
    /// Clears MODE1, which ends sleep and disables sub-addressing and
    /// all-call. Fails if the device does not acknowledge.
    pub fn new(bus: B, address: I2cAddress, debug: bool) -> Result<Self, Pca9685Error<B::Error>> {
        let mut pwm = Self {
            bus,
            address,
            debug,
            period_us: SERVO_PERIOD_US,
        };
        if debug {
            debug!("Resetting PCA9685 at {:#x}", address.get());
        }
        pwm.write_register(reg::MODE1, 0x00)?;
        Ok(pwm)
    }

    /// Write one register
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Pca9685Error<B::Error>> {
        self.bus
            .write(self.address, &[reg, value])
            .map_err(Pca9685Error::Bus)?;
        if self.debug {
            debug!("I2C: Write {:#x} to register {:#x}", value, reg);
        }
        Ok(())
    }

    /// Read one register
    pub fn read_register(&mut self, reg: u8) -> Result<u8, Pca9685Error<B::Error>> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Pca9685Error::Bus)?;
        if self.debug {
            debug!(
                "I2C: Device {:#x} returned {:#x} from reg {:#x}",
                self.address.get(),
                buf[0],
                reg
            );
        }
        Ok(buf[0])
    }

    /// Set the PWM frequency shared by all channels
    pub fn set_frequency<D: DelayNs>(
        &mut self,
        freq_hz: u16,
        delay: &mut D,
    ) -> Result<(), Pca9685Error<B::Error>> {
        let prescale = prescale_for(freq_hz);
        if self.debug {
            debug!("Setting PWM frequency to {} Hz (prescale {})", freq_hz, prescale);
        }

        let old_mode = self.read_register(reg::MODE1)?;
        let sleep_mode = (old_mode & !mode1::RESTART) | mode1::SLEEP;
        self.write_register(reg::MODE1, sleep_mode)?;
        self.write_register(reg::PRESCALE, prescale)?;
        self.write_register(reg::MODE1, old_mode)?;
        delay.delay_ms(OSCILLATOR_SETTLE_MS);
        self.write_register(reg::MODE1, old_mode | mode1::RESTART)?;

        self.period_us = 1_000_000 / freq_hz.max(1) as u32;
        Ok(())
    }

    /// Program `channel` to switch on at `on` and off at `off` (ticks 0-4095)
    pub fn set_channel_raw(
        &mut self,
        channel: Channel,
        on: u16,
        off: u16,
    ) -> Result<(), Pca9685Error<B::Error>> {
        let on = on.min(MAX_TICK);
        let off = off.min(MAX_TICK);
        let [on_l, on_h, off_l, off_h] = channel_registers(channel);

        self.write_register(on_l, (on & 0xFF) as u8)?;
        self.write_register(on_h, (on >> 8) as u8)?;
        self.write_register(off_l, (off & 0xFF) as u8)?;
        self.write_register(off_h, (off >> 8) as u8)?;

        if self.debug {
            debug!("channel: {}  LED_ON: {} LED_OFF: {}", channel.get(), on, off);
        }
        Ok(())
    }

    /// Drive `channel` with a pulse of `pulse_us` at the start of each period
    ///
    /// Assumes the frequency set by [`Self::set_frequency`] (50 Hz, 20 ms,
    /// until changed).
    pub fn set_pulse_us(
        &mut self,
        channel: Channel,
        pulse_us: u16,
    ) -> Result<(), Pca9685Error<B::Error>> {
        let off = pulse_to_ticks(pulse_us, self.period_us);
        self.set_channel_raw(channel, 0, off)
    }

    /// Device address on the bus
    pub fn address(&self) -> I2cAddress {
        self.address
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: I2cBus> ServoOutput for Pca9685<B> {
    type Error = Pca9685Error<B::Error>;

    fn set_frequency<D: DelayNs>(
        &mut self,
        freq_hz: u16,
        delay: &mut D,
    ) -> Result<(), Self::Error> {
        Pca9685::set_frequency(self, freq_hz, delay)
    }

    fn set_pulse_us(&mut self, channel: Channel, pulse_us: u16) -> Result<(), Self::Error> {
        Pca9685::set_pulse_us(self, channel, pulse_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petarm_core::{ArmConfig, ArmController, Axis};
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Write(u8, u8),
        Read(u8),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    /// Register-file model of the chip that logs every transfer
    struct FakeBus {
        regs: [u8; 256],
        ops: Vec<Op>,
        fail_after: Option<usize>,
    }

    impl FakeBus {
        fn new() -> Self {
            Self {
                regs: [0; 256],
                ops: Vec::new(),
                fail_after: None,
            }
        }

        fn check(&self, address: I2cAddress) -> Result<(), Nack> {
            assert_eq!(address, DEFAULT_ADDRESS);
            match self.fail_after {
                Some(n) if self.ops.len() >= n => Err(Nack),
                _ => Ok(()),
            }
        }

        fn writes(&self) -> Vec<(u8, u8)> {
            self.ops
                .iter()
                .filter_map(|op| match *op {
                    Op::Write(reg, value) => Some((reg, value)),
                    Op::Read(_) => None,
                })
                .collect()
        }
    }

    impl I2cBus for FakeBus {
        type Error = Nack;

        fn write(&mut self, address: I2cAddress, data: &[u8]) -> Result<(), Nack> {
            self.check(address)?;
            let [reg, value] = data else {
                panic!("register writes are two bytes, got {data:?}");
            };
            self.regs[*reg as usize] = *value;
            self.ops.push(Op::Write(*reg, *value));
            Ok(())
        }

        fn read(&mut self, _address: I2cAddress, _buf: &mut [u8]) -> Result<(), Nack> {
            panic!("driver reads registers with write_read");
        }

        fn write_read(
            &mut self,
            address: I2cAddress,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), Nack> {
            self.check(address)?;
            let [reg] = write_data else {
                panic!("register reads send one address byte, got {write_data:?}");
            };
            read_buf[0] = self.regs[*reg as usize];
            self.ops.push(Op::Read(*reg));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        calls_ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls_ms.push(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.calls_ms.push(ms);
        }
    }

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_new_clears_mode1() {
        let mut bus = FakeBus::new();
        bus.regs[reg::MODE1 as usize] = mode1::SLEEP;

        let pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();
        assert_eq!(pwm.address(), DEFAULT_ADDRESS);

        assert_eq!(bus.ops, vec![Op::Write(reg::MODE1, 0x00)]);
        assert_eq!(bus.regs[reg::MODE1 as usize], 0x00);
    }

    #[test]
    fn test_new_fails_without_ack() {
        let mut bus = FakeBus::new();
        bus.fail_after = Some(0);

        let result = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false);
        assert!(matches!(result, Err(Pca9685Error::Bus(Nack))));
    }

    #[test]
    fn test_prescale_for_50hz() {
        // 25e6 / (4096 * 50) - 1 = 121.07
        assert_eq!(prescale_for(50), 121);
        assert_eq!(prescale_for(60), 101);
    }

    #[test]
    fn test_prescale_limits() {
        assert_eq!(prescale_for(1526), PRESCALE_MIN);
        assert_eq!(prescale_for(24), 253);
        assert_eq!(prescale_for(1), PRESCALE_MAX);
        assert_eq!(prescale_for(0), PRESCALE_MAX);
        assert_eq!(prescale_for(u16::MAX), PRESCALE_MIN);
    }

    #[test]
    fn test_set_frequency_sequence() {
        let mut bus = FakeBus::new();
        let mut delay = RecordingDelay::default();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();
        // auto-increment and a stale restart flag, as left by another program
        pwm.write_register(reg::MODE1, 0xA1).unwrap();

        pwm.set_frequency(50, &mut delay).unwrap();
        drop(pwm);

        assert_eq!(
            &bus.ops[2..],
            &[
                Op::Read(reg::MODE1),
                Op::Write(reg::MODE1, 0x31),
                Op::Write(reg::PRESCALE, 121),
                Op::Write(reg::MODE1, 0xA1),
                Op::Write(reg::MODE1, 0xA1),
            ]
        );
        assert_eq!(delay.calls_ms, vec![OSCILLATOR_SETTLE_MS]);
    }

    #[test]
    fn test_set_frequency_from_reset_mode() {
        let mut bus = FakeBus::new();
        let mut delay = RecordingDelay::default();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        pwm.set_frequency(50, &mut delay).unwrap();
        drop(pwm);

        assert_eq!(
            bus.writes(),
            vec![
                (reg::MODE1, 0x00),
                (reg::MODE1, mode1::SLEEP),
                (reg::PRESCALE, 121),
                (reg::MODE1, 0x00),
                (reg::MODE1, mode1::RESTART),
            ]
        );
    }

    #[test]
    fn test_set_frequency_aborts_on_bus_error() {
        let mut bus = FakeBus::new();
        let mut delay = RecordingDelay::default();
        // init write, mode read, sleep write succeed
        bus.fail_after = Some(3);
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        assert_eq!(
            pwm.set_frequency(50, &mut delay),
            Err(Pca9685Error::Bus(Nack))
        );
        drop(pwm);

        assert!(delay.calls_ms.is_empty());
        assert_eq!(bus.regs[reg::PRESCALE as usize], 0);
    }

    #[test]
    fn test_channel_registers() {
        assert_eq!(channel_registers(ch(0)), [0x06, 0x07, 0x08, 0x09]);
        assert_eq!(channel_registers(ch(3)), [0x12, 0x13, 0x14, 0x15]);
        assert_eq!(channel_registers(ch(15)), [0x42, 0x43, 0x44, 0x45]);
    }

    #[test]
    fn test_set_channel_raw() {
        let mut bus = FakeBus::new();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        pwm.set_channel_raw(ch(3), 0x0102, 0x0133).unwrap();
        drop(pwm);

        assert_eq!(
            &bus.writes()[1..],
            &[(0x12, 0x02), (0x13, 0x01), (0x14, 0x33), (0x15, 0x01)]
        );
    }

    #[test]
    fn test_pulse_before_set_frequency_uses_servo_period() {
        let mut bus = FakeBus::new();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        pwm.set_pulse_us(ch(0), 1500).unwrap();
        drop(pwm);

        // 1500 us of a 20 ms period
        assert_eq!(&bus.writes()[1..], &[(0x06, 0), (0x07, 0), (0x08, 0x33), (0x09, 0x01)]);
    }

    #[test]
    fn test_set_channel_raw_clamps_to_12_bits() {
        let mut bus = FakeBus::new();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        pwm.set_channel_raw(ch(0), 0, 5000).unwrap();
        drop(pwm);

        assert_eq!(bus.regs[reg::LED0_OFF_L as usize], 0xFF);
        assert_eq!(bus.regs[reg::LED0_OFF_H as usize], 0x0F);
    }

    #[test]
    fn test_pulse_to_ticks_at_50hz() {
        assert_eq!(pulse_to_ticks(1500, 20_000), 307);
        assert_eq!(pulse_to_ticks(500, 20_000), 102);
        assert_eq!(pulse_to_ticks(2500, 20_000), 512);
        assert_eq!(pulse_to_ticks(0, 20_000), 0);
        assert_eq!(pulse_to_ticks(u16::MAX, 20_000), MAX_TICK);
    }

    #[test]
    fn test_set_pulse_us() {
        let mut bus = FakeBus::new();
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        pwm.set_pulse_us(ch(1), 1500).unwrap();
        drop(pwm);

        // on = 0, off = 307 = 0x133
        assert_eq!(
            &bus.writes()[1..],
            &[(0x0A, 0x00), (0x0B, 0x00), (0x0C, 0x33), (0x0D, 0x01)]
        );
    }

    #[test]
    fn test_bus_error_stops_channel_update() {
        let mut bus = FakeBus::new();
        bus.fail_after = Some(2);
        let mut pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();

        assert_eq!(
            pwm.set_pulse_us(ch(0), 1500),
            Err(Pca9685Error::Bus(Nack))
        );
        drop(pwm);

        assert_eq!(bus.ops.len(), 2);
    }

    #[test]
    fn test_debug_does_not_change_traffic() {
        let mut quiet = FakeBus::new();
        let mut chatty = FakeBus::new();
        let mut delay = RecordingDelay::default();

        for (bus, debug) in [(&mut quiet, false), (&mut chatty, true)] {
            let mut pwm = Pca9685::new(bus, DEFAULT_ADDRESS, debug).unwrap();
            pwm.set_frequency(50, &mut delay).unwrap();
            pwm.set_pulse_us(ch(2), 2500).unwrap();
        }

        assert_eq!(quiet.ops, chatty.ops);
    }

    #[test]
    fn test_controller_over_pca9685() {
        let mut bus = FakeBus::new();
        let pwm = Pca9685::new(&mut bus, DEFAULT_ADDRESS, false).unwrap();
        let config = ArmConfig::default().with_settle_ms(0);

        let mut arm = ArmController::new(pwm, RecordingDelay::default(), config).unwrap();
        arm.set(Axis::X, 90).unwrap();
        drop(arm);

        assert_eq!(bus.regs[reg::PRESCALE as usize], 121);
        let off = |channel: u8| {
            let [_, _, lo, hi] = channel_registers(ch(channel));
            u16::from(bus.regs[lo as usize]) | u16::from(bus.regs[hi as usize]) << 8
        };
        // pulse(100) = 1611 us, pulse(0) = 500 us, 1500 us for x and rotate
        assert_eq!(off(0), 329);
        assert_eq!(off(1), 307);
        assert_eq!(off(2), 102);
        assert_eq!(off(3), 307);
    }

    proptest! {
        #[test]
        fn ticks_never_exceed_counter(pulse in any::<u16>()) {
            prop_assert!(pulse_to_ticks(pulse, 20_000) <= MAX_TICK);
        }

        #[test]
        fn channel_registers_are_disjoint(a in 0u8..16, b in 0u8..16) {
            prop_assume!(a != b);
            let ra = channel_registers(ch(a));
            let rb = channel_registers(ch(b));
            prop_assert!(ra.iter().all(|r| !rb.contains(r)));
        }
    }
}
