//! Driver for the AS5600 12-bit magnetic rotary position sensor.
//!
//! [`As5600`] wraps the register transport with position validation,
//! direction correction and typed configuration options.
//!
//! # Error reporting
//!
//! Setters return [`DeviceError`]. Getters do not: a failed read is reported
//! as a zero register value, so callers that care about bus health should
//! check [`As5600::is_connected`] or use a setter's result.

pub mod registers;

use core::f32::consts::TAU;

use embassy_time::Duration;

use crate::bits::FieldValue;
use crate::device::{I2cMemory, RegisterDevice, DEFAULT_RESPONSE_TIMEOUT};
use crate::error::DeviceError;
use registers::*;
pub use registers::{
    AngleUnit, FastFilterThreshold, Hysteresis, OutputMode, PowerMode, PwmFrequency,
    RotationDirection, SlowFilter, Watchdog,
};

const ADC_TO_DEGREES: f32 = 360.0 / 4096.0;
const ADC_TO_RADIANS: f32 = TAU / 4096.0;

/// Magnet status check.
///
/// The status byte must equal `flag` exactly; a byte carrying several flags
/// at once matches none of them.
fn status_flag_set(status: u8, flag: u8) -> bool {
    status == flag
}

/// Reflect a 12-bit angle for counter-clockwise counting.
fn reflect(raw: u16) -> u16 {
    MAX_POSITION.wrapping_sub(raw) & MAX_POSITION
}

/// AS5600 magnetic encoder.
///
/// # Example
///
/// ```no_run
/// use sensor_drivers::as5600::{As5600, AngleUnit, RotationDirection};
///
/// # fn example(i2c: impl embedded_hal::i2c::I2c) {
/// let mut encoder = As5600::new(i2c, RotationDirection::Clockwise);
/// let degrees = encoder.real_angle(AngleUnit::Degrees);
/// # }
/// ```
pub struct As5600<BUS> {
    device: RegisterDevice<BUS>,
    direction: RotationDirection,
}

impl<BUS> As5600<BUS>
where
    BUS: I2cMemory,
{
    /// Create a driver at [`DEFAULT_ADDRESS`] with the default response timeout.
    pub fn new(bus: BUS, direction: RotationDirection) -> Self {
        Self::with_address(bus, DEFAULT_ADDRESS, direction, DEFAULT_RESPONSE_TIMEOUT)
    }

    /// Create a driver with every construction parameter explicit.
    ///
    /// # Arguments
    /// * `bus`: bus handle
    /// * `address`: 7-bit I2C device address
    /// * `direction`: rotation direction that counts upward
    /// * `response_timeout`: bound on each transaction
    pub fn with_address(
        bus: BUS,
        address: u8,
        direction: RotationDirection,
        response_timeout: Duration,
    ) -> Self {
        Self {
            device: RegisterDevice::new(bus, address, response_timeout),
            direction,
        }
    }

    pub fn direction(&self) -> RotationDirection {
        self.direction
    }

    pub fn address(&self) -> u8 {
        self.device.address()
    }

    pub fn response_timeout(&self) -> Duration {
        self.device.response_timeout()
    }

    pub fn is_connected(&mut self) -> bool {
        self.device.is_connected()
    }

    /// Give the bus handle back.
    pub fn release(self) -> BUS {
        self.device.release()
    }

    // -----------------------------------------------------------------------
    // Angle
    // -----------------------------------------------------------------------

    fn read_angle_register(&mut self, register: u8) -> u16 {
        let raw = self.device.read_or_zero(register);
        match self.direction {
            RotationDirection::Clockwise => raw,
            RotationDirection::CounterClockwise => reflect(raw),
        }
    }

    /// Unfiltered position in ADC counts, direction-corrected.
    pub fn raw_angle(&mut self) -> u16 {
        self.read_angle_register(RAW_ANGLE_H)
    }

    /// Filtered position in ADC counts, direction-corrected.
    pub fn angle(&mut self) -> u16 {
        self.read_angle_register(ANGLE_H)
    }

    /// Filtered position converted to `unit`.
    pub fn real_angle(&mut self, unit: AngleUnit) -> f32 {
        let angle = self.angle() as f32;
        match unit {
            AngleUnit::Degrees => angle * ADC_TO_DEGREES,
            AngleUnit::Radians => angle * ADC_TO_RADIANS,
        }
    }

    // -----------------------------------------------------------------------
    // Reduced angle range
    // -----------------------------------------------------------------------

    fn write_position(&mut self, register: u8, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        if value > MAX_POSITION {
            return Err(DeviceError::OutOfRange {
                value,
                max: MAX_POSITION,
            });
        }
        self.device.write_u16(register, value)
    }

    /// Set the start position.
    ///
    /// # Errors
    /// * [`DeviceError::OutOfRange`] if `value > 0x0FFF`; nothing is written
    /// * [`DeviceError::I2c`] on communication failure
    pub fn set_z_position(&mut self, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        self.write_position(ZPOS_H, value)
    }

    pub fn z_position(&mut self) -> u16 {
        self.device.read_or_zero(ZPOS_H)
    }

    /// Set the stop position. Same validation as [`set_z_position`](Self::set_z_position).
    pub fn set_m_position(&mut self, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        self.write_position(MPOS_H, value)
    }

    pub fn m_position(&mut self) -> u16 {
        self.device.read_or_zero(MPOS_H)
    }

    /// Set the maximum angle. Same validation as [`set_z_position`](Self::set_z_position).
    pub fn set_max_angle(&mut self, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        self.write_position(MANG_H, value)
    }

    pub fn max_angle(&mut self) -> u16 {
        self.device.read_or_zero(MANG_H)
    }

    // -----------------------------------------------------------------------
    // Magnet detection
    // -----------------------------------------------------------------------

    pub fn is_magnet_detected(&mut self) -> bool {
        status_flag_set(self.status(), MAGNET_DETECTED)
    }

    /// Magnet too close.
    pub fn is_magnet_strong(&mut self) -> bool {
        status_flag_set(self.status(), MAGNET_STRONG)
    }

    /// Magnet too far away.
    pub fn is_magnet_weak(&mut self) -> bool {
        status_flag_set(self.status(), MAGNET_WEAK)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Overwrite the whole configuration word.
    ///
    /// # Errors
    /// * [`DeviceError::OutOfRange`] if `value > 0x3FFF`; nothing is written
    /// * [`DeviceError::I2c`] on communication failure
    pub fn set_configuration(&mut self, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        if value > MAX_CONFIGURATION {
            return Err(DeviceError::OutOfRange {
                value,
                max: MAX_CONFIGURATION,
            });
        }
        self.device.write_u16(CONF_H, value)
    }

    pub fn configuration(&mut self) -> u16 {
        self.device.read_or_zero(CONF_H)
    }

    fn option<T: FieldValue<u8>>(&mut self) -> Option<T> {
        self.device.option::<u8, T>()
    }

    fn set_option<T: FieldValue<u8>>(&mut self, option: T) -> Result<(), DeviceError<BUS::Error>> {
        self.device.set_option::<u8, T>(option)
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(mode)
    }

    pub fn power_mode(&mut self) -> Option<PowerMode> {
        self.option()
    }

    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(hysteresis)
    }

    pub fn hysteresis(&mut self) -> Option<Hysteresis> {
        self.option()
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(mode)
    }

    /// `None` if the output stage bits hold the reserved code `0b11`.
    pub fn output_mode(&mut self) -> Option<OutputMode> {
        self.option()
    }

    pub fn set_pwm_frequency(&mut self, frequency: PwmFrequency) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(frequency)
    }

    pub fn pwm_frequency(&mut self) -> Option<PwmFrequency> {
        self.option()
    }

    pub fn set_slow_filter(&mut self, filter: SlowFilter) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(filter)
    }

    pub fn slow_filter(&mut self) -> Option<SlowFilter> {
        self.option()
    }

    pub fn set_fast_filter_threshold(
        &mut self,
        threshold: FastFilterThreshold,
    ) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(threshold)
    }

    pub fn fast_filter_threshold(&mut self) -> Option<FastFilterThreshold> {
        self.option()
    }

    pub fn set_watchdog(&mut self, watchdog: Watchdog) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(watchdog)
    }

    pub fn watchdog(&mut self) -> Option<Watchdog> {
        self.option()
    }

    // -----------------------------------------------------------------------
    // Miscellaneous registers
    // -----------------------------------------------------------------------

    /// How many times the angle has been burned into OTP.
    pub fn zmco(&mut self) -> u8 {
        self.device.read_or_zero(ZMCO)
    }

    pub fn status(&mut self) -> u8 {
        self.device.read_or_zero(STATUS)
    }

    pub fn agc(&mut self) -> u8 {
        self.device.read_or_zero(AGC)
    }

    pub fn magnitude(&mut self) -> u16 {
        self.device.read_or_zero(MAGNITUDE_H)
    }
}
