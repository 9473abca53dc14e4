//! AS5600 register map, bit masks and configuration options.
//!
//! 16-bit values span an `_H`/`_L` register pair; the driver always
//! addresses the `_H` register and reads or writes both bytes in one
//! transaction. The burn (OTP) register is deliberately absent.

use crate::bits::{field_value, Field};

/// Default I2C address of the AS5600.
pub const DEFAULT_ADDRESS: u8 = 0x36;

// ---------------------------------------------------------------------------
// Configuration registers
// ---------------------------------------------------------------------------

/// Number of permanent angle programming cycles used (2 bits).
pub const ZMCO: u8 = 0x00;
/// Start position, 12 bits.
pub const ZPOS_H: u8 = 0x01;
/// Stop position, 12 bits.
pub const MPOS_H: u8 = 0x03;
/// Maximum angle, 12 bits.
pub const MANG_H: u8 = 0x05;
/// Configuration, 14 bits across two bytes.
pub const CONF_H: u8 = 0x07;
pub const CONF_L: u8 = 0x08;

// ---------------------------------------------------------------------------
// Output registers
// ---------------------------------------------------------------------------

/// Unfiltered angle, 12 bits.
pub const RAW_ANGLE_H: u8 = 0x0C;
/// Filtered (and scaled) angle, 12 bits.
pub const ANGLE_H: u8 = 0x0E;

// ---------------------------------------------------------------------------
// Status registers
// ---------------------------------------------------------------------------

pub const STATUS: u8 = 0x0B;
/// Automatic gain control.
pub const AGC: u8 = 0x1A;
/// CORDIC magnitude, 12 bits.
pub const MAGNITUDE_H: u8 = 0x1B;

// ---------------------------------------------------------------------------
// Masks and limits
// ---------------------------------------------------------------------------

/// Largest value accepted by the 12-bit position registers.
pub const MAX_POSITION: u16 = 0x0FFF;
/// Largest value accepted by the 14-bit configuration register.
pub const MAX_CONFIGURATION: u16 = 0x3FFF;

// CONF_L
pub const POWER_MODE_MASK: u8 = 0x03;
pub const HYSTERESIS_MASK: u8 = 0x0C;
pub const OUTPUT_MODE_MASK: u8 = 0x30;
pub const PWM_FREQUENCY_MASK: u8 = 0xC0;

// CONF_H
pub const SLOW_FILTER_MASK: u8 = 0x03;
pub const FAST_FILTER_TH_MASK: u8 = 0x1C;
pub const WATCHDOG_MASK: u8 = 0x20;

// STATUS
pub const MAGNET_STRONG: u8 = 0x08;
pub const MAGNET_WEAK: u8 = 0x10;
pub const MAGNET_DETECTED: u8 = 0x20;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Power mode. Supply current and polling time in the comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// 6.5 mA, always on.
    Nom = 0x00,
    /// 3.5 mA, 5 ms.
    Lpm1 = 0x01,
    /// 1.8 mA, 20 ms.
    Lpm2 = 0x02,
    /// 1.5 mA, 100 ms.
    Lpm3 = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hysteresis {
    Off = 0x00 << 2,
    Lsb1 = 0x01 << 2,
    Lsb2 = 0x02 << 2,
    Lsb3 = 0x03 << 2,
}

/// Output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputMode {
    /// Analog, 0% to 100% of VDD.
    AnalogFullRange = 0x00 << 4,
    /// Analog, 10% to 90% of VDD.
    AnalogReducedRange = 0x01 << 4,
    DigitalPwm = 0x02 << 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PwmFrequency {
    Hz115 = 0x00 << 6,
    Hz230 = 0x01 << 6,
    Hz460 = 0x02 << 6,
    Hz920 = 0x03 << 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SlowFilter {
    X16 = 0x00,
    X8 = 0x01,
    X4 = 0x02,
    X2 = 0x03,
}

/// Fast filter threshold, in LSBs. The datasheet order is not monotonic:
/// the last code selects 10 LSBs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FastFilterThreshold {
    SlowFilterOnly = 0x00 << 2,
    Lsb6 = 0x01 << 2,
    Lsb7 = 0x02 << 2,
    Lsb9 = 0x03 << 2,
    Lsb18 = 0x04 << 2,
    Lsb21 = 0x05 << 2,
    Lsb24 = 0x06 << 2,
    Lsb10 = 0x07 << 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Watchdog {
    Off = 0x00 << 5,
    On = 0x01 << 5,
}

field_value!(PowerMode, u8, Field::new(CONF_L, POWER_MODE_MASK), [Nom, Lpm1, Lpm2, Lpm3]);
field_value!(Hysteresis, u8, Field::new(CONF_L, HYSTERESIS_MASK), [Off, Lsb1, Lsb2, Lsb3]);
field_value!(
    OutputMode,
    u8,
    Field::new(CONF_L, OUTPUT_MODE_MASK),
    [AnalogFullRange, AnalogReducedRange, DigitalPwm]
);
field_value!(PwmFrequency, u8, Field::new(CONF_L, PWM_FREQUENCY_MASK), [Hz115, Hz230, Hz460, Hz920]);
field_value!(SlowFilter, u8, Field::new(CONF_H, SLOW_FILTER_MASK), [X16, X8, X4, X2]);
field_value!(
    FastFilterThreshold,
    u8,
    Field::new(CONF_H, FAST_FILTER_TH_MASK),
    [SlowFilterOnly, Lsb6, Lsb7, Lsb9, Lsb18, Lsb21, Lsb24, Lsb10]
);
field_value!(Watchdog, u8, Field::new(CONF_H, WATCHDOG_MASK), [Off, On]);

/// Unit for [`As5600::real_angle`](super::As5600::real_angle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AngleUnit {
    Degrees,
    #[default]
    Radians,
}

/// Rotation direction that counts upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RotationDirection {
    #[default]
    Clockwise,
    /// Angle reads are reflected: `(0x0FFF - raw) & 0x0FFF`.
    CounterClockwise,
}
