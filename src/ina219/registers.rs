//! INA219 register map, bit masks and configuration options.
//!
//! Every register is 16 bits wide, transmitted high byte first.

use crate::bits::{field_value, Field};

/// Default I2C address of the INA219 (A0 and A1 tied to GND).
pub const DEFAULT_ADDRESS: u8 = 0x40;

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

pub const CONF: u8 = 0x00;
pub const SHUNT_VOLTAGE: u8 = 0x01;
pub const BUS_VOLTAGE: u8 = 0x02;
pub const POWER: u8 = 0x03;
pub const CURRENT: u8 = 0x04;
pub const CALIBRATION: u8 = 0x05;

// ---------------------------------------------------------------------------
// Masks
// ---------------------------------------------------------------------------

// CONF
pub const RESET_MASK: u16 = 0x8000;
pub const BUS_VOLTAGE_RANGE_MASK: u16 = 0x2000;
pub const PGA_MASK: u16 = 0x1800;
pub const BUS_ADC_RESOLUTION_MASK: u16 = 0x0780;
pub const SHUNT_ADC_RESOLUTION_MASK: u16 = 0x0078;
pub const OPERATING_MODE_MASK: u16 = 0x0007;

// BUS_VOLTAGE flag bits, below the 13-bit reading
pub const BUS_REGISTER_FLAGS_MASK: u16 = 0x0003;
pub const BUS_REGISTER_CNVR_MASK: u16 = 0x0002;
pub const BUS_REGISTER_OVF_MASK: u16 = 0x0001;
/// Bits to shift out of the bus voltage register to reach the reading.
pub const BUS_REGISTER_SHIFT: u16 = 3;

// ---------------------------------------------------------------------------
// Fixed scale factors
// ---------------------------------------------------------------------------

/// Bus voltage LSB, volts.
pub const BUS_VOLTAGE_LSB: f32 = 4e-3;
/// Shunt voltage LSB, volts.
pub const SHUNT_VOLTAGE_LSB: f32 = 1e-5;
/// Reported by [`Ina219::bus_voltage_v`](super::Ina219::bus_voltage_v)
/// when the math overflow flag is set.
pub const BUS_VOLTAGE_OVERFLOW: f32 = -100.0;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Bus voltage full-scale range. Power-on default is 32 V.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum BusVoltageRange {
    Fsr16V = 0x00 << 13,
    Fsr32V = 0x01 << 13,
}

/// Shunt PGA gain and range. Power-on default is /8, ±320 mV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Pga {
    /// /1, ±40 mV
    Mv40 = 0x00 << 11,
    /// /2, ±80 mV
    Mv80 = 0x01 << 11,
    /// /4, ±160 mV
    Mv160 = 0x02 << 11,
    /// /8, ±320 mV
    Mv320 = 0x03 << 11,
}

/// Bus ADC resolution or averaging. Conversion time in the comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum BusAdcResolution {
    /// 84 µs
    Bits9 = 0x00 << 7,
    /// 148 µs
    Bits10 = 0x01 << 7,
    /// 276 µs
    Bits11 = 0x02 << 7,
    /// 532 µs, power-on default
    Bits12 = 0x03 << 7,
    /// 1.06 ms
    Samples2 = 0x09 << 7,
    /// 2.13 ms
    Samples4 = 0x0A << 7,
    /// 4.26 ms
    Samples8 = 0x0B << 7,
    /// 8.51 ms
    Samples16 = 0x0C << 7,
    /// 17.02 ms
    Samples32 = 0x0D << 7,
    /// 34.05 ms
    Samples64 = 0x0E << 7,
    /// 68.10 ms
    Samples128 = 0x0F << 7,
}

/// Shunt ADC resolution or averaging. Same timings as [`BusAdcResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ShuntAdcResolution {
    Bits9 = 0x00 << 3,
    Bits10 = 0x01 << 3,
    Bits11 = 0x02 << 3,
    Bits12 = 0x03 << 3,
    Samples2 = 0x09 << 3,
    Samples4 = 0x0A << 3,
    Samples8 = 0x0B << 3,
    Samples16 = 0x0C << 3,
    Samples32 = 0x0D << 3,
    Samples64 = 0x0E << 3,
    Samples128 = 0x0F << 3,
}

/// Continuous, triggered or power-down. Power-on default is both continuous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OperatingMode {
    PowerDown = 0x00,
    ShuntVoltageTriggered = 0x01,
    BusVoltageTriggered = 0x02,
    BothTriggered = 0x03,
    AdcOff = 0x04,
    ShuntVoltageContinuous = 0x05,
    BusVoltageContinuous = 0x06,
    BothContinuous = 0x07,
}

field_value!(BusVoltageRange, u16, Field::new(CONF, BUS_VOLTAGE_RANGE_MASK), [Fsr16V, Fsr32V]);
field_value!(Pga, u16, Field::new(CONF, PGA_MASK), [Mv40, Mv80, Mv160, Mv320]);
field_value!(
    BusAdcResolution,
    u16,
    Field::new(CONF, BUS_ADC_RESOLUTION_MASK),
    [Bits9, Bits10, Bits11, Bits12, Samples2, Samples4, Samples8, Samples16, Samples32, Samples64, Samples128]
);
field_value!(
    ShuntAdcResolution,
    u16,
    Field::new(CONF, SHUNT_ADC_RESOLUTION_MASK),
    [Bits9, Bits10, Bits11, Bits12, Samples2, Samples4, Samples8, Samples16, Samples32, Samples64, Samples128]
);
field_value!(
    OperatingMode,
    u16,
    Field::new(CONF, OPERATING_MODE_MASK),
    [
        PowerDown,
        ShuntVoltageTriggered,
        BusVoltageTriggered,
        BothTriggered,
        AdcOff,
        ShuntVoltageContinuous,
        BusVoltageContinuous,
        BothContinuous,
    ]
);
