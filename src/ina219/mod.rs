//! Driver for the INA219 bidirectional current and power monitor.
//!
//! [`Ina219`] keeps the shunt parameters it was calibrated with and rewrites
//! the calibration register before every current or power read, so a device
//! that lost its calibration (brown-out, reset) still reports scaled values.
//!
//! Bus and shunt voltage use the fixed LSBs of the datasheet (4 mV and
//! 10 µV). Current and power use the LSBs derived in [`Calibration`].

pub mod registers;

use embassy_time::Duration;

use crate::bits::FieldValue;
use crate::device::{I2cMemory, RegisterDevice, DEFAULT_RESPONSE_TIMEOUT};
use crate::error::DeviceError;
use registers::*;
pub use registers::{
    BusAdcResolution, BusVoltageRange, OperatingMode, Pga, ShuntAdcResolution,
};

/// Full-scale count of the current register.
const CURRENT_FULL_SCALE: f32 = 32768.0;
/// Fixed scaling constant of the calibration equation.
const CALIBRATION_SCALE: f32 = 0.04096;
/// Power LSB as a multiple of the current LSB.
const POWER_LSB_FACTOR: f32 = 20.0;

const MILLI: f32 = 1e3;
const MICRO: f32 = 1e6;

/// Shunt parameters and the scale factors derived from them.
///
/// ```
/// use sensor_drivers::ina219::Calibration;
///
/// let cal = Calibration::new(3.2, 0.1);
/// assert_eq!(cal.register(), 4194);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    max_expected_current: f32,
    shunt_resistor: f32,
    current_lsb: f32,
    power_lsb: f32,
    register: u16,
}

impl Calibration {
    /// # Arguments
    /// * `max_expected_current`: amperes
    /// * `shunt_resistor`: ohms
    pub fn new(max_expected_current: f32, shunt_resistor: f32) -> Self {
        let current_lsb = max_expected_current / CURRENT_FULL_SCALE;
        let power_lsb = POWER_LSB_FACTOR * current_lsb;
        // `as` saturates, so degenerate parameters clamp instead of wrapping.
        let register = libm::roundf(CALIBRATION_SCALE / (current_lsb * shunt_resistor)) as u16;

        Self {
            max_expected_current,
            shunt_resistor,
            current_lsb,
            power_lsb,
            register,
        }
    }

    pub fn max_expected_current(&self) -> f32 {
        self.max_expected_current
    }

    pub fn shunt_resistor(&self) -> f32 {
        self.shunt_resistor
    }

    /// Amperes per count of the current register.
    pub fn current_lsb(&self) -> f32 {
        self.current_lsb
    }

    /// Watts per count of the power register.
    pub fn power_lsb(&self) -> f32 {
        self.power_lsb
    }

    /// Value written to the calibration register.
    pub fn register(&self) -> u16 {
        self.register
    }
}

/// INA219 current and power monitor.
///
/// # Example
///
/// ```no_run
/// use sensor_drivers::ina219::Ina219;
///
/// # fn example(i2c: impl embedded_hal::i2c::I2c) {
/// // 3.2 A full scale across a 0.1 Ω shunt.
/// let mut monitor = Ina219::new(i2c, 3.2, 0.1);
/// let amps = monitor.current_a();
/// let volts = monitor.bus_voltage_v();
/// # }
/// ```
pub struct Ina219<BUS> {
    device: RegisterDevice<BUS>,
    calibration: Calibration,
}

impl<BUS> Ina219<BUS>
where
    BUS: I2cMemory,
{
    /// Create a driver at [`DEFAULT_ADDRESS`] with the default response
    /// timeout, and calibrate the device.
    pub fn new(bus: BUS, max_expected_current: f32, shunt_resistor: f32) -> Self {
        Self::with_address(
            bus,
            max_expected_current,
            shunt_resistor,
            DEFAULT_ADDRESS,
            DEFAULT_RESPONSE_TIMEOUT,
        )
    }

    /// Create a driver with every construction parameter explicit, and
    /// calibrate the device.
    ///
    /// A failed calibration write is not reported here; the next current or
    /// power read calibrates again.
    pub fn with_address(
        bus: BUS,
        max_expected_current: f32,
        shunt_resistor: f32,
        address: u8,
        response_timeout: Duration,
    ) -> Self {
        let mut ina = Self {
            device: RegisterDevice::new(bus, address, response_timeout),
            calibration: Calibration::new(max_expected_current, shunt_resistor),
        };
        ina.write_calibration();
        ina
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
    // Calibration
    // -----------------------------------------------------------------------

    /// Store new shunt parameters and write the calibration register.
    ///
    /// The write is fire-and-forget: a bus failure is logged (with the
    /// `defmt` feature) and otherwise ignored.
    pub fn calibrate_sensor(&mut self, max_expected_current: f32, shunt_resistor: f32) {
        self.calibration = Calibration::new(max_expected_current, shunt_resistor);
        self.write_calibration();
    }

    fn write_calibration(&mut self) {
        let value = self.calibration.register();
        if self.device.write_u16(CALIBRATION, value).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "calibration write to {=u8:#04x} failed",
                self.device.address()
            );
        }
    }

    /// Rewrite the calibration register from the stored parameters.
    fn recalibrate(&mut self) {
        let Calibration {
            max_expected_current,
            shunt_resistor,
            ..
        } = self.calibration;
        self.calibrate_sensor(max_expected_current, shunt_resistor);
    }

    /// Parameters and scale factors currently in use.
    pub fn calibration_state(&self) -> Calibration {
        self.calibration
    }

    /// Calibration register as read back from the device.
    pub fn calibration(&mut self) -> u16 {
        self.device.read_or_zero(CALIBRATION)
    }

    pub fn max_expected_current(&self) -> f32 {
        self.calibration.max_expected_current()
    }

    pub fn shunt_resistor(&self) -> f32 {
        self.calibration.shunt_resistor()
    }

    pub fn current_lsb(&self) -> f32 {
        self.calibration.current_lsb()
    }

    pub fn current_lsb_ma(&self) -> f32 {
        self.current_lsb() * MILLI
    }

    pub fn current_lsb_ua(&self) -> f32 {
        self.current_lsb() * MICRO
    }

    pub fn power_lsb(&self) -> f32 {
        self.calibration.power_lsb()
    }

    pub fn power_lsb_mw(&self) -> f32 {
        self.power_lsb() * MILLI
    }

    pub fn power_lsb_uw(&self) -> f32 {
        self.power_lsb() * MICRO
    }

    // -----------------------------------------------------------------------
    // Raw readings
    // -----------------------------------------------------------------------

    fn read_signed(&mut self, register: u8) -> i16 {
        self.device.read_or_zero::<u16>(register) as i16
    }

    /// Bus voltage register with the flag bits shifted out, times four.
    ///
    /// The result is in millivolts even though it is called raw.
    pub fn raw_bus_voltage(&mut self) -> i16 {
        let register: u16 = self.device.read_or_zero(BUS_VOLTAGE);
        ((register >> BUS_REGISTER_SHIFT) as i16) * 4
    }

    pub fn raw_shunt_voltage(&mut self) -> i16 {
        self.read_signed(SHUNT_VOLTAGE)
    }

    /// Current register. Recalibrates first.
    pub fn raw_current(&mut self) -> i16 {
        self.recalibrate();
        self.read_signed(CURRENT)
    }

    /// Power register. Recalibrates first.
    pub fn raw_power(&mut self) -> i16 {
        self.recalibrate();
        self.read_signed(POWER)
    }

    // -----------------------------------------------------------------------
    // Physical readings
    // -----------------------------------------------------------------------

    /// Bus voltage in volts, or [`BUS_VOLTAGE_OVERFLOW`] (`-100.0`) when the
    /// math overflow flag is set.
    pub fn bus_voltage_v(&mut self) -> f32 {
        let register: u16 = self.device.read_or_zero(BUS_VOLTAGE);
        let flags = register & BUS_REGISTER_FLAGS_MASK;
        if flags & BUS_REGISTER_OVF_MASK != 0 {
            return BUS_VOLTAGE_OVERFLOW;
        }
        (register >> BUS_REGISTER_SHIFT) as f32 * BUS_VOLTAGE_LSB
    }

    pub fn bus_voltage_mv(&mut self) -> f32 {
        self.bus_voltage_v() * MILLI
    }

    pub fn bus_voltage_uv(&mut self) -> f32 {
        self.bus_voltage_v() * MICRO
    }

    pub fn shunt_voltage_v(&mut self) -> f32 {
        self.raw_shunt_voltage() as f32 * SHUNT_VOLTAGE_LSB
    }

    pub fn shunt_voltage_mv(&mut self) -> f32 {
        self.shunt_voltage_v() * MILLI
    }

    pub fn shunt_voltage_uv(&mut self) -> f32 {
        self.shunt_voltage_v() * MICRO
    }

    /// Current in amperes. Recalibrates first.
    pub fn current_a(&mut self) -> f32 {
        self.raw_current() as f32 * self.calibration.current_lsb()
    }

    pub fn current_ma(&mut self) -> f32 {
        self.current_a() * MILLI
    }

    pub fn current_ua(&mut self) -> f32 {
        self.current_a() * MICRO
    }

    /// Power in watts. Recalibrates first.
    pub fn power_w(&mut self) -> f32 {
        self.raw_power() as f32 * self.calibration.power_lsb()
    }

    pub fn power_mw(&mut self) -> f32 {
        self.power_w() * MILLI
    }

    pub fn power_uw(&mut self) -> f32 {
        self.power_w() * MICRO
    }

    /// Conversion ready flag of the bus voltage register.
    ///
    /// Reading the power register clears it on the device.
    pub fn conversion_ready(&mut self) -> bool {
        let register: u16 = self.device.read_or_zero(BUS_VOLTAGE);
        register & BUS_REGISTER_CNVR_MASK != 0
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Overwrite the whole configuration register.
    pub fn set_configuration(&mut self, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        self.device.write_u16(CONF, value)
    }

    pub fn configuration(&mut self) -> u16 {
        self.device.read_or_zero(CONF)
    }

    fn option<T: FieldValue<u16>>(&mut self) -> Option<T> {
        self.device.option::<u16, T>()
    }

    fn set_option<T: FieldValue<u16>>(&mut self, option: T) -> Result<(), DeviceError<BUS::Error>> {
        self.device.set_option::<u16, T>(option)
    }

    pub fn set_bus_voltage_range(
        &mut self,
        range: BusVoltageRange,
    ) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(range)
    }

    pub fn bus_voltage_range(&mut self) -> Option<BusVoltageRange> {
        self.option()
    }

    pub fn set_pga(&mut self, pga: Pga) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(pga)
    }

    pub fn pga(&mut self) -> Option<Pga> {
        self.option()
    }

    pub fn set_bus_adc_resolution(
        &mut self,
        resolution: BusAdcResolution,
    ) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(resolution)
    }

    /// `None` for the alias codes `0b0100..=0b1000`, which the device
    /// treats as 12-bit or 1-sample settings.
    pub fn bus_adc_resolution(&mut self) -> Option<BusAdcResolution> {
        self.option()
    }

    pub fn set_shunt_adc_resolution(
        &mut self,
        resolution: ShuntAdcResolution,
    ) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(resolution)
    }

    /// `None` for the alias codes, as for [`bus_adc_resolution`](Self::bus_adc_resolution).
    pub fn shunt_adc_resolution(&mut self) -> Option<ShuntAdcResolution> {
        self.option()
    }

    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), DeviceError<BUS::Error>> {
        self.set_option(mode)
    }

    pub fn operating_mode(&mut self) -> Option<OperatingMode> {
        self.option()
    }

    /// Enter power-down mode. Any other operating mode wakes the device.
    pub fn shut_down(&mut self) -> Result<(), DeviceError<BUS::Error>> {
        self.set_operating_mode(OperatingMode::PowerDown)
    }

    /// Write the reset bit. The device returns to its power-on configuration
    /// and loses its calibration.
    pub fn reset(&mut self) -> Result<(), DeviceError<BUS::Error>> {
        self.device.write_u16(CONF, RESET_MASK)
    }
}
