//! Register transport shared by both sensor drivers.
//!
//! [`RegisterDevice`] owns a bus handle, the device address and the response
//! timeout, and exposes 8/16-bit register access on top of the fixed
//! 8-bit-register-address I2C memory model. Multi-byte registers travel high
//! byte first.
//!
//! The bus itself is reached through [`I2cMemory`]. Every
//! [`embedded_hal::i2c::I2c`] implements it, so a driver can be handed a
//! plain bus, `&mut` bus, or a shared-bus proxy such as
//! `embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice`. The proxy
//! only borrows the physical bus for the length of one transaction; drivers
//! sharing one physical bus are serialised by the proxy's mutex.

use embassy_time::Duration;
use embedded_hal::i2c::{ErrorType, I2c, Operation};

use crate::bits::{Field, FieldValue, Word};
use crate::error::DeviceError;

/// "Wait forever" response timeout.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(u32::MAX as u64);

/// Number of attempts made by the readiness probe.
pub const PROBE_TRIALS: u32 = 5;

/// Largest register access performed by the drivers, in bytes.
const MAX_WORD_BYTES: usize = 2;

/// Blocking I2C memory access: read or write N bytes at an 8-bit register
/// address, plus a device readiness probe.
///
/// `timeout` bounds each transaction. Implementations that cannot enforce a
/// per-call timeout rely on the timeout configured on the bus itself.
pub trait I2cMemory {
    type Error;

    /// Read `buffer.len()` bytes starting at `register`.
    fn mem_read(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<(), Self::Error>;

    /// Write `data` starting at `register`.
    fn mem_write(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<(), Self::Error>;

    /// Check that the device acknowledges its address, trying up to `trials`
    /// times.
    fn is_device_ready(
        &mut self,
        address: u8,
        trials: u32,
        timeout: Duration,
    ) -> Result<(), Self::Error>;
}

/// embedded-hal buses carry their own timeout configuration, so `timeout` is
/// not used here.
impl<T: I2c> I2cMemory for T {
    type Error = <T as ErrorType>::Error;

    fn mem_read(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
        _timeout: Duration,
    ) -> Result<(), <T as ErrorType>::Error> {
        self.write_read(address, &[register], buffer)
    }

    fn mem_write(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
        _timeout: Duration,
    ) -> Result<(), <T as ErrorType>::Error> {
        // Adjacent writes go out back to back, without a repeated start.
        self.transaction(
            address,
            &mut [Operation::Write(&[register]), Operation::Write(data)],
        )
    }

    fn is_device_ready(
        &mut self,
        address: u8,
        trials: u32,
        _timeout: Duration,
    ) -> Result<(), <T as ErrorType>::Error> {
        let mut attempt = self.write(address, &[]);
        for _ in 1..trials {
            if attempt.is_ok() {
                break;
            }
            attempt = self.write(address, &[]);
        }
        attempt
    }
}

/// One I2C peripheral with 8-bit register addresses.
///
/// Immutable after construction: the address and timeout never change.
pub struct RegisterDevice<BUS> {
    bus: BUS,
    address: u8,
    response_timeout: Duration,
}

impl<BUS> RegisterDevice<BUS>
where
    BUS: I2cMemory,
{
    /// Create a new register transport.
    ///
    /// # Arguments
    /// * `bus`: bus handle, usually a shared-bus proxy or `&mut` bus
    /// * `address`: 7-bit I2C device address
    /// * `response_timeout`: bound on each transaction
    pub fn new(bus: BUS, address: u8, response_timeout: Duration) -> Self {
        Self {
            bus,
            address,
            response_timeout,
        }
    }

    /// 7-bit device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Give the bus handle back.
    pub fn release(self) -> BUS {
        self.bus
    }

    /// Probe the device with a zero-length transaction.
    ///
    /// Returns `true` if it acknowledged within [`PROBE_TRIALS`] attempts.
    pub fn is_connected(&mut self) -> bool {
        let ready = self
            .bus
            .is_device_ready(self.address, PROBE_TRIALS, self.response_timeout)
            .is_ok();

        #[cfg(feature = "defmt")]
        if !ready {
            defmt::debug!("no ack from device {=u8:#04x}", self.address);
        }

        ready
    }

    // -----------------------------------------------------------------------
    // Register access
    // -----------------------------------------------------------------------

    /// Read a register of width `W`.
    pub fn read<W: Word>(&mut self, register: u8) -> Result<W, DeviceError<BUS::Error>> {
        let mut buf = [0u8; MAX_WORD_BYTES];
        let buf = &mut buf[..W::BYTES];
        self.bus
            .mem_read(self.address, register, buf, self.response_timeout)?;
        Ok(W::from_wire(buf))
    }

    /// Write a register of width `W`.
    pub fn write<W: Word>(&mut self, register: u8, value: W) -> Result<(), DeviceError<BUS::Error>> {
        let mut buf = [0u8; MAX_WORD_BYTES];
        let buf = &mut buf[..W::BYTES];
        value.to_wire(buf);
        self.bus
            .mem_write(self.address, register, buf, self.response_timeout)?;
        Ok(())
    }

    pub fn read_u8(&mut self, register: u8) -> Result<u8, DeviceError<BUS::Error>> {
        self.read(register)
    }

    pub fn write_u8(&mut self, register: u8, value: u8) -> Result<(), DeviceError<BUS::Error>> {
        self.write(register, value)
    }

    /// Read a 16-bit register, high byte first.
    pub fn read_u16(&mut self, register: u8) -> Result<u16, DeviceError<BUS::Error>> {
        self.read(register)
    }

    /// Write a 16-bit register, high byte first.
    pub fn write_u16(&mut self, register: u8, value: u16) -> Result<(), DeviceError<BUS::Error>> {
        self.write(register, value)
    }

    /// Read a register for a getter that does not report errors.
    ///
    /// A failed transaction yields zero.
    pub fn read_or_zero<W: Word>(&mut self, register: u8) -> W {
        match self.read(register) {
            Ok(value) => value,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "read of register {=u8:#04x} on {=u8:#04x} failed, reporting zero",
                    register,
                    self.address
                );
                W::default()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Sub-fields
    // -----------------------------------------------------------------------

    /// The bits of `field`, in register position. Zero if the read fails.
    pub fn read_field<W: Word>(&mut self, field: Field<W>) -> W {
        field.extract(self.read_or_zero(field.register))
    }

    /// Read-modify-write one sub-field, leaving every other bit untouched.
    ///
    /// If the initial read fails nothing is written.
    pub fn update_field<W: Word>(
        &mut self,
        field: Field<W>,
        bits: W,
    ) -> Result<(), DeviceError<BUS::Error>> {
        let current = self.read(field.register)?;
        self.write(field.register, field.merge(current, bits))
    }

    /// Current option of a sub-field, or `None` if the register holds a code
    /// with no named option.
    pub fn option<W: Word, T: FieldValue<W>>(&mut self) -> Option<T> {
        T::from_bits(self.read_field(T::FIELD))
    }

    /// Select an option of a sub-field.
    pub fn set_option<W: Word, T: FieldValue<W>>(
        &mut self,
        option: T,
    ) -> Result<(), DeviceError<BUS::Error>> {
        self.update_field(T::FIELD, option.bits())
    }
}
