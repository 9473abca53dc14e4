//! Error types for the sensor drivers.

use core::fmt;

/// Errors reported by setters and other checked operations.
///
/// Most getters do not return this type: they report a failed read as a
/// zero register value instead (see [`RegisterDevice::read_or_zero`]).
///
/// [`RegisterDevice::read_or_zero`]: crate::device::RegisterDevice::read_or_zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError<E> {
    /// Underlying I2C bus error (NACK, arbitration loss, timeout, ...).
    I2c(E),

    /// Value does not fit the register it was meant for. Nothing was written.
    OutOfRange { value: u16, max: u16 },
}

// Allow ergonomic `?` propagation from raw bus errors.
impl<E> From<E> for DeviceError<E> {
    fn from(error: E) -> Self {
        DeviceError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceError::I2c(e) => write!(f, "I2C error: {:?}", e),
            DeviceError::OutOfRange { value, max } => {
                write!(f, "Value {:#06x} out of range (max {:#06x})", value, max)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for DeviceError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DeviceError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            DeviceError::OutOfRange { value, max } => {
                defmt::write!(f, "Value {=u16:#x} out of range (max {=u16:#x})", *value, *max)
            }
        }
    }
}
