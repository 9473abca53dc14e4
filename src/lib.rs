//! Blocking I2C drivers for the AS5600 magnetic rotary encoder and the
//! INA219 current/power monitor.
//!
//! Both devices use the same memory model: 8-bit register addresses, 16-bit
//! values high byte first, and configuration registers packed with
//! independent sub-fields.
//!
//! # Architecture
//!
//! - **[`bits`]**: masking and word helpers, plus the [`bits::Field`] /
//!   [`bits::FieldValue`] metadata that lets one read-modify-write operation
//!   serve every configuration option.
//! - **[`device`]**: [`RegisterDevice`], the register transport, and
//!   [`I2cMemory`], the bus trait it consumes. Every
//!   `embedded_hal::i2c::I2c` implements [`I2cMemory`].
//! - **[`as5600`]** and **[`ina219`]**: the device drivers, each with a
//!   `registers` submodule holding the register map and option enums.
//!
//! # Error reporting
//!
//! Setters return `Result<(), DeviceError<E>>`. Getters return plain values
//! and report a failed read as zero, so a disconnected sensor reads as a
//! zero angle or zero current rather than an error. Use `is_connected` to
//! tell the two apart.
//!
//! # Quick start
//!
//! ```no_run
//! use sensor_drivers::as5600::{AngleUnit, RotationDirection};
//! use sensor_drivers::{As5600, Ina219};
//!
//! # fn example<I2C: embedded_hal::i2c::I2c>(encoder_bus: I2C, monitor_bus: I2C) {
//! let mut encoder = As5600::new(encoder_bus, RotationDirection::Clockwise);
//! let mut monitor = Ina219::new(monitor_bus, 3.2, 0.1);
//!
//! let angle = encoder.real_angle(AngleUnit::Degrees);
//! let current = monitor.current_a();
//! # }
//! ```
//!
//! To put both sensors on one physical bus, hand each driver its own
//! `embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice`.
//!
//! # Features
//!
//! - **`defmt`**: `defmt::Format` on public types, and warnings for
//!   failures that are not returned to the caller.

#![no_std]

pub mod as5600;
pub mod bits;
pub mod device;
pub mod error;
pub mod ina219;

#[cfg(test)]
mod mock;

pub use as5600::As5600;
pub use device::{I2cMemory, RegisterDevice, DEFAULT_RESPONSE_TIMEOUT};
pub use error::DeviceError;
pub use ina219::Ina219;

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
    use embassy_sync::blocking_mutex::NoopMutex;

    use super::*;
    use crate::as5600::registers::{ANGLE_H, DEFAULT_ADDRESS as ENCODER_ADDRESS};
    use crate::as5600::RotationDirection;
    use crate::ina219::registers::{CALIBRATION, CURRENT, DEFAULT_ADDRESS as MONITOR_ADDRESS};
    use crate::mock::{MockBus, RegisterLayout};

    fn shared_bus() -> NoopMutex<RefCell<MockBus>> {
        let mut bus = MockBus::new(ENCODER_ADDRESS, RegisterLayout::Bytes)
            .with_device(MONITOR_ADDRESS, RegisterLayout::Words);
        bus.set_word(ANGLE_H, 0x0200);
        bus.set_word_at(MONITOR_ADDRESS, CURRENT, 1000);
        NoopMutex::new(RefCell::new(bus))
    }

    #[test]
    fn drivers_share_one_bus() {
        let bus = shared_bus();

        let mut encoder = As5600::new(I2cDevice::new(&bus), RotationDirection::Clockwise);
        let mut monitor = Ina219::new(I2cDevice::new(&bus), 3.2, 0.1);

        assert!(encoder.is_connected());
        assert!(monitor.is_connected());

        // Interleaved traffic reaches the right device each time.
        assert_eq!(encoder.angle(), 0x0200);
        assert!(libm::fabsf(monitor.current_a() - 0.097_656_25) < 1e-6);
        assert_eq!(encoder.angle(), 0x0200);
        assert_eq!(monitor.calibration(), 4194);

        // The monitor's calibration writes never land on the encoder.
        assert_eq!(encoder.max_angle(), 0);
        assert_eq!(
            bus.lock(|b| b.borrow_mut().word_at(MONITOR_ADDRESS, CALIBRATION)),
            Some(4194)
        );
    }

    #[test]
    fn released_handle_can_be_reused() {
        let bus = shared_bus();

        let encoder = As5600::new(I2cDevice::new(&bus), RotationDirection::CounterClockwise);
        let handle = encoder.release();

        let mut encoder = As5600::new(handle, RotationDirection::Clockwise);
        assert_eq!(encoder.angle(), 0x0200);
    }

    #[test]
    fn setter_errors_surface_through_the_proxy() {
        let bus = shared_bus();
        bus.lock(|b| b.borrow_mut().fail_writes(true));

        let mut encoder = As5600::new(I2cDevice::new(&bus), RotationDirection::Clockwise);
        assert!(matches!(encoder.set_z_position(0x0100), Err(DeviceError::I2c(_))));
        assert_eq!(bus.lock(|b| b.borrow().writes()), 0);
    }
}
