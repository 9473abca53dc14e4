//! Register-file I2C bus used by the unit tests.
//!
//! [`MockBus`] implements the blocking embedded-hal `I2c` trait and hosts up
//! to two devices. The first byte written in a transaction sets the device's
//! register pointer; further written bytes are stored from that pointer and
//! reads are served from it.
//!
//! Two register layouts are modelled:
//!
//! - [`RegisterLayout::Bytes`]: one byte per address, the pointer
//!   auto-increments (AS5600).
//! - [`RegisterLayout::Words`]: one 16-bit register per address (INA219).

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

const MEMORY_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Nack,
    Bus,
}

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockError::Bus => ErrorKind::Bus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterLayout {
    Bytes,
    Words,
}

impl RegisterLayout {
    fn slot(self, register: u8, offset: usize) -> usize {
        let base = match self {
            RegisterLayout::Bytes => register as usize,
            RegisterLayout::Words => register as usize * 2,
        };
        (base + offset) % MEMORY_SIZE
    }
}

#[derive(Debug, Clone, Copy)]
struct MockDevice {
    address: u8,
    layout: RegisterLayout,
    memory: [u8; MEMORY_SIZE],
    pointer: u8,
}

impl MockDevice {
    fn new(address: u8, layout: RegisterLayout) -> Self {
        Self {
            address,
            layout,
            memory: [0; MEMORY_SIZE],
            pointer: 0,
        }
    }

    fn set_word(&mut self, register: u8, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.memory[self.layout.slot(register, 0)] = hi;
        self.memory[self.layout.slot(register, 1)] = lo;
    }

    fn word(&self, register: u8) -> u16 {
        u16::from_be_bytes([
            self.memory[self.layout.slot(register, 0)],
            self.memory[self.layout.slot(register, 1)],
        ])
    }
}

#[derive(Debug)]
pub struct MockBus {
    devices: [Option<MockDevice>; 2],
    fail_reads: bool,
    fail_writes: bool,
    probe_nacks: u32,
    writes: usize,
    probes: u32,
}

impl MockBus {
    /// A bus with a single device at `address`.
    pub fn new(address: u8, layout: RegisterLayout) -> Self {
        Self {
            devices: [Some(MockDevice::new(address, layout)), None],
            fail_reads: false,
            fail_writes: false,
            probe_nacks: 0,
            writes: 0,
            probes: 0,
        }
    }

    /// Attach a second device.
    pub fn with_device(mut self, address: u8, layout: RegisterLayout) -> Self {
        self.devices[1] = Some(MockDevice::new(address, layout));
        self
    }

    fn primary(&self) -> &MockDevice {
        self.devices[0].as_ref().expect("primary device is always present")
    }

    fn primary_mut(&mut self) -> &mut MockDevice {
        self.devices[0].as_mut().expect("primary device is always present")
    }

    fn find(&mut self, address: u8) -> Option<&mut MockDevice> {
        self.devices.iter_mut().flatten().find(|d| d.address == address)
    }

    pub fn set_byte(&mut self, register: u8, value: u8) {
        let device = self.primary_mut();
        let slot = device.layout.slot(register, 0);
        device.memory[slot] = value;
    }

    pub fn byte(&self, register: u8) -> u8 {
        let device = self.primary();
        device.memory[device.layout.slot(register, 0)]
    }

    pub fn set_word(&mut self, register: u8, value: u16) {
        self.primary_mut().set_word(register, value);
    }

    pub fn word(&self, register: u8) -> u16 {
        self.primary().word(register)
    }

    pub fn set_word_at(&mut self, address: u8, register: u8, value: u16) {
        if let Some(device) = self.find(address) {
            device.set_word(register, value);
        }
    }

    pub fn word_at(&mut self, address: u8, register: u8) -> Option<u16> {
        self.find(address).map(|d| d.word(register))
    }

    /// Fail every transaction that reads.
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Fail every transaction that writes register data.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// NACK the next `count` zero-length probes.
    pub fn nack_probes(&mut self, count: u32) {
        self.probe_nacks = count;
    }

    /// Number of transactions that stored register data.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of zero-length probes seen.
    pub fn probes(&self) -> u32 {
        self.probes
    }
}

impl ErrorType for MockBus {
    type Error = MockError;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let is_probe = operations
            .iter()
            .all(|op| matches!(op, Operation::Write(data) if data.is_empty()));

        if is_probe {
            self.probes += 1;
            self.find(address).ok_or(MockError::Nack)?;
            if self.probe_nacks > 0 {
                self.probe_nacks -= 1;
                return Err(MockError::Nack);
            }
            return Ok(());
        }

        let reads = operations
            .iter()
            .any(|op| matches!(op, Operation::Read(_)));
        let written: usize = operations
            .iter()
            .map(|op| match op {
                Operation::Write(data) => data.len(),
                Operation::Read(_) => 0,
            })
            .sum();

        let fail_reads = self.fail_reads;
        let fail_writes = self.fail_writes;
        let device = self.find(address).ok_or(MockError::Nack)?;

        if (reads && fail_reads) || (written > 1 && fail_writes) {
            return Err(MockError::Bus);
        }

        let mut pointer_set = false;
        let mut cursor = 0;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    for &byte in data.iter() {
                        if pointer_set {
                            let slot = device.layout.slot(device.pointer, cursor);
                            device.memory[slot] = byte;
                            cursor += 1;
                        } else {
                            device.pointer = byte;
                            pointer_set = true;
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = device.memory[device.layout.slot(device.pointer, cursor)];
                        cursor += 1;
                    }
                }
            }
        }

        if written > 1 {
            self.writes += 1;
        }
        Ok(())
    }
}
