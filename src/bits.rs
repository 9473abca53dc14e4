//! Bitfield helpers for packed configuration registers.
//!
//! Registers on both sensors are either 8 or 16 bits wide and 16-bit values
//! travel high byte first. Configuration registers are split into disjoint
//! sub-fields, each described by a [`Field`] (register address plus mask).
//! Option enums implement [`FieldValue`] so the register transport can
//! read-modify-write any of them through one generic operation.

use core::ops::{BitAnd, BitOr, Not};

/// Apply `mask` to `value`, or its complement when `invert` is set.
///
/// Without inversion this extracts a sub-field; with inversion it clears the
/// sub-field so new bits can be OR'd in.
pub const fn mask_u8(value: u8, mask: u8, invert: bool) -> u8 {
    if invert {
        value & !mask
    } else {
        value & mask
    }
}

/// 16-bit counterpart of [`mask_u8`].
pub const fn mask_u16(value: u16, mask: u16, invert: bool) -> u16 {
    if invert {
        value & !mask
    } else {
        value & mask
    }
}

/// Replace the bits under `mask` in `current` with those of `bits`.
pub const fn merge_u8(current: u8, mask: u8, bits: u8) -> u8 {
    mask_u8(current, mask, true) | mask_u8(bits, mask, false)
}

/// 16-bit counterpart of [`merge_u8`].
pub const fn merge_u16(current: u16, mask: u16, bits: u16) -> u16 {
    mask_u16(current, mask, true) | mask_u16(bits, mask, false)
}

/// Build a register word from its wire bytes (`bytes[0]` is the high byte).
pub const fn concat_u16(bytes: [u8; 2]) -> u16 {
    ((bytes[0] as u16) << 8) | bytes[1] as u16
}

/// Split a register word into wire bytes, high byte first.
pub const fn split_u16(value: u16) -> [u8; 2] {
    [(value >> 8) as u8, (value & 0xFF) as u8]
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// Register width: `u8` or `u16`.
pub trait Word:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + core::fmt::Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
{
    /// Number of bytes on the wire.
    const BYTES: usize;

    /// Decode from wire bytes, high byte first. `bytes` holds exactly
    /// [`Self::BYTES`] bytes.
    fn from_wire(bytes: &[u8]) -> Self;

    /// Encode into `out`, which holds exactly [`Self::BYTES`] bytes.
    fn to_wire(self, out: &mut [u8]);
}

impl Word for u8 {
    const BYTES: usize = 1;

    fn from_wire(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn to_wire(self, out: &mut [u8]) {
        out[0] = self;
    }
}

impl Word for u16 {
    const BYTES: usize = 2;

    fn from_wire(bytes: &[u8]) -> Self {
        concat_u16([bytes[0], bytes[1]])
    }

    fn to_wire(self, out: &mut [u8]) {
        out.copy_from_slice(&split_u16(self));
    }
}

/// A sub-field of a configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field<W> {
    /// Register address holding the field.
    pub register: u8,
    /// Bits owned by the field, in register position.
    pub mask: W,
}

impl<W: Word> Field<W> {
    pub const fn new(register: u8, mask: W) -> Self {
        Self { register, mask }
    }

    /// The field's bits of `value`, left in register position.
    pub fn extract(&self, value: W) -> W {
        value & self.mask
    }

    /// `current` with this field replaced by `bits`; every other bit is kept.
    pub fn merge(&self, current: W, bits: W) -> W {
        (current & !self.mask) | (bits & self.mask)
    }
}

/// A named option of a register sub-field.
///
/// `bits()` is already shifted into register position, so it can be OR'd
/// straight into the register.
pub trait FieldValue<W: Word>: Sized + Copy {
    /// The sub-field this option belongs to.
    const FIELD: Field<W>;

    /// Register bits for this option.
    fn bits(self) -> W;

    /// Decode the field bits of a register value. Returns `None` for codes
    /// that have no named option.
    fn from_bits(bits: W) -> Option<Self>;
}

/// Implements [`FieldValue`] for a fieldless `#[repr]` enum whose
/// discriminants are the register bits of each option.
macro_rules! field_value {
    ($ty:ty, $word:ty, $field:expr, [$($variant:ident),+ $(,)?]) => {
        impl $crate::bits::FieldValue<$word> for $ty {
            const FIELD: $crate::bits::Field<$word> = $field;

            fn bits(self) -> $word {
                self as $word
            }

            fn from_bits(bits: $word) -> Option<Self> {
                let bits = bits & <Self as $crate::bits::FieldValue<$word>>::FIELD.mask;
                $(
                    if bits == <$ty>::$variant as $word {
                        return Some(<$ty>::$variant);
                    }
                )+
                None
            }
        }
    };
}

pub(crate) use field_value;

#[cfg(test)]
mod tests {
    use super::*;

    // ── Masking ──────────────────────────────────────────────────────

    #[test]
    fn mask_extracts_or_clears() {
        assert_eq!(mask_u8(0b1011_0110, 0x0C, false), 0b0000_0100);
        assert_eq!(mask_u8(0b1011_0110, 0x0C, true), 0b1011_0010);
        assert_eq!(mask_u16(0xABCD, 0x1800, false), 0x0800);
        assert_eq!(mask_u16(0xABCD, 0x1800, true), 0xA3CD);
    }

    #[test]
    fn merge_keeps_bits_outside_mask() {
        assert_eq!(merge_u8(0xFF, 0x30, 0x10), 0xDF);
        assert_eq!(merge_u16(0x399F, 0x0007, 0x0003), 0x399B);
    }

    #[test]
    fn merge_drops_bits_outside_mask() {
        // Stray bits in the new value must not leak into sibling fields.
        assert_eq!(merge_u8(0x00, 0x0C, 0xFF), 0x0C);
    }

    // ── Word composition ─────────────────────────────────────────────

    #[test]
    fn words_are_high_byte_first() {
        assert_eq!(concat_u16([0x12, 0x34]), 0x1234);
        assert_eq!(split_u16(0x1234), [0x12, 0x34]);
        assert_eq!(<u16 as Word>::from_wire(&[0x0F, 0xFF]), 0x0FFF);

        let mut out = [0u8; 2];
        0xBEEFu16.to_wire(&mut out);
        assert_eq!(out, [0xBE, 0xEF]);
    }

    // ── Fields ───────────────────────────────────────────────────────

    #[test]
    fn field_extract_and_merge() {
        let field = Field::new(0x08, 0x0Cu8);
        assert_eq!(field.extract(0xFF), 0x0C);
        assert_eq!(field.merge(0b1111_0011, 0b0000_1000), 0b1111_1011);
    }
}
