//! MSB-first bit-slice algebra over 8-bit register values.
//!
//! Position 0 names the most significant bit. A slice `[position,
//! position + width)` is read contiguously toward the least significant bit,
//! so the slice `(0, 8)` is the whole byte and `(7, 1)` is bit 0.

use crate::Defect;

/// Width in bits of every register value.
pub const REGISTER_WIDTH: u8 = 8;

/// Width in bits of every register address.
pub const ADDRESS_WIDTH: u8 = 16;

/// Validates that a slice lies inside a register value.
///
/// # Errors
///
/// Returns [`Defect::InvalidSlice`] when `width` is zero, `position` is past
/// the last bit, or the slice runs off the end of the register.
#[allow(clippy::missing_const_for_fn)]
pub fn validate_slice(position: u8, width: u8) -> Result<(), Defect> {
    if width == 0 || position >= REGISTER_WIDTH || width > REGISTER_WIDTH - position {
        return Err(Defect::InvalidSlice { position, width });
    }
    Ok(())
}

/// Largest sub-value a slice of `width` bits can hold.
///
/// Widths above the register width saturate to `0xFF`.
#[must_use]
pub const fn max_sub_value(width: u8) -> u8 {
    if width >= REGISTER_WIDTH {
        u8::MAX
    } else {
        (1u8 << width) - 1
    }
}

/// Mask selecting the slice inside a full register value.
///
/// Callers validate the slice first; see [`validate_slice`].
#[must_use]
pub const fn slice_mask(position: u8, width: u8) -> u8 {
    max_sub_value(width) << shift(position, width)
}

/// Reads the slice out of `value`, right-aligned.
#[must_use]
pub const fn read_slice(value: u8, position: u8, width: u8) -> u8 {
    (value & slice_mask(position, width)) >> shift(position, width)
}

/// Overwrites the slice in `value` with `sub_value`, leaving every other bit
/// unchanged.
///
/// Bits of `sub_value` above the slice width are discarded.
#[must_use]
pub const fn write_slice(value: u8, position: u8, width: u8, sub_value: u8) -> u8 {
    let mask = slice_mask(position, width);
    (value & !mask) | ((sub_value << shift(position, width)) & mask)
}

const fn shift(position: u8, width: u8) -> u8 {
    REGISTER_WIDTH - position - width
}
