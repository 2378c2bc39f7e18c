//! Typed register and bitfield model.

use crate::bits::{max_sub_value, read_slice, slice_mask, write_slice, REGISTER_WIDTH};
use crate::control::ControlKind;
use crate::Defect;

/// Ordered register bank contents, indexed by row.
pub type RegisterList = Vec<Register>;

/// A named, positioned, fixed-width slice of a register value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bitfield {
    name: String,
    position: u8,
    width: u8,
}

impl Bitfield {
    /// Creates a bitfield after checking that it fits inside a register.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::BitfieldOutOfBounds`] when `width` is outside `1..=8`,
    /// `position` is outside `0..=7`, or `position + width > 8`.
    pub fn new(name: impl Into<String>, position: u8, width: u8) -> Result<Self, Defect> {
        let name = name.into();
        if !fits_register(i64::from(position), i64::from(width)) {
            return Err(Defect::BitfieldOutOfBounds {
                name,
                position: i64::from(position),
                width: i64::from(width),
            });
        }
        Ok(Self {
            name,
            position,
            width,
        })
    }

    /// Returns the bitfield name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the MSB-first position of the first bit.
    #[must_use]
    pub const fn position(&self) -> u8 {
        self.position
    }

    /// Returns the width in bits.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Mask of the bits this field occupies in the full value.
    #[must_use]
    pub const fn mask(&self) -> u8 {
        slice_mask(self.position, self.width)
    }

    /// Largest sub-value the field can hold.
    #[must_use]
    pub const fn max_value(&self) -> u8 {
        max_sub_value(self.width)
    }

    /// Control kind a presentation must use for this field.
    #[must_use]
    pub fn control_kind(&self) -> ControlKind {
        // Width is validated at construction.
        ControlKind::for_width(self.width).unwrap_or(ControlKind::Ranged {
            min: 0,
            max: self.max_value(),
        })
    }
}

pub(crate) fn fits_register(position: i64, width: i64) -> bool {
    let register_width = i64::from(REGISTER_WIDTH);
    (1..=register_width).contains(&width)
        && (0..register_width).contains(&position)
        && position + width <= register_width
}

/// An addressable byte-wide register with a fixed partition into bitfields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Register {
    name: String,
    address: u16,
    bitfields: Vec<Bitfield>,
    value: u8,
}

impl Register {
    /// Creates a register after checking its bitfield layout.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::BitfieldOverlap`] when two bitfields share a bit and
    /// [`Defect::WidthSumMismatch`] when the widths do not sum to 8.
    pub fn new(
        name: impl Into<String>,
        address: u16,
        bitfields: Vec<Bitfield>,
        value: u8,
    ) -> Result<Self, Defect> {
        validate_layout(&bitfields)?;
        Ok(Self {
            name: name.into(),
            address,
            bitfields,
            value,
        })
    }

    /// Returns the register name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the register address.
    #[must_use]
    pub const fn address(&self) -> u16 {
        self.address
    }

    /// Returns the bitfields in declaration order.
    #[must_use]
    pub fn bitfields(&self) -> &[Bitfield] {
        &self.bitfields
    }

    /// Returns the current full value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Overwrites the full value.
    pub const fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Reads one bitfield's sub-value.
    #[must_use]
    pub const fn field_value(&self, field: &Bitfield) -> u8 {
        read_slice(self.value, field.position, field.width)
    }

    /// Rebuilds the full value from every bitfield sub-value in position
    /// order.
    #[must_use]
    pub fn recompose(&self) -> u8 {
        let mut ordered: Vec<&Bitfield> = self.bitfields.iter().collect();
        ordered.sort_by_key(|field| field.position);
        ordered.into_iter().fold(0, |acc, field| {
            write_slice(acc, field.position, field.width, self.field_value(field))
        })
    }
}

/// Checks that bitfields are pairwise disjoint and cover exactly 8 bits.
///
/// # Errors
///
/// Returns [`Defect::BitfieldOverlap`] for the first field that shares a bit
/// with an earlier one, or [`Defect::WidthSumMismatch`] when the widths do not
/// sum to the register width.
pub fn validate_layout(bitfields: &[Bitfield]) -> Result<(), Defect> {
    let mut covered = 0u8;
    let mut total = 0i64;
    for field in bitfields {
        if covered & field.mask() != 0 {
            return Err(Defect::BitfieldOverlap {
                name: field.name.clone(),
            });
        }
        covered |= field.mask();
        total += i64::from(field.width);
    }
    if total != i64::from(REGISTER_WIDTH) {
        return Err(Defect::WidthSumMismatch { total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_layout, Bitfield, Register};
    use crate::control::ControlKind;
    use crate::Defect;

    fn layer_register() -> Register {
        Register::new(
            "reg 3",
            3,
            vec![
                Bitfield::new("bit 0", 0, 1).expect("bit 0"),
                Bitfield::new("bit 1-3", 1, 3).expect("bit 1-3"),
                Bitfield::new("bit 4-8", 4, 4).expect("bit 4-8"),
            ],
            0,
        )
        .expect("valid layout")
    }

    #[test]
    fn bitfield_rejects_slices_past_the_register() {
        assert_eq!(
            Bitfield::new("bits 1-7", 1, 22),
            Err(Defect::BitfieldOutOfBounds {
                name: "bits 1-7".to_string(),
                position: 1,
                width: 22,
            })
        );
        assert!(Bitfield::new("empty", 0, 0).is_err());
        assert!(Bitfield::new("high", 8, 1).is_err());
        assert!(Bitfield::new("all", 0, 8).is_ok());
    }

    #[test]
    fn layout_must_cover_exactly_eight_bits() {
        let short = vec![Bitfield::new("bit 0", 0, 1).expect("bit 0")];
        assert_eq!(
            validate_layout(&short),
            Err(Defect::WidthSumMismatch { total: 1 })
        );

        let overlapping = vec![
            Bitfield::new("low", 0, 4).expect("low"),
            Bitfield::new("middle", 2, 4).expect("middle"),
        ];
        assert_eq!(
            validate_layout(&overlapping),
            Err(Defect::BitfieldOverlap {
                name: "middle".to_string()
            })
        );
    }

    #[test]
    fn layout_accepts_fields_in_any_declaration_order() {
        let reversed = vec![
            Bitfield::new("tail", 4, 4).expect("tail"),
            Bitfield::new("head", 0, 4).expect("head"),
        ];
        assert!(validate_layout(&reversed).is_ok());
    }

    #[test]
    fn field_values_read_msb_first() {
        let mut register = layer_register();
        register.set_value(0b1011_0010);

        let values: Vec<u8> = register
            .bitfields()
            .iter()
            .map(|field| register.field_value(field))
            .collect();
        assert_eq!(values, vec![1, 0b011, 0b0010]);
        assert_eq!(register.recompose(), 0b1011_0010);
    }

    #[test]
    fn control_kind_follows_field_width() {
        let register = layer_register();
        let kinds: Vec<ControlKind> = register
            .bitfields()
            .iter()
            .map(Bitfield::control_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ControlKind::Toggle,
                ControlKind::Choice { options: 8 },
                ControlKind::Ranged { min: 0, max: 15 },
            ]
        );
    }
}
