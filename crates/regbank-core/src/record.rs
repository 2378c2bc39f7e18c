//! Adapter-facing register records and their one-time validation.
//!
//! Storage adapters hand over loosely typed records so that any data a real
//! backend could produce, including malformed data, is representable. A
//! record becomes a [`Register`] only through [`RegisterRecord::validate`].

use crate::bits::{ADDRESS_WIDTH, REGISTER_WIDTH};
use crate::model::{fits_register, Bitfield, Register};
use crate::Defect;

/// Fixed-width bit vector as stored by a hardware layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BitVector {
    /// Unsigned payload.
    pub value: u64,
    /// Declared width in bits.
    pub width: u8,
}

impl BitVector {
    /// Creates a bit vector.
    #[must_use]
    pub const fn new(value: u64, width: u8) -> Self {
        Self { value, width }
    }

    /// Returns the payload when it fits `width` bits and the declared width
    /// is `width`.
    #[must_use]
    pub const fn payload_if_width(self, width: u8) -> Option<u64> {
        if self.width != width || width >= 64 {
            return None;
        }
        if self.value >> width != 0 {
            return None;
        }
        Some(self.value)
    }
}

/// One loosely typed record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// Text.
    Text(String),
    /// Plain integer.
    Integer(i64),
    /// Fixed-width bit vector.
    Bits(BitVector),
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<BitVector> for FieldValue {
    fn from(bits: BitVector) -> Self {
        Self::Bits(bits)
    }
}

/// Adapter-facing bitfield declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BitfieldRecord {
    /// Bitfield name.
    pub name: String,
    /// MSB-first position of the first bit.
    pub position: i64,
    /// Width in bits.
    pub width: i64,
}

impl BitfieldRecord {
    /// Creates a bitfield record.
    #[must_use]
    pub fn new(name: impl Into<String>, position: i64, width: i64) -> Self {
        Self {
            name: name.into(),
            position,
            width,
        }
    }

    /// Validates the declaration into a typed bitfield.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::BitfieldOutOfBounds`] when the declaration does not
    /// fit inside a register.
    pub fn validate(&self) -> Result<Bitfield, Defect> {
        let out_of_bounds = || Defect::BitfieldOutOfBounds {
            name: self.name.clone(),
            position: self.position,
            width: self.width,
        };
        if !fits_register(self.position, self.width) {
            return Err(out_of_bounds());
        }
        let position = u8::try_from(self.position).map_err(|_| out_of_bounds())?;
        let width = u8::try_from(self.width).map_err(|_| out_of_bounds())?;
        Bitfield::new(self.name.clone(), position, width)
    }
}

impl From<&Bitfield> for BitfieldRecord {
    fn from(field: &Bitfield) -> Self {
        Self::new(
            field.name(),
            i64::from(field.position()),
            i64::from(field.width()),
        )
    }
}

/// Adapter-facing register shape: name, address, bitfields, value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterRecord {
    /// Register name, expected to be text.
    pub name: FieldValue,
    /// Register address, expected to be an integer or 16-bit vector.
    pub address: FieldValue,
    /// Bitfield declarations in display order.
    pub bitfields: Vec<BitfieldRecord>,
    /// Current value, expected to be an 8-bit vector.
    pub value: FieldValue,
}

impl RegisterRecord {
    /// Validates the record into a typed register.
    ///
    /// Checks run in field order: name, address, bitfields, layout, value.
    ///
    /// # Errors
    ///
    /// Returns the first [`Defect`] found, unwrapped; callers that know the
    /// record's row attach it with [`Defect::in_record`].
    pub fn validate(&self) -> Result<Register, Defect> {
        let FieldValue::Text(name) = &self.name else {
            return Err(Defect::NameNotText);
        };
        let address = validate_address(&self.address)?;
        let bitfields = self
            .bitfields
            .iter()
            .map(BitfieldRecord::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let value = validate_value(&self.value)?;
        Register::new(name.clone(), address, bitfields, value)
    }
}

impl From<&Register> for RegisterRecord {
    fn from(register: &Register) -> Self {
        Self {
            name: FieldValue::from(register.name()),
            address: BitVector::new(u64::from(register.address()), ADDRESS_WIDTH).into(),
            bitfields: register
                .bitfields()
                .iter()
                .map(BitfieldRecord::from)
                .collect(),
            value: BitVector::new(u64::from(register.value()), REGISTER_WIDTH).into(),
        }
    }
}

fn validate_address(address: &FieldValue) -> Result<u16, Defect> {
    match address {
        FieldValue::Integer(raw) => {
            u16::try_from(*raw).map_err(|_| Defect::AddressOutOfRange { address: *raw })
        }
        FieldValue::Bits(bits) => bits
            .payload_if_width(ADDRESS_WIDTH)
            .and_then(|payload| u16::try_from(payload).ok())
            .ok_or(Defect::AddressNotInteger),
        FieldValue::Text(_) => Err(Defect::AddressNotInteger),
    }
}

fn validate_value(value: &FieldValue) -> Result<u8, Defect> {
    match value {
        FieldValue::Bits(bits) => bits
            .payload_if_width(REGISTER_WIDTH)
            .and_then(|payload| u8::try_from(payload).ok())
            .ok_or(Defect::ValueNotBitVector),
        FieldValue::Text(_) | FieldValue::Integer(_) => Err(Defect::ValueNotBitVector),
    }
}

/// Validates every record of a loaded list, attributing defects to rows.
///
/// # Errors
///
/// Returns the first defect as [`Defect::Record`].
pub fn validate_records(records: &[RegisterRecord]) -> Result<Vec<Register>, Defect> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| record.validate().map_err(|defect| defect.in_record(row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{validate_records, BitVector, BitfieldRecord, FieldValue, RegisterRecord};
    use crate::{Defect, DefectKind};

    fn sample() -> RegisterRecord {
        RegisterRecord {
            name: "reg 1".into(),
            address: BitVector::new(1, 16).into(),
            bitfields: vec![
                BitfieldRecord::new("bit 0", 0, 1),
                BitfieldRecord::new("bits 1-7", 1, 7),
            ],
            value: BitVector::new(0x81, 8).into(),
        }
    }

    #[test]
    fn well_formed_record_validates() {
        let register = sample().validate().expect("valid record");
        assert_eq!(register.name(), "reg 1");
        assert_eq!(register.address(), 1);
        assert_eq!(register.bitfields().len(), 2);
        assert_eq!(register.value(), 0x81);
    }

    #[test]
    fn integer_addresses_are_accepted_within_sixteen_bits() {
        let mut record = sample();
        record.address = FieldValue::Integer(0xFFFF);
        assert_eq!(record.validate().expect("max address").address(), 0xFFFF);

        record.address = FieldValue::Integer(-1);
        assert_eq!(
            record.validate(),
            Err(Defect::AddressOutOfRange { address: -1 })
        );
    }

    #[test]
    fn vectors_of_the_wrong_width_are_type_mismatches() {
        let mut record = sample();
        record.value = BitVector::new(1, 16).into();
        assert_eq!(record.validate(), Err(Defect::ValueNotBitVector));

        let mut record = sample();
        record.value = BitVector::new(0x1FF, 8).into();
        assert_eq!(record.validate(), Err(Defect::ValueNotBitVector));

        let mut record = sample();
        record.address = BitVector::new(1, 8).into();
        assert_eq!(record.validate(), Err(Defect::AddressNotInteger));
    }

    #[test]
    fn record_round_trips_through_the_typed_model() {
        let register = sample().validate().expect("valid record");
        assert_eq!(RegisterRecord::from(&register), sample());
    }

    #[test]
    fn list_validation_reports_the_failing_row() {
        let mut broken = sample();
        broken.name = FieldValue::Integer(42);
        let error = validate_records(&[sample(), broken]).expect_err("row 1 is broken");

        assert_eq!(error, Defect::NameNotText.in_record(1));
        assert_eq!(error.kind(), DefectKind::TypeMismatch);
    }
}
