//! In-memory register bank with full-value and bitfield read/modify/write.

use crate::bits::{max_sub_value, read_slice, validate_slice, write_slice};
use crate::model::{Bitfield, Register, RegisterList};
use crate::record::{validate_records, RegisterRecord};
use crate::Defect;

/// Bank of registers owned by one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterBank {
    registers: RegisterList,
}

impl RegisterBank {
    /// Creates a bank from already-validated registers.
    #[must_use]
    pub const fn new(registers: RegisterList) -> Self {
        Self { registers }
    }

    /// Validates adapter records into a bank.
    ///
    /// # Errors
    ///
    /// Returns the first record defect as [`Defect::Record`].
    pub fn from_records(records: &[RegisterRecord]) -> Result<Self, Defect> {
        validate_records(records).map(Self::new)
    }

    /// Number of registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns `true` when the bank holds no registers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// All registers in row order.
    #[must_use]
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Consumes the bank, returning its registers.
    #[must_use]
    pub fn into_registers(self) -> RegisterList {
        self.registers
    }

    /// Returns the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn register(&self, row: usize) -> Result<&Register, Defect> {
        self.registers.get(row).ok_or(Defect::RowOutOfBounds {
            row,
            len: self.registers.len(),
        })
    }

    fn register_mut(&mut self, row: usize) -> Result<&mut Register, Defect> {
        let len = self.registers.len();
        self.registers
            .get_mut(row)
            .ok_or(Defect::RowOutOfBounds { row, len })
    }

    /// Returns the name of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn register_name(&self, row: usize) -> Result<&str, Defect> {
        self.register(row).map(Register::name)
    }

    /// Returns the address of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn register_address(&self, row: usize) -> Result<u16, Defect> {
        self.register(row).map(Register::address)
    }

    /// Returns the bitfields of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn bitfields(&self, row: usize) -> Result<&[Bitfield], Defect> {
        self.register(row).map(Register::bitfields)
    }

    /// Returns the number of bitfields of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn bitfield_count(&self, row: usize) -> Result<usize, Defect> {
        self.bitfields(row).map(<[Bitfield]>::len)
    }

    /// Returns the bitfield named `name` in the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::UnknownBitfield`] when no bitfield has that name and
    /// [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn find_bitfield(&self, row: usize, name: &str) -> Result<&Bitfield, Defect> {
        self.bitfields(row)?
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| Defect::UnknownBitfield {
                row,
                name: name.to_string(),
            })
    }

    /// Returns the full value of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn value(&self, row: usize) -> Result<u8, Defect> {
        self.register(row).map(Register::value)
    }

    /// Overwrites the full value of the register at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::ValueOutOfRange`] when `value > 255` and
    /// [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn set_value(&mut self, row: usize, value: u32) -> Result<(), Defect> {
        let value = u8::try_from(value).map_err(|_| Defect::ValueOutOfRange { value })?;
        self.register_mut(row)?.set_value(value);
        log::debug!("register {row} <- {value:#04x}");
        Ok(())
    }

    /// Reads the slice `[position, position + width)` of the value at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::InvalidSlice`] when the slice leaves the register and
    /// [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn sub_value(&self, row: usize, position: u8, width: u8) -> Result<u8, Defect> {
        validate_slice(position, width)?;
        Ok(read_slice(self.value(row)?, position, width))
    }

    /// Overwrites the slice `[position, position + width)` of the value at
    /// `row` with `value`, leaving every other bit unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::InvalidSlice`] when the slice leaves the register,
    /// [`Defect::SubValueOutOfRange`] when `value` does not fit `width` bits,
    /// and [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn set_sub_value(
        &mut self,
        row: usize,
        position: u8,
        width: u8,
        value: u32,
    ) -> Result<(), Defect> {
        validate_slice(position, width)?;
        let sub_value = u8::try_from(value)
            .ok()
            .filter(|sub| *sub <= max_sub_value(width))
            .ok_or(Defect::SubValueOutOfRange { value, width })?;

        let register = self.register_mut(row)?;
        let full = write_slice(register.value(), position, width, sub_value);
        register.set_value(full);
        log::debug!("register {row} [{position}+{width}] <- {sub_value} ({full:#010b})");
        Ok(())
    }

    /// Rebuilds the value at `row` from its bitfields in position order.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::RowOutOfBounds`] when `row` is past the end.
    pub fn recompose(&self, row: usize) -> Result<u8, Defect> {
        self.register(row).map(Register::recompose)
    }
}
