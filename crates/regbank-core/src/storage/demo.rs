use crate::bits::{ADDRESS_WIDTH, REGISTER_WIDTH};
use crate::model::Register;
use crate::partition::enumerate_partitions;
use crate::record::{BitVector, BitfieldRecord, RegisterRecord};
use crate::storage::{StorageAdapter, StorageError};

/// Demo device holding one register for every bitfield partition of 8, so
/// that every control kind appears in every position.
#[derive(Debug, Clone, Default)]
pub struct DemoDevice {
    registers: Vec<RegisterRecord>,
}

impl DemoDevice {
    /// Creates an empty device; registers are generated on load.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registers: Vec::new(),
        }
    }

    /// Records currently held by the device (after a load or store).
    #[must_use]
    pub fn registers(&self) -> &[RegisterRecord] {
        &self.registers
    }

    /// Generates the full register list, in partition order.
    ///
    /// Register `i` is named `reg i`, lives at address `i`, and holds zero.
    #[must_use]
    pub fn build_registers() -> Vec<RegisterRecord> {
        enumerate_partitions(REGISTER_WIDTH)
            .iter()
            .zip(0u16..)
            .map(|(widths, address)| generate_register(address, widths))
            .collect()
    }
}

/// Builds one register record laying `widths` out from the most significant
/// bit.
#[must_use]
pub fn generate_register(address: u16, widths: &[u8]) -> RegisterRecord {
    let mut position = 0i64;
    let bitfields = widths
        .iter()
        .map(|width| {
            let width = i64::from(*width);
            let field = BitfieldRecord::new(
                format!("bit {position}-{}", position + width - 1),
                position,
                width,
            );
            position += width;
            field
        })
        .collect();

    RegisterRecord {
        name: format!("reg {address}").into(),
        address: BitVector::new(u64::from(address), ADDRESS_WIDTH).into(),
        bitfields,
        value: BitVector::new(0, REGISTER_WIDTH).into(),
    }
}

impl StorageAdapter for DemoDevice {
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError> {
        self.registers = Self::build_registers();
        log::info!("demo device generated {} registers", self.registers.len());
        Ok(self.registers.clone())
    }

    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError> {
        for register in registers {
            log::info!(
                "Register 0x{:04x}: {:<7} = 0b{:08b}",
                register.address(),
                register.name(),
                register.value()
            );
        }
        self.registers = registers.iter().map(RegisterRecord::from).collect();
        Ok(())
    }
}
