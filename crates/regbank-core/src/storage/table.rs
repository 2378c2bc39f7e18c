use crate::bits::{ADDRESS_WIDTH, REGISTER_WIDTH};
use crate::model::Register;
use crate::record::{BitVector, BitfieldRecord, RegisterRecord};
use crate::storage::{StorageAdapter, StorageError};

/// Hardware layer backed by a fixed register table owned by the instance.
///
/// A store replaces the table, so a later load returns the stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDevice {
    label: &'static str,
    registers: Vec<RegisterRecord>,
}

fn entry(name: &str, address: u16, fields: &[(&str, i64, i64)]) -> RegisterRecord {
    RegisterRecord {
        name: name.into(),
        address: BitVector::new(u64::from(address), ADDRESS_WIDTH).into(),
        bitfields: fields
            .iter()
            .map(|(field, position, width)| BitfieldRecord::new(*field, *position, *width))
            .collect(),
        value: BitVector::new(0, REGISTER_WIDTH).into(),
    }
}

impl TableDevice {
    /// Creates a device over an arbitrary table.
    #[must_use]
    pub const fn new(label: &'static str, registers: Vec<RegisterRecord>) -> Self {
        Self { label, registers }
    }

    /// Layer A: a toggle with a ranged field, a full-width slider, and a
    /// toggle/choice/ranged mix.
    #[must_use]
    pub fn layer_a() -> Self {
        Self::new(
            "layer A",
            vec![
                entry("reg 1", 1, &[("bit 0", 0, 1), ("bits 1-7", 1, 7)]),
                entry("reg 2", 2, &[("slider", 0, 8)]),
                entry(
                    "reg 3",
                    3,
                    &[("bit 0", 0, 1), ("bit 1-3", 1, 3), ("bit 4-8", 4, 4)],
                ),
            ],
        )
    }

    /// Layer B: the first two registers of layer A.
    #[must_use]
    pub fn layer_b() -> Self {
        Self::new(
            "layer B",
            vec![
                entry("reg 1", 1, &[("bit 0", 0, 1), ("bits 1-7", 1, 7)]),
                entry("reg 2", 2, &[("slider", 0, 8)]),
            ],
        )
    }

    /// Human-readable layer name used in log lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Current table contents.
    #[must_use]
    pub fn registers(&self) -> &[RegisterRecord] {
        &self.registers
    }
}

impl StorageAdapter for TableDevice {
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError> {
        log::info!("loading {} registers from {}", self.registers.len(), self.label);
        Ok(self.registers.clone())
    }

    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError> {
        log::info!("storing {} registers through {}", registers.len(), self.label);
        self.registers = registers.iter().map(RegisterRecord::from).collect();
        Ok(())
    }
}
