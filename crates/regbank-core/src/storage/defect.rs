use crate::model::Register;
use crate::record::{BitVector, BitfieldRecord, FieldValue, RegisterRecord};
use crate::storage::{StorageAdapter, StorageError};

/// Device whose single register record carries one deliberate defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectDevice {
    /// Name is the integer `42`.
    IntegerName,
    /// Address is the integer `66666`, beyond 16 bits.
    OversizedAddress,
    /// Second bitfield declares width 22 at position 1.
    OversizedBitfield,
    /// Value is the text `"DEFECT"`.
    TextValue,
}

impl DefectDevice {
    /// Every defect scenario.
    pub const ALL: [Self; 4] = [
        Self::IntegerName,
        Self::OversizedAddress,
        Self::OversizedBitfield,
        Self::TextValue,
    ];

    /// The malformed record this device loads.
    #[must_use]
    pub fn record(self) -> RegisterRecord {
        let mut record = RegisterRecord {
            name: "defect".into(),
            address: BitVector::new(1, 16).into(),
            bitfields: vec![
                BitfieldRecord::new("bit 0", 0, 1),
                BitfieldRecord::new("bits 1-7", 1, 7),
            ],
            value: BitVector::new(0, 8).into(),
        };
        match self {
            Self::IntegerName => record.name = FieldValue::Integer(42),
            Self::OversizedAddress => record.address = FieldValue::Integer(66_666),
            Self::OversizedBitfield => record.bitfields[1].width = 22,
            Self::TextValue => record.value = "DEFECT".into(),
        }
        record
    }
}

impl StorageAdapter for DefectDevice {
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError> {
        Ok(vec![self.record()])
    }

    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError> {
        log::debug!("{self:?} discarded {} registers", registers.len());
        Ok(())
    }
}
