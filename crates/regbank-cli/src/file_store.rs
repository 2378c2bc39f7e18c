use std::fs;
use std::path::{Path, PathBuf};

use regbank_core::{Register, RegisterRecord, StorageAdapter, StorageError};
use serde::{Deserialize, Serialize};

/// Current register file format version.
pub const REGISTER_FILE_VERSION: u32 = 1;

/// On-disk register file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    /// Format version; must equal [`REGISTER_FILE_VERSION`].
    pub version: u32,
    /// Register records in row order.
    pub registers: Vec<RegisterRecord>,
}

/// Storage adapter reading and writing a pretty-printed JSON register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileDevice {
    path: PathBuf,
}

impl JsonFileDevice {
    /// Adapter for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the register file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `records` to the file, replacing it atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreFailed`] when the file cannot be written.
    pub fn write_records(&self, records: Vec<RegisterRecord>) -> Result<(), StorageError> {
        let failed = |err: &dyn std::fmt::Display| {
            StorageError::StoreFailed(format!("{}: {err}", self.path.display()))
        };
        let file = RegisterFile {
            version: REGISTER_FILE_VERSION,
            registers: records,
        };
        let raw = serde_json::to_string_pretty(&file).map_err(|err| failed(&err))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|err| failed(&err))?;
        fs::rename(&tmp, &self.path).map_err(|err| failed(&err))?;
        log::info!(
            "wrote {} registers to {}",
            file.registers.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl StorageAdapter for JsonFileDevice {
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError> {
        let failed = |err: &dyn std::fmt::Display| {
            StorageError::LoadFailed(format!("{}: {err}", self.path.display()))
        };
        let raw = fs::read_to_string(&self.path).map_err(|err| failed(&err))?;
        let file: RegisterFile = serde_json::from_str(&raw).map_err(|err| failed(&err))?;
        if file.version != REGISTER_FILE_VERSION {
            return Err(failed(&format!(
                "unsupported version {} (expected {REGISTER_FILE_VERSION})",
                file.version
            )));
        }
        log::info!(
            "read {} registers from {}",
            file.registers.len(),
            self.path.display()
        );
        Ok(file.registers)
    }

    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError> {
        self.write_records(registers.iter().map(RegisterRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileDevice, REGISTER_FILE_VERSION};
    use regbank_core::{
        validate_records, FieldValue, StorageAdapter, StorageError, TableDevice,
    };
    use std::fs;

    #[test]
    fn stored_registers_load_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut device = JsonFileDevice::new(dir.path().join("bank.json"));

        let records = TableDevice::layer_a().load().expect("layer A");
        let mut registers = validate_records(&records).expect("valid");
        registers[2].set_value(0x9C);
        device.store(&registers).expect("store");

        let loaded = validate_records(&device.load().expect("load")).expect("valid");
        assert_eq!(loaded, registers);
    }

    #[test]
    fn hand_written_integer_addresses_are_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bank.json");
        fs::write(
            &path,
            r#"{
  "version": 1,
  "registers": [
    {
      "name": "ctrl",
      "address": 4096,
      "bitfields": [{ "name": "all", "position": 0, "width": 8 }],
      "value": { "value": 7, "width": 8 }
    }
  ]
}"#,
        )
        .expect("write fixture");

        let records = JsonFileDevice::new(&path).load().expect("load");
        assert_eq!(records[0].address, FieldValue::Integer(4096));
        assert_eq!(validate_records(&records).expect("valid")[0].value(), 7);
    }

    #[test]
    fn missing_and_future_files_fail_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bank.json");
        let mut device = JsonFileDevice::new(&path);
        assert!(matches!(device.load(), Err(StorageError::LoadFailed(_))));

        fs::write(
            &path,
            format!(
                "{{\"version\": {}, \"registers\": []}}",
                REGISTER_FILE_VERSION + 1
            ),
        )
        .expect("write fixture");
        let Err(StorageError::LoadFailed(message)) = device.load() else {
            panic!("future version must not load");
        };
        assert!(message.contains("unsupported version 2"));
    }
}
