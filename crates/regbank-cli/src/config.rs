use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

use regbank_core::{StorageAdapter, StorageProfile};

use crate::file_store::JsonFileDevice;

/// Device named by `--device`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelection {
    /// One of the built-in hardware layers.
    Builtin(StorageProfile),
    /// A JSON register file.
    File(PathBuf),
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self::Builtin(StorageProfile::default())
    }
}

impl DeviceSelection {
    /// Builds the adapter for this selection.
    #[must_use]
    pub fn adapter(&self) -> Box<dyn StorageAdapter> {
        match self {
            Self::Builtin(profile) => profile.adapter(),
            Self::File(path) => Box::new(JsonFileDevice::new(path.clone())),
        }
    }
}

impl FromStr for DeviceSelection {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(value
            .parse::<StorageProfile>()
            .map_or_else(|_| Self::File(PathBuf::from(value)), Self::Builtin))
    }
}

/// Parses a decimal, `0x` hexadecimal, or `0b` binary number.
///
/// # Errors
///
/// Returns a message naming the rejected text.
pub fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(bits) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u32::from_str_radix(bits, 2)
    } else {
        text.parse()
    };
    parsed.map_err(|_| format!("invalid number: {text}"))
}

#[cfg(test)]
mod tests {
    use super::{parse_number, DeviceSelection};
    use regbank_core::StorageProfile;
    use std::path::PathBuf;

    #[test]
    fn builtin_names_select_profiles() {
        assert_eq!(
            "layer-b".parse(),
            Ok(DeviceSelection::Builtin(StorageProfile::LayerB))
        );
        assert_eq!(
            DeviceSelection::default(),
            DeviceSelection::Builtin(StorageProfile::Demo)
        );
    }

    #[test]
    fn other_names_are_file_paths() {
        assert_eq!(
            "bank.json".parse(),
            Ok(DeviceSelection::File(PathBuf::from("bank.json")))
        );
    }

    #[test]
    fn numbers_accept_common_radixes() {
        assert_eq!(parse_number("200"), Ok(200));
        assert_eq!(parse_number("0xA5"), Ok(0xA5));
        assert_eq!(parse_number("0b1010"), Ok(10));
        assert_eq!(parse_number("0xZZ"), Err("invalid number: 0xZZ".to_string()));
    }
}
