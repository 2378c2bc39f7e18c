//! Storage adapter contract and the built-in hardware layers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::Register;
use crate::record::RegisterRecord;

/// Procedurally generated demo device.
pub mod demo;
/// Intentionally malformed devices for failure-handling tests.
pub mod defect;
/// Fixed-table hardware layers.
pub mod table;

pub use defect::DefectDevice;
pub use demo::DemoDevice;
pub use table::TableDevice;

/// Adapter transport failure categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum StorageError {
    /// The backend could not produce a register list.
    #[error("failed to load register list: {0}")]
    LoadFailed(String),
    /// The backend could not accept a register list.
    #[error("failed to store register list: {0}")]
    StoreFailed(String),
}

/// Backend that supplies a register list at session start and takes it back
/// at session end.
pub trait StorageAdapter {
    /// Produces the initial register records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LoadFailed`] when the backend cannot produce
    /// the list.
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError>;

    /// Accepts the final register list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreFailed`] when the backend cannot accept
    /// the list.
    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError>;
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for Box<T> {
    fn load(&mut self) -> Result<Vec<RegisterRecord>, StorageError> {
        (**self).load()
    }

    fn store(&mut self, registers: &[Register]) -> Result<(), StorageError> {
        (**self).store(registers)
    }
}

/// Built-in adapter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StorageProfile {
    /// One register per bitfield partition of 8.
    #[default]
    Demo,
    /// Three-register fixed table.
    LayerA,
    /// Two-register fixed table.
    LayerB,
}

impl StorageProfile {
    /// Every built-in profile.
    pub const ALL: [Self; 3] = [Self::Demo, Self::LayerA, Self::LayerB];

    /// Stable profile name as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::LayerA => "layer-a",
            Self::LayerB => "layer-b",
        }
    }

    /// Instantiates the adapter for this profile.
    #[must_use]
    pub fn adapter(self) -> Box<dyn StorageAdapter> {
        match self {
            Self::Demo => Box::new(DemoDevice::new()),
            Self::LayerA => Box::new(TableDevice::layer_a()),
            Self::LayerB => Box::new(TableDevice::layer_b()),
        }
    }
}

impl fmt::Display for StorageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a profile name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown storage profile '{0}' (expected demo, layer-a, or layer-b)")]
pub struct UnknownProfile(pub String);

impl FromStr for StorageProfile {
    type Err = UnknownProfile;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.name() == name)
            .ok_or_else(|| UnknownProfile(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{StorageAdapter, StorageProfile, UnknownProfile};

    #[test]
    fn profile_names_round_trip() {
        for profile in StorageProfile::ALL {
            assert_eq!(profile.name().parse(), Ok(profile));
            assert_eq!(profile.to_string(), profile.name());
        }
        assert_eq!(
            "HardwareLayerA".parse::<StorageProfile>(),
            Err(UnknownProfile("HardwareLayerA".to_string()))
        );
    }

    #[test]
    fn profiles_build_adapters_with_expected_sizes() {
        let sizes: Vec<usize> = StorageProfile::ALL
            .into_iter()
            .map(|profile| profile.adapter().load().expect("built-in load").len())
            .collect();
        assert_eq!(sizes, vec![128, 3, 2]);
    }
}
