//! Core register-bank model, presentation boundary, and self-test for
//! byte-wide hardware registers partitioned into bitfields.

/// MSB-first bit-slice algebra and register width constants.
pub mod bits;
pub use bits::{
    max_sub_value, read_slice, slice_mask, validate_slice, write_slice, ADDRESS_WIDTH,
    REGISTER_WIDTH,
};

/// Defect taxonomy shared by validation, editing, and self-test.
pub mod fault;
pub use fault::{Defect, DefectKind};

/// Width-to-control policy and headless control state.
pub mod control;
pub use control::{BitfieldControl, Control, ControlKind, CHOICE_MAX_WIDTH};

/// Typed register and bitfield model.
pub mod model;
pub use model::{validate_layout, Bitfield, Register, RegisterList};

/// Adapter-facing records and load-time validation.
pub mod record;
pub use record::{validate_records, BitVector, BitfieldRecord, FieldValue, RegisterRecord};

/// Ordered bitfield partitions of a register width.
pub mod partition;
pub use partition::enumerate_partitions;

/// In-memory register bank.
pub mod bank;
pub use bank::RegisterBank;

/// Storage adapter contract and built-in devices.
pub mod storage;
pub use storage::{
    DefectDevice, DemoDevice, StorageAdapter, StorageError, StorageProfile, TableDevice,
    UnknownProfile,
};

/// Presentation boundary and the headless editor.
pub mod presentation;
pub use presentation::{
    format_address_label, format_name_label, FieldView, HeadlessEditor, Presentation,
};

/// Exhaustive model/presentation self-test.
pub mod selftest;
pub use selftest::{SelfTest, SelfTestConfig, SelfTestFailure, SelfTestReport};

/// Scoped load/edit/store sessions.
pub mod session;
pub use session::{Session, SessionError};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
