use thiserror::Error;

use crate::control::ControlKind;

/// Defect classes used for reporting and test policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DefectKind {
    /// Register or bitfield layout violates the model invariants.
    Structural,
    /// A full-value, sub-value, or row argument is outside its legal range.
    Range,
    /// Presentation state disagrees with the model.
    Consistency,
    /// Adapter data has the wrong representation.
    TypeMismatch,
}

/// Every way an edit, load, or self-test step can fail.
///
/// Operations abort on the first defect; nothing is recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    /// A load-time defect attributed to one adapter record.
    #[error("register {row}: {defect}")]
    Record {
        /// Row of the offending record in the loaded list.
        row: usize,
        /// The defect found in that record.
        #[source]
        defect: Box<Defect>,
    },

    /// Register name is not text.
    #[error("register name is not text")]
    NameNotText,
    /// Register address is neither an integer nor a 16-bit vector.
    #[error("register address is not an integer or a 16-bit vector")]
    AddressNotInteger,
    /// Register value is not a bit vector of the register width.
    #[error("register value is not an 8-bit vector")]
    ValueNotBitVector,

    /// Register address does not fit the 16-bit address width.
    #[error("address {address} does not fit in 16 bits")]
    AddressOutOfRange {
        /// Address as supplied.
        address: i64,
    },
    /// Bitfield position or width leaves the register.
    #[error("bitfield '{name}' at position {position} with width {width} exceeds the register")]
    BitfieldOutOfBounds {
        /// Bitfield name.
        name: String,
        /// Declared position.
        position: i64,
        /// Declared width.
        width: i64,
    },
    /// Bitfield shares bits with an earlier bitfield of the same register.
    #[error("bitfield '{name}' overlaps another bitfield")]
    BitfieldOverlap {
        /// Bitfield name.
        name: String,
    },
    /// Bitfield widths do not cover the register exactly.
    #[error("bitfield widths sum to {total}, expected 8")]
    WidthSumMismatch {
        /// Sum of all declared widths.
        total: i64,
    },
    /// Slice arguments to a sub-value operation leave the register.
    #[error("slice at position {position} with width {width} is not inside the register")]
    InvalidSlice {
        /// Requested position.
        position: u8,
        /// Requested width.
        width: u8,
    },
    /// No control kind exists for the width.
    #[error("no control kind for bitfield width {width}")]
    InvalidControlWidth {
        /// Requested width.
        width: u8,
    },

    /// Full-value write outside `0..=255`.
    #[error("value {value} is outside 0..=255")]
    ValueOutOfRange {
        /// Value as supplied.
        value: u32,
    },
    /// Sub-value write outside `0..=2^width - 1`.
    #[error("value {value} conflicts with bit width {width}")]
    SubValueOutOfRange {
        /// Value as supplied.
        value: u32,
        /// Slice width.
        width: u8,
    },
    /// Row index past the end of the register list.
    #[error("row {row} is out of bounds for {len} registers")]
    RowOutOfBounds {
        /// Requested row.
        row: usize,
        /// Number of registers in the bank.
        len: usize,
    },
    /// No bitfield of the register has the requested name.
    #[error("register {row} has no bitfield '{name}'")]
    UnknownBitfield {
        /// Register row searched.
        row: usize,
        /// Requested bitfield name.
        name: String,
    },
    /// Edit attempted while the presentation has no register selected.
    #[error("no register is selected")]
    NoRegisterSelected,
    /// Control index past the controls of the selected register.
    #[error("no bitfield control {index}; the selected register has {count}")]
    NoSuchControl {
        /// Requested control index.
        index: usize,
        /// Number of controls shown.
        count: usize,
    },

    /// Presentation lists a different number of registers than the bank holds.
    #[error("presentation lists {shown} registers, model holds {expected}")]
    RegisterCountMismatch {
        /// Count reported by the presentation.
        shown: usize,
        /// Count held by the bank.
        expected: usize,
    },
    /// Name label disagrees with the model.
    #[error("name label reads '{shown}', expected '{expected}'")]
    NameLabelMismatch {
        /// Label text shown.
        shown: String,
        /// Label text derived from the model.
        expected: String,
    },
    /// Address label disagrees with the model.
    #[error("address label reads '{shown}', expected '{expected}'")]
    AddressLabelMismatch {
        /// Label text shown.
        shown: String,
        /// Label text derived from the model.
        expected: String,
    },
    /// Number of bitfield controls disagrees with the model.
    #[error("presentation shows {shown} bitfield controls, model has {expected}")]
    ControlCountMismatch {
        /// Controls shown.
        shown: usize,
        /// Bitfields in the model.
        expected: usize,
    },
    /// Control kind does not match the width rule.
    #[error("bitfield {index} uses a {shown} control, expected {expected}")]
    ControlKindMismatch {
        /// Bitfield index within the register.
        index: usize,
        /// Kind the presentation built.
        shown: ControlKind,
        /// Kind required by the width.
        expected: ControlKind,
    },
    /// Control shows a different sub-value than the model holds.
    #[error("bitfield {index} control shows {shown}, model holds {expected}")]
    ControlValueMismatch {
        /// Bitfield index within the register.
        index: usize,
        /// Sub-value displayed.
        shown: u8,
        /// Sub-value in the model.
        expected: u8,
    },
    /// Writing through a control did not reach the model.
    #[error("bitfield {index} was set to {written} but the model reads {read}")]
    RoundTripMismatch {
        /// Bitfield index within the register.
        index: usize,
        /// Sub-value written through the control.
        written: u8,
        /// Sub-value read back from the model.
        read: u8,
    },
    /// Full-value entry did not reach the model.
    #[error("value {written} was entered but the model reads {read}")]
    FullValueMismatch {
        /// Value entered.
        written: u8,
        /// Value read back from the model.
        read: u8,
    },
    /// Displayed full value disagrees with the model.
    #[error("value display shows {shown}, model holds {expected}")]
    DisplayedValueMismatch {
        /// Value displayed.
        shown: u8,
        /// Value in the model.
        expected: u8,
    },
    /// Bitfields reassembled in position order disagree with the stored value.
    #[error("bitfields recompose to {recomposed:#010b}, stored value is {stored:#010b}")]
    RecomposedValueMismatch {
        /// Value rebuilt from the bitfields.
        recomposed: u8,
        /// Value stored in the register.
        stored: u8,
    },
}

impl Defect {
    /// Attributes a defect to one record of a loaded register list.
    #[must_use]
    pub fn in_record(self, row: usize) -> Self {
        Self::Record {
            row,
            defect: Box::new(self),
        }
    }

    /// Returns the defect class for reporting.
    #[must_use]
    pub fn kind(&self) -> DefectKind {
        match self {
            Self::Record { defect, .. } => defect.kind(),
            Self::NameNotText | Self::AddressNotInteger | Self::ValueNotBitVector => {
                DefectKind::TypeMismatch
            }
            Self::AddressOutOfRange { .. }
            | Self::BitfieldOutOfBounds { .. }
            | Self::BitfieldOverlap { .. }
            | Self::WidthSumMismatch { .. }
            | Self::InvalidSlice { .. }
            | Self::InvalidControlWidth { .. } => DefectKind::Structural,
            Self::ValueOutOfRange { .. }
            | Self::SubValueOutOfRange { .. }
            | Self::RowOutOfBounds { .. }
            | Self::UnknownBitfield { .. }
            | Self::NoRegisterSelected
            | Self::NoSuchControl { .. } => DefectKind::Range,
            Self::RegisterCountMismatch { .. }
            | Self::NameLabelMismatch { .. }
            | Self::AddressLabelMismatch { .. }
            | Self::ControlCountMismatch { .. }
            | Self::ControlKindMismatch { .. }
            | Self::ControlValueMismatch { .. }
            | Self::RoundTripMismatch { .. }
            | Self::FullValueMismatch { .. }
            | Self::DisplayedValueMismatch { .. }
            | Self::RecomposedValueMismatch { .. } => DefectKind::Consistency,
        }
    }
}
