//! Width-to-control policy and the headless bitfield controls.

use std::fmt;

use crate::bits::{max_sub_value, REGISTER_WIDTH};
use crate::Defect;

/// Widest bitfield still edited through a choice control.
pub const CHOICE_MAX_WIDTH: u8 = 3;

/// Kind of control a presentation uses for one bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ControlKind {
    /// Binary on/off button for single-bit fields.
    Toggle,
    /// Enumerated choice of `0..options`.
    Choice {
        /// Number of selectable values (`2^width`).
        options: u16,
    },
    /// Slider-like control over `min..=max`.
    Ranged {
        /// Lowest selectable value.
        min: u8,
        /// Highest selectable value (`2^width - 1`).
        max: u8,
    },
}

impl ControlKind {
    /// Selects the control kind for a bitfield width.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::InvalidControlWidth`] for width 0 or widths above the
    /// register width.
    pub const fn for_width(width: u8) -> Result<Self, Defect> {
        match width {
            1 => Ok(Self::Toggle),
            2..=CHOICE_MAX_WIDTH => Ok(Self::Choice {
                options: 1 << width,
            }),
            4..=REGISTER_WIDTH => Ok(Self::Ranged {
                min: 0,
                max: max_sub_value(width),
            }),
            _ => Err(Defect::InvalidControlWidth { width }),
        }
    }

    /// Largest value the control can show.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_value(self) -> u8 {
        match self {
            Self::Toggle => 1,
            Self::Choice { options } => options.saturating_sub(1) as u8,
            Self::Ranged { max, .. } => max,
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => write!(f, "toggle"),
            Self::Choice { options } => write!(f, "choice of {options}"),
            Self::Ranged { min, max } => write!(f, "ranged {min}..={max}"),
        }
    }
}

/// Presentation-side handle for one bitfield.
///
/// A control only holds what it shows; writes to the model go through the
/// presentation that owns it.
pub trait BitfieldControl {
    /// Returns the kind of this control.
    fn kind(&self) -> ControlKind;
    /// Renders `value` on the control.
    fn display_sub_value(&mut self, value: u8);
    /// Returns the value the control currently shows.
    fn current_sub_value(&self) -> u8;
}

/// Headless control state mirroring a button, combo box, or slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Checkable button.
    Toggle {
        /// Button is pressed.
        checked: bool,
    },
    /// Combo box with one entry per value.
    Choice {
        /// Number of entries.
        options: u16,
        /// Index of the selected entry.
        selected: u16,
    },
    /// Horizontal slider.
    Slider {
        /// Lower bound.
        min: u8,
        /// Upper bound.
        max: u8,
        /// Handle position.
        position: u8,
    },
}

impl Control {
    /// Builds the control the width rule asks for, showing zero.
    ///
    /// # Errors
    ///
    /// Returns [`Defect::InvalidControlWidth`] when no control kind exists for
    /// `width`.
    pub fn for_width(width: u8) -> Result<Self, Defect> {
        ControlKind::for_width(width).map(Self::from_kind)
    }

    /// Builds a control of a given kind, showing zero.
    #[must_use]
    pub const fn from_kind(kind: ControlKind) -> Self {
        match kind {
            ControlKind::Toggle => Self::Toggle { checked: false },
            ControlKind::Choice { options } => Self::Choice {
                options,
                selected: 0,
            },
            ControlKind::Ranged { min, max } => Self::Slider {
                min,
                max,
                position: min,
            },
        }
    }

    /// Text a button shows for its state.
    #[must_use]
    pub const fn toggle_text(checked: bool) -> &'static str {
        if checked {
            "HIGH"
        } else {
            "LOW"
        }
    }
}

impl BitfieldControl for Control {
    fn kind(&self) -> ControlKind {
        match *self {
            Self::Toggle { .. } => ControlKind::Toggle,
            Self::Choice { options, .. } => ControlKind::Choice { options },
            Self::Slider { min, max, .. } => ControlKind::Ranged { min, max },
        }
    }

    fn display_sub_value(&mut self, value: u8) {
        match self {
            Self::Toggle { checked } => *checked = value != 0,
            Self::Choice { options, selected } => {
                *selected = u16::from(value).min(options.saturating_sub(1));
            }
            Self::Slider { min, max, position } => *position = value.clamp(*min, *max),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn current_sub_value(&self) -> u8 {
        match *self {
            Self::Toggle { checked } => u8::from(checked),
            Self::Choice { selected, .. } => selected as u8,
            Self::Slider { position, .. } => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BitfieldControl, Control, ControlKind};
    use crate::Defect;
    use rstest::rstest;

    #[rstest]
    #[case(1, ControlKind::Toggle)]
    #[case(2, ControlKind::Choice { options: 4 })]
    #[case(3, ControlKind::Choice { options: 8 })]
    #[case(4, ControlKind::Ranged { min: 0, max: 15 })]
    #[case(5, ControlKind::Ranged { min: 0, max: 31 })]
    #[case(7, ControlKind::Ranged { min: 0, max: 127 })]
    #[case(8, ControlKind::Ranged { min: 0, max: 255 })]
    fn width_selects_control_kind(#[case] width: u8, #[case] expected: ControlKind) {
        assert_eq!(ControlKind::for_width(width), Ok(expected));
        assert_eq!(
            u16::from(expected.max_value()) + 1,
            1u16 << width,
            "control must cover every sub-value"
        );
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    #[case(22)]
    fn unsupported_widths_are_rejected(#[case] width: u8) {
        assert_eq!(
            ControlKind::for_width(width),
            Err(Defect::InvalidControlWidth { width })
        );
        assert!(Control::for_width(width).is_err());
    }

    #[test]
    fn controls_start_at_zero_and_report_their_kind() {
        for width in 1..=8 {
            let control = Control::for_width(width).expect("valid width");
            assert_eq!(control.current_sub_value(), 0);
            assert_eq!(Ok(control.kind()), ControlKind::for_width(width));
        }
    }

    #[test]
    fn controls_clamp_what_they_cannot_show() {
        let mut toggle = Control::for_width(1).expect("toggle");
        toggle.display_sub_value(1);
        assert_eq!(toggle.current_sub_value(), 1);
        toggle.display_sub_value(0);
        assert_eq!(toggle.current_sub_value(), 0);

        let mut choice = Control::for_width(2).expect("choice");
        choice.display_sub_value(9);
        assert_eq!(choice.current_sub_value(), 3);

        let mut slider = Control::for_width(4).expect("slider");
        slider.display_sub_value(200);
        assert_eq!(slider.current_sub_value(), 15);
    }

    #[test]
    fn toggle_text_follows_button_state() {
        assert_eq!(Control::toggle_text(true), "HIGH");
        assert_eq!(Control::toggle_text(false), "LOW");
    }
}
