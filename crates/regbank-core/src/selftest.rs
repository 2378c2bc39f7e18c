//! Exhaustive model/presentation cross-check.
//!
//! For every register the runner checks the labels and the control layout,
//! then walks all 256 full values. After each full-value entry every bitfield
//! is written through its control with a random target and read back; after
//! each such write the displayed and recomposed values are compared with the
//! model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::bank::RegisterBank;
use crate::model::Bitfield;
use crate::presentation::{format_address_label, format_name_label, Presentation};
use crate::Defect;

/// Randomness configuration for a self-test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SelfTestConfig {
    /// Seed for reproducible sub-value targets; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl SelfTestConfig {
    /// Configuration with a fixed seed.
    #[must_use]
    pub const fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Builds the generator this configuration describes.
    #[must_use]
    pub fn rng(self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}

/// Counters of a passed self-test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SelfTestReport {
    /// Registers checked.
    pub registers: usize,
    /// Full values entered across all registers.
    pub values: usize,
    /// Bitfield writes performed through controls.
    pub sub_value_writes: usize,
}

/// First failed check of a self-test run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelfTestFailure {
    /// Bank-wide check failed before any register ran.
    #[error("self-test failed: {0}")]
    Bank(#[source] Defect),
    /// Check failed for one register.
    #[error("self-test failed at register {row}: {defect}")]
    Register {
        /// Row of the failing register.
        row: usize,
        /// Failed check.
        #[source]
        defect: Defect,
    },
}

impl SelfTestFailure {
    /// Failed check.
    #[must_use]
    pub const fn defect(&self) -> &Defect {
        match self {
            Self::Bank(defect) | Self::Register { defect, .. } => defect,
        }
    }
}

/// Self-test runner over a random source.
#[derive(Debug, Clone)]
pub struct SelfTest<R: Rng> {
    rng: R,
}

impl SelfTest<StdRng> {
    /// Runner seeded as `config` describes.
    #[must_use]
    pub fn with_config(config: SelfTestConfig) -> Self {
        Self::new(config.rng())
    }
}

impl<R: Rng> SelfTest<R> {
    /// Runner drawing targets from `rng`.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Checks every register of `bank` through `view`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check; no further registers run after it.
    pub fn run<P: Presentation + ?Sized>(
        &mut self,
        bank: &mut RegisterBank,
        view: &mut P,
    ) -> Result<SelfTestReport, SelfTestFailure> {
        if view.register_count() != bank.len() {
            return Err(SelfTestFailure::Bank(Defect::RegisterCountMismatch {
                shown: view.register_count(),
                expected: bank.len(),
            }));
        }

        let mut report = SelfTestReport::default();
        for row in 0..bank.len() {
            self.check_register(bank, view, row, &mut report)
                .map_err(|defect| SelfTestFailure::Register { row, defect })?;
            report.registers += 1;
            log::info!("register {row}: OK");
        }
        Ok(report)
    }

    fn check_register<P: Presentation + ?Sized>(
        &mut self,
        bank: &mut RegisterBank,
        view: &mut P,
        row: usize,
        report: &mut SelfTestReport,
    ) -> Result<(), Defect> {
        view.select_register(bank, row)?;

        let expected = format_name_label(bank.register_name(row)?);
        if view.name_label() != expected {
            return Err(Defect::NameLabelMismatch {
                shown: view.name_label().to_string(),
                expected,
            });
        }
        let expected = format_address_label(bank.register_address(row)?);
        if view.address_label() != expected {
            return Err(Defect::AddressLabelMismatch {
                shown: view.address_label().to_string(),
                expected,
            });
        }

        let fields = bank.bitfields(row)?.to_vec();
        if view.control_count() != fields.len() {
            return Err(Defect::ControlCountMismatch {
                shown: view.control_count(),
                expected: fields.len(),
            });
        }

        for value in 0..=u8::MAX {
            view.enter_value(bank, u32::from(value))?;
            let read = bank.value(row)?;
            if read != value {
                return Err(Defect::FullValueMismatch {
                    written: value,
                    read,
                });
            }

            for (index, field) in fields.iter().enumerate() {
                self.check_field(bank, view, row, index, field)?;
                check_full_value(bank, view, row)?;
                report.sub_value_writes += 1;
            }
            report.values += 1;
        }
        Ok(())
    }

    fn check_field<P: Presentation + ?Sized>(
        &mut self,
        bank: &mut RegisterBank,
        view: &mut P,
        row: usize,
        index: usize,
        field: &Bitfield,
    ) -> Result<(), Defect> {
        let (shown_kind, shown_value) = view
            .control(index)
            .map(|control| (control.kind(), control.current_sub_value()))
            .ok_or(Defect::NoSuchControl {
                index,
                count: view.control_count(),
            })?;

        let expected_kind = field.control_kind();
        if shown_kind != expected_kind {
            return Err(Defect::ControlKindMismatch {
                index,
                shown: shown_kind,
                expected: expected_kind,
            });
        }
        let expected_value = bank.sub_value(row, field.position(), field.width())?;
        if shown_value != expected_value {
            return Err(Defect::ControlValueMismatch {
                index,
                shown: shown_value,
                expected: expected_value,
            });
        }

        let target = self.rng.gen_range(0..=field.max_value());
        view.operate_control(bank, index, target)?;
        let read = bank.sub_value(row, field.position(), field.width())?;
        if read != target {
            return Err(Defect::RoundTripMismatch {
                index,
                written: target,
                read,
            });
        }
        Ok(())
    }
}

/// Compares the value box and the recomposed bitfields with the stored value.
fn check_full_value<P: Presentation + ?Sized>(
    bank: &RegisterBank,
    view: &P,
    row: usize,
) -> Result<(), Defect> {
    let stored = bank.value(row)?;
    if view.displayed_value() != stored {
        return Err(Defect::DisplayedValueMismatch {
            shown: view.displayed_value(),
            expected: stored,
        });
    }
    let recomposed = bank.recompose(row)?;
    if recomposed != stored {
        return Err(Defect::RecomposedValueMismatch { recomposed, stored });
    }
    Ok(())
}
