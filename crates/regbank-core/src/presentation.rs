//! Presentation boundary and a headless editor that mirrors a widget tree.
//!
//! A presentation never mutates registers on its own: every edit is
//! forwarded to the [`RegisterBank`] and followed by a full refresh of the
//! selected register, so labels, the value box, and every control always show
//! the model state.

use crate::bank::RegisterBank;
use crate::bits::REGISTER_WIDTH;
use crate::control::{BitfieldControl, Control};
use crate::model::Bitfield;
use crate::Defect;

/// Text of the name label for a register name.
#[must_use]
pub fn format_name_label(name: &str) -> String {
    format!("Register: {name}")
}

/// Text of the address label for a register address.
#[must_use]
pub fn format_address_label(address: u16) -> String {
    format!("Address: 0x{address:04x}")
}

/// What a register editor shows and how it forwards edits.
pub trait Presentation {
    /// Number of registers listed for selection.
    fn register_count(&self) -> usize;

    /// Selects `row` and rebuilds labels and controls from `bank`.
    ///
    /// # Errors
    ///
    /// Returns a [`Defect`] when the row does not exist or its register
    /// cannot be shown.
    fn select_register(&mut self, bank: &RegisterBank, row: usize) -> Result<(), Defect>;

    /// Currently selected row.
    fn selected_row(&self) -> Option<usize>;

    /// Name label text.
    fn name_label(&self) -> &str;

    /// Address label text.
    fn address_label(&self) -> &str;

    /// Full value shown in the value box.
    fn displayed_value(&self) -> u8;

    /// Enters a full value for the selected register.
    ///
    /// # Errors
    ///
    /// Returns a [`Defect`] when no register is selected or the bank rejects
    /// the value.
    fn enter_value(&mut self, bank: &mut RegisterBank, value: u32) -> Result<(), Defect>;

    /// Number of bitfield controls shown.
    fn control_count(&self) -> usize;

    /// Control for bitfield `index` of the selected register.
    fn control(&self, index: usize) -> Option<&dyn BitfieldControl>;

    /// Moves control `index` to `value` and writes the control's new value
    /// into the bitfield.
    ///
    /// # Errors
    ///
    /// Returns a [`Defect`] when the control does not exist or the bank
    /// rejects the sub-value.
    fn operate_control(
        &mut self,
        bank: &mut RegisterBank,
        index: usize,
        value: u8,
    ) -> Result<(), Defect>;
}

/// One bitfield as laid out in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    name: String,
    position: u8,
    width: u8,
    control: Control,
}

impl FieldView {
    /// Bitfield name shown next to the control.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MSB-first position of the field.
    #[must_use]
    pub const fn position(&self) -> u8 {
        self.position
    }

    /// Field width.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Control state.
    #[must_use]
    pub const fn control(&self) -> &Control {
        &self.control
    }
}

/// Widget-free [`Presentation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessEditor {
    register_count: usize,
    selected: Option<usize>,
    name_label: String,
    address_label: String,
    value: u8,
    fields: Vec<FieldView>,
}

impl HeadlessEditor {
    /// Attaches an editor to `bank`, selecting the first register if any.
    ///
    /// # Errors
    ///
    /// Returns a [`Defect`] when the first register cannot be shown.
    pub fn bind(bank: &RegisterBank) -> Result<Self, Defect> {
        let mut editor = Self {
            register_count: bank.len(),
            ..Self::default()
        };
        if !bank.is_empty() {
            editor.select_register(bank, 0)?;
        }
        Ok(editor)
    }

    /// Bitfield views of the selected register.
    #[must_use]
    pub fn fields(&self) -> &[FieldView] {
        &self.fields
    }

    const fn selected(&self) -> Result<usize, Defect> {
        match self.selected {
            Some(row) => Ok(row),
            None => Err(Defect::NoRegisterSelected),
        }
    }

    fn build_fields(bitfields: &[Bitfield]) -> Result<Vec<FieldView>, Defect> {
        let total: i64 = bitfields
            .iter()
            .map(|field| i64::from(field.width()))
            .sum();
        if total != i64::from(REGISTER_WIDTH) {
            return Err(Defect::WidthSumMismatch { total });
        }

        bitfields
            .iter()
            .map(|field| {
                Ok(FieldView {
                    name: field.name().to_string(),
                    position: field.position(),
                    width: field.width(),
                    control: Control::for_width(field.width())?,
                })
            })
            .collect()
    }

    fn refresh(&mut self, bank: &RegisterBank) -> Result<(), Defect> {
        let row = self.selected()?;
        let register = bank.register(row)?;
        self.name_label = format_name_label(register.name());
        self.address_label = format_address_label(register.address());
        self.value = register.value();
        for field in &mut self.fields {
            let sub_value = bank.sub_value(row, field.position, field.width)?;
            field.control.display_sub_value(sub_value);
        }
        Ok(())
    }
}

impl Presentation for HeadlessEditor {
    fn register_count(&self) -> usize {
        self.register_count
    }

    fn select_register(&mut self, bank: &RegisterBank, row: usize) -> Result<(), Defect> {
        let fields = Self::build_fields(bank.bitfields(row)?)?;
        self.register_count = bank.len();
        self.selected = Some(row);
        self.fields = fields;
        self.refresh(bank)
    }

    fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    fn name_label(&self) -> &str {
        &self.name_label
    }

    fn address_label(&self) -> &str {
        &self.address_label
    }

    fn displayed_value(&self) -> u8 {
        self.value
    }

    fn enter_value(&mut self, bank: &mut RegisterBank, value: u32) -> Result<(), Defect> {
        let row = self.selected()?;
        bank.set_value(row, value)?;
        self.refresh(bank)
    }

    fn control_count(&self) -> usize {
        self.fields.len()
    }

    fn control(&self, index: usize) -> Option<&dyn BitfieldControl> {
        self.fields
            .get(index)
            .map(|field| &field.control as &dyn BitfieldControl)
    }

    fn operate_control(
        &mut self,
        bank: &mut RegisterBank,
        index: usize,
        value: u8,
    ) -> Result<(), Defect> {
        let row = self.selected()?;
        let count = self.fields.len();
        let field = self
            .fields
            .get_mut(index)
            .ok_or(Defect::NoSuchControl { index, count })?;
        field.control.display_sub_value(value);
        let sub_value = field.control.current_sub_value();
        bank.set_sub_value(row, field.position, field.width, u32::from(sub_value))?;
        self.refresh(bank)
    }
}
