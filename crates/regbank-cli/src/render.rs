use std::fmt::Write as _;

use regbank_core::{Control, HeadlessEditor, Presentation, RegisterBank};

/// One line per register: row, address, name, and value.
#[must_use]
pub fn render_bank(bank: &RegisterBank) -> String {
    let mut out = String::new();
    for (row, register) in bank.registers().iter().enumerate() {
        let _ = writeln!(
            out,
            "{row:>3}  0x{:04x}  {:<10} 0b{:08b}  ({} fields)",
            register.address(),
            register.name(),
            register.value(),
            register.bitfields().len()
        );
    }
    out
}

/// Editor view of the selected register: labels, value box, and controls.
#[must_use]
pub fn render_editor(editor: &HeadlessEditor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", editor.name_label());
    let _ = writeln!(out, "{}", editor.address_label());
    let value = editor.displayed_value();
    let _ = writeln!(out, "Value: {value} (0x{value:02x}, 0b{value:08b})");
    for field in editor.fields() {
        let _ = writeln!(
            out,
            "  {:<10} [{}+{}]  {}",
            field.name(),
            field.position(),
            field.width(),
            render_control(field.control())
        );
    }
    out
}

fn render_control(control: &Control) -> String {
    match *control {
        Control::Toggle { checked } => Control::toggle_text(checked).to_string(),
        Control::Choice { options, selected } => {
            format!("choice {selected} of 0..{}", options.saturating_sub(1))
        }
        Control::Slider { min, max, position } => format!("slider {position} in {min}..={max}"),
    }
}

/// Partition list: one width sequence per line, then the count.
#[must_use]
pub fn render_partitions<'a>(partitions: impl ExactSizeIterator<Item = &'a Vec<u8>>) -> String {
    let count = partitions.len();
    let mut out = String::new();
    for widths in partitions {
        let line: Vec<String> = widths.iter().map(u8::to_string).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    let _ = writeln!(out, "{count} partitions");
    out
}
