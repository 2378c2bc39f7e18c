//! CLI entry point for the regbank register editor.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use regbank_cli::config::{parse_number, DeviceSelection};
use regbank_cli::file_store::JsonFileDevice;
use regbank_cli::render::{render_bank, render_editor, render_partitions};
use regbank_core::{
    enumerate_partitions, HeadlessEditor, Presentation, RegisterBank, RegisterRecord, SelfTest,
    SelfTestConfig, Session, SessionError, REGISTER_WIDTH,
};
use log as _;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: regbank <command> [options]

Commands:
  show       [--device <d>] [--row <n>]         Show all registers or one register
  set        <row> <value> [--device <d>]       Write a full register value
  set-field  <row> <field> <value> [--device <d>]
                                                Write one bitfield by name
  selftest   [--device <d>] [--seed <n>]        Run the model/editor self-test
  export     <output> [--device <d>]            Write the register list as JSON
  partitions [--width <n>]                      List bitfield partitions

Options:
  -d, --device <d>  demo (default), layer-a, layer-b, or a JSON file path
  -h, --help        Show this help message

Values accept decimal, 0x hexadecimal, or 0b binary.
Set RUST_LOG=info to see session and store logging.
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Show {
        device: DeviceSelection,
        row: Option<usize>,
    },
    Set {
        device: DeviceSelection,
        row: usize,
        value: u32,
    },
    SetField {
        device: DeviceSelection,
        row: usize,
        field: String,
        value: u32,
    },
    SelfTest {
        device: DeviceSelection,
        seed: Option<u64>,
    },
    Export {
        device: DeviceSelection,
        output: PathBuf,
    },
    Partitions {
        width: u8,
    },
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

/// Flags and positional arguments shared by every command.
#[derive(Debug, Default)]
struct RawArgs {
    device: DeviceSelection,
    row: Option<String>,
    seed: Option<String>,
    width: Option<String>,
    positional: Vec<String>,
}

#[allow(clippy::while_let_on_iterator)]
fn collect_args(mut args: impl Iterator<Item = OsString>) -> Result<RawArgs, String> {
    let mut raw = RawArgs::default();

    while let Some(arg) = args.next() {
        let arg = arg.to_string_lossy().to_string();
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        let slot = match arg.as_str() {
            "-d" | "--device" => None,
            "--row" => Some(&mut raw.row),
            "--seed" => Some(&mut raw.seed),
            "--width" => Some(&mut raw.width),
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("unknown option: {arg}"));
            }
            _ => {
                raw.positional.push(arg);
                continue;
            }
        };
        let value = args
            .next()
            .ok_or_else(|| format!("missing value for {arg}"))?
            .to_string_lossy()
            .to_string();
        match slot {
            Some(slot) => *slot = Some(value),
            None => {
                raw.device = value
                    .parse()
                    .map_err(|_| format!("invalid device: {value}"))?;
            }
        }
    }
    Ok(raw)
}

fn parse_row(text: &str) -> Result<usize, String> {
    text.parse().map_err(|_| format!("invalid row: {text}"))
}

fn expect_positional(raw: &RawArgs, names: &[&str]) -> Result<(), String> {
    if raw.positional.len() < names.len() {
        return Err(format!("missing {}", names[raw.positional.len()]));
    }
    if raw.positional.len() > names.len() {
        return Err(format!(
            "unexpected argument: {}",
            raw.positional[names.len()]
        ));
    }
    Ok(())
}

fn reject_flag(present: Option<&String>, flag: &str, command: &str) -> Result<(), String> {
    present.map_or(Ok(()), |_| {
        Err(format!("{flag} is not valid for {command}"))
    })
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();
    let raw = collect_args(args)?;

    let command = match command_str.as_str() {
        "show" => {
            expect_positional(&raw, &[])?;
            Command::Show {
                row: raw.row.as_deref().map(parse_row).transpose()?,
                device: raw.device,
            }
        }
        "set" => {
            expect_positional(&raw, &["row", "value"])?;
            Command::Set {
                row: parse_row(&raw.positional[0])?,
                value: parse_number(&raw.positional[1])?,
                device: raw.device,
            }
        }
        "set-field" => {
            expect_positional(&raw, &["row", "field", "value"])?;
            Command::SetField {
                row: parse_row(&raw.positional[0])?,
                field: raw.positional[1].clone(),
                value: parse_number(&raw.positional[2])?,
                device: raw.device,
            }
        }
        "selftest" => {
            expect_positional(&raw, &[])?;
            let seed = raw
                .seed
                .as_deref()
                .map(|text| text.parse().map_err(|_| format!("invalid seed: {text}")))
                .transpose()?;
            Command::SelfTest {
                device: raw.device,
                seed,
            }
        }
        "export" => {
            expect_positional(&raw, &["output path"])?;
            Command::Export {
                output: PathBuf::from(&raw.positional[0]),
                device: raw.device,
            }
        }
        "partitions" => {
            expect_positional(&raw, &[])?;
            let width = raw
                .width
                .as_deref()
                .map_or(Ok(REGISTER_WIDTH), |text| {
                    text.parse::<u8>()
                        .ok()
                        .filter(|width| *width <= REGISTER_WIDTH)
                        .ok_or_else(|| format!("invalid width: {text} (expected 0..=8)"))
                })?;
            Command::Partitions { width }
        }
        other => return Err(format!("unknown command: {other}")),
    };

    if !matches!(command, Command::Show { .. }) {
        reject_flag(raw.row.as_ref(), "--row", &command_str)?;
    }
    if !matches!(command, Command::SelfTest { .. }) {
        reject_flag(raw.seed.as_ref(), "--seed", &command_str)?;
    }
    if !matches!(command, Command::Partitions { .. }) {
        reject_flag(raw.width.as_ref(), "--width", &command_str)?;
    }
    Ok(ParseResult::Command(command))
}

/// Runs `work` inside a session on the selected device, reporting failures.
fn with_session<T>(
    device: &DeviceSelection,
    work: impl FnOnce(&mut RegisterBank) -> Result<T, SessionError>,
) -> Result<T, i32> {
    let mut adapter = device.adapter();
    Session::run(&mut adapter, work).map_err(|error| {
        eprintln!("error: {error}");
        1
    })
}

fn run_show(device: &DeviceSelection, row: Option<usize>) -> Result<(), i32> {
    let text = with_session(device, |bank| {
        let Some(row) = row else {
            return Ok(render_bank(bank));
        };
        let mut editor = HeadlessEditor::bind(bank)?;
        editor.select_register(bank, row)?;
        Ok(render_editor(&editor))
    })?;
    print!("{text}");
    Ok(())
}

fn run_set(device: &DeviceSelection, row: usize, value: u32) -> Result<(), i32> {
    let text = with_session(device, |bank| {
        let mut editor = HeadlessEditor::bind(bank)?;
        editor.select_register(bank, row)?;
        editor.enter_value(bank, value)?;
        Ok(render_editor(&editor))
    })?;
    print!("{text}");
    Ok(())
}

fn run_set_field(
    device: &DeviceSelection,
    row: usize,
    field: &str,
    value: u32,
) -> Result<(), i32> {
    let text = with_session(device, |bank| {
        let (position, width) = bank
            .find_bitfield(row, field)
            .map(|bitfield| (bitfield.position(), bitfield.width()))?;
        bank.set_sub_value(row, position, width, value)?;
        let mut editor = HeadlessEditor::bind(bank)?;
        editor.select_register(bank, row)?;
        Ok(render_editor(&editor))
    })?;
    print!("{text}");
    Ok(())
}

fn run_selftest(device: &DeviceSelection, seed: Option<u64>) -> Result<(), i32> {
    let report = with_session(device, |bank| {
        let mut editor = HeadlessEditor::bind(bank)?;
        SelfTest::with_config(SelfTestConfig { seed })
            .run(bank, &mut editor)
            .map_err(SessionError::from)
    })?;
    println!(
        "Self-test passed: {} registers, {} values, {} bitfield writes",
        report.registers, report.values, report.sub_value_writes
    );
    Ok(())
}

fn run_export(device: &DeviceSelection, output: PathBuf) -> Result<(), i32> {
    let records: Vec<RegisterRecord> = with_session(device, |bank| {
        Ok(bank.registers().iter().map(RegisterRecord::from).collect())
    })?;
    let count = records.len();
    let target = JsonFileDevice::new(output);
    if let Err(error) = target.write_records(records) {
        eprintln!("error: {error}");
        return Err(1);
    }
    println!("Exported {count} registers -> {}", target.path().display());
    Ok(())
}

fn run_partitions(width: u8) {
    print!("{}", render_partitions(enumerate_partitions(width).iter()));
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(command)) => {
            let outcome = match command {
                Command::Show { device, row } => run_show(&device, row),
                Command::Set { device, row, value } => run_set(&device, row, value),
                Command::SetField {
                    device,
                    row,
                    field,
                    value,
                } => run_set_field(&device, row, &field, value),
                Command::SelfTest { device, seed } => run_selftest(&device, seed),
                Command::Export { device, output } => run_export(&device, output),
                Command::Partitions { width } => {
                    run_partitions(width);
                    Ok(())
                }
            };
            match outcome {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use regbank_core::StorageProfile;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Result<ParseResult, String> {
        parse_args(args.iter().map(OsString::from))
    }

    fn command(args: &[&str]) -> Command {
        match parse(args).expect("arguments should parse") {
            ParseResult::Command(command) => command,
            ParseResult::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn parses_show_with_defaults() {
        assert_eq!(
            command(&["show"]),
            Command::Show {
                device: DeviceSelection::Builtin(StorageProfile::Demo),
                row: None,
            }
        );
    }

    #[test]
    fn parses_set_field_with_device_file() {
        assert_eq!(
            command(&["set-field", "2", "bit 1-3", "0b101", "--device", "bank.json"]),
            Command::SetField {
                device: DeviceSelection::File(PathBuf::from("bank.json")),
                row: 2,
                field: "bit 1-3".to_string(),
                value: 5,
            }
        );
    }

    #[test]
    fn parses_selftest_seed() {
        assert_eq!(
            command(&["selftest", "-d", "layer-a", "--seed", "42"]),
            Command::SelfTest {
                device: DeviceSelection::Builtin(StorageProfile::LayerA),
                seed: Some(42),
            }
        );
    }

    #[test]
    fn partitions_default_to_register_width() {
        assert_eq!(command(&["partitions"]), Command::Partitions { width: 8 });
        let error = parse(&["partitions", "--width", "9"]).expect_err("too wide");
        assert!(error.contains("invalid width"));
    }

    #[test]
    fn parses_help_flag() {
        assert!(matches!(parse(&["--help"]), Ok(ParseResult::Help)));
        let usage = parse(&["show", "-h"]).expect_err("help inside a command");
        assert!(usage.starts_with("Usage:"));
    }

    #[test]
    fn rejects_misplaced_and_missing_arguments() {
        let error = parse(&["set", "1"]).expect_err("missing value");
        assert_eq!(error, "missing value");

        let error = parse(&["show", "--seed", "1"]).expect_err("seed on show");
        assert!(error.contains("--seed is not valid for show"));

        let error = parse(&["export", "a.json", "b.json"]).expect_err("two outputs");
        assert!(error.contains("unexpected argument: b.json"));

        let error = parse(&["set", "1", "2", "--bogus"]).expect_err("unknown flag");
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse(&["unknown"]).expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }
}
