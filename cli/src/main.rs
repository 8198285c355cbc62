//! Command-line driver for the 6000-series peripheral core.
//!
//! Attaches a printer (and optionally a console) to the channel
//! fabric, replays a text file through it the way a PP driver would,
//! and can finish with an operator paper removal.  Mostly useful for
//! watching the capture files come out right without deadstarting a
//! whole mainframe.
mod screen;

use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{event, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

use base::charset::{ascii_to_cdc, ASCII_TO_EXT_BCD};
use base::prelude::*;
use periph::operator::{remove_paper, PrinterKind};
use periph::{ConsoleConfig, DeviceFabric, FC6681_OUTPUT};

use screen::TerminalScreen;

// 1612 function codes used by the job driver.
const FC_PRINT_SELECT: PpWord = 0o600;
const FC_PRINT_SINGLE_SPACE: PpWord = 0o601;

// Console: medium characters on the left screen.
const FC6612_SEL_32_CHAR_LEFT: PpWord = 0o7001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrinterModel {
    /// 3000-series printer with the 501 display-code train.
    Lp501,
    /// 3000-series printer with the 512 ASCII train.
    Lp512,
    /// The 6600's own 1612 printer.
    Lp1612,
}

/// Replay a print job through the emulated peripherals
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Channel number (octal) the printer is attached to
    #[arg(long, default_value = "6")]
    channel: String,

    /// Equipment number (octal)
    #[arg(long, default_value = "0")]
    equipment: String,

    /// Printer model
    #[arg(long, value_enum, default_value = "lp512")]
    printer: PrinterModel,

    /// Device parameter string: "path,controllerType,mode"
    #[arg(long, default_value = "")]
    device_params: String,

    /// Archive the capture file (operator paper removal) after the job
    #[arg(long)]
    remove_paper: bool,

    /// Hand archived print files to this application
    #[arg(long)]
    print_app: Option<PathBuf>,

    /// Also echo the job to a console on this channel (octal)
    #[arg(long)]
    console_channel: Option<String>,

    /// Text file to print; stdin when absent
    job: Option<OsString>,
}

fn parse_octal_u8(what: &str, s: &str) -> Result<u8, String> {
    u8::from_str_radix(s.trim(), 8).map_err(|e| format!("invalid {} '{}': {}", what, s, e))
}

fn read_job(job: Option<&OsString>) -> Result<String, std::io::Error> {
    match job {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Print one line the way the 3000-series drivers do: one output
/// function, the data words, then drop the channel so the postprint
/// spacing fires.
fn print_line_3000(
    fabric: &mut DeviceFabric,
    ch: ChannelId,
    model: PrinterModel,
    line: &str,
) {
    fabric.function(ch, FC6681_OUTPUT);
    match model {
        PrinterModel::Lp501 => {
            let bytes = line.as_bytes();
            for pair in bytes.chunks(2) {
                let high = ascii_to_cdc(pair[0]);
                let low = ascii_to_cdc(*pair.get(1).unwrap_or(&b' '));
                send_word(fabric, ch, pack_chars(high, low));
            }
        }
        PrinterModel::Lp512 => {
            for byte in line.bytes() {
                send_word(fabric, ch, PpWord::from(byte));
            }
        }
        PrinterModel::Lp1612 => unreachable!("the 1612 has its own driver"),
    }
    fabric.disconnect(ch);
}

/// Print one line on the 1612: characters under the select function,
/// then a single-space to advance.
fn print_line_1612(fabric: &mut DeviceFabric, ch: ChannelId, line: &str) {
    fabric.function(ch, FC_PRINT_SELECT);
    for byte in line.bytes() {
        send_word(fabric, ch, PpWord::from(ASCII_TO_EXT_BCD[usize::from(byte)]));
    }
    fabric.function(ch, FC_PRINT_SINGLE_SPACE);
    fabric.disconnect(ch);
}

/// Echo one line to the console as medium characters.
fn echo_line_console(fabric: &mut DeviceFabric, ch: ChannelId, line: &str) {
    fabric.function(ch, FC6612_SEL_32_CHAR_LEFT);
    let bytes = line.as_bytes();
    for pair in bytes.chunks(2) {
        let high = ascii_to_cdc(pair[0]);
        let low = ascii_to_cdc(*pair.get(1).unwrap_or(&b' '));
        send_word(fabric, ch, pack_chars(high, low));
    }
    fabric.disconnect(ch);
    // A data-free transaction asks the screen to repaint.
    fabric.activate(ch);
    fabric.disconnect(ch);
}

fn send_word(fabric: &mut DeviceFabric, ch: ChannelId, word: PpWord) {
    if !fabric.channel_mut(ch).put(word) {
        event!(Level::WARN, "channel {} was still full; dropping a word", ch);
        return;
    }
    fabric.io(ch);
}

fn run_driver() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // By default, display info messages.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let channel_no = parse_octal_u8("channel", &cli.channel)?;
    let channel =
        ChannelId::new(channel_no).ok_or_else(|| format!("channel {:o} out of range", channel_no))?;
    let eq_no = parse_octal_u8("equipment", &cli.equipment)?;

    let mut fabric = DeviceFabric::new();
    match cli.printer {
        PrinterModel::Lp501 => fabric.attach_lp501(channel, eq_no, 0, &cli.device_params)?,
        PrinterModel::Lp512 => fabric.attach_lp512(channel, eq_no, 0, &cli.device_params)?,
        PrinterModel::Lp1612 => fabric.attach_lp1612(channel, eq_no, 0, &cli.device_params)?,
    }
    if let Some(app) = cli.print_app.clone() {
        if !fabric.set_print_app(channel, eq_no, app) {
            event!(Level::WARN, "--print-app only applies to 3000-series printers");
        }
    }

    let console_channel = match cli.console_channel.as_deref() {
        Some(s) => {
            let n = parse_octal_u8("console channel", s)?;
            let ch = ChannelId::new(n).ok_or_else(|| format!("channel {:o} out of range", n))?;
            fabric.attach_console(ch, Box::new(TerminalScreen::new()), ConsoleConfig::default())?;
            Some(ch)
        }
        None => None,
    };

    let job = read_job(cli.job.as_ref())?;
    for line in job.lines() {
        match cli.printer {
            PrinterModel::Lp1612 => print_line_1612(&mut fabric, channel, line),
            model => print_line_3000(&mut fabric, channel, model, line),
        }
        if let Some(ch) = console_channel {
            echo_line_console(&mut fabric, ch, line);
        }
    }
    event!(Level::INFO, "job finished");

    if cli.remove_paper {
        let kind = match cli.printer {
            PrinterModel::Lp1612 => PrinterKind::Lp1612,
            _ => PrinterKind::Lp5xx,
        };
        remove_paper(
            &mut fabric,
            kind,
            &format!("{:o},{:o}", channel.number(), eq_no),
        );
    }
    Ok(())
}

fn main() {
    match run_driver() {
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Ok(()) => {}
    }
}
