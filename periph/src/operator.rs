//! Operator interface: paper removal.
//!
//! The operator types `"chan,eq"` (octal) at the control panel; we
//! flush the printer's capture file, park it under a timestamped
//! archive name, and start a fresh capture file in its place.  Bad
//! parameters, a missing device, or an empty capture file produce a
//! log line and nothing else; the emulator never stops for an
//! operator mistake.
use std::fs::File;
use std::io::{Seek, Write};
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use tracing::{event, Level};

use base::prelude::*;

use crate::device::{DeviceFabric, DeviceKind, DeviceType};

/// Which printer family a paper-removal command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrinterKind {
    Lp1612,
    Lp5xx,
}

/// Remove the paper from the printer at `"chan,eq"`.
///
/// All failure modes are reported on the operator log; the call never
/// fails loudly.
pub fn remove_paper(fabric: &mut DeviceFabric, kind: PrinterKind, params: &str) {
    let (channel, eq_no) = match parse_chan_eq(params) {
        Some(addr) => addr,
        None => return,
    };
    let ty = match kind {
        PrinterKind::Lp1612 => DeviceType::Lp1612,
        PrinterKind::Lp5xx => DeviceType::Lp5xx,
    };
    let slot = match fabric.find_slot(channel, eq_no, ty) {
        Some(slot) => slot,
        None => {
            event!(
                Level::INFO,
                "no {:?} printer on channel {} equipment {:o}",
                kind,
                channel,
                eq_no
            );
            return;
        }
    };
    match &mut slot.kind {
        DeviceKind::Lp1612(printer) => printer.remove_paper(&slot.state),
        DeviceKind::Lp3000(printer) => printer.remove_paper(&slot.state),
        DeviceKind::Console(_) => unreachable!("find_slot matched the device type"),
    }
}

fn parse_chan_eq(params: &str) -> Option<(ChannelId, u8)> {
    let mut fields = params.split(',').map(str::trim);
    let channel = fields.next().map(str::parse::<ChannelId>);
    let eq = fields
        .next()
        .map(|field| u8::from_str_radix(field, 8));
    match (channel, eq) {
        (Some(Ok(channel)), Some(Ok(eq))) if eq < MAX_EQUIPMENT => Some((channel, eq)),
        (Some(Err(e)), _) => {
            event!(Level::INFO, "invalid channel no: {}", e);
            None
        }
        (_, Some(Ok(eq))) => {
            event!(Level::INFO, "invalid equipment no {:o}", eq);
            None
        }
        _ => {
            event!(Level::INFO, "not enough or invalid parameters");
            None
        }
    }
}

/// What the archive cycle did.
pub(crate) enum Rotation {
    /// Nothing has been printed since the last removal; the capture
    /// file was left alone.
    NoOutput,
    /// The capture file was archived under the returned name and a
    /// fresh one opened.
    Archived(PathBuf),
    /// The rename or reopen failed; details are on the operator log.
    Failed,
}

/// Flush and close the capture file, rename it to
/// `<dir>LP5xx_YYYYMMDD_hhmmss_NN<ext>`, and reopen `active` fresh.
///
/// The wall clock is re-read before each rename attempt so that a
/// retry one second later picks a new name; the suffix covers
/// collisions within one second.  On reopen failure `fcb` is left
/// `None`; every device callback checks for that.
pub(crate) fn archive_and_reopen(
    fcb: &mut Option<File>,
    active: &str,
    dir: &str,
    ext: &str,
) -> Rotation {
    let mut file = match fcb.take() {
        Some(file) => file,
        None => return Rotation::Failed,
    };
    if let Err(e) = file.flush() {
        event!(Level::WARN, "flush of '{}' failed: {}", active, e);
    }
    match file.stream_position() {
        Ok(0) => {
            // Nothing printed; keep using the same file.
            *fcb = Some(file);
            return Rotation::NoOutput;
        }
        Ok(_) => (),
        Err(e) => {
            event!(Level::WARN, "cannot tell position of '{}': {}", active, e);
        }
    }
    drop(file);

    let mut archived = None;
    for suffix in 0..100 {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let name = PathBuf::from(format!("{}LP5xx_{}_{:02}{}", dir, stamp, suffix, ext));
        match std::fs::rename(active, &name) {
            Ok(()) => {
                archived = Some(name);
                break;
            }
            Err(e) => {
                event!(
                    Level::WARN,
                    "could not rename '{}' to '{}' - {} (retrying)",
                    active,
                    name.display(),
                    e
                );
            }
        }
    }

    match File::create(active) {
        Ok(file) => {
            *fcb = Some(file);
        }
        Err(e) => {
            // Leave the slot without a file; callbacks will log and
            // do nothing until the operator intervenes.
            event!(Level::WARN, "failed to open {}: {}", active, e);
            return Rotation::Failed;
        }
    }
    match archived {
        Some(name) => Rotation::Archived(name),
        None => {
            event!(
                Level::WARN,
                "giving up renaming '{}' after 100 attempts",
                active
            );
            Rotation::Failed
        }
    }
}
