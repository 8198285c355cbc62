//! 1612 line printer.
//!
//! The simple one: a single function code at a time, one external-BCD
//! character per channel word, no interrupts and no spacing memory.
//! Output goes to a capture file named `LP1612_C<CC>` in the
//! configured directory, either as plain ASCII or with ANSI/ASA
//! carriage control in column one.
//!
//! Function codes (the full 12-bit word is the code; the `x` digit is
//! the unit number on the channel, always 0 here):
//!
//! ```text
//! 06x0  select printer          06x4  move paper to top of form
//! 06x1  single space            06x5  print
//! 06x2  double space            06x6  suppress line advance
//! 06x3  move paper to format 7  06x7  status request
//! 0610..0616  clear format / format channel 1-6
//! ```
use std::fs::File;
use std::io::Write;

use tracing::{event, Level};

use base::charset::ext_bcd_to_ascii;
use base::prelude::*;

use crate::channel::Channel;
use crate::device::{
    ConfigError, DevSlot, Device, DeviceFabric, DeviceKind, DeviceType, FcStatus, SlotState,
};
use crate::operator::{self, Rotation};
use crate::params::{DeviceParams, OutputMode};

const FC_PRINT_SELECT: PpWord = 0o600;
const FC_PRINT_SINGLE_SPACE: PpWord = 0o601;
const FC_PRINT_DOUBLE_SPACE: PpWord = 0o602;
const FC_PRINT_MOVE_CHANNEL7: PpWord = 0o603;
const FC_PRINT_MOVE_TOF: PpWord = 0o604;
const FC_PRINT_PRINT: PpWord = 0o605;
const FC_PRINT_SUPPRESS_LF: PpWord = 0o606;
const FC_PRINT_STATUS_REQ: PpWord = 0o607;
const FC_PRINT_CLEAR_FORMAT: PpWord = 0o610;
const FC_PRINT_FORMAT6: PpWord = 0o616;

/// Status reply: 0o4000 is ready, 0 is not ready.
pub const ST_1612_READY: PpWord = 0o4000;

pub struct Lp1612 {
    use_ansi: bool,
    path: String,
    fcb: Option<File>,
}

impl DeviceFabric {
    /// Attach a 1612 printer.  `params` is the equipment parameter
    /// string `"path,controllerType,mode"`; the controller field is
    /// accepted and ignored, as the 1612 has no separate controller.
    pub fn attach_lp1612(
        &mut self,
        channel: ChannelId,
        eq_no: u8,
        unit_no: u8,
        params: &str,
    ) -> Result<(), ConfigError> {
        if eq_no != 0 || unit_no != 0 {
            return Err(ConfigError::HardwiredAddress {
                device: DeviceType::Lp1612,
                eq_no,
                unit_no,
            });
        }
        let params = DeviceParams::parse(params)?;
        let fname = capture_name(&params.path, channel);
        let fcb = File::create(&fname).map_err(|error| ConfigError::OutputFile {
            path: fname.clone().into(),
            error,
        })?;
        let printer = Lp1612 {
            use_ansi: params.mode == OutputMode::Ansi,
            path: params.path,
            fcb: Some(fcb),
        };
        self.add_slot(DevSlot::new(
            channel,
            eq_no,
            unit_no,
            DeviceKind::Lp1612(printer),
        ))?;
        event!(
            Level::INFO,
            "LP1612 initialised on channel {} equipment {:o} filename '{}'",
            channel,
            eq_no,
            fname
        );
        Ok(())
    }
}

fn capture_name(path: &str, channel: ChannelId) -> String {
    format!("{}LP1612_C{:02o}", path, channel.number())
}

impl Lp1612 {
    /// Guard used on entry to every callback: the capture file can be
    /// gone if a paper-removal reopen failed.
    fn fcb_missing(&self, st: &SlotState) -> bool {
        if self.fcb.is_none() {
            event!(
                Level::WARN,
                "LP1612: no capture file on channel {} equipment {:o}",
                st.channel,
                st.eq_no
            );
            true
        } else {
            false
        }
    }

    fn emit(&mut self, bytes: &[u8]) {
        if let Some(fcb) = self.fcb.as_mut() {
            if let Err(e) = fcb.write_all(bytes) {
                event!(Level::WARN, "LP1612: write to capture file failed: {}", e);
            }
        }
    }

    /// Operator paper removal: archive the capture file under a
    /// timestamped name and start a fresh one.
    pub(crate) fn remove_paper(&mut self, st: &SlotState) {
        let fname = capture_name(&self.path, st.channel);
        // The 1612 archive keeps the historical LP5xx stem and has no
        // .txt suffix.
        match operator::archive_and_reopen(&mut self.fcb, &fname, &self.path, "") {
            Rotation::NoOutput => {
                event!(
                    Level::INFO,
                    "LP1612: no output has been written on channel {} and equipment {:o}",
                    st.channel,
                    st.eq_no
                );
            }
            Rotation::Archived(archive) => {
                event!(
                    Level::INFO,
                    "LP1612: paper removed and available on '{}'",
                    archive.display()
                );
            }
            Rotation::Failed => {}
        }
    }
}

impl Device for Lp1612 {
    fn func(&mut self, st: &mut SlotState, chan: &mut Channel, code: PpWord) -> FcStatus {
        if self.fcb_missing(st) {
            return FcStatus::Processed;
        }
        let ansi = self.use_ansi;
        match code {
            FC_PRINT_SELECT => (),
            FC_PRINT_SINGLE_SPACE | FC_PRINT_MOVE_CHANNEL7 | FC_PRINT_PRINT => {
                self.emit(if ansi { b"\n " } else { b"\n" });
            }
            FC_PRINT_DOUBLE_SPACE => {
                self.emit(if ansi { b"\n0" } else { b"\n\n" });
            }
            FC_PRINT_MOVE_TOF => {
                self.emit(if ansi { b"\n1" } else { b"\x0c" });
            }
            FC_PRINT_SUPPRESS_LF => {
                // Handled right here, nothing to latch.
                self.emit(if ansi { b"\n+" } else { b"\r" });
                return FcStatus::Processed;
            }
            FC_PRINT_STATUS_REQ => {
                chan.status = ST_1612_READY;
            }
            FC_PRINT_CLEAR_FORMAT..=FC_PRINT_FORMAT6 => (),
            _ => {
                return FcStatus::Declined;
            }
        }
        st.fcode = code;
        FcStatus::Accepted
    }

    fn io(&mut self, st: &mut SlotState, chan: &mut Channel) {
        if self.fcb_missing(st) {
            return;
        }
        match st.fcode {
            FC_PRINT_STATUS_REQ => {
                // The reply is whatever the channel status happens to
                // hold; the function path stored the ready bit there.
                chan.data = chan.status;
                chan.full = true;
                st.fcode = 0;
                chan.status = 0;
            }
            _ => {
                if chan.full {
                    let ch = ext_bcd_to_ascii((chan.data & MASK_6) as u8);
                    self.emit(&[ch]);
                    chan.full = false;
                }
            }
        }
    }

    fn disconnect(&mut self, st: &mut SlotState, _chan: &mut Channel) {
        // The 1612 defers no spacing to disconnect.
        self.fcb_missing(st);
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Lp1612
    }

    fn name(&self) -> String {
        "1612 line printer".to_string()
    }
}
