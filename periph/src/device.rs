//! The device-slot registry and the channel/device protocol.
//!
//! Every peripheral plugs into the fabric through the same four
//! operations: a function code is presented (`func`), zero or more
//! words move across the channel (`io`), and the PP finally drops the
//! channel (`disconnect`).  `activate` is the PP selecting the
//! channel and is a no-op for most devices.
//!
//! A transaction is single-threaded: per (channel, equipment, unit)
//! the four callbacks are totally ordered and observe one latched
//! function code at a time.  Across devices nothing is ordered; the
//! executive simply interleaves.
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{event, Level};

use base::prelude::*;

use crate::channel::{Channel, ChannelSet};
use crate::dev_console::Console;
use crate::dev_lp1612::Lp1612;
use crate::dev_lp3000::Lp3000;

/// Outcome of presenting a function code to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FcStatus {
    /// The code was latched; subsequent I/O cycles belong to it.
    Accepted,
    /// The code was handled synchronously and not latched.
    Processed,
    /// The code means nothing to this device.
    Declined,
}

/// The kind of peripheral occupying a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceType {
    Console,
    Lp1612,
    Lp5xx,
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            DeviceType::Console => "console",
            DeviceType::Lp1612 => "lp1612",
            DeviceType::Lp5xx => "lp5xx",
        })
    }
}

/// Addressing and transaction state common to every slot.  The
/// device-specific context lives in [`DeviceKind`]; this part is what
/// the executive and the operator interface need to see.
#[derive(Debug)]
pub struct SlotState {
    pub channel: ChannelId,
    pub eq_no: u8,
    pub unit_no: u8,
    /// The currently latched function code, 0 when idle.
    pub fcode: PpWord,
    /// Aggregate device-interrupt summary presented to the PP.
    pub interrupt: bool,
}

/// The capability set every emulated peripheral implements.
pub trait Device {
    fn func(&mut self, st: &mut SlotState, chan: &mut Channel, code: PpWord) -> FcStatus;
    fn io(&mut self, st: &mut SlotState, chan: &mut Channel);
    fn activate(&mut self, _st: &mut SlotState, _chan: &mut Channel) {}
    fn disconnect(&mut self, st: &mut SlotState, chan: &mut Channel);
    fn device_type(&self) -> DeviceType;
    fn name(&self) -> String;
}

/// Tagged device variants.  The executive dispatches through
/// [`Device`]; the operator interface matches on the variant when it
/// needs a concrete device (paper removal).
pub enum DeviceKind {
    Console(Console),
    Lp1612(Lp1612),
    Lp3000(Lp3000),
}

impl DeviceKind {
    pub(crate) fn as_device(&mut self) -> &mut dyn Device {
        match self {
            DeviceKind::Console(dev) => dev,
            DeviceKind::Lp1612(dev) => dev,
            DeviceKind::Lp3000(dev) => dev,
        }
    }

    fn device_type(&self) -> DeviceType {
        match self {
            DeviceKind::Console(_) => DeviceType::Console,
            DeviceKind::Lp1612(_) => DeviceType::Lp1612,
            DeviceKind::Lp3000(_) => DeviceType::Lp5xx,
        }
    }
}

impl fmt::Debug for DeviceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "<device: {}>", self.device_type())
    }
}

/// One attached device: shared slot state plus the device context.
#[derive(Debug)]
pub struct DevSlot {
    pub state: SlotState,
    pub kind: DeviceKind,
}

impl DevSlot {
    pub(crate) fn new(channel: ChannelId, eq_no: u8, unit_no: u8, kind: DeviceKind) -> DevSlot {
        DevSlot {
            state: SlotState {
                channel,
                eq_no,
                unit_no,
                fcode: 0,
                interrupt: false,
            },
            kind,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.kind.device_type()
    }

    fn func(&mut self, chan: &mut Channel, code: PpWord) -> FcStatus {
        self.kind.as_device().func(&mut self.state, chan, code)
    }

    fn io(&mut self, chan: &mut Channel) {
        self.kind.as_device().io(&mut self.state, chan)
    }

    fn activate(&mut self, chan: &mut Channel) {
        self.kind.as_device().activate(&mut self.state, chan)
    }

    fn disconnect(&mut self, chan: &mut Channel) {
        self.kind.as_device().disconnect(&mut self.state, chan)
    }
}

/// A fatal problem while attaching a device at initialisation time.
#[derive(Debug)]
pub enum ConfigError {
    /// Only one unit of a device type is possible per equipment.
    DuplicateUnit {
        device: DeviceType,
        channel: ChannelId,
        eq_no: u8,
    },
    UnknownControllerType(String),
    /// The 1612 is hardwired to equipment 0, unit 0.
    HardwiredAddress {
        device: DeviceType,
        eq_no: u8,
        unit_no: u8,
    },
    OutputFile {
        path: PathBuf,
        error: io::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigError::DuplicateUnit {
                device,
                channel,
                eq_no,
            } => {
                write!(
                    f,
                    "only one {} unit is possible per equipment (channel {} equipment {:o})",
                    device, channel, eq_no
                )
            }
            ConfigError::UnknownControllerType(name) => {
                write!(f, "unrecognized printer controller type {}", name)
            }
            ConfigError::HardwiredAddress {
                device,
                eq_no,
                unit_no,
            } => {
                write!(
                    f,
                    "{} is hardwired to equipment 0 unit 0, not {:o}/{:o}",
                    device, eq_no, unit_no
                )
            }
            ConfigError::OutputFile { path, error } => {
                write!(f, "failed to open {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The channels and the devices attached to them.  The executive
/// drives PP channel instructions through this; the initialisation
/// layer builds it with the `attach_*` functions on the device
/// modules.
#[derive(Debug)]
pub struct DeviceFabric {
    channels: ChannelSet,
    slots: Vec<DevSlot>,
    /// Per channel, the slot the last function call selected for I/O.
    active: [Option<usize>; MAX_CHANNELS as usize],
}

impl DeviceFabric {
    pub fn new() -> DeviceFabric {
        DeviceFabric {
            channels: ChannelSet::new(),
            slots: Vec::new(),
            active: [None; MAX_CHANNELS as usize],
        }
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        self.channels.get(id)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        self.channels.get_mut(id)
    }

    /// Locate the slot for (channel, equipment, device type), as the
    /// operator interface addresses devices.
    pub fn find_slot(
        &mut self,
        channel: ChannelId,
        eq_no: u8,
        ty: DeviceType,
    ) -> Option<&mut DevSlot> {
        self.slots.iter_mut().find(|slot| {
            slot.state.channel == channel
                && slot.state.eq_no == eq_no
                && slot.kind.device_type() == ty
        })
    }

    /// True while the equipment on this channel has its interrupt
    /// summary raised.
    pub fn interrupt_summary(&self, channel: ChannelId) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.state.channel == channel && slot.state.interrupt)
    }

    pub(crate) fn add_slot(&mut self, slot: DevSlot) -> Result<(), ConfigError> {
        let ty = slot.kind.device_type();
        if self
            .slots
            .iter()
            .any(|s| {
                s.state.channel == slot.state.channel
                    && s.state.eq_no == slot.state.eq_no
                    && s.kind.device_type() == ty
            })
        {
            return Err(ConfigError::DuplicateUnit {
                device: ty,
                channel: slot.state.channel,
                eq_no: slot.state.eq_no,
            });
        }
        self.slots.push(slot);
        Ok(())
    }

    /// Present a function code on a channel.  Slots are offered the
    /// code in attachment order; the first that does not decline
    /// becomes the channel's I/O device.
    pub fn function(&mut self, channel: ChannelId, code: PpWord) -> FcStatus {
        let code = code & MASK_12;
        let DeviceFabric {
            channels,
            slots,
            active,
        } = self;
        let chan = channels.get_mut(channel);
        for (idx, slot) in slots.iter_mut().enumerate() {
            if slot.state.channel != channel {
                continue;
            }
            let presented = match route_code(slot, code) {
                Some(presented) => presented,
                None => continue,
            };
            match slot.func(chan, presented) {
                FcStatus::Declined => continue,
                status => {
                    active[channel.index()] = Some(idx);
                    return status;
                }
            }
        }
        event!(
            Level::WARN,
            "function {:04o} declined by all devices on channel {}",
            code,
            channel
        );
        FcStatus::Declined
    }

    /// Run one I/O cycle for the channel's selected device.
    pub fn io(&mut self, channel: ChannelId) {
        let DeviceFabric {
            channels,
            slots,
            active,
        } = self;
        if let Some(idx) = active[channel.index()] {
            slots[idx].io(channels.get_mut(channel));
        }
    }

    /// The PP selected the channel.
    pub fn activate(&mut self, channel: ChannelId) {
        let DeviceFabric {
            channels,
            slots,
            active,
        } = self;
        if let Some(idx) = active[channel.index()] {
            slots[idx].activate(channels.get_mut(channel));
        }
    }

    /// The PP released the channel; the selected device finalises any
    /// deferred work.
    pub fn disconnect(&mut self, channel: ChannelId) {
        let DeviceFabric {
            channels,
            slots,
            active,
        } = self;
        if let Some(idx) = active[channel.index()] {
            slots[idx].disconnect(channels.get_mut(channel));
        }
    }
}

impl Default for DeviceFabric {
    fn default() -> DeviceFabric {
        Self::new()
    }
}

/// On the wire a 3000-series function word carries the equipment
/// select in its high six bits; the device sees only the low six.
/// The data-channel-converter codes (0o1xxx) pass through whole.
fn route_code(slot: &DevSlot, code: PpWord) -> Option<PpWord> {
    match slot.kind {
        DeviceKind::Lp3000(_) if code < 0o1000 => {
            let eq = ((code >> 6) & 0o7) as u8;
            if eq == slot.state.eq_no {
                Some(code & MASK_6)
            } else {
                None
            }
        }
        _ => Some(code),
    }
}
