//! Emulation core for the CDC 6000-series peripherals: the numbered
//! PP channels, the device-slot registry, the 1612 and 3000-series
//! line printers, and the 6612 operator console.
//!
//! The executive drives everything through [`DeviceFabric`]: a PP
//! transaction is one `function` call, zero or more `io` cycles
//! moving 12-bit words over the channel's `data`/`full` pair, and a
//! final `disconnect`.  Printed output lands in capture files on the
//! host; console output goes to whatever implements
//! [`screen::Screen`].
//!
//! Device callbacks run to completion and never block; the only
//! cross-thread structure is the keyboard ring in [`keyboard`].
#![crate_name = "periph"]

mod channel;
mod dev_console;
mod dev_lp1612;
mod dev_lp3000;
mod device;
pub mod keyboard;
pub mod operator;
pub mod params;
pub mod screen;

pub use channel::{Channel, ChannelSet};
pub use dev_console::{AutoDateConfig, Console, ConsoleConfig};
pub use dev_lp1612::{Lp1612, ST_1612_READY};
pub use dev_lp3000::{
    HeadModel, Lp3000, FC6681_DEV_STATUS_REQ, FC6681_MASTER_CLEAR, FC6681_OUTPUT, ST_INT_END,
    ST_INT_READY, ST_PRINT_READY,
};
pub use device::{
    ConfigError, DevSlot, Device, DeviceFabric, DeviceKind, DeviceType, FcStatus, SlotState,
};
