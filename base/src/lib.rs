//! The `base` crate defines the 6000-series things which are useful
//! in both the peripheral core and other associated tools.  The idea
//! is that if you want to write a print-file decoder or a channel
//! trace formatter, it would depend on the base crate but would not
//! need to depend on the emulation library itself.

mod types;

pub mod charset;
pub mod prelude;

pub use types::{ChannelId, ChannelIdParseError, PpWord};
