//! The prelude exports the types which are useful in representing
//! things to do with the 6000-series channel fabric.  Providing this
//! prelude is the main purpose of the base crate.
pub use super::types::{
    pack_chars, ChannelId, ChannelIdParseError, PpWord, MASK_12, MASK_6, MASK_9, MAX_CHANNELS,
    MAX_EQUIPMENT,
};
