//! The numbered 12-bit I/O channels.
//!
//! A channel is the only path between a Peripheral Processor and a
//! peripheral: one data word, one `full` flag, one status word.  The
//! PP and the device alternate as producer and consumer on `full`; a
//! writer must find the channel empty before it may deposit the next
//! word.
use base::prelude::*;

#[derive(Debug)]
pub struct Channel {
    pub id: ChannelId,
    /// The word in flight, valid while `full` is set.
    pub data: PpWord,
    /// Set by the producer after writing `data`, cleared by the
    /// consumer after draining it.
    pub full: bool,
    pub status: PpWord,
}

impl Channel {
    pub fn new(id: ChannelId) -> Channel {
        Channel {
            id,
            data: 0,
            full: false,
            status: 0,
        }
    }

    /// Deposit a word on the channel.  Returns false (and changes
    /// nothing) if the previous word has not been drained yet.
    pub fn put(&mut self, word: PpWord) -> bool {
        if self.full {
            false
        } else {
            self.data = word & MASK_12;
            self.full = true;
            true
        }
    }

    /// Drain the word currently on the channel, if any.
    pub fn take(&mut self) -> Option<PpWord> {
        if self.full {
            self.full = false;
            Some(self.data)
        } else {
            None
        }
    }
}

/// All channels of the mainframe, indexed by [`ChannelId`].
#[derive(Debug)]
pub struct ChannelSet {
    channels: Vec<Channel>,
}

impl ChannelSet {
    pub fn new() -> ChannelSet {
        ChannelSet {
            channels: (0..MAX_CHANNELS)
                .map(|n| Channel::new(ChannelId::new(n).expect("n is below MAX_CHANNELS")))
                .collect(),
        }
    }

    pub fn get(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    pub fn get_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.channels[id.index()]
    }
}

impl Default for ChannelSet {
    fn default() -> ChannelSet {
        Self::new()
    }
}
