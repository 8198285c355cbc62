//! 6612 operator console.
//!
//! Two logical screens sit side by side; a function code picks the
//! character generator (dot plotting or one of three text sizes) and
//! the screen, and each data word is then either two display-code
//! characters or a coordinate: high six bits below 0o60 are text, 0o60
//! to 0o67 set the horizontal position, 0o70 and up the vertical.
//! Rendering goes through the [`Screen`] abstraction; keyboard input
//! comes either from the host window system or from the asynchronous
//! key ring.
//!
//! The autodate matcher watches medium-font text for the system's
//! "ENTER DATE" prompt and, when the whole prompt has crossed the
//! screen while the keyboard is idle, types the date and time back at
//! it.  DSD supplies the punctuation, so the injected text is just
//! `YYMMDD` and `HHMMSS`, each ended with a carriage return; the year
//! is overridden because the operating systems of this era have firm
//! opinions about which years exist.
use chrono::Local;
use tracing::{event, Level};

use base::charset::{ascii_to_cdc, ascii_to_console, console_to_ascii};
use base::prelude::*;

use crate::channel::Channel;
use crate::device::{
    ConfigError, DevSlot, Device, DeviceFabric, DeviceKind, DeviceType, FcStatus, SlotState,
};
use crate::keyboard::{key_ring, KeyConsumer, KeyProducer};
use crate::screen::{Font, Screen, OFF_LEFT_SCREEN, OFF_RIGHT_SCREEN};

const FC6612_SEL_64_CHAR_LEFT: PpWord = 0o7000;
const FC6612_SEL_32_CHAR_LEFT: PpWord = 0o7001;
const FC6612_SEL_16_CHAR_LEFT: PpWord = 0o7002;
const FC6612_SEL_512_DOTS_LEFT: PpWord = 0o7010;
const FC6612_SEL_KEY_IN: PpWord = 0o7020;
const FC6612_SEL_64_CHAR_RIGHT: PpWord = 0o7100;
const FC6612_SEL_32_CHAR_RIGHT: PpWord = 0o7101;
const FC6612_SEL_16_CHAR_RIGHT: PpWord = 0o7102;
const FC6612_SEL_512_DOTS_RIGHT: PpWord = 0o7110;

/// Console behaviour settings, fixed at attach time.
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfig {
    /// When set, watch for the date prompt and answer it.
    pub auto_date: Option<AutoDateConfig>,
}

#[derive(Debug, Clone)]
pub struct AutoDateConfig {
    /// The prompt to watch for, e.g. `"ENTER DATE"`.
    pub pattern: String,
    /// Two digits that replace the real year, e.g. `"70"`.
    pub year: String,
}

pub struct Console {
    screen: Box<dyn Screen>,
    keys: KeyConsumer,
    /// Producer half used by the autodate injector.  The windowing
    /// layer holds its own clone; the two never push at the same time
    /// because injection only happens while the keyboard is idle.
    injector: KeyProducer,
    current_font: Font,
    current_offset: u16,
    /// Set on activate, cleared by any data word; a transaction that
    /// moved nothing asks the screen to repaint instead.
    empty_drop: bool,
    auto_date: bool,
    auto_date_string: Vec<u8>,
    auto_year: Vec<u8>,
    auto_pos: usize,
}

impl DeviceFabric {
    /// Attach the console.  Returns the keyboard producer for the
    /// windowing layer to feed.
    pub fn attach_console(
        &mut self,
        channel: ChannelId,
        screen: Box<dyn Screen>,
        config: ConsoleConfig,
    ) -> Result<KeyProducer, ConfigError> {
        let (producer, consumer) = key_ring();
        let console = Console {
            screen,
            keys: consumer,
            injector: producer.clone(),
            current_font: Font::Small,
            current_offset: OFF_LEFT_SCREEN,
            empty_drop: false,
            auto_date: config.auto_date.is_some(),
            auto_date_string: config
                .auto_date
                .as_ref()
                .map(|ad| ad.pattern.clone().into_bytes())
                .unwrap_or_default(),
            auto_year: config
                .auto_date
                .as_ref()
                .map(|ad| ad.year.clone().into_bytes())
                .unwrap_or_default(),
            auto_pos: 0,
        };
        self.add_slot(DevSlot::new(channel, 0, 0, DeviceKind::Console(console)))?;
        event!(Level::INFO, "console initialised on channel {}", channel);
        Ok(producer)
    }
}

impl Console {
    /// The character generator currently selected, for front ends
    /// that size their drawing by it.
    pub fn current_font(&self) -> Font {
        self.current_font
    }

    /// One character-mode data word: either two characters for the
    /// current row or a coordinate move.
    fn char_word(&mut self, data: PpWord) {
        let high = ((data >> 6) & MASK_6) as u8;
        if high >= 0o60 {
            if high >= 0o70 {
                self.screen.set_y(data & MASK_9);
            } else {
                self.screen.set_x((data & MASK_9) + self.current_offset);
            }
        } else {
            self.screen.queue(console_to_ascii(high));
            self.screen.queue(console_to_ascii((data & MASK_6) as u8));
        }
    }

    /// One dot-mode data word: only the coordinates matter, and a
    /// vertical move plots a dot.
    fn dot_word(&mut self, data: PpWord) {
        let high = ((data >> 6) & MASK_6) as u8;
        if high >= 0o60 {
            if high >= 0o70 {
                self.screen.set_y(data & MASK_9);
                self.screen.queue(b'.');
            } else {
                self.screen.set_x((data & MASK_9) + self.current_offset);
            }
        }
    }

    /// Watch medium-font text for the date prompt.
    fn auto_date_check(&mut self, fcode: PpWord, data: PpWord) {
        if !self.auto_date {
            return;
        }
        if fcode != FC6612_SEL_32_CHAR_LEFT && fcode != FC6612_SEL_32_CHAR_RIGHT {
            self.auto_pos = 0;
            return;
        }
        // Out-of-range pattern positions read as NUL, whose display
        // code is 0.
        let pattern_at = |pos: usize| -> u8 {
            self.auto_date_string.get(pos).copied().unwrap_or(0)
        };
        let high = ((data >> 6) & MASK_6) as u8;
        let low = (data & MASK_6) as u8;
        if high == ascii_to_cdc(pattern_at(self.auto_pos))
            && low == ascii_to_cdc(pattern_at(self.auto_pos + 1))
        {
            if self.auto_pos + 2 >= self.auto_date_string.len() {
                // The whole prompt has gone by.  Answer it, provided
                // there is no typeahead in the way.
                self.auto_date = false;
                if self.keys.is_empty() {
                    self.inject_date();
                }
            } else {
                self.auto_pos += 2;
            }
        } else {
            self.auto_pos = 0;
        }
    }

    fn inject_date(&mut self) {
        // DSD supplies the punctuation.
        let mut text = Local::now()
            .format("%y%m%d\n%H%M%S\n")
            .to_string()
            .into_bytes();
        for (byte, year) in text.iter_mut().zip(self.auto_year.iter()) {
            *byte = *year;
        }
        event!(Level::INFO, "console: answering the date prompt");
        for byte in text {
            self.injector.push(ascii_to_console(byte));
        }
    }
}

impl Device for Console {
    fn func(&mut self, st: &mut SlotState, chan: &mut Channel, code: PpWord) -> FcStatus {
        chan.full = false;
        let (font, offset) = match code {
            FC6612_SEL_512_DOTS_LEFT => (Font::Dot, OFF_LEFT_SCREEN),
            FC6612_SEL_512_DOTS_RIGHT => (Font::Dot, OFF_RIGHT_SCREEN),
            FC6612_SEL_64_CHAR_LEFT => (Font::Small, OFF_LEFT_SCREEN),
            FC6612_SEL_32_CHAR_LEFT => (Font::Medium, OFF_LEFT_SCREEN),
            FC6612_SEL_16_CHAR_LEFT => (Font::Large, OFF_LEFT_SCREEN),
            FC6612_SEL_64_CHAR_RIGHT => (Font::Small, OFF_RIGHT_SCREEN),
            FC6612_SEL_32_CHAR_RIGHT => (Font::Medium, OFF_RIGHT_SCREEN),
            FC6612_SEL_16_CHAR_RIGHT => (Font::Large, OFF_RIGHT_SCREEN),
            FC6612_SEL_KEY_IN => {
                st.fcode = code;
                return FcStatus::Accepted;
            }
            _ => {
                return FcStatus::Declined;
            }
        };
        self.current_font = font;
        self.current_offset = offset;
        self.screen.set_font(font);
        st.fcode = code;
        FcStatus::Accepted
    }

    fn io(&mut self, st: &mut SlotState, chan: &mut Channel) {
        match st.fcode {
            FC6612_SEL_64_CHAR_LEFT
            | FC6612_SEL_32_CHAR_LEFT
            | FC6612_SEL_16_CHAR_LEFT
            | FC6612_SEL_64_CHAR_RIGHT
            | FC6612_SEL_32_CHAR_RIGHT
            | FC6612_SEL_16_CHAR_RIGHT => {
                if chan.full {
                    self.empty_drop = false;
                    self.char_word(chan.data);
                    self.auto_date_check(st.fcode, chan.data);
                    chan.full = false;
                }
            }
            FC6612_SEL_512_DOTS_LEFT | FC6612_SEL_512_DOTS_RIGHT => {
                if chan.full {
                    self.empty_drop = false;
                    self.dot_word(chan.data);
                    chan.full = false;
                }
            }
            FC6612_SEL_KEY_IN => {
                // Host window input first, then the key ring.
                let mut key = self
                    .screen
                    .poll_key()
                    .map(ascii_to_console)
                    .unwrap_or(0);
                if key == 0 {
                    key = self.keys.get();
                }
                chan.data = PpWord::from(key);
                chan.full = true;
                chan.status = 0;
                st.fcode = 0;
            }
            _ => (),
        }
    }

    fn activate(&mut self, _st: &mut SlotState, _chan: &mut Channel) {
        self.empty_drop = true;
    }

    fn disconnect(&mut self, _st: &mut SlotState, _chan: &mut Channel) {
        if self.empty_drop {
            self.screen.refresh();
            self.empty_drop = false;
        }
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Console
    }

    fn name(&self) -> String {
        "6612 console".to_string()
    }
}
