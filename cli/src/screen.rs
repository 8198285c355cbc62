//! A terminal stand-in for the 6612 display.
//!
//! The real tube draws characters at beam coordinates; a terminal
//! cannot, so this renders each vertical repositioning as a new line
//! and ignores horizontal moves beyond logging them.  Good enough to
//! watch DSD traffic scroll past.
use std::io::Write;

use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{event, Level};

use periph::screen::{Font, Screen};

pub struct TerminalScreen {
    stream: StandardStream,
    line_dirty: bool,
}

fn get_colour_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

impl TerminalScreen {
    pub fn new() -> TerminalScreen {
        let mut stream = StandardStream::stdout(get_colour_choice());
        // Phosphor green, in fond memory.
        let mut colour = ColorSpec::new();
        colour.set_fg(Some(termcolor::Color::Green));
        if let Err(e) = stream.set_color(&colour) {
            event!(Level::ERROR, "failed to set console colour: {}", e);
        }
        TerminalScreen {
            stream,
            line_dirty: false,
        }
    }
}

impl Screen for TerminalScreen {
    fn set_font(&mut self, font: Font) {
        event!(Level::TRACE, "console font {:?}", font);
    }

    fn set_x(&mut self, x: u16) {
        event!(Level::TRACE, "console beam x={:o}", x);
    }

    fn set_y(&mut self, y: u16) {
        event!(Level::TRACE, "console beam y={:o}", y);
        if self.line_dirty {
            if let Err(e) = writeln!(self.stream) {
                event!(Level::WARN, "console output error: {}", e);
            }
            self.line_dirty = false;
        }
    }

    fn queue(&mut self, ch: u8) {
        if ch == 0 {
            return;
        }
        self.line_dirty = true;
        if let Err(e) = write!(self.stream, "{}", ch as char) {
            event!(Level::WARN, "console output error: {}", e);
        }
    }

    fn refresh(&mut self) {
        if self.line_dirty {
            if let Err(e) = writeln!(self.stream) {
                event!(Level::WARN, "console output error: {}", e);
            }
            self.line_dirty = false;
        }
        if let Err(e) = self.stream.flush() {
            event!(Level::WARN, "console flush error: {}", e);
        }
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        if let Err(e) = self.stream.reset() {
            event!(Level::ERROR, "failed to reset terminal: {}", e);
        }
    }
}

impl Default for TerminalScreen {
    fn default() -> TerminalScreen {
        Self::new()
    }
}
