//! The console's view of the display hardware.
//!
//! The emulation core does not render anything itself; the 6612
//! device drives whatever implements [`Screen`].  Windowed front ends
//! plot for real, the command-line driver writes to the terminal, and
//! tests record the calls.
use serde::Serialize;

/// The four character generators of the 6612.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    /// Single-dot plotting.
    Dot,
    /// 64 characters per row.
    Small,
    /// 32 characters per row.
    Medium,
    /// 16 characters per row.
    Large,
}

/// Horizontal offset of the left screen.
pub const OFF_LEFT_SCREEN: u16 = 0;

/// Horizontal offset of the right screen, one 512-dot screen to the
/// right.
pub const OFF_RIGHT_SCREEN: u16 = 0o1000;

pub trait Screen {
    fn set_font(&mut self, font: Font);
    fn set_x(&mut self, x: u16);
    fn set_y(&mut self, y: u16);
    /// Queue one ASCII character at the current position.
    fn queue(&mut self, ch: u8);
    /// Repaint.  Called when a whole channel transaction moved no
    /// data, which is how the display driver asks for a refresh.
    fn refresh(&mut self);
    /// Poll the host window system for one typed ASCII character.
    fn poll_key(&mut self) -> Option<u8> {
        None
    }
}

/// A screen that swallows everything, for headless operation and
/// tests.
#[derive(Debug, Default)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn set_font(&mut self, _font: Font) {}
    fn set_x(&mut self, _x: u16) {}
    fn set_y(&mut self, _y: u16) {}
    fn queue(&mut self, _ch: u8) {}
    fn refresh(&mut self) {}
}
