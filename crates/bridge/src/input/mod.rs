//! Host input injection
//!
//! The reader talks to a [`KeyInjector`]; production uses the uinput-backed
//! [`VirtualKeyboard`].

use std::io;

pub mod uinput;

pub use uinput::{VIRTUAL_KEYBOARD_NAME, VirtualKeyboard};

/// Sink for synthesized key events
pub trait KeyInjector {
    /// Queue a key state change (`pressed` = press, otherwise release)
    fn write_key(&mut self, code: u16, pressed: bool) -> io::Result<()>;

    /// Flush queued changes to the input stack
    fn sync(&mut self) -> io::Result<()>;

    /// Apply one key transition: the state change immediately followed by its
    /// sync, so listeners never observe a half-applied transition
    fn key_transition(&mut self, code: u16, pressed: bool) -> io::Result<()> {
        self.write_key(code, pressed)?;
        self.sync()
    }
}
