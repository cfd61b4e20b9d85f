//! Key packets read from the accessory's bulk IN endpoint
//!
//! Every packet is exactly three bytes:
//!
//! ```text
//! [action: u8][key code high: u8][key code low: u8]
//! ```
//!
//! Action `0` is key down, `1` is key up. The key code is rebuilt as
//! `high * 0xFF + low`. This is not a big-endian `u16` (that would be
//! `high * 0x100 + low`); the Linux side has always decoded it this way and
//! the two agree for every Android key code below 255, which covers the whole
//! translation table.

use crate::error::{ProtocolError, Result};

/// Size of one key packet
pub const KEY_PACKET_LEN: usize = 3;

const ACTION_DOWN: u8 = 0;
const ACTION_UP: u8 = 1;

/// Key transition reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

impl KeyAction {
    /// Decode the action byte, `None` for anything but 0 or 1
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            ACTION_DOWN => Some(KeyAction::Down),
            ACTION_UP => Some(KeyAction::Up),
            _ => None,
        }
    }

    pub fn is_press(self) -> bool {
        self == KeyAction::Down
    }
}

/// One decoded key packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub action: KeyAction,
    /// Android key code (`android/keycodes.h`)
    pub key_code: u16,
}

impl KeyEvent {
    /// Decode a packet
    ///
    /// Only the first [`KEY_PACKET_LEN`] bytes are considered.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < KEY_PACKET_LEN {
            return Err(ProtocolError::ShortPacket {
                expected: KEY_PACKET_LEN,
                actual: buf.len(),
            });
        }

        let action = KeyAction::from_code(buf[0]).ok_or(ProtocolError::UnknownAction(buf[0]))?;

        Ok(Self {
            action,
            key_code: compose_key_code(buf[1], buf[2]),
        })
    }
}

/// `high * 0xFF + low`, at most 65280 so it always fits
pub fn compose_key_code(high: u8, low: u8) -> u16 {
    u16::from(high) * 0xFF + u16::from(low)
}
