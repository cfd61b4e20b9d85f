//! Protocol library for aoa-keyboard-bridge
//!
//! This crate defines the wire-level pieces of the Android Open Accessory (AOA)
//! keyboard link: the control-transfer vocabulary used to switch a device into
//! accessory mode, the identification strings sent during that handshake, the
//! 3-byte key packets read from the bulk endpoint and the translation from
//! Android key codes to Linux input key codes.
//!
//! Nothing here touches USB or the input subsystem, so every item can be
//! exercised without hardware.
//!
//! # Example
//!
//! ```
//! use protocol::{KeyAction, KeyEvent, keycode};
//!
//! // "A" pressed on the phone
//! let event = KeyEvent::parse(&[0x00, 0x00, 0x1D]).unwrap();
//! assert_eq!(event.action, KeyAction::Down);
//! assert_eq!(keycode::translate(event.key_code), Some(keycode::host::KEY_A));
//! ```

pub mod aoa;
pub mod error;
pub mod identity;
pub mod keycode;
pub mod packet;

pub use aoa::{
    ACCESSORY_PRODUCT_IDS, DEFAULT_VENDOR_ID, REQUEST_GET_PROTOCOL, REQUEST_SEND_STRING,
    REQUEST_START_ACCESSORY, decode_protocol_version, is_accessory_product, parse_vendor_id,
};
pub use error::{ProtocolError, Result};
pub use identity::{AccessoryIdentity, IdentityField};
pub use keycode::{KEYCODE_TABLE, translate};
pub use packet::{KEY_PACKET_LEN, KeyAction, KeyEvent};
