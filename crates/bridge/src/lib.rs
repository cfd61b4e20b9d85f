//! aoa-keyboard-bridge
//!
//! Turns an Android device attached over USB into a keyboard for the host.
//! The device is switched into Android Open Accessory mode, key packets are
//! read from its bulk endpoint, translated to Linux key codes and injected
//! through a uinput virtual keyboard. USB hot-plug notifications restart the
//! whole sequence whenever a device is attached.
//!
//! Module map:
//! - [`negotiator`]: discovery and the AOA handshake
//! - [`reader`]: the packet read loop
//! - [`supervisor`]: startup probe and the hot-plug dispatch loop
//! - [`usb`]: transport seam, libusb backend and hot-plug monitor
//! - [`input`]: key injection seam and the uinput keyboard
//! - [`config`]: TOML configuration

pub mod config;
pub mod error;
pub mod input;
pub mod negotiator;
pub mod reader;
pub mod supervisor;
pub mod usb;

pub use config::BridgeConfig;
pub use error::{AccessoryError, Result};
pub use input::{KeyInjector, VirtualKeyboard};
pub use negotiator::{
    AccessorySession, Clock, ConnectionState, EndpointPair, Negotiator, SettleDelays, SystemClock,
};
pub use reader::{DEFAULT_READ_TIMEOUT, EventReader};
pub use supervisor::{SessionOutcome, Supervisor};
pub use usb::{AccessoryDevice, EndpointInfo, UsbBus};
