//! Common utilities for aoa-keyboard-bridge
//!
//! This crate provides the ambient pieces shared by the bridge: error
//! handling, logging setup, the hot-plug notification queue that connects the
//! device monitor thread to the supervisor, and the shutdown signal raised on
//! operator interrupt.

pub mod channel;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use channel::{
    DeviceAction, HOTPLUG_QUEUE_CAPACITY, HotplugEvent, HotplugReceiver, HotplugSender,
    USB_SUBSYSTEM, create_hotplug_channel,
};
pub use error::{Error, Result};
pub use logging::setup_logging;
pub use shutdown::ShutdownSignal;
