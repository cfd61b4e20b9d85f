//! Hot-plug notification queue
//!
//! The device monitor runs on its own thread and pushes [`HotplugEvent`]s into
//! a bounded channel without ever blocking; the supervisor is the single
//! consumer and blocks on [`HotplugReceiver::recv`].

use async_channel::{Receiver, Sender, TrySendError, bounded};

/// Subsystem name carried by USB notifications
pub const USB_SUBSYSTEM: &str = "usb";

/// Queue depth; a burst of re-enumerations never comes close
pub const HOTPLUG_QUEUE_CAPACITY: usize = 256;

/// What happened on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Add,
    Remove,
}

impl DeviceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceAction::Add => "add",
            DeviceAction::Remove => "remove",
        }
    }
}

/// A single bus notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotplugEvent {
    pub action: DeviceAction,
    pub subsystem: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: u8,
    pub address: u8,
}

impl HotplugEvent {
    /// USB device notification
    pub fn usb(action: DeviceAction, vendor_id: u16, product_id: u16, bus: u8, address: u8) -> Self {
        Self {
            action,
            subsystem: USB_SUBSYSTEM.to_string(),
            vendor_id,
            product_id,
            bus,
            address,
        }
    }

    /// Whether this is an "add" on the USB subsystem
    pub fn is_usb_add(&self) -> bool {
        self.action == DeviceAction::Add && self.subsystem == USB_SUBSYSTEM
    }
}

/// Producer end, held by the device monitor and the interrupt handler
#[derive(Debug, Clone)]
pub struct HotplugSender {
    tx: Sender<HotplugEvent>,
}

impl HotplugSender {
    /// Queue an event without blocking
    ///
    /// Fails with [`crate::Error::ChannelFull`] when the consumer is behind.
    pub fn try_send(&self, event: HotplugEvent) -> crate::Result<()> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => crate::Error::ChannelFull,
            TrySendError::Closed(_) => crate::Error::Channel("hotplug queue closed".into()),
        })
    }

    /// Close the queue; the consumer drains what is left and then sees `None`
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer end, owned by the supervisor
#[derive(Debug)]
pub struct HotplugReceiver {
    rx: Receiver<HotplugEvent>,
}

impl HotplugReceiver {
    /// Block until the next event, `None` once the queue is closed and empty
    pub fn recv(&self) -> Option<HotplugEvent> {
        self.rx.recv_blocking().ok()
    }
}

/// Create the hot-plug queue
///
/// Returns (HotplugSender for the monitor, HotplugReceiver for the supervisor)
pub fn create_hotplug_channel() -> (HotplugSender, HotplugReceiver) {
    let (tx, rx) = bounded(HOTPLUG_QUEUE_CAPACITY);
    (HotplugSender { tx }, HotplugReceiver { rx })
}
