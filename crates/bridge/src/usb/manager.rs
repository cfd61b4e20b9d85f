//! USB device discovery
//!
//! Walks the bus looking for the target vendor ID. The bus is re-walked on
//! every call: a device that switches into accessory mode re-enumerates with
//! a new product ID and any handle opened before the switch is stale.

use crate::usb::{UsbBus, device::RusbDevice};
use protocol::is_accessory_product;
use rusb::{Context, Device, UsbContext};
use std::time::Duration;
use tracing::{debug, warn};

/// Short description of a device, for `--list-devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub bus_number: u8,
    pub device_address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl DeviceSummary {
    pub fn in_accessory_mode(&self) -> bool {
        is_accessory_product(self.product_id)
    }
}

/// libusb-backed bus
pub struct RusbBus {
    /// USB context for device operations
    context: Context,
    /// Timeout handed to every opened device for control transfers
    control_timeout: Duration,
}

impl RusbBus {
    /// Create a new libusb context
    pub fn new(control_timeout: Duration) -> rusb::Result<Self> {
        Ok(Self {
            context: Context::new()?,
            control_timeout,
        })
    }

    /// Every device on the bus with the given vendor ID
    pub fn list_devices(&self, vendor_id: u16) -> rusb::Result<Vec<DeviceSummary>> {
        let devices = self.context.devices()?;

        Ok(devices
            .iter()
            .filter(|device| {
                device
                    .device_descriptor()
                    .map(|d| d.vendor_id() == vendor_id)
                    .unwrap_or(false)
            })
            .filter_map(|device| summarize(&device))
            .collect())
    }
}

impl UsbBus for RusbBus {
    type Device = RusbDevice;

    fn open_by_vendor(&self, vendor_id: u16) -> rusb::Result<Option<RusbDevice>> {
        let devices = self.context.devices()?;

        let candidates = devices.iter().filter(|device| match device.device_descriptor() {
            Ok(descriptor) => descriptor.vendor_id() == vendor_id,
            Err(e) => {
                debug!(
                    "Skipping device bus={}, addr={}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                );
                false
            }
        });

        open_first(candidates, |device| {
            let (bus, address) = (device.bus_number(), device.address());
            RusbDevice::open(device, self.control_timeout).inspect_err(|e| {
                warn!(
                    "Failed to open device bus={}, addr={}: {}",
                    bus, address, e
                )
            })
        })
    }
}

/// First candidate that opens
///
/// Failed candidates are skipped. When none opens, the last failure is
/// returned; `Ok(None)` means there were no candidates at all.
fn open_first<C, D>(
    candidates: impl IntoIterator<Item = C>,
    mut open: impl FnMut(C) -> rusb::Result<D>,
) -> rusb::Result<Option<D>> {
    let mut last_error = None;

    for candidate in candidates {
        match open(candidate) {
            Ok(device) => return Ok(Some(device)),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// Descriptor and string summary, `None` if the descriptor is unreadable
fn summarize(device: &Device<Context>) -> Option<DeviceSummary> {
    let descriptor = device.device_descriptor().ok()?;

    // Strings need an open handle; leave them out when we lack permission
    let (manufacturer, product) = match device.open() {
        Ok(handle) => (
            handle.read_manufacturer_string_ascii(&descriptor).ok(),
            handle.read_product_string_ascii(&descriptor).ok(),
        ),
        Err(_) => (None, None),
    };

    Some(DeviceSummary {
        bus_number: device.bus_number(),
        device_address: device.address(),
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        manufacturer,
        product,
    })
}
