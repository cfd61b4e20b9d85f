//! USB subsystem
//!
//! The negotiator and reader only see the two traits below, so they can be
//! driven by the libusb backend in production and by scripted devices in
//! tests.
//!
//! - [`UsbBus`]: find and open the first device with a given vendor ID
//! - [`AccessoryDevice`]: control transfers, configuration, endpoint
//!   enumeration and bulk reads on one opened device
//!
//! The libusb backend lives in [`device`] and [`manager`]; [`hotplug`] feeds
//! bus notifications to the supervisor.

use std::time::Duration;

pub mod device;
pub mod hotplug;
pub mod manager;

pub use device::RusbDevice;
pub use hotplug::HotplugMonitor;
pub use manager::{DeviceSummary, RusbBus};

/// One endpoint of the accessory interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub direction: rusb::Direction,
    pub transfer_type: rusb::TransferType,
}

impl EndpointInfo {
    pub fn is_bulk_in(&self) -> bool {
        self.transfer_type == rusb::TransferType::Bulk && self.direction == rusb::Direction::In
    }

    pub fn is_bulk_out(&self) -> bool {
        self.transfer_type == rusb::TransferType::Bulk && self.direction == rusb::Direction::Out
    }
}

/// An opened USB device that may speak AOA
///
/// Owned exclusively by one negotiation attempt and, on success, by the read
/// session that follows it.
pub trait AccessoryDevice {
    /// Current `idProduct`
    fn product_id(&self) -> u16;

    /// Control IN transfer on endpoint 0, returns the number of bytes read
    fn read_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize>;

    /// Control OUT transfer on endpoint 0, returns the number of bytes written
    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> rusb::Result<usize>;

    /// Select the device configuration and claim the accessory interface
    fn claim(&mut self) -> rusb::Result<()>;

    /// Endpoints of the first interface of the active configuration
    fn interface_endpoints(&self) -> rusb::Result<Vec<EndpointInfo>>;

    /// Bulk IN transfer, `Err(rusb::Error::Timeout)` when nothing arrived
    fn read_bulk(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> rusb::Result<usize>;
}

/// Device discovery
pub trait UsbBus {
    type Device: AccessoryDevice;

    /// Open the first device whose `idVendor` matches, `None` if there is none
    fn open_by_vendor(&self, vendor_id: u16) -> rusb::Result<Option<Self::Device>>;
}
