//! libusb-backed accessory device
//!
//! Wraps an opened `rusb::DeviceHandle` with its cached descriptor. Claiming
//! detaches any kernel driver from the accessory interface; dropping the
//! device releases the interface and gives the kernel driver back.

use crate::usb::{AccessoryDevice, EndpointInfo};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// The accessory interface is always the first one
const ACCESSORY_INTERFACE: u8 = 0;

/// Opened USB device
pub struct RusbDevice {
    /// Underlying rusb device
    device: Device<Context>,
    /// Cached device descriptor
    descriptor: DeviceDescriptor,
    handle: DeviceHandle<Context>,
    /// Timeout applied to every control transfer
    control_timeout: Duration,
    /// Interface claimed by us, if any
    claimed_interface: Option<u8>,
    /// Whether we detached a kernel driver that must be reattached
    detached_kernel_driver: bool,
}

impl RusbDevice {
    /// Open the device and cache its descriptor
    pub fn open(device: Device<Context>, control_timeout: Duration) -> rusb::Result<Self> {
        let descriptor = device.device_descriptor()?;
        let handle = device.open()?;

        debug!(
            "Opened device bus={}, addr={}, vid={:#06x}, pid={:#06x}",
            device.bus_number(),
            device.address(),
            descriptor.vendor_id(),
            descriptor.product_id()
        );

        Ok(Self {
            device,
            descriptor,
            handle,
            control_timeout,
            claimed_interface: None,
            detached_kernel_driver: false,
        })
    }

    pub fn vendor_id(&self) -> u16 {
        self.descriptor.vendor_id()
    }

    /// Value of the first configuration, which is what gets selected
    fn first_configuration(&self) -> rusb::Result<u8> {
        Ok(self.device.config_descriptor(0)?.number())
    }

    fn detach_kernel_driver(&mut self, interface: u8) {
        match self.handle.kernel_driver_active(interface) {
            Ok(true) => {
                debug!("Detaching kernel driver from interface {}", interface);
                match self.handle.detach_kernel_driver(interface) {
                    Ok(()) => self.detached_kernel_driver = true,
                    // Claiming will most likely fail next and report it
                    Err(e) => warn!(
                        "Failed to detach kernel driver from interface {}: {}",
                        interface, e
                    ),
                }
            }
            Ok(false) => {
                debug!("No kernel driver active on interface {}", interface);
            }
            Err(e) => {
                debug!(
                    "Could not check kernel driver status for interface {}: {}",
                    interface, e
                );
            }
        }
    }
}

impl AccessoryDevice for RusbDevice {
    fn product_id(&self) -> u16 {
        self.descriptor.product_id()
    }

    fn read_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize> {
        debug!(
            "Control IN: request_type={:#x}, request={}, value={:#x}, index={}, len={}",
            request_type,
            request,
            value,
            index,
            buf.len()
        );
        self.handle
            .read_control(request_type, request, value, index, buf, self.control_timeout)
    }

    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> rusb::Result<usize> {
        debug!(
            "Control OUT: request_type={:#x}, request={}, value={:#x}, index={}, len={}",
            request_type,
            request,
            value,
            index,
            data.len()
        );
        self.handle
            .write_control(request_type, request, value, index, data, self.control_timeout)
    }

    fn claim(&mut self) -> rusb::Result<()> {
        self.detach_kernel_driver(ACCESSORY_INTERFACE);

        let configuration = self.first_configuration()?;
        match self.handle.set_active_configuration(configuration) {
            Ok(()) => debug!("Selected configuration {}", configuration),
            // Configuration already active and in use
            Err(rusb::Error::Busy) => warn!(
                "Configuration {} busy, continuing with the active one",
                configuration
            ),
            Err(e) => return Err(e),
        }

        self.handle.claim_interface(ACCESSORY_INTERFACE)?;
        self.claimed_interface = Some(ACCESSORY_INTERFACE);
        debug!("Claimed interface {}", ACCESSORY_INTERFACE);
        Ok(())
    }

    fn interface_endpoints(&self) -> rusb::Result<Vec<EndpointInfo>> {
        let config = self.device.active_config_descriptor()?;

        let Some(interface) = config.interfaces().next() else {
            return Ok(Vec::new());
        };
        let Some(setting) = interface.descriptors().next() else {
            return Ok(Vec::new());
        };

        Ok(setting
            .endpoint_descriptors()
            .map(|endpoint| EndpointInfo {
                address: endpoint.address(),
                direction: endpoint.direction(),
                transfer_type: endpoint.transfer_type(),
            })
            .collect())
    }

    fn read_bulk(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> rusb::Result<usize> {
        self.handle.read_bulk(endpoint, buf, timeout)
    }
}

impl Drop for RusbDevice {
    fn drop(&mut self) {
        if let Some(interface) = self.claimed_interface.take() {
            // Fails harmlessly when the device is already gone
            if let Err(e) = self.handle.release_interface(interface) {
                debug!("Could not release interface {}: {}", interface, e);
            }

            if self.detached_kernel_driver
                && let Err(e) = self.handle.attach_kernel_driver(interface)
            {
                debug!(
                    "Could not reattach kernel driver to interface {}: {}",
                    interface, e
                );
            }
        }

        debug!("Closed device vid={:#06x}", self.vendor_id());
    }
}
