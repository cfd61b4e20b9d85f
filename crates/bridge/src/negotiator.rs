//! Accessory negotiation
//!
//! Brings a device with the target vendor ID into accessory mode and resolves
//! the bulk endpoints of its accessory interface:
//!
//! ```text
//! NotFound ──found──> NegotiatingMode ──re-enumerated──> Resolving ──> AccessoryModeActive
//!     │                                                    ▲
//!     └──already in accessory mode─────────────────────────┘
//! ```
//!
//! Two fixed settle delays are part of the handshake: one after the
//! start-accessory request while the device re-enumerates, one after
//! claiming the configuration while the "accessory attached" broadcast
//! reaches the app on the device.

use crate::error::{AccessoryError, Result};
use crate::usb::{AccessoryDevice, UsbBus};
use protocol::aoa::{MIN_PROTOCOL_VERSION, PROTOCOL_VERSION_LEN, VENDOR_REQUEST_IN, VENDOR_REQUEST_OUT};
use protocol::{
    AccessoryIdentity, REQUEST_GET_PROTOCOL, REQUEST_SEND_STRING, REQUEST_START_ACCESSORY,
    decode_protocol_version, is_accessory_product,
};
use std::time::Duration;
use tracing::{debug, info};

/// Wait for the device to re-enumerate after the start-accessory request
pub const MODE_SWITCH_SETTLE: Duration = Duration::from_secs(1);

/// Wait for the device OS to announce the accessory to its app
pub const ACCESSORY_ATTACH_SETTLE: Duration = Duration::from_secs(1);

/// The two fixed waits of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    pub mode_switch: Duration,
    pub accessory_attach: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            mode_switch: MODE_SWITCH_SETTLE,
            accessory_attach: ACCESSORY_ATTACH_SETTLE,
        }
    }
}

/// Source of the settle delays
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Real time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Where a connection attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NotFound,
    NegotiatingMode,
    Resolving,
    AccessoryModeActive,
    Reading,
    Closed,
    Failed,
}

/// Bulk endpoints of the accessory interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPair {
    pub inbound: u8,
    /// Resolved for completeness, the bridge never writes to the device
    pub outbound: u8,
}

/// A device in accessory mode with its endpoints resolved
#[derive(Debug)]
pub struct AccessorySession<D> {
    pub device: D,
    pub endpoints: EndpointPair,
}

/// Runs the handshake against devices found on `B`
pub struct Negotiator<B, C = SystemClock> {
    bus: B,
    clock: C,
    vendor_id: u16,
    identity: AccessoryIdentity,
    delays: SettleDelays,
    state: ConnectionState,
}

impl<B: UsbBus, C: Clock> Negotiator<B, C> {
    pub fn new(
        bus: B,
        clock: C,
        vendor_id: u16,
        identity: AccessoryIdentity,
        delays: SettleDelays,
    ) -> Self {
        Self {
            bus,
            clock,
            vendor_id,
            identity,
            delays,
            state: ConnectionState::NotFound,
        }
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// State reached by the last attempt
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Run one complete negotiation attempt
    pub fn negotiate(&mut self) -> Result<AccessorySession<B::Device>> {
        let result = self.try_negotiate();
        if let Err(e) = &result {
            self.state = match e {
                AccessoryError::DeviceNotFound { .. } => ConnectionState::NotFound,
                _ => ConnectionState::Failed,
            };
        }
        result
    }

    fn try_negotiate(&mut self) -> Result<AccessorySession<B::Device>> {
        self.state = ConnectionState::NotFound;

        let device = self.discover()?;
        info!("Device found (pid={:#06x})", device.product_id());

        let device = if is_accessory_product(device.product_id()) {
            info!("Device is in accessory mode");
            device
        } else {
            info!("Device is not in accessory mode yet");
            self.transition(ConnectionState::NegotiatingMode);
            self.activate_accessory_mode(&device)?;

            // The product ID changes with the mode switch, the old handle is stale
            drop(device);
            self.rediscover()?
        };

        self.transition(ConnectionState::Resolving);
        let session = self.resolve_endpoints(device)?;

        self.transition(ConnectionState::AccessoryModeActive);
        Ok(session)
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!("Negotiation state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn discover(&self) -> Result<B::Device> {
        self.bus
            .open_by_vendor(self.vendor_id)?
            .ok_or(AccessoryError::DeviceNotFound {
                vendor_id: self.vendor_id,
            })
    }

    fn rediscover(&self) -> Result<B::Device> {
        match self.bus.open_by_vendor(self.vendor_id)? {
            Some(device) if is_accessory_product(device.product_id()) => {
                info!("Device is in accessory mode");
                Ok(device)
            }
            Some(device) => Err(AccessoryError::ModeSwitchFailed {
                product_id: Some(device.product_id()),
            }),
            None => Err(AccessoryError::ModeSwitchFailed { product_id: None }),
        }
    }

    /// Protocol version check, identification strings, start request
    fn activate_accessory_mode(&self, device: &B::Device) -> Result<()> {
        let mut buf = [0u8; PROTOCOL_VERSION_LEN];
        let len = device.read_control(VENDOR_REQUEST_IN, REQUEST_GET_PROTOCOL, 0, 0, &mut buf)?;
        let version = decode_protocol_version(&buf[..len]);
        debug!("Protocol version {} ({} bytes)", version, len);

        if version < MIN_PROTOCOL_VERSION {
            return Err(AccessoryError::UnsupportedProtocol { version });
        }

        for (field, bytes) in self.identity.fields() {
            let sent =
                device.write_control(VENDOR_REQUEST_OUT, REQUEST_SEND_STRING, 0, field.index(), bytes)?;
            if sent != bytes.len() {
                return Err(AccessoryError::Handshake {
                    index: field.index(),
                    expected: bytes.len(),
                    actual: sent,
                });
            }
            debug!("Sent {} string ({} bytes)", field.name(), sent);
        }

        device.write_control(VENDOR_REQUEST_OUT, REQUEST_START_ACCESSORY, 0, 0, &[])?;
        debug!("Requested accessory mode, waiting {:?}", self.delays.mode_switch);

        self.clock.sleep(self.delays.mode_switch);
        Ok(())
    }

    fn resolve_endpoints(&self, mut device: B::Device) -> Result<AccessorySession<B::Device>> {
        device.claim()?;
        self.clock.sleep(self.delays.accessory_attach);

        let endpoints = device.interface_endpoints()?;
        let inbound = endpoints.iter().find(|e| e.is_bulk_in()).map(|e| e.address);
        let outbound = endpoints.iter().find(|e| e.is_bulk_out()).map(|e| e.address);

        match (inbound, outbound) {
            (Some(inbound), Some(outbound)) => {
                debug!(
                    "Accessory endpoints in={:#04x}, out={:#04x}",
                    inbound, outbound
                );
                Ok(AccessorySession {
                    device,
                    endpoints: EndpointPair { inbound, outbound },
                })
            }
            (inbound, outbound) => Err(AccessoryError::EndpointsNotFound {
                has_in: inbound.is_some(),
                has_out: outbound.is_some(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays() {
        let delays = SettleDelays::default();
        assert_eq!(delays.mode_switch, Duration::from_secs(1));
        assert_eq!(delays.accessory_attach, Duration::from_secs(1));
    }

    #[test]
    fn test_system_clock_sleeps() {
        let start = std::time::Instant::now();
        SystemClock.sleep(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
