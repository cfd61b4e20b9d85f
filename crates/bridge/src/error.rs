//! Accessory session errors
//!
//! Every variant is recovered by the supervisor: logged, then the bridge
//! goes back to waiting for the next attach notification.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessoryError {
    /// No device with the target vendor ID is on the bus
    #[error("Device not found (vendor ID {vendor_id:#06x})")]
    DeviceNotFound { vendor_id: u16 },

    /// The device does not speak AOA
    #[error("Device returned an unsupported protocol version (version {version})")]
    UnsupportedProtocol { version: u16 },

    /// An identification string was not fully accepted
    #[error(
        "Identification string {index} rejected: sent {expected} bytes, device took {actual}"
    )]
    Handshake {
        index: u16,
        expected: usize,
        actual: usize,
    },

    /// The device did not come back with an accessory product ID
    #[error("Device did not switch into accessory mode (product ID {product_id:?})")]
    ModeSwitchFailed { product_id: Option<u16> },

    /// The accessory interface lacks a bulk IN or bulk OUT endpoint
    #[error("Accessory endpoints not found (bulk IN: {has_in}, bulk OUT: {has_out})")]
    EndpointsNotFound { has_in: bool, has_out: bool },

    /// A bulk read failed for a reason other than a timeout
    #[error("Connection to accessory lost: {0}")]
    ConnectionLost(rusb::Error),

    /// Any other USB failure while talking to the device
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// The virtual keyboard refused an event
    #[error("Virtual keyboard error: {0}")]
    Input(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AccessoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AccessoryError::DeviceNotFound { vendor_id: 0x18d1 };
        assert_eq!(err.to_string(), "Device not found (vendor ID 0x18d1)");

        let err = AccessoryError::Handshake {
            index: 3,
            expected: 4,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("string 3"));
        assert!(msg.contains("sent 4"));

        let err = AccessoryError::ConnectionLost(rusb::Error::NoDevice);
        assert!(err.to_string().contains("Connection to accessory lost"));
    }

    #[test]
    fn test_rusb_error_converts() {
        let err: AccessoryError = rusb::Error::Pipe.into();
        assert!(matches!(err, AccessoryError::Usb(rusb::Error::Pipe)));
    }
}
