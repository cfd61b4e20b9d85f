//! Android Open Accessory control-transfer vocabulary
//!
//! See <https://source.android.com/devices/accessories/aoa> for the handshake.
//! All three requests are vendor-class requests addressed to the device.

use crate::error::{ProtocolError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Google's vendor ID, used by most devices once they are in accessory mode
pub const DEFAULT_VENDOR_ID: u16 = 0x18D1;

/// Product IDs a device presents once it has switched into accessory mode
///
/// `0x2D00` accessory, `0x2D01` accessory + ADB, `0x2D04` accessory + audio,
/// `0x2D05` accessory + audio + ADB.
pub const ACCESSORY_PRODUCT_IDS: [u16; 4] = [0x2D00, 0x2D01, 0x2D04, 0x2D05];

/// Request code: read the supported AOA protocol version (IN, 2 bytes)
pub const REQUEST_GET_PROTOCOL: u8 = 51;

/// Request code: send one identification string (OUT, `wIndex` 0..5)
pub const REQUEST_SEND_STRING: u8 = 52;

/// Request code: switch the device into accessory mode (OUT, no data)
pub const REQUEST_START_ACCESSORY: u8 = 53;

/// `bmRequestType` for a vendor request, device recipient, device-to-host
pub const VENDOR_REQUEST_IN: u8 = 0xC0;

/// `bmRequestType` for a vendor request, device recipient, host-to-device
pub const VENDOR_REQUEST_OUT: u8 = 0x40;

/// Length of the protocol version reply
pub const PROTOCOL_VERSION_LEN: usize = 2;

/// Lowest protocol version able to carry the identification strings
pub const MIN_PROTOCOL_VERSION: u16 = 1;

/// Whether `product_id` is one of the accessory-mode product IDs
pub fn is_accessory_product(product_id: u16) -> bool {
    ACCESSORY_PRODUCT_IDS.contains(&product_id)
}

/// Decode the reply to [`REQUEST_GET_PROTOCOL`]
///
/// The version is little-endian. Missing bytes of a short reply count as zero.
pub fn decode_protocol_version(reply: &[u8]) -> u16 {
    let mut buf = [0u8; PROTOCOL_VERSION_LEN];
    let len = reply.len().min(PROTOCOL_VERSION_LEN);
    buf[..len].copy_from_slice(&reply[..len]);
    LittleEndian::read_u16(&buf)
}

/// Parse a vendor ID given as hexadecimal, with or without a `0x` prefix
///
/// ```
/// use protocol::parse_vendor_id;
///
/// assert_eq!(parse_vendor_id("18d1").unwrap(), 0x18d1);
/// assert_eq!(parse_vendor_id("0x04E8").unwrap(), 0x04e8);
/// assert!(parse_vendor_id("xyz").is_err());
/// ```
pub fn parse_vendor_id(s: &str) -> Result<u16> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.is_empty() || hex.len() > 4 {
        return Err(ProtocolError::InvalidVendorId(s.to_string()));
    }

    u16::from_str_radix(hex, 16).map_err(|_| ProtocolError::InvalidVendorId(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessory_products() {
        for pid in ACCESSORY_PRODUCT_IDS {
            assert!(is_accessory_product(pid));
        }
        assert!(!is_accessory_product(0x4EE7));
        assert!(!is_accessory_product(0x2D02));
        assert!(!is_accessory_product(0x2D03));
    }

    #[test]
    fn test_decode_protocol_version() {
        assert_eq!(decode_protocol_version(&[0x02, 0x00]), 2);
        assert_eq!(decode_protocol_version(&[0x01]), 1);
        assert_eq!(decode_protocol_version(&[]), 0);
        assert_eq!(decode_protocol_version(&[0x00, 0x01]), 0x0100);
        assert_eq!(decode_protocol_version(&[0x02, 0x00, 0xff]), 2);
    }

    #[test]
    fn test_parse_vendor_id() {
        assert_eq!(parse_vendor_id("18d1").unwrap(), 0x18D1);
        assert_eq!(parse_vendor_id("18D1").unwrap(), 0x18D1);
        assert_eq!(parse_vendor_id("0x22b8").unwrap(), 0x22B8);
        assert_eq!(parse_vendor_id(" 0X1004 ").unwrap(), 0x1004);
        assert_eq!(parse_vendor_id("1").unwrap(), 0x0001);
    }

    #[test]
    fn test_parse_vendor_id_invalid() {
        assert!(parse_vendor_id("").is_err());
        assert!(parse_vendor_id("0x").is_err());
        assert!(parse_vendor_id("12345").is_err());
        assert!(parse_vendor_id("g123").is_err());
        assert!(parse_vendor_id("-1").is_err());
    }

    #[test]
    fn test_request_types() {
        // Direction bit set only for the IN request, type bits = vendor
        assert_eq!(VENDOR_REQUEST_IN & 0x80, 0x80);
        assert_eq!(VENDOR_REQUEST_OUT & 0x80, 0x00);
        assert_eq!(VENDOR_REQUEST_IN & 0x60, 0x40);
        assert_eq!(VENDOR_REQUEST_OUT & 0x60, 0x40);
    }
}
