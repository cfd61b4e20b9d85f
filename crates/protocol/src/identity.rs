//! Accessory identification strings
//!
//! During the handshake the host announces itself with six strings. The
//! Android side matches them against the `accessory_filter` of the app that
//! should be launched, so they have to stay in sync with that app.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// Index of an identification string, sent as `wIndex` of request 52
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum IdentityField {
    Manufacturer = 0,
    Model = 1,
    Description = 2,
    Version = 3,
    Url = 4,
    Serial = 5,
}

impl IdentityField {
    /// All fields in the order they are sent
    pub const ALL: [IdentityField; 6] = [
        IdentityField::Manufacturer,
        IdentityField::Model,
        IdentityField::Description,
        IdentityField::Version,
        IdentityField::Url,
        IdentityField::Serial,
    ];

    /// Value of `wIndex` for this string
    pub fn index(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            IdentityField::Manufacturer => "manufacturer",
            IdentityField::Model => "model",
            IdentityField::Description => "description",
            IdentityField::Version => "version",
            IdentityField::Url => "url",
            IdentityField::Serial => "serial",
        }
    }
}

/// The six strings announced to the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryIdentity {
    pub manufacturer: String,
    pub model: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub serial: String,
}

impl Default for AccessoryIdentity {
    fn default() -> Self {
        Self {
            manufacturer: "aoa-keyboard-bridge".to_string(),
            model: "Keyboard".to_string(),
            description: "Android device as host keyboard".to_string(),
            version: "1.0".to_string(),
            url: "https://github.com/aoa-keyboard-bridge/aoa-keyboard-bridge".to_string(),
            serial: "0000000012345678".to_string(),
        }
    }
}

impl AccessoryIdentity {
    /// String for a single field
    pub fn get(&self, field: IdentityField) -> &str {
        match field {
            IdentityField::Manufacturer => &self.manufacturer,
            IdentityField::Model => &self.model,
            IdentityField::Description => &self.description,
            IdentityField::Version => &self.version,
            IdentityField::Url => &self.url,
            IdentityField::Serial => &self.serial,
        }
    }

    /// Fields paired with their bytes, in wire order
    pub fn fields(&self) -> impl Iterator<Item = (IdentityField, &[u8])> + '_ {
        IdentityField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field).as_bytes()))
    }

    /// Reject strings the device could not interpret
    pub fn validate(&self) -> Result<()> {
        for field in IdentityField::ALL {
            let value = self.get(field);
            if !value.is_ascii() {
                return Err(ProtocolError::NonAsciiIdentity {
                    field: field.name(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_in_wire_order() {
        let identity = AccessoryIdentity::default();
        let indices: Vec<u16> = identity.fields().map(|(f, _)| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fields_carry_exact_bytes() {
        let identity = AccessoryIdentity {
            manufacturer: "M".to_string(),
            model: "Mo".to_string(),
            description: "Desc".to_string(),
            version: "2".to_string(),
            url: "u".to_string(),
            serial: "".to_string(),
        };
        let fields: Vec<(IdentityField, &[u8])> = identity.fields().collect();
        assert_eq!(fields[0], (IdentityField::Manufacturer, b"M".as_slice()));
        assert_eq!(fields[2], (IdentityField::Description, b"Desc".as_slice()));
        assert_eq!(fields[5], (IdentityField::Serial, b"".as_slice()));
    }

    #[test]
    fn test_default_identity_is_valid() {
        assert!(AccessoryIdentity::default().validate().is_ok());
    }

    #[test]
    fn test_non_ascii_rejected() {
        let identity = AccessoryIdentity {
            model: "Tastatür".to_string(),
            ..Default::default()
        };
        match identity.validate() {
            Err(ProtocolError::NonAsciiIdentity { field, .. }) => assert_eq!(field, "model"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_identity_from_toml() {
        let identity: AccessoryIdentity = toml::from_str(
            r#"
manufacturer = "Acme"
model = "Keys"
description = "d"
version = "3"
url = "https://example.com"
serial = "42"
"#,
        )
        .unwrap();
        assert_eq!(identity.manufacturer, "Acme");
        assert_eq!(identity.get(IdentityField::Serial), "42");
    }

    #[test]
    fn test_partial_identity_keeps_defaults() {
        let identity: AccessoryIdentity = toml::from_str(r#"model = "Tablet""#).unwrap();
        assert_eq!(identity.model, "Tablet");
        assert_eq!(identity.serial, AccessoryIdentity::default().serial);
    }
}
