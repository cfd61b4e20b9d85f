//! Protocol error types

use thiserror::Error;

/// Protocol-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Fewer bytes than a full key packet were received
    #[error("Short key packet: expected {expected} bytes, got {actual}")]
    ShortPacket { expected: usize, actual: usize },

    /// The action byte is neither key-down nor key-up
    #[error("Unknown key action code {0}")]
    UnknownAction(u8),

    /// Vendor ID string is not a 16-bit hexadecimal number
    #[error("Invalid vendor ID '{0}', expected a hexadecimal value such as 18d1")]
    InvalidVendorId(String),

    /// An identification string contains non-ASCII characters
    #[error("Accessory {field} string must be ASCII: {value:?}")]
    NonAsciiIdentity { field: &'static str, value: String },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
