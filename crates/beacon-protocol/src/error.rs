//! Error types for PNS/PHN encoding and decoding

use thiserror::Error;

/// Errors that can occur while serializing a command into its wire frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Reboot password contains characters outside 7-bit ASCII
    #[error("password must be ASCII")]
    NonAsciiPassword,

    /// Payload does not fit the 16-bit length field
    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Errors that can occur while parsing request frames on the device side
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Buffer is incomplete - need more data
    #[error("incomplete data: need {needed} more bytes")]
    Incomplete { needed: usize },

    /// Value outside a code table's domain
    #[error("unknown {table} code: {value}")]
    UnknownCode { table: &'static str, value: u8 },
}

/// Errors surfaced by a single request/response exchange
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The device answered with its NAK sentinel
    #[error("negative acknowledge")]
    NegativeAcknowledge,

    /// Response is shorter than the selected layout requires
    #[error("truncated frame: need {needed} bytes, got {actual}")]
    TruncatedFrame { needed: usize, actual: usize },

    /// PHN read response did not echo the command id
    #[error("unexpected echo: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedEcho { expected: u8, actual: u8 },

    /// Command could not be serialized
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

impl ProtocolError {
    /// Whether more response bytes could turn this failure into a success
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::TruncatedFrame { .. })
    }
}
