//! Error types for the transport layer

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a request/response exchange
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No complete response before the deadline
    #[error("no response within {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// Peer closed the connection before a complete response arrived
    #[error("connection closed by device")]
    ConnectionClosed,

    /// Response grew past the configured limit without decoding
    #[error("response exceeded {max} bytes")]
    ResponseTooLarge { max: usize },

    /// Protocol error (NAK, malformed response, unencodable command)
    #[error("protocol error: {0}")]
    Protocol(#[from] beacon_protocol::ProtocolError),
}

impl LinkError {
    /// Whether the device explicitly rejected the command
    pub fn is_negative_acknowledge(&self) -> bool {
        matches!(
            self,
            LinkError::Protocol(beacon_protocol::ProtocolError::NegativeAcknowledge)
        )
    }
}
