//! Signal Tower Protocol Library
//!
//! This crate provides frame encoding and response parsing for the two
//! command families spoken by networked signal towers:
//!
//! - **PNS**: Length-prefixed frames (`AB` product id, command id, 16-bit
//!   payload length) covering pattern control, color control, smart mode,
//!   mute, reboot and the two status queries
//! - **PHN**: Single command byte with an optional flag byte, driving three
//!   LED stages and two buzzer patterns
//!
//! # Architecture
//!
//! Each protocol module provides:
//! - A command enum that encodes to its request frame ([`EncodeCommand`])
//! - One decode function per response kind
//! - A streaming request parser ([`ProtocolCodec`]) for the device side
//!
//! Every encode/decode call is a pure transform on byte buffers. Socket
//! lifecycle, timeouts and the one-request-at-a-time discipline belong to
//! the transport.
//!
//! # Example
//!
//! ```rust
//! use beacon_protocol::pns::{self, PnsCommand, RunControlData};
//! use beacon_protocol::status::ModeData;
//! use beacon_protocol::EncodeCommand;
//!
//! let frame = PnsCommand::RunControl(RunControlData::new([1, 2, 0, 9, 9], 3))
//!     .encode()
//!     .unwrap();
//! assert_eq!(&frame[..6], b"ABS\x00\x00\x06");
//!
//! let response = [0, 0, 0, 0, 0, 0, 0, 0, 0x00, 1, 2, 0, 9, 9, 3];
//! let status = pns::decode_status(&response).unwrap();
//! assert!(matches!(status.data, ModeData::Led(_)));
//! ```

pub mod codes;
mod cursor;
pub mod error;
pub mod phn;
pub mod pns;
pub mod status;

pub use codes::{BlinkControl, BuzzerPattern, DetailBuzzerPattern, LedColor, LedPattern, Mode};
pub use error::{EncodingError, ParseError, ProtocolError};
pub use phn::{PhnCodec, PhnCommand, PhnRunData};
pub use pns::{DetailRunControlData, PnsCodec, PnsCommand, RunControlData};
pub use status::{
    DetailModeData, DetailStatusData, LedModeData, LedModeDetailData, LedUnitData, ModeData,
    SmartModeData, SmartModeDetailData, SmartModeDetailState, StatusData,
};

/// Identifies which command family a connection speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    /// Length-prefixed PNS frames
    Pns,
    /// Single-byte PHN commands
    Phn,
}

impl Protocol {
    /// Returns a human-readable name for the protocol
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Pns => "PNS",
            Protocol::Phn => "PHN",
        }
    }
}

/// Trait for protocol codecs that can parse incoming data streams
pub trait ProtocolCodec {
    /// The command type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete command from the buffer
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Try to extract the next complete command along with its raw bytes
    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Result<Vec<u8>, ProtocolError>;
}
