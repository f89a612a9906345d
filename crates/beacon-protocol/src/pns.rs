//! PNS Protocol Implementation
//!
//! PNS is the length-prefixed command family. Every request carries a
//! 6-byte header followed by a command-specific payload.
//!
//! # Request Format
//! ```text
//! 'A' 'B' [cmd] 0x00 [len_hi] [len_lo] [payload...]
//! ```
//!
//! - `AB`: Product id (fixed)
//! - `cmd`: ASCII command identifier
//! - `0x00`: Reserved
//! - `len`: Payload length, big-endian `u16`
//!
//! # Responses
//! Command-style requests are answered with a single ACK (0x06) or NAK
//! (0x15) byte. The two query commands answer with their status payload
//! directly, or with NAK.

use crate::error::{EncodingError, ParseError, ProtocolError};
use crate::status::{DetailStatusData, StatusData};
use crate::{EncodeCommand, ProtocolCodec};

/// Product id that opens every PNS request
pub const PRODUCT_ID: [u8; 2] = *b"AB";
/// Length of the request header
pub const HEADER_LEN: usize = 6;
/// Largest payload the length field can describe
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Positive acknowledgement byte
pub const ACK: u8 = 0x06;
/// Negative acknowledgement byte
pub const NAK: u8 = 0x15;

/// PNS command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PnsCommandId {
    /// Smart mode control (`T`)
    SmartMode = b'T',
    /// Mute (`M`)
    Mute = b'M',
    /// Stop/pulse input (`P`)
    StopPulseInput = b'P',
    /// Operation control (`S`)
    RunControl = b'S',
    /// Detailed operation control (`D`)
    DetailRunControl = b'D',
    /// Clear (`C`)
    Clear = b'C',
    /// Reboot (`B`)
    Reboot = b'B',
    /// Get status (`G`)
    GetData = b'G',
    /// Get detailed status (`E`)
    GetDetailData = b'E',
}

impl PnsCommandId {
    /// Wire byte for this command
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Payload length the command requires, `None` when it varies
    pub fn payload_len(self) -> Option<usize> {
        match self {
            PnsCommandId::Clear | PnsCommandId::GetData | PnsCommandId::GetDetailData => Some(0),
            PnsCommandId::SmartMode | PnsCommandId::Mute | PnsCommandId::StopPulseInput => {
                Some(1)
            }
            PnsCommandId::RunControl => Some(RunControlData::LEN),
            PnsCommandId::DetailRunControl => Some(DetailRunControlData::LEN),
            PnsCommandId::Reboot => None,
        }
    }
}

impl TryFrom<u8> for PnsCommandId {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'T' => Ok(Self::SmartMode),
            b'M' => Ok(Self::Mute),
            b'P' => Ok(Self::StopPulseInput),
            b'S' => Ok(Self::RunControl),
            b'D' => Ok(Self::DetailRunControl),
            b'C' => Ok(Self::Clear),
            b'B' => Ok(Self::Reboot),
            b'G' => Ok(Self::GetData),
            b'E' => Ok(Self::GetDetailData),
            _ => Err(ParseError::UnknownCode {
                table: "PNS command",
                value,
            }),
        }
    }
}

/// Payload of the operation control command
///
/// Values are sent as given; see [`crate::codes::LedPattern`] and
/// [`crate::codes::BuzzerPattern`] for the documented codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunControlData {
    /// Pattern of LED stages 1 to 5
    pub led_patterns: [u8; 5],
    pub buzzer_pattern: u8,
}

impl RunControlData {
    pub const LEN: usize = 6;

    pub fn new(led_patterns: [u8; 5], buzzer_pattern: u8) -> Self {
        Self {
            led_patterns,
            buzzer_pattern,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [l1, l2, l3, l4, l5] = self.led_patterns;
        [l1, l2, l3, l4, l5, self.buzzer_pattern]
    }

    fn from_payload(payload: &[u8]) -> Option<Self> {
        let [l1, l2, l3, l4, l5, buzzer_pattern]: [u8; Self::LEN] = payload.try_into().ok()?;
        Some(Self::new([l1, l2, l3, l4, l5], buzzer_pattern))
    }
}

/// Payload of the detailed operation control command
///
/// Values are sent as given; see [`crate::codes::LedColor`],
/// [`crate::codes::BlinkControl`] and [`crate::codes::DetailBuzzerPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetailRunControlData {
    /// Color of LED stages 1 to 5
    pub led_colors: [u8; 5],
    pub blinking_control: u8,
    pub buzzer_pattern: u8,
}

impl DetailRunControlData {
    pub const LEN: usize = 7;

    pub fn new(led_colors: [u8; 5], blinking_control: u8, buzzer_pattern: u8) -> Self {
        Self {
            led_colors,
            blinking_control,
            buzzer_pattern,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [c1, c2, c3, c4, c5] = self.led_colors;
        [
            c1,
            c2,
            c3,
            c4,
            c5,
            self.blinking_control,
            self.buzzer_pattern,
        ]
    }

    fn from_payload(payload: &[u8]) -> Option<Self> {
        let [c1, c2, c3, c4, c5, blinking_control, buzzer_pattern]: [u8; Self::LEN] =
            payload.try_into().ok()?;
        Some(Self::new(
            [c1, c2, c3, c4, c5],
            blinking_control,
            buzzer_pattern,
        ))
    }
}

/// PNS protocol command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PnsCommand {
    /// Run smart mode for a group number (device accepts 1 to 31)
    SmartMode { group: u8 },
    /// Buzzer mute on/off
    Mute { enabled: bool },
    /// STOP input in time trigger mode, trigger input in pulse trigger mode
    StopPulseInput { enabled: bool },
    /// Drive each LED stage and the buzzer with a pattern
    RunControl(RunControlData),
    /// Drive each LED stage with a color, plus blinking and buzzer pattern
    DetailRunControl(DetailRunControlData),
    /// Turn off all LED stages and stop the buzzer
    Clear,
    /// Restart the device; password is the web configuration password
    Reboot { password: String },
    /// Query status
    GetData,
    /// Query detailed status
    GetDetailData,
    /// Request frame with an unrecognised id or a payload of the wrong size
    Unknown { command_id: u8, payload: Vec<u8> },
}

impl PnsCommand {
    /// Wire byte of the command identifier
    pub fn command_id(&self) -> u8 {
        match self {
            PnsCommand::SmartMode { .. } => PnsCommandId::SmartMode.byte(),
            PnsCommand::Mute { .. } => PnsCommandId::Mute.byte(),
            PnsCommand::StopPulseInput { .. } => PnsCommandId::StopPulseInput.byte(),
            PnsCommand::RunControl(_) => PnsCommandId::RunControl.byte(),
            PnsCommand::DetailRunControl(_) => PnsCommandId::DetailRunControl.byte(),
            PnsCommand::Clear => PnsCommandId::Clear.byte(),
            PnsCommand::Reboot { .. } => PnsCommandId::Reboot.byte(),
            PnsCommand::GetData => PnsCommandId::GetData.byte(),
            PnsCommand::GetDetailData => PnsCommandId::GetDetailData.byte(),
            PnsCommand::Unknown { command_id, .. } => *command_id,
        }
    }

    /// Payload bytes that follow the header
    pub fn payload(&self) -> Result<Vec<u8>, EncodingError> {
        let payload = match self {
            PnsCommand::SmartMode { group } => vec![*group],
            PnsCommand::Mute { enabled } | PnsCommand::StopPulseInput { enabled } => {
                vec![u8::from(*enabled)]
            }
            PnsCommand::RunControl(data) => data.to_bytes().to_vec(),
            PnsCommand::DetailRunControl(data) => data.to_bytes().to_vec(),
            PnsCommand::Clear | PnsCommand::GetData | PnsCommand::GetDetailData => Vec::new(),
            PnsCommand::Reboot { password } => {
                if !password.is_ascii() {
                    return Err(EncodingError::NonAsciiPassword);
                }
                password.as_bytes().to_vec()
            }
            PnsCommand::Unknown { payload, .. } => payload.clone(),
        };

        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(EncodingError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(payload)
    }

    /// Build a command from a header id and its payload
    ///
    /// Payloads that do not match the command's size rule yield
    /// [`PnsCommand::Unknown`], as does an unrecognised id.
    pub fn from_parts(command_id: u8, payload: &[u8]) -> Self {
        let unknown = || PnsCommand::Unknown {
            command_id,
            payload: payload.to_vec(),
        };

        let Ok(id) = PnsCommandId::try_from(command_id) else {
            return unknown();
        };
        if id.payload_len().is_some_and(|len| len != payload.len()) {
            return unknown();
        }

        match id {
            PnsCommandId::SmartMode => PnsCommand::SmartMode { group: payload[0] },
            PnsCommandId::Mute => PnsCommand::Mute {
                enabled: payload[0] != 0,
            },
            PnsCommandId::StopPulseInput => PnsCommand::StopPulseInput {
                enabled: payload[0] != 0,
            },
            PnsCommandId::RunControl => RunControlData::from_payload(payload)
                .map(PnsCommand::RunControl)
                .unwrap_or_else(unknown),
            PnsCommandId::DetailRunControl => DetailRunControlData::from_payload(payload)
                .map(PnsCommand::DetailRunControl)
                .unwrap_or_else(unknown),
            PnsCommandId::Clear => PnsCommand::Clear,
            PnsCommandId::Reboot => match std::str::from_utf8(payload) {
                Ok(password) if password.is_ascii() => PnsCommand::Reboot {
                    password: password.to_string(),
                },
                _ => unknown(),
            },
            PnsCommandId::GetData => PnsCommand::GetData,
            PnsCommandId::GetDetailData => PnsCommand::GetDetailData,
        }
    }
}

impl EncodeCommand for PnsCommand {
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let payload = self.payload()?;
        // payload() caps the length at MAX_PAYLOAD_LEN
        let len = payload.len() as u16;

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.extend_from_slice(&PRODUCT_ID);
        frame.push(self.command_id());
        frame.push(0x00);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }
}

/// Encode a PNS command into its request frame
pub fn encode(command: &PnsCommand) -> Result<Vec<u8>, ProtocolError> {
    command.encode()
}

fn check_nak(response: &[u8]) -> Result<(), ProtocolError> {
    match response.first() {
        Some(&NAK) => Err(ProtocolError::NegativeAcknowledge),
        Some(_) => Ok(()),
        None => Err(ProtocolError::TruncatedFrame {
            needed: 1,
            actual: 0,
        }),
    }
}

/// Check the response to a command-style request
///
/// Only the NAK sentinel is an error; any other leading byte is taken as
/// acknowledgement.
pub fn decode_ack(response: &[u8]) -> Result<(), ProtocolError> {
    check_nak(response)
}

/// Decode the response to [`PnsCommand::GetData`]
pub fn decode_status(response: &[u8]) -> Result<StatusData, ProtocolError> {
    check_nak(response)?;
    StatusData::from_bytes(response)
}

/// Decode the response to [`PnsCommand::GetDetailData`]
pub fn decode_detail_status(response: &[u8]) -> Result<DetailStatusData, ProtocolError> {
    check_nak(response)?;
    DetailStatusData::from_bytes(response)
}

/// Streaming PNS request parser (device side)
pub struct PnsCodec {
    buffer: Vec<u8>,
}

impl PnsCodec {
    /// Create a new PNS codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Drop bytes until the buffer starts with the product id
    fn sync_to_product_id(&mut self) {
        let start = self
            .buffer
            .windows(2)
            .position(|w| w == PRODUCT_ID.as_slice())
            .unwrap_or_else(|| {
                // Keep a trailing 'A' that may be the first half of the id
                let keep = self.buffer.last() == Some(&PRODUCT_ID[0]);
                self.buffer.len() - usize::from(keep)
            });

        if start > 0 {
            let skipped: Vec<u8> = self.buffer.drain(..start).collect();
            tracing::warn!(
                "Discarded {} bytes before PNS product id: {:02X?}",
                skipped.len(),
                skipped
            );
        }
    }

    /// Check the buffer for a complete frame, returning its total length
    ///
    /// Expects the buffer to start at a product id.
    fn frame_len(&self) -> Result<usize, ParseError> {
        if self.buffer.len() < HEADER_LEN {
            return Err(ParseError::Incomplete {
                needed: HEADER_LEN - self.buffer.len(),
            });
        }

        let payload_len = u16::from_be_bytes([self.buffer[4], self.buffer[5]]) as usize;
        let total = HEADER_LEN + payload_len;
        if self.buffer.len() < total {
            return Err(ParseError::Incomplete {
                needed: total - self.buffer.len(),
            });
        }
        Ok(total)
    }
}

impl Default for PnsCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for PnsCodec {
    type Command = PnsCommand;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn next_command(&mut self) -> Option<Self::Command> {
        self.next_command_with_bytes().map(|(cmd, _)| cmd)
    }

    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)> {
        self.sync_to_product_id();

        let total = match self.frame_len() {
            Ok(total) => total,
            Err(e) => {
                tracing::trace!("Waiting for PNS frame: {}", e);
                return None;
            }
        };

        let bytes: Vec<u8> = self.buffer.drain(..total).collect();
        let cmd = PnsCommand::from_parts(bytes[2], &bytes[HEADER_LEN..]);
        Some((cmd, bytes))
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
