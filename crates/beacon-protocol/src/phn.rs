//! PHN Protocol Implementation
//!
//! PHN is the minimal command family: a single ASCII command byte,
//! optionally followed by one flag byte.
//!
//! # Request Format
//! ```text
//! 'W' [flags]    write
//! 'R'            read
//! ```
//!
//! # Response Format
//! ```text
//! "ACK" | "NAK"  write
//! 'R' [flags]    read (command byte echoed back)
//! ```
//!
//! # Flag Byte
//! ```text
//! bit7 bit6 bit5 bit4  bit3  bit2 bit1 bit0
//! B3   B2   B1   BZ2   BZ1   L3   L2   L1
//! ```
//! `Ln` = LED unit n lighting, `Bn` = LED unit n blinking, `BZn` = buzzer pattern n.

use crate::error::ProtocolError;
use crate::{EncodeCommand, ProtocolCodec};

/// Write command byte
pub const WRITE_COMMAND: u8 = b'W';
/// Read command byte
pub const READ_COMMAND: u8 = b'R';

/// Write acknowledgement token
pub const ACK: [u8; 3] = *b"ACK";
/// Write rejection token
pub const NAK: [u8; 3] = *b"NAK";

/// Bit masks of the PHN flag byte
pub mod flags {
    /// 1st LED unit lighting
    pub const LED_UNIT1_LIGHTING: u8 = 0x01;
    /// 2nd LED unit lighting
    pub const LED_UNIT2_LIGHTING: u8 = 0x02;
    /// 3rd LED unit lighting
    pub const LED_UNIT3_LIGHTING: u8 = 0x04;
    /// Buzzer pattern 1
    pub const BUZZER_PATTERN1: u8 = 0x08;
    /// Buzzer pattern 2
    pub const BUZZER_PATTERN2: u8 = 0x10;
    /// 1st LED unit blinking
    pub const LED_UNIT1_BLINKING: u8 = 0x20;
    /// 2nd LED unit blinking
    pub const LED_UNIT2_BLINKING: u8 = 0x40;
    /// 3rd LED unit blinking
    pub const LED_UNIT3_BLINKING: u8 = 0x80;
}

/// PHN command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PhnCommandId {
    Write = WRITE_COMMAND,
    Read = READ_COMMAND,
}

/// Lighting, blinking and buzzer state carried by the PHN flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhnRunData {
    pub led_unit1_lighting: bool,
    pub led_unit2_lighting: bool,
    pub led_unit3_lighting: bool,
    pub buzzer_pattern1: bool,
    pub buzzer_pattern2: bool,
    pub led_unit1_blinking: bool,
    pub led_unit2_blinking: bool,
    pub led_unit3_blinking: bool,
}

impl PhnRunData {
    /// Unpack a flag byte
    pub fn from_byte(byte: u8) -> Self {
        let bit = |mask: u8| byte & mask != 0;
        Self {
            led_unit1_lighting: bit(flags::LED_UNIT1_LIGHTING),
            led_unit2_lighting: bit(flags::LED_UNIT2_LIGHTING),
            led_unit3_lighting: bit(flags::LED_UNIT3_LIGHTING),
            buzzer_pattern1: bit(flags::BUZZER_PATTERN1),
            buzzer_pattern2: bit(flags::BUZZER_PATTERN2),
            led_unit1_blinking: bit(flags::LED_UNIT1_BLINKING),
            led_unit2_blinking: bit(flags::LED_UNIT2_BLINKING),
            led_unit3_blinking: bit(flags::LED_UNIT3_BLINKING),
        }
    }

    /// Pack into a flag byte
    pub fn to_byte(&self) -> u8 {
        self.fields()
            .iter()
            .filter(|(on, _)| *on)
            .fold(0, |acc, (_, mask)| acc | mask)
    }

    /// Every field paired with its mask, lowest bit first
    fn fields(&self) -> [(bool, u8); 8] {
        [
            (self.led_unit1_lighting, flags::LED_UNIT1_LIGHTING),
            (self.led_unit2_lighting, flags::LED_UNIT2_LIGHTING),
            (self.led_unit3_lighting, flags::LED_UNIT3_LIGHTING),
            (self.buzzer_pattern1, flags::BUZZER_PATTERN1),
            (self.buzzer_pattern2, flags::BUZZER_PATTERN2),
            (self.led_unit1_blinking, flags::LED_UNIT1_BLINKING),
            (self.led_unit2_blinking, flags::LED_UNIT2_BLINKING),
            (self.led_unit3_blinking, flags::LED_UNIT3_BLINKING),
        ]
    }
}

impl From<u8> for PhnRunData {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<PhnRunData> for u8 {
    fn from(data: PhnRunData) -> u8 {
        data.to_byte()
    }
}

/// PHN protocol command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhnCommand {
    /// Set lighting, blinking and buzzer state
    Write(PhnRunData),
    /// Read back the current state
    Read,
    /// Leading byte that is not a PHN command
    Unknown { command_id: u8 },
}

impl PhnCommand {
    /// Wire byte of the command identifier
    pub fn command_id(&self) -> u8 {
        match self {
            PhnCommand::Write(_) => PhnCommandId::Write as u8,
            PhnCommand::Read => PhnCommandId::Read as u8,
            PhnCommand::Unknown { command_id } => *command_id,
        }
    }
}

impl EncodeCommand for PhnCommand {
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(match self {
            PhnCommand::Write(data) => encode_write(data.to_byte()),
            PhnCommand::Read => encode_read(),
            PhnCommand::Unknown { command_id } => vec![*command_id],
        })
    }
}

/// Encode a write request carrying `flags`
pub fn encode_write(flags: u8) -> Vec<u8> {
    vec![WRITE_COMMAND, flags]
}

/// Encode a read request
pub fn encode_read() -> Vec<u8> {
    vec![READ_COMMAND]
}

/// Check the response to a write request
///
/// Only the NAK token is an error; any other 3-byte token is taken as
/// acknowledgement.
pub fn decode_write_ack(response: &[u8]) -> Result<(), ProtocolError> {
    let token = response
        .get(..NAK.len())
        .ok_or(ProtocolError::TruncatedFrame {
            needed: NAK.len(),
            actual: response.len(),
        })?;

    if token == NAK.as_slice() {
        return Err(ProtocolError::NegativeAcknowledge);
    }
    if token != ACK.as_slice() {
        tracing::debug!("Accepting non-ACK PHN write response: {:02X?}", token);
    }
    Ok(())
}

/// Decode the response to a read request
pub fn decode_read(response: &[u8]) -> Result<PhnRunData, ProtocolError> {
    match response {
        [] => Err(ProtocolError::TruncatedFrame {
            needed: 2,
            actual: 0,
        }),
        [echo, ..] if *echo != READ_COMMAND => Err(ProtocolError::UnexpectedEcho {
            expected: READ_COMMAND,
            actual: *echo,
        }),
        [_] => Err(ProtocolError::TruncatedFrame {
            needed: 2,
            actual: 1,
        }),
        [_, flags, ..] => Ok(PhnRunData::from_byte(*flags)),
    }
}

/// Streaming PHN request parser (device side)
pub struct PhnCodec {
    buffer: Vec<u8>,
}

impl PhnCodec {
    /// Create a new PHN codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(8),
        }
    }
}

impl Default for PhnCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for PhnCodec {
    type Command = PhnCommand;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn next_command(&mut self) -> Option<Self::Command> {
        self.next_command_with_bytes().map(|(cmd, _)| cmd)
    }

    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)> {
        let (cmd, len) = match self.buffer.as_slice() {
            [] => return None,
            [WRITE_COMMAND] => return None,
            [WRITE_COMMAND, flags, ..] => (PhnCommand::Write(PhnRunData::from_byte(*flags)), 2),
            [READ_COMMAND, ..] => (PhnCommand::Read, 1),
            [other, ..] => (PhnCommand::Unknown { command_id: *other }, 1),
        };

        let bytes: Vec<u8> = self.buffer.drain(..len).collect();
        Some((cmd, bytes))
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_write_and_read() {
        assert_eq!(encode_write(0xA5), vec![b'W', 0xA5]);
        assert_eq!(encode_read(), vec![b'R']);
        assert_eq!(
            PhnCommand::Write(PhnRunData::from_byte(0x03)).encode().unwrap(),
            vec![b'W', 0x03]
        );
    }

    #[test]
    fn test_decode_read_bit_assignment() {
        let data = decode_read(&[0x52, 0b1010_0101]).unwrap();

        assert!(data.led_unit1_lighting);
        assert!(!data.led_unit2_lighting);
        assert!(data.led_unit3_lighting);
        assert!(!data.buzzer_pattern1);
        assert!(!data.buzzer_pattern2);
        assert!(data.led_unit1_blinking);
        assert!(!data.led_unit2_blinking);
        assert!(data.led_unit3_blinking);
    }

    #[test]
    fn test_each_mask_maps_to_one_field() {
        for bit in 0..8 {
            let data = PhnRunData::from_byte(1 << bit);
            let set = data.fields().iter().filter(|(on, _)| *on).count();
            assert_eq!(set, 1, "bit {}", bit);
            assert_eq!(data.to_byte(), 1 << bit);
        }
    }

    #[test]
    fn test_decode_read_unexpected_echo() {
        assert_eq!(
            decode_read(b"NAK"),
            Err(ProtocolError::UnexpectedEcho {
                expected: b'R',
                actual: b'N'
            })
        );
    }

    #[test]
    fn test_decode_read_truncated() {
        assert!(decode_read(&[]).unwrap_err().is_truncated());
        assert!(decode_read(b"R").unwrap_err().is_truncated());
    }

    #[test]
    fn test_decode_write_ack_lenient() {
        assert_eq!(decode_write_ack(b"ACK"), Ok(()));
        assert_eq!(decode_write_ack(b"???"), Ok(()));
        assert_eq!(decode_write_ack(&[0, 0, 0]), Ok(()));
        assert_eq!(
            decode_write_ack(b"NAK"),
            Err(ProtocolError::NegativeAcknowledge)
        );
        assert!(decode_write_ack(b"AC").unwrap_err().is_truncated());
    }

    #[test]
    fn test_codec_parses_requests() {
        let mut codec = PhnCodec::new();
        codec.push_bytes(&[b'R', b'W']);

        assert_eq!(codec.next_command(), Some(PhnCommand::Read));
        assert_eq!(codec.next_command(), None);

        codec.push_bytes(&[0x11, b'X']);
        assert_eq!(
            codec.next_command(),
            Some(PhnCommand::Write(PhnRunData::from_byte(0x11)))
        );
        assert_eq!(
            codec.next_command(),
            Some(PhnCommand::Unknown { command_id: b'X' })
        );
    }
}
