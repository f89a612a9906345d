//! Status records returned by the PNS get-data and get-detail-data commands
//!
//! # Get Data Response
//! ```text
//! [input x8] [mode] [LED mode: p1..p5 buzzer | smart mode: group mute stop pattern]
//! ```
//!
//! # Get Detail Data Response
//! ```text
//! [MAC x6] [input x8] [mode] [unused x4] [LED mode: unit x5 buzzer | smart mode: state x5 unit x5 buzzer]
//! ```
//!
//! The four bytes after the mode byte carry nothing; they are skipped on
//! decode and written as zero on encode.
//!
//! Each LED unit block is 4 bytes: pattern, red, green, blue.
//!
//! The mode byte is compared against the signal light sentinel only: any
//! other value selects the smart mode layout.

use crate::codes::Mode;
use crate::cursor::Cursor;
use crate::error::ProtocolError;

/// Number of addressable LED stages
pub const LED_STAGES: usize = 5;
/// Number of signal line / contact inputs
pub const INPUT_COUNT: usize = 8;

/// Bytes before the mode-dependent part of a get-data response
pub const STATUS_HEADER_LEN: usize = INPUT_COUNT + 1;
/// Unused bytes between the mode byte and the mode-dependent part of a
/// get-detail-data response
pub const DETAIL_STATUS_UNUSED_LEN: usize = 4;
/// Bytes before the mode-dependent part of a get-detail-data response
pub const DETAIL_STATUS_HEADER_LEN: usize = 6 + INPUT_COUNT + 1 + DETAIL_STATUS_UNUSED_LEN;

/// Length of one LED unit block
pub const LED_UNIT_LEN: usize = 4;
/// Length of the signal light mode part of a get-data response
pub const LED_MODE_LEN: usize = LED_STAGES + 1;
/// Length of the smart mode part of a get-data response
pub const SMART_MODE_LEN: usize = 4;
/// Length of the smart mode state block of a get-detail-data response
pub const SMART_MODE_DETAIL_STATE_LEN: usize = 5;
/// Length of the signal light mode part of a get-detail-data response
pub const LED_MODE_DETAIL_LEN: usize = LED_STAGES * LED_UNIT_LEN + 1;
/// Length of the smart mode part of a get-detail-data response
pub const SMART_MODE_DETAIL_LEN: usize = SMART_MODE_DETAIL_STATE_LEN + LED_MODE_DETAIL_LEN;

/// Color and pattern of one LED stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedUnitData {
    /// Pattern / status code
    pub pattern: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedUnitData {
    fn read(cursor: &mut Cursor<'_>) -> Result<Self, ProtocolError> {
        let [pattern, red, green, blue] = cursor.take::<LED_UNIT_LEN>()?;
        Ok(Self {
            pattern,
            red,
            green,
            blue,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.pattern, self.red, self.green, self.blue]);
    }
}

fn read_led_units(cursor: &mut Cursor<'_>) -> Result<[LedUnitData; LED_STAGES], ProtocolError> {
    let mut units = [LedUnitData::default(); LED_STAGES];
    for unit in units.iter_mut() {
        *unit = LedUnitData::read(cursor)?;
    }
    Ok(units)
}

/// Status while running signal light mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedModeData {
    /// Pattern of LED stages 1 to 5
    pub led_patterns: [u8; LED_STAGES],
    pub buzzer_pattern: u8,
}

/// Status while running smart mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmartModeData {
    pub group_no: u8,
    pub mute: u8,
    pub stop_input: u8,
    pub pattern_no: u8,
}

/// Mode-dependent part of a get-data response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeData {
    Led(LedModeData),
    Smart(SmartModeData),
}

/// Decoded get-data response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusData {
    /// Input 1 to 8, one flag byte each
    pub input: [u8; INPUT_COUNT],
    /// Raw mode byte as sent by the device
    pub mode: u8,
    pub data: ModeData,
}

impl StatusData {
    /// Parse a get-data response payload
    ///
    /// Does not look for the NAK sentinel; see [`crate::pns::decode_status`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut cursor = Cursor::new(bytes);
        cursor.require(STATUS_HEADER_LEN)?;

        let input = cursor.take::<INPUT_COUNT>()?;
        let mode = cursor.take_u8()?;

        let data = match Mode::from_byte(mode) {
            Mode::Led => {
                cursor.require(LED_MODE_LEN)?;
                let led_patterns = cursor.take::<LED_STAGES>()?;
                let buzzer_pattern = cursor.take_u8()?;
                ModeData::Led(LedModeData {
                    led_patterns,
                    buzzer_pattern,
                })
            }
            Mode::Smart => {
                let [group_no, mute, stop_input, pattern_no] = cursor.take::<SMART_MODE_LEN>()?;
                ModeData::Smart(SmartModeData {
                    group_no,
                    mute,
                    stop_input,
                    pattern_no,
                })
            }
        };

        Ok(Self { input, mode, data })
    }

    /// Serialize back to the device's response layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATUS_HEADER_LEN + LED_MODE_LEN);
        out.extend_from_slice(&self.input);
        out.push(mode_byte_for(self.mode, matches!(self.data, ModeData::Led(_))));

        match &self.data {
            ModeData::Led(led) => {
                out.extend_from_slice(&led.led_patterns);
                out.push(led.buzzer_pattern);
            }
            ModeData::Smart(smart) => {
                out.extend_from_slice(&[
                    smart.group_no,
                    smart.mute,
                    smart.stop_input,
                    smart.pattern_no,
                ]);
            }
        }
        out
    }

    /// Operating mode selected by the mode byte
    pub fn operating_mode(&self) -> Mode {
        Mode::from_byte(self.mode)
    }
}

/// Smart mode state block of a get-detail-data response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmartModeDetailState {
    pub group_no: u8,
    pub mute: u8,
    pub stop_input: u8,
    pub pattern_no: u8,
    pub last_pattern: u8,
}

/// Detailed status while running signal light mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedModeDetailData {
    /// LED stages 1 to 5
    pub led_units: [LedUnitData; LED_STAGES],
    pub buzzer_pattern: u8,
}

/// Detailed status while running smart mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmartModeDetailData {
    pub state: SmartModeDetailState,
    /// LED stages 1 to 5
    pub led_units: [LedUnitData; LED_STAGES],
    pub buzzer_pattern: u8,
}

/// Mode-dependent part of a get-detail-data response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetailModeData {
    Led(LedModeDetailData),
    Smart(SmartModeDetailData),
}

impl DetailModeData {
    /// LED stages 1 to 5, whichever mode is active
    pub fn led_units(&self) -> &[LedUnitData; LED_STAGES] {
        match self {
            DetailModeData::Led(led) => &led.led_units,
            DetailModeData::Smart(smart) => &smart.led_units,
        }
    }

    pub fn buzzer_pattern(&self) -> u8 {
        match self {
            DetailModeData::Led(led) => led.buzzer_pattern,
            DetailModeData::Smart(smart) => smart.buzzer_pattern,
        }
    }
}

/// Decoded get-detail-data response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetailStatusData {
    pub mac_address: [u8; 6],
    /// Input 1 to 8, one flag byte each
    pub input: [u8; INPUT_COUNT],
    /// Raw mode byte as sent by the device
    pub mode: u8,
    pub data: DetailModeData,
}

impl DetailStatusData {
    /// Parse a get-detail-data response payload
    ///
    /// Does not look for the NAK sentinel; see [`crate::pns::decode_detail_status`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut cursor = Cursor::new(bytes);
        cursor.require(DETAIL_STATUS_HEADER_LEN)?;

        let mac_address = cursor.take::<6>()?;
        let input = cursor.take::<INPUT_COUNT>()?;
        let mode = cursor.take_u8()?;
        cursor.take::<DETAIL_STATUS_UNUSED_LEN>()?;

        let data = match Mode::from_byte(mode) {
            Mode::Led => {
                cursor.require(LED_MODE_DETAIL_LEN)?;
                let led_units = read_led_units(&mut cursor)?;
                let buzzer_pattern = cursor.take_u8()?;
                DetailModeData::Led(LedModeDetailData {
                    led_units,
                    buzzer_pattern,
                })
            }
            Mode::Smart => {
                cursor.require(SMART_MODE_DETAIL_LEN)?;
                let [group_no, mute, stop_input, pattern_no, last_pattern] =
                    cursor.take::<SMART_MODE_DETAIL_STATE_LEN>()?;
                let led_units = read_led_units(&mut cursor)?;
                let buzzer_pattern = cursor.take_u8()?;
                DetailModeData::Smart(SmartModeDetailData {
                    state: SmartModeDetailState {
                        group_no,
                        mute,
                        stop_input,
                        pattern_no,
                        last_pattern,
                    },
                    led_units,
                    buzzer_pattern,
                })
            }
        };

        Ok(Self {
            mac_address,
            input,
            mode,
            data,
        })
    }

    /// Serialize back to the device's response layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DETAIL_STATUS_HEADER_LEN + SMART_MODE_DETAIL_LEN);
        out.extend_from_slice(&self.mac_address);
        out.extend_from_slice(&self.input);
        out.push(mode_byte_for(
            self.mode,
            matches!(self.data, DetailModeData::Led(_)),
        ));
        out.extend_from_slice(&[0; DETAIL_STATUS_UNUSED_LEN]);

        if let DetailModeData::Smart(smart) = &self.data {
            let s = &smart.state;
            out.extend_from_slice(&[
                s.group_no,
                s.mute,
                s.stop_input,
                s.pattern_no,
                s.last_pattern,
            ]);
        }
        for unit in self.data.led_units() {
            unit.write(&mut out);
        }
        out.push(self.data.buzzer_pattern());
        out
    }

    /// Operating mode selected by the mode byte
    pub fn operating_mode(&self) -> Mode {
        Mode::from_byte(self.mode)
    }
}

/// Mode byte to put on the wire so it selects the layout of `is_led`
fn mode_byte_for(raw: u8, is_led: bool) -> u8 {
    match (is_led, raw) {
        (true, _) => Mode::LED_BYTE,
        (false, Mode::LED_BYTE) => Mode::SMART_BYTE,
        (false, raw) => raw,
    }
}
