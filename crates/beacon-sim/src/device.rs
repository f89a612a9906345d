//! Virtual signal tower
//!
//! Tracks the state a real device would keep and answers each decoded
//! request with protocol-accurate response bytes. Values outside the
//! documented code tables are rejected with NAK, as the hardware does.

use beacon_protocol::status::{INPUT_COUNT, LED_STAGES};
use beacon_protocol::{
    phn, pns, BlinkControl, BuzzerPattern, DetailBuzzerPattern, DetailModeData,
    DetailRunControlData, DetailStatusData, LedColor, LedModeData, LedModeDetailData,
    LedPattern, LedUnitData, Mode, ModeData, PhnCommand, PhnRunData, PnsCommand, Protocol,
    RunControlData, SmartModeData, SmartModeDetailData, SmartModeDetailState, StatusData,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smart mode group numbers the device accepts
pub const SMART_MODE_GROUPS: std::ops::RangeInclusive<u8> = 1..=31;

/// Configuration for creating a virtual beacon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualBeaconConfig {
    /// Display name/identifier
    pub id: String,
    /// Command family the device answers on this connection
    pub protocol: Protocol,
    pub mac_address: [u8; 6],
    /// Password accepted by the reboot command
    pub password: String,
    /// Initial state of input 1 to 8
    #[serde(default)]
    pub inputs: [u8; INPUT_COUNT],
}

impl Default for VirtualBeaconConfig {
    fn default() -> Self {
        Self {
            id: "Virtual Beacon".to_string(),
            protocol: Protocol::Pns,
            mac_address: [0x00, 0x30, 0x8A, 0x00, 0x00, 0x01],
            password: "patlite".to_string(),
            inputs: [0; INPUT_COUNT],
        }
    }
}

/// A simulated signal tower
#[derive(Debug, Clone)]
pub struct VirtualBeacon {
    config: VirtualBeaconConfig,
    mode: Mode,
    led_units: [LedUnitData; LED_STAGES],
    buzzer_pattern: u8,
    smart: SmartModeDetailState,
    phn_state: PhnRunData,
    reboots: u32,
    /// Commands received (for test verification)
    received_commands: Vec<PnsCommand>,
}

impl VirtualBeacon {
    /// Create a new virtual beacon with default settings
    pub fn new(id: impl Into<String>, protocol: Protocol) -> Self {
        Self::from_config(VirtualBeaconConfig {
            id: id.into(),
            protocol,
            ..Default::default()
        })
    }

    /// Create a virtual beacon from configuration
    pub fn from_config(config: VirtualBeaconConfig) -> Self {
        Self {
            config,
            mode: Mode::Led,
            led_units: [LedUnitData::default(); LED_STAGES],
            buzzer_pattern: 0,
            smart: SmartModeDetailState::default(),
            phn_state: PhnRunData::default(),
            reboots: 0,
            received_commands: Vec::new(),
        }
    }

    /// Get the beacon's identifier
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Get the protocol this beacon answers
    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn led_units(&self) -> &[LedUnitData; LED_STAGES] {
        &self.led_units
    }

    pub fn buzzer_pattern(&self) -> u8 {
        self.buzzer_pattern
    }

    pub fn smart_state(&self) -> &SmartModeDetailState {
        &self.smart
    }

    pub fn phn_state(&self) -> PhnRunData {
        self.phn_state
    }

    /// Number of accepted reboot commands
    pub fn reboots(&self) -> u32 {
        self.reboots
    }

    /// Set the level of input `index` (0-based)
    pub fn set_input(&mut self, index: usize, on: bool) {
        if let Some(input) = self.config.inputs.get_mut(index) {
            *input = u8::from(on);
        }
    }

    /// Get list of PNS commands received
    pub fn received_commands(&self) -> &[PnsCommand] {
        &self.received_commands
    }

    /// Clear received commands
    pub fn clear_received(&mut self) {
        self.received_commands.clear();
    }

    /// Answer a PNS request
    pub fn handle_pns(&mut self, command: &PnsCommand) -> Vec<u8> {
        debug!("Virtual beacon {} handling {:?}", self.config.id, command);
        self.received_commands.push(command.clone());

        match command {
            PnsCommand::GetData => return self.status().to_bytes(),
            PnsCommand::GetDetailData => return self.detail_status().to_bytes(),
            _ => {}
        }

        let accepted = match command {
            PnsCommand::SmartMode { group } => self.run_smart_mode(*group),
            PnsCommand::Mute { enabled } => {
                self.smart.mute = u8::from(*enabled);
                true
            }
            PnsCommand::StopPulseInput { enabled } => {
                self.smart.stop_input = u8::from(*enabled);
                true
            }
            PnsCommand::RunControl(data) => self.run_control(data),
            PnsCommand::DetailRunControl(data) => self.detail_run_control(data),
            PnsCommand::Clear => {
                self.clear();
                true
            }
            PnsCommand::Reboot { password } => self.reboot(password),
            PnsCommand::GetData | PnsCommand::GetDetailData | PnsCommand::Unknown { .. } => false,
        };

        vec![if accepted { pns::ACK } else { pns::NAK }]
    }

    /// Answer a PHN request
    pub fn handle_phn(&mut self, command: &PhnCommand) -> Vec<u8> {
        debug!("Virtual beacon {} handling {:?}", self.config.id, command);

        match command {
            PhnCommand::Write(data) => {
                self.phn_state = *data;
                phn::ACK.to_vec()
            }
            PhnCommand::Read => vec![phn::READ_COMMAND, self.phn_state.to_byte()],
            PhnCommand::Unknown { .. } => phn::NAK.to_vec(),
        }
    }

    /// Current state as a get-data response
    pub fn status(&self) -> StatusData {
        let data = match self.mode {
            Mode::Led => ModeData::Led(LedModeData {
                led_patterns: self.led_units.map(|unit| unit.pattern),
                buzzer_pattern: self.buzzer_pattern,
            }),
            Mode::Smart => ModeData::Smart(SmartModeData {
                group_no: self.smart.group_no,
                mute: self.smart.mute,
                stop_input: self.smart.stop_input,
                pattern_no: self.smart.pattern_no,
            }),
        };

        StatusData {
            input: self.config.inputs,
            mode: self.mode.to_byte(),
            data,
        }
    }

    /// Current state as a get-detail-data response
    pub fn detail_status(&self) -> DetailStatusData {
        let data = match self.mode {
            Mode::Led => DetailModeData::Led(LedModeDetailData {
                led_units: self.led_units,
                buzzer_pattern: self.buzzer_pattern,
            }),
            Mode::Smart => DetailModeData::Smart(SmartModeDetailData {
                state: self.smart,
                led_units: self.led_units,
                buzzer_pattern: self.buzzer_pattern,
            }),
        };

        DetailStatusData {
            mac_address: self.config.mac_address,
            input: self.config.inputs,
            mode: self.mode.to_byte(),
            data,
        }
    }

    fn run_smart_mode(&mut self, group: u8) -> bool {
        if !SMART_MODE_GROUPS.contains(&group) {
            return false;
        }
        self.mode = Mode::Smart;
        self.smart.last_pattern = self.smart.pattern_no;
        self.smart.group_no = group;
        self.smart.pattern_no = 1;
        true
    }

    fn run_control(&mut self, data: &RunControlData) -> bool {
        let patterns: Result<Vec<LedPattern>, _> = data
            .led_patterns
            .iter()
            .map(|&code| LedPattern::try_from(code))
            .collect();
        let (Ok(patterns), Ok(buzzer)) = (patterns, BuzzerPattern::try_from(data.buzzer_pattern))
        else {
            return false;
        };

        for (unit, pattern) in self.led_units.iter_mut().zip(patterns) {
            if pattern != LedPattern::NoChange {
                unit.pattern = pattern.into();
            }
        }
        if buzzer != BuzzerPattern::NoChange {
            self.buzzer_pattern = buzzer.into();
        }
        self.mode = Mode::Led;
        true
    }

    fn detail_run_control(&mut self, data: &DetailRunControlData) -> bool {
        let colors: Result<Vec<LedColor>, _> = data
            .led_colors
            .iter()
            .map(|&code| LedColor::try_from(code))
            .collect();
        let (Ok(colors), Ok(blink), Ok(buzzer)) = (
            colors,
            BlinkControl::try_from(data.blinking_control),
            DetailBuzzerPattern::try_from(data.buzzer_pattern),
        ) else {
            return false;
        };

        let lit = match blink {
            BlinkControl::Off => LedPattern::On,
            BlinkControl::On => LedPattern::Blinking,
        };
        for (unit, color) in self.led_units.iter_mut().zip(colors) {
            let (red, green, blue) = color_rgb(color);
            *unit = LedUnitData {
                pattern: if color == LedColor::Off {
                    LedPattern::Off.into()
                } else {
                    lit.into()
                },
                red,
                green,
                blue,
            };
        }
        self.buzzer_pattern = buzzer.into();
        self.mode = Mode::Led;
        true
    }

    fn clear(&mut self) {
        for unit in self.led_units.iter_mut() {
            unit.pattern = LedPattern::Off.into();
        }
        self.buzzer_pattern = BuzzerPattern::Stop.into();
    }

    fn reboot(&mut self, password: &str) -> bool {
        if password != self.config.password {
            return false;
        }
        info!("Virtual beacon {} rebooting", self.config.id);
        self.mode = Mode::Led;
        self.led_units = [LedUnitData::default(); LED_STAGES];
        self.buzzer_pattern = 0;
        self.smart = SmartModeDetailState::default();
        self.reboots += 1;
        true
    }
}

/// RGB channel values the device reports for each color code
pub fn color_rgb(color: LedColor) -> (u8, u8, u8) {
    match color {
        LedColor::Off => (0, 0, 0),
        LedColor::Red => (255, 0, 0),
        LedColor::Yellow => (255, 160, 0),
        LedColor::Lemon => (200, 255, 0),
        LedColor::Green => (0, 255, 0),
        LedColor::SkyBlue => (0, 200, 255),
        LedColor::Blue => (0, 0, 255),
        LedColor::Purple => (160, 0, 255),
        LedColor::Peach => (255, 100, 120),
        LedColor::White => (255, 255, 255),
    }
}
