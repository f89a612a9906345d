//! Property tests for frame shapes and record layouts

use beacon_protocol::pns::{self, HEADER_LEN, NAK};
use beacon_protocol::status::LED_STAGES;
use beacon_protocol::{
    phn, DetailModeData, DetailRunControlData, DetailStatusData, EncodeCommand, LedModeData,
    LedModeDetailData, LedUnitData, ModeData, PhnRunData, PnsCodec, PnsCommand, ProtocolCodec,
    ProtocolError, RunControlData, SmartModeData, SmartModeDetailData, SmartModeDetailState,
    StatusData,
};
use proptest::prelude::*;

fn pns_command() -> impl Strategy<Value = PnsCommand> {
    prop_oneof![
        any::<u8>().prop_map(|group| PnsCommand::SmartMode { group }),
        any::<bool>().prop_map(|enabled| PnsCommand::Mute { enabled }),
        any::<bool>().prop_map(|enabled| PnsCommand::StopPulseInput { enabled }),
        (any::<[u8; 5]>(), any::<u8>())
            .prop_map(|(leds, buzzer)| PnsCommand::RunControl(RunControlData::new(leds, buzzer))),
        (any::<[u8; 5]>(), any::<u8>(), any::<u8>()).prop_map(|(colors, blink, buzzer)| {
            PnsCommand::DetailRunControl(DetailRunControlData::new(colors, blink, buzzer))
        }),
        Just(PnsCommand::Clear),
        "[ -~]{0,64}".prop_map(|password| PnsCommand::Reboot { password }),
        Just(PnsCommand::GetData),
        Just(PnsCommand::GetDetailData),
    ]
}

fn led_unit() -> impl Strategy<Value = LedUnitData> {
    any::<[u8; 4]>().prop_map(|[pattern, red, green, blue]| LedUnitData {
        pattern,
        red,
        green,
        blue,
    })
}

fn led_units() -> impl Strategy<Value = [LedUnitData; LED_STAGES]> {
    prop::array::uniform5(led_unit())
}

// Input lines report 0 or 1; a leading 0x15 would read as NAK
fn inputs() -> impl Strategy<Value = [u8; 8]> {
    prop::array::uniform8(0u8..=1)
}

fn mac_address() -> impl Strategy<Value = [u8; 6]> {
    any::<[u8; 6]>().prop_filter("leading NAK byte", |mac| mac[0] != NAK)
}

fn status_data() -> impl Strategy<Value = StatusData> {
    let led = (any::<[u8; 5]>(), any::<u8>()).prop_map(|(led_patterns, buzzer_pattern)| {
        (
            0u8,
            ModeData::Led(LedModeData {
                led_patterns,
                buzzer_pattern,
            }),
        )
    });
    let smart = (1u8..=255, any::<[u8; 4]>()).prop_map(|(mode, [g, m, s, p])| {
        (
            mode,
            ModeData::Smart(SmartModeData {
                group_no: g,
                mute: m,
                stop_input: s,
                pattern_no: p,
            }),
        )
    });

    (inputs(), prop_oneof![led, smart])
        .prop_map(|(input, (mode, data))| StatusData { input, mode, data })
}

fn detail_status_data() -> impl Strategy<Value = DetailStatusData> {
    let led = (led_units(), any::<u8>()).prop_map(|(led_units, buzzer_pattern)| {
        (
            0u8,
            DetailModeData::Led(LedModeDetailData {
                led_units,
                buzzer_pattern,
            }),
        )
    });
    let smart = (1u8..=255, any::<[u8; 5]>(), led_units(), any::<u8>()).prop_map(
        |(mode, [g, m, s, p, l], led_units, buzzer_pattern)| {
            (
                mode,
                DetailModeData::Smart(SmartModeDetailData {
                    state: SmartModeDetailState {
                        group_no: g,
                        mute: m,
                        stop_input: s,
                        pattern_no: p,
                        last_pattern: l,
                    },
                    led_units,
                    buzzer_pattern,
                }),
            )
        },
    );

    (mac_address(), inputs(), prop_oneof![led, smart]).prop_map(
        |(mac_address, input, (mode, data))| DetailStatusData {
            mac_address,
            input,
            mode,
            data,
        },
    )
}

proptest! {
    #[test]
    fn pns_length_field_matches_payload(cmd in pns_command()) {
        let frame = cmd.encode().unwrap();
        let len = u16::from_be_bytes([frame[4], frame[5]]) as usize;

        prop_assert_eq!(&frame[..2], b"AB");
        prop_assert_eq!(frame[3], 0);
        prop_assert_eq!(frame.len(), HEADER_LEN + len);
    }

    #[test]
    fn pns_frames_parse_back(cmd in pns_command()) {
        let mut codec = PnsCodec::new();
        codec.push_bytes(&cmd.encode().unwrap());
        prop_assert_eq!(codec.next_command(), Some(cmd));
    }

    #[test]
    fn phn_flag_byte_roundtrip(byte: u8) {
        prop_assert_eq!(PhnRunData::from_byte(byte).to_byte(), byte);
        prop_assert_eq!(phn::decode_read(&[b'R', byte]), Ok(PhnRunData::from_byte(byte)));
    }

    #[test]
    fn status_survives_to_bytes(status in status_data()) {
        prop_assert_eq!(pns::decode_status(&status.to_bytes()), Ok(status));
    }

    #[test]
    fn detail_status_survives_to_bytes(detail in detail_status_data()) {
        prop_assert_eq!(pns::decode_detail_status(&detail.to_bytes()), Ok(detail));
    }

    #[test]
    fn every_status_prefix_is_truncated(status in status_data()) {
        let bytes = status.to_bytes();
        for len in 1..bytes.len() {
            let result = pns::decode_status(&bytes[..len]);
            prop_assert!(
                matches!(result, Err(ProtocolError::TruncatedFrame { .. })),
                "prefix of {} bytes gave {:?}", len, result
            );
        }
    }

    #[test]
    fn nak_first_byte_always_rejected(tail in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut response = vec![NAK];
        response.extend(tail);

        prop_assert_eq!(pns::decode_ack(&response), Err(ProtocolError::NegativeAcknowledge));
        prop_assert_eq!(pns::decode_status(&response), Err(ProtocolError::NegativeAcknowledge));
        prop_assert_eq!(
            pns::decode_detail_status(&response),
            Err(ProtocolError::NegativeAcknowledge)
        );
    }
}
