//! End-to-end tests of the typed clients against a virtual beacon
//!
//! Each test serves a `VirtualBeacon` over an in-memory duplex stream and
//! drives it through `PnsClient` or `PhnClient`, covering:
//! - ACK/NAK handling for every PNS control command
//! - Status and detail status decoding in both operating modes
//! - PHN write/read of the flag byte

use std::time::Duration;

use beacon_link::{Connection, LinkConfig, LinkError, PhnClient, PnsClient};
use beacon_protocol::{
    DetailModeData, DetailRunControlData, LedColor, Mode, ModeData, PhnRunData, Protocol,
    RunControlData,
};
use beacon_sim::{run_virtual_beacon_task, VirtualBeacon, VirtualBeaconCommand, VirtualBeaconConfig};
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub struct Harness {
        pub cmd_tx: mpsc::Sender<VirtualBeaconCommand>,
        pub task: JoinHandle<std::io::Result<VirtualBeacon>>,
    }

    impl Harness {
        /// Stop the device and return its final state
        pub async fn finish(self) -> VirtualBeacon {
            let _ = self.cmd_tx.send(VirtualBeaconCommand::Shutdown).await;
            self.task.await.unwrap().unwrap()
        }
    }

    pub fn config() -> LinkConfig {
        LinkConfig {
            response_timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    /// Serve `beacon` on one end of a duplex pipe and return a connection to the other
    pub fn serve(beacon: VirtualBeacon) -> (Connection<DuplexStream>, Harness) {
        let (client, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_virtual_beacon_task(device, beacon, cmd_rx));
        let conn = Connection::new(client, "virtual", config());
        (conn, Harness { cmd_tx, task })
    }

    pub fn pns_client() -> (PnsClient<DuplexStream>, Harness) {
        let (conn, harness) = serve(VirtualBeacon::new("Test", Protocol::Pns));
        (PnsClient::new(conn), harness)
    }

    pub fn phn_client() -> (PhnClient<DuplexStream>, Harness) {
        let (conn, harness) = serve(VirtualBeacon::new("Test", Protocol::Phn));
        (PhnClient::new(conn), harness)
    }
}

use helpers::*;

// ============================================================================
// PNS Control Commands
// ============================================================================

#[tokio::test]
async fn test_run_control_then_get_data() {
    let (mut client, harness) = pns_client();

    client
        .run_control(RunControlData::new([1, 2, 0, 1, 9], 3))
        .await
        .unwrap();

    let status = client.get_data().await.unwrap();
    assert_eq!(status.operating_mode(), Mode::Led);
    match status.data {
        ModeData::Led(led) => {
            assert_eq!(led.led_patterns, [1, 2, 0, 1, 0]);
            assert_eq!(led.buzzer_pattern, 3);
        }
        other => panic!("expected LED mode data, got {:?}", other),
    }

    harness.finish().await;
}

#[tokio::test]
async fn test_run_control_out_of_table_is_rejected() {
    let (mut client, harness) = pns_client();

    let err = client
        .run_control(RunControlData::new([7, 0, 0, 0, 0], 0))
        .await
        .unwrap_err();
    assert!(err.is_negative_acknowledge());

    // The connection stays usable after a NAK
    client.clear().await.unwrap();
    harness.finish().await;
}

#[tokio::test]
async fn test_smart_mode_reports_smart_status() {
    let (mut client, harness) = pns_client();

    client.smart_mode(5).await.unwrap();
    client.mute(true).await.unwrap();
    client.stop_pulse_input(true).await.unwrap();

    let status = client.get_data().await.unwrap();
    assert_eq!(status.operating_mode(), Mode::Smart);
    match status.data {
        ModeData::Smart(smart) => {
            assert_eq!(smart.group_no, 5);
            assert_eq!(smart.mute, 1);
            assert_eq!(smart.stop_input, 1);
        }
        other => panic!("expected smart mode data, got {:?}", other),
    }

    let detail = client.get_detail_data().await.unwrap();
    match detail.data {
        DetailModeData::Smart(smart) => assert_eq!(smart.state.group_no, 5),
        other => panic!("expected smart detail data, got {:?}", other),
    }

    harness.finish().await;
}

#[tokio::test]
async fn test_smart_mode_group_out_of_range() {
    let (mut client, harness) = pns_client();

    let err = client.smart_mode(0).await.unwrap_err();
    assert!(matches!(
        err,
        LinkError::Protocol(beacon_protocol::ProtocolError::NegativeAcknowledge)
    ));

    harness.finish().await;
}

#[tokio::test]
async fn test_detail_run_control_sets_colors() {
    let (mut client, harness) = pns_client();

    let colors = [
        LedColor::Red,
        LedColor::Green,
        LedColor::Off,
        LedColor::Blue,
        LedColor::White,
    ]
    .map(u8::from);
    client
        .detail_run_control(DetailRunControlData::new(colors, 0, 1))
        .await
        .unwrap();

    let detail = client.get_detail_data().await.unwrap();
    assert_eq!(detail.mac_address, VirtualBeaconConfig::default().mac_address);
    let units = detail.data.led_units();
    assert_eq!((units[0].red, units[0].green, units[0].blue), (255, 0, 0));
    assert_eq!((units[1].red, units[1].green, units[1].blue), (0, 255, 0));
    assert_eq!(units[2].pattern, 0);
    assert_eq!((units[4].red, units[4].green, units[4].blue), (255, 255, 255));
    assert_eq!(detail.data.buzzer_pattern(), 1);

    harness.finish().await;
}

#[tokio::test]
async fn test_clear_turns_everything_off() {
    let (mut client, harness) = pns_client();

    client
        .run_control(RunControlData::new([1, 1, 1, 1, 1], 1))
        .await
        .unwrap();
    client.clear().await.unwrap();

    let status = client.get_data().await.unwrap();
    match status.data {
        ModeData::Led(led) => {
            assert_eq!(led.led_patterns, [0; 5]);
            assert_eq!(led.buzzer_pattern, 0);
        }
        other => panic!("expected LED mode data, got {:?}", other),
    }

    harness.finish().await;
}

#[tokio::test]
async fn test_reboot_checks_password() {
    let (mut client, harness) = pns_client();

    assert!(client.reboot("wrong").await.unwrap_err().is_negative_acknowledge());
    client.reboot("patlite").await.unwrap();

    let beacon = harness.finish().await;
    assert_eq!(beacon.reboots(), 1);
}

#[tokio::test]
async fn test_reboot_rejects_non_ascii_password_locally() {
    let (mut client, harness) = pns_client();

    let err = client.reboot("pässword").await.unwrap_err();
    assert!(matches!(err, LinkError::Protocol(_)));

    let beacon = harness.finish().await;
    assert!(beacon.received_commands().is_empty());
}

#[tokio::test]
async fn test_inputs_reported_in_status() {
    let (mut client, harness) = pns_client();

    harness
        .cmd_tx
        .send(VirtualBeaconCommand::SetInput { index: 0, on: true })
        .await
        .unwrap();
    harness
        .cmd_tx
        .send(VirtualBeaconCommand::SetInput { index: 7, on: true })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let status = client.get_data().await.unwrap();
    assert_eq!(status.input, [1, 0, 0, 0, 0, 0, 0, 1]);

    harness.finish().await;
}

// ============================================================================
// PHN Commands
// ============================================================================

#[tokio::test]
async fn test_phn_write_then_read() {
    let (mut client, harness) = phn_client();

    let data = PhnRunData {
        led_unit1_lighting: true,
        buzzer_pattern1: true,
        led_unit3_blinking: true,
        ..Default::default()
    };
    client.write(data).await.unwrap();

    let read = client.read().await.unwrap();
    assert_eq!(read, data);
    assert_eq!(read.to_byte(), 0b1000_1001);

    let beacon = harness.finish().await;
    assert_eq!(beacon.phn_state(), data);
}

#[tokio::test]
async fn test_phn_write_raw_flags() {
    let (mut client, harness) = phn_client();

    client.write_raw(0b1010_0101).await.unwrap();
    let read = client.read().await.unwrap();
    assert!(read.led_unit1_lighting);
    assert!(!read.led_unit2_lighting);
    assert!(read.led_unit3_lighting);
    assert!(read.led_unit1_blinking);
    assert!(read.led_unit3_blinking);

    harness.finish().await;
}
