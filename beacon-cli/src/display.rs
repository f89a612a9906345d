//! Text rendering of decoded device responses

use std::fmt::Write;

use beacon_protocol::{
    BuzzerPattern, DetailBuzzerPattern, DetailModeData, DetailStatusData, LedPattern,
    LedUnitData, ModeData, PhnRunData, SmartModeData, StatusData,
};

/// MAC address as dash-separated hex (`00-30-8A-00-00-01`)
pub fn mac_address(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-")
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Raw code followed by its documented name, if any
fn labelled(code: u8, name: Option<&'static str>) -> String {
    match name {
        Some(name) => format!("{} ({})", code, name),
        None => code.to_string(),
    }
}

fn led_pattern(code: u8) -> String {
    labelled(code, LedPattern::try_from(code).ok().map(|p| p.name()))
}

fn write_inputs(out: &mut String, input: &[u8]) {
    for (i, level) in input.iter().enumerate() {
        let _ = writeln!(out, "Input {}: {}", i + 1, on_off(*level != 0));
    }
}

fn write_smart(out: &mut String, smart: &SmartModeData) {
    let _ = writeln!(out, "Group number: {}", smart.group_no);
    let _ = writeln!(out, "Mute: {}", on_off(smart.mute != 0));
    let _ = writeln!(out, "STOP input: {}", on_off(smart.stop_input != 0));
    let _ = writeln!(out, "Pattern number: {}", smart.pattern_no);
}

fn write_led_units(out: &mut String, units: &[LedUnitData]) {
    for (i, unit) in units.iter().enumerate() {
        let _ = writeln!(
            out,
            "LED unit {}: pattern {}, RGB {}/{}/{}",
            i + 1,
            led_pattern(unit.pattern),
            unit.red,
            unit.green,
            unit.blue
        );
    }
}

/// Render a get-data response
pub fn status(status: &StatusData) -> String {
    let mut out = String::new();
    write_inputs(&mut out, &status.input);
    let _ = writeln!(out, "Mode: {}", status.operating_mode().name());

    match &status.data {
        ModeData::Led(led) => {
            for (i, pattern) in led.led_patterns.iter().enumerate() {
                let _ = writeln!(out, "LED unit {} pattern: {}", i + 1, led_pattern(*pattern));
            }
            let buzzer = BuzzerPattern::try_from(led.buzzer_pattern).ok();
            let _ = writeln!(
                out,
                "Buzzer pattern: {}",
                labelled(led.buzzer_pattern, buzzer.map(|b| b.name()))
            );
        }
        ModeData::Smart(smart) => write_smart(&mut out, smart),
    }
    out
}

/// Render a get-detail-data response
pub fn detail_status(status: &DetailStatusData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "MAC address: {}", mac_address(&status.mac_address));
    write_inputs(&mut out, &status.input);
    let _ = writeln!(out, "Mode: {}", status.operating_mode().name());

    if let DetailModeData::Smart(smart) = &status.data {
        write_smart(
            &mut out,
            &SmartModeData {
                group_no: smart.state.group_no,
                mute: smart.state.mute,
                stop_input: smart.state.stop_input,
                pattern_no: smart.state.pattern_no,
            },
        );
        let _ = writeln!(out, "Last pattern: {}", smart.state.last_pattern);
    }

    write_led_units(&mut out, status.data.led_units());
    let buzzer_code = status.data.buzzer_pattern();
    let buzzer = DetailBuzzerPattern::try_from(buzzer_code).ok();
    let _ = writeln!(
        out,
        "Buzzer pattern: {}",
        labelled(buzzer_code, buzzer.map(|b| b.name()))
    );
    out
}

/// Render a PHN read response
pub fn phn_run_data(data: &PhnRunData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Flags: 0x{:02X}", data.to_byte());
    let lighting = [
        data.led_unit1_lighting,
        data.led_unit2_lighting,
        data.led_unit3_lighting,
    ];
    let blinking = [
        data.led_unit1_blinking,
        data.led_unit2_blinking,
        data.led_unit3_blinking,
    ];
    for (i, (lit, blink)) in lighting.iter().zip(blinking).enumerate() {
        let _ = writeln!(
            out,
            "LED unit {}: lighting {}, blinking {}",
            i + 1,
            on_off(*lit),
            on_off(blink)
        );
    }
    let _ = writeln!(out, "Buzzer pattern 1: {}", on_off(data.buzzer_pattern1));
    let _ = writeln!(out, "Buzzer pattern 2: {}", on_off(data.buzzer_pattern2));
    out
}
