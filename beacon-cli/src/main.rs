//! Signal Tower Command-Line Client
//!
//! Sends PNS/PHN commands to a network signal tower and prints the decoded
//! response. `beacon simulate` serves a virtual tower for trying the client
//! without hardware.

mod display;
mod settings;

use anyhow::Context;
use beacon_link::{PhnClient, PnsClient};
use beacon_protocol::{DetailRunControlData, Protocol, RunControlData};
use beacon_sim::{run_virtual_beacon_task, VirtualBeacon, VirtualBeaconConfig};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info};

use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "beacon", version, about = "Control PNS/PHN network signal towers")]
struct Cli {
    /// Device IP address or host name
    #[arg(long, global = true, env = "BEACON_HOST")]
    host: Option<String>,

    /// Device TCP port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Response timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run smart mode for a group (PNS `T`)
    SmartMode { group: u8 },

    /// Mute or unmute the buzzer (PNS `M`)
    Mute {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        state: u8,
    },

    /// STOP/pulse trigger input (PNS `P`)
    StopPulseInput {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        state: u8,
    },

    /// Set LED stage patterns and buzzer (PNS `S`)
    RunControl {
        led1: u8,
        led2: u8,
        led3: u8,
        led4: u8,
        led5: u8,
        buzzer: u8,
    },

    /// Set LED stage colors, blinking and buzzer (PNS `D`)
    DetailRunControl {
        color1: u8,
        color2: u8,
        color3: u8,
        color4: u8,
        color5: u8,
        blink: u8,
        buzzer: u8,
    },

    /// Turn off all LED stages and stop the buzzer (PNS `C`)
    Clear,

    /// Restart the device (PNS `B`)
    Reboot { password: String },

    /// Read inputs and LED/buzzer status (PNS `G`)
    GetData,

    /// Read inputs, LED colors and buzzer status (PNS `E`)
    GetDetailData,

    /// Write the PHN flag byte (decimal, 0x hex or 0b binary)
    PhnWrite {
        #[arg(value_parser = parse_flags)]
        flags: u8,
    },

    /// Read the PHN flag byte
    PhnRead,

    /// Serve a virtual signal tower
    Simulate {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:10000")]
        listen: String,

        /// Command family to answer
        #[arg(long, value_enum, default_value_t = ProtocolArg::Pns)]
        protocol: ProtocolArg,

        /// Password accepted by the reboot command
        #[arg(long)]
        password: Option<String>,

        /// Input to report as ON (1 to 8, repeatable)
        #[arg(long = "input", value_parser = clap::value_parser!(u8).range(1..=8))]
        inputs: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProtocolArg {
    Pns,
    Phn,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Pns => Protocol::Pns,
            ProtocolArg::Phn => Protocol::Phn,
        }
    }
}

/// Parse a flag byte written as decimal, `0x` hex or `0b` binary
fn parse_flags(s: &str) -> Result<u8, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u8::from_str_radix(&bin.replace('_', ""), 2)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid flag byte '{}': {}", s, e))
}

#[derive(Serialize)]
struct Acknowledged {
    command: &'static str,
    ack: bool,
}

fn print_ack(command: &'static str, json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&Acknowledged { command, ack: true })?
        );
    } else {
        println!("{}: ACK", command);
    }
    Ok(())
}

fn print_record<T: Serialize>(record: &T, json: bool, render: fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print!("{}", render(record));
    }
    Ok(())
}

async fn connect_pns(settings: &Settings) -> anyhow::Result<PnsClient<tokio::net::TcpStream>> {
    let addr = settings.address();
    PnsClient::connect(&addr, settings.link_config())
        .await
        .with_context(|| format!("Failed to connect to {}", addr))
}

async fn connect_phn(settings: &Settings) -> anyhow::Result<PhnClient<tokio::net::TcpStream>> {
    let addr = settings.address();
    PhnClient::connect(&addr, settings.link_config())
        .await
        .with_context(|| format!("Failed to connect to {}", addr))
}

async fn run(command: Command, settings: &Settings, json: bool) -> anyhow::Result<()> {
    match command {
        Command::SmartMode { group } => {
            connect_pns(settings).await?.smart_mode(group).await?;
            print_ack("smart-mode", json)
        }
        Command::Mute { state } => {
            connect_pns(settings).await?.mute(state == 1).await?;
            print_ack("mute", json)
        }
        Command::StopPulseInput { state } => {
            connect_pns(settings)
                .await?
                .stop_pulse_input(state == 1)
                .await?;
            print_ack("stop-pulse-input", json)
        }
        Command::RunControl {
            led1,
            led2,
            led3,
            led4,
            led5,
            buzzer,
        } => {
            let data = RunControlData::new([led1, led2, led3, led4, led5], buzzer);
            connect_pns(settings).await?.run_control(data).await?;
            print_ack("run-control", json)
        }
        Command::DetailRunControl {
            color1,
            color2,
            color3,
            color4,
            color5,
            blink,
            buzzer,
        } => {
            let data =
                DetailRunControlData::new([color1, color2, color3, color4, color5], blink, buzzer);
            connect_pns(settings).await?.detail_run_control(data).await?;
            print_ack("detail-run-control", json)
        }
        Command::Clear => {
            connect_pns(settings).await?.clear().await?;
            print_ack("clear", json)
        }
        Command::Reboot { password } => {
            connect_pns(settings).await?.reboot(&password).await?;
            print_ack("reboot", json)
        }
        Command::GetData => {
            let status = connect_pns(settings).await?.get_data().await?;
            print_record(&status, json, display::status)
        }
        Command::GetDetailData => {
            let status = connect_pns(settings).await?.get_detail_data().await?;
            print_record(&status, json, display::detail_status)
        }
        Command::PhnWrite { flags } => {
            connect_phn(settings).await?.write_raw(flags).await?;
            print_ack("phn-write", json)
        }
        Command::PhnRead => {
            let data = connect_phn(settings).await?.read().await?;
            print_record(&data, json, display::phn_run_data)
        }
        Command::Simulate {
            listen,
            protocol,
            password,
            inputs,
        } => {
            let mut config = VirtualBeaconConfig {
                id: format!("virtual@{}", listen),
                protocol: protocol.into(),
                ..Default::default()
            };
            if let Some(password) = password {
                config.password = password;
            }
            for input in inputs {
                config.inputs[usize::from(input) - 1] = 1;
            }
            simulate(&listen, VirtualBeacon::from_config(config)).await
        }
    }
}

/// Serve one client at a time, keeping device state across connections
async fn simulate(listen: &str, mut beacon: VirtualBeacon) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to listen on {}", listen))?;
    info!(
        "Virtual {} beacon listening on {}",
        beacon.protocol().name(),
        listener.local_addr()?
    );

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => break,
        };
        info!("Client connected from {}", peer);

        beacon = tokio::select! {
            result = serve_session(stream, beacon) => result?,
            _ = tokio::signal::ctrl_c() => break,
        };
        info!("Client {} disconnected", peer);
    }

    info!("Virtual beacon stopped");
    Ok(())
}

/// Run one client session, returning the beacon with its command log emptied
async fn serve_session<S>(stream: S, beacon: VirtualBeacon) -> anyhow::Result<VirtualBeacon>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (_cmd_tx, cmd_rx) = mpsc::channel(1);
    let mut beacon = run_virtual_beacon_task(stream, beacon, cmd_rx).await?;
    debug!(
        "Session handled {} commands",
        beacon.received_commands().len()
    );
    beacon.clear_received();
    Ok(beacon)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "beacon=info,beacon_protocol=info,beacon_link=info,beacon_sim=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?.with_overrides(cli.host, cli.port, cli.timeout_ms);

    run(cli.command, &settings, cli.json).await
}
