//! Virtual beacon actor task
//!
//! Owns a [`VirtualBeacon`] and serves it over an async stream. The task uses
//! a select! loop to:
//! - Read request bytes from the stream, parse them, and write responses
//! - Handle control commands (input changes, shutdown) from a channel

use std::io;

use beacon_protocol::{PhnCodec, PnsCodec, Protocol, ProtocolCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::VirtualBeacon;

/// Commands that can be sent to a virtual beacon actor
#[derive(Debug, Clone)]
pub enum VirtualBeaconCommand {
    /// Change the level of input `index` (0-based)
    SetInput { index: usize, on: bool },
    /// Shutdown the virtual beacon actor
    Shutdown,
}

/// Request parser matching the beacon's protocol family
enum DeviceCodec {
    Pns(PnsCodec),
    Phn(PhnCodec),
}

impl DeviceCodec {
    fn new(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Pns => Self::Pns(PnsCodec::new()),
            Protocol::Phn => Self::Phn(PhnCodec::new()),
        }
    }

    fn push_bytes(&mut self, data: &[u8]) {
        match self {
            Self::Pns(c) => c.push_bytes(data),
            Self::Phn(c) => c.push_bytes(data),
        }
    }

    /// Handle the next complete request, returning the response bytes
    fn respond_next(&mut self, beacon: &mut VirtualBeacon) -> Option<Vec<u8>> {
        match self {
            Self::Pns(c) => c.next_command().map(|cmd| beacon.handle_pns(&cmd)),
            Self::Phn(c) => c.next_command().map(|cmd| beacon.handle_phn(&cmd)),
        }
    }
}

/// Run the virtual beacon actor task
///
/// Returns the beacon when the stream closes or a shutdown command arrives,
/// so callers can inspect the final state.
pub async fn run_virtual_beacon_task<S>(
    mut stream: S,
    mut beacon: VirtualBeacon,
    mut cmd_rx: mpsc::Receiver<VirtualBeaconCommand>,
) -> io::Result<VirtualBeacon>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut codec = DeviceCodec::new(beacon.protocol());
    let mut buf = [0u8; 1024];

    info!(
        "Starting virtual beacon task for {} ({})",
        beacon.id(),
        beacon.protocol().name()
    );

    loop {
        tokio::select! {
            result = stream.read(&mut buf) => {
                let n = result?;
                if n == 0 {
                    debug!("Virtual beacon stream closed for {}", beacon.id());
                    break;
                }
                debug!("Virtual beacon {} received {} bytes: {:02X?}", beacon.id(), n, &buf[..n]);

                codec.push_bytes(&buf[..n]);
                while let Some(response) = codec.respond_next(&mut beacon) {
                    stream.write_all(&response).await?;
                }
                stream.flush().await?;
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(VirtualBeaconCommand::SetInput { index, on }) => {
                        beacon.set_input(index, on);
                    }
                    Some(VirtualBeaconCommand::Shutdown) | None => {
                        info!("Virtual beacon {} shutting down", beacon.id());
                        break;
                    }
                }
            }
        }
    }

    Ok(beacon)
}
