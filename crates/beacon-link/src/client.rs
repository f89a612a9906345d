//! Typed clients pairing each command with its response decoder

use beacon_protocol::{
    phn, pns, DetailRunControlData, DetailStatusData, EncodeCommand, PhnRunData, PnsCommand,
    RunControlData, StatusData,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::info;

use crate::{Connection, LinkConfig, LinkError};

/// Client for the PNS command family
pub struct PnsClient<S> {
    conn: Connection<S>,
}

impl PnsClient<TcpStream> {
    /// Connect to a device at `addr` (`host:port`)
    pub async fn connect(addr: &str, config: LinkConfig) -> Result<Self, LinkError> {
        Ok(Self::new(Connection::connect(addr, config).await?))
    }
}

impl<S> PnsClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: Connection<S>) -> Self {
        Self { conn }
    }

    /// Send a command that is answered with ACK/NAK
    pub async fn execute(&mut self, command: &PnsCommand) -> Result<(), LinkError> {
        let frame = command.encode()?;
        self.conn.transact(&frame, pns::decode_ack).await
    }

    /// Run smart mode for `group` (device accepts 1 to 31)
    pub async fn smart_mode(&mut self, group: u8) -> Result<(), LinkError> {
        info!("Running smart mode group {}", group);
        self.execute(&PnsCommand::SmartMode { group }).await
    }

    /// Mute or unmute the buzzer
    pub async fn mute(&mut self, enabled: bool) -> Result<(), LinkError> {
        self.execute(&PnsCommand::Mute { enabled }).await
    }

    /// STOP input (time trigger mode) or trigger input (pulse trigger mode)
    pub async fn stop_pulse_input(&mut self, enabled: bool) -> Result<(), LinkError> {
        self.execute(&PnsCommand::StopPulseInput { enabled }).await
    }

    pub async fn run_control(&mut self, data: RunControlData) -> Result<(), LinkError> {
        self.execute(&PnsCommand::RunControl(data)).await
    }

    pub async fn detail_run_control(&mut self, data: DetailRunControlData) -> Result<(), LinkError> {
        self.execute(&PnsCommand::DetailRunControl(data)).await
    }

    /// Turn off all LED stages and stop the buzzer
    pub async fn clear(&mut self) -> Result<(), LinkError> {
        self.execute(&PnsCommand::Clear).await
    }

    /// Restart the device
    pub async fn reboot(&mut self, password: &str) -> Result<(), LinkError> {
        info!("Requesting reboot of {}", self.conn.peer());
        self.execute(&PnsCommand::Reboot {
            password: password.to_string(),
        })
        .await
    }

    /// Read input and LED/buzzer status
    pub async fn get_data(&mut self) -> Result<StatusData, LinkError> {
        let frame = PnsCommand::GetData.encode()?;
        self.conn.transact(&frame, pns::decode_status).await
    }

    /// Read input, LED/buzzer status and per-stage colors
    pub async fn get_detail_data(&mut self) -> Result<DetailStatusData, LinkError> {
        let frame = PnsCommand::GetDetailData.encode()?;
        self.conn.transact(&frame, pns::decode_detail_status).await
    }
}

/// Client for the PHN command family
pub struct PhnClient<S> {
    conn: Connection<S>,
}

impl PhnClient<TcpStream> {
    /// Connect to a device at `addr` (`host:port`)
    pub async fn connect(addr: &str, config: LinkConfig) -> Result<Self, LinkError> {
        Ok(Self::new(Connection::connect(addr, config).await?))
    }
}

impl<S> PhnClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: Connection<S>) -> Self {
        Self { conn }
    }

    /// Set LED lighting/blinking and buzzer state
    pub async fn write(&mut self, data: PhnRunData) -> Result<(), LinkError> {
        self.write_raw(data.to_byte()).await
    }

    /// Write a raw flag byte
    pub async fn write_raw(&mut self, flags: u8) -> Result<(), LinkError> {
        let frame = phn::encode_write(flags);
        self.conn.transact(&frame, phn::decode_write_ack).await
    }

    /// Read back LED lighting/blinking and buzzer state
    pub async fn read(&mut self) -> Result<PhnRunData, LinkError> {
        let frame = phn::encode_read();
        self.conn.transact(&frame, phn::decode_read).await
    }
}
