//! Stream connection to a signal tower
//!
//! One request is outstanding at a time: every method takes `&mut self`, and
//! [`Connection::transact`] does not return until the response has decoded,
//! failed, or timed out.

use std::time::Duration;

use beacon_protocol::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace, warn};

use crate::LinkError;

/// Port the device listens on out of the box
pub const DEFAULT_PORT: u16 = 10000;

/// Connection settings
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Time allowed to establish the TCP connection
    pub connect_timeout: Duration,
    /// Time allowed for a complete response after a request is sent
    pub response_timeout: Duration,
    /// Largest response accepted before giving up
    pub max_response_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(3),
            max_response_len: 1024,
        }
    }
}

/// Request/response connection over any byte stream
///
/// Generic over the I/O type so tests can run against a virtual device
/// through `tokio::io::duplex()`.
pub struct Connection<S> {
    io: S,
    config: LinkConfig,
    peer: String,
}

impl Connection<TcpStream> {
    /// Open a TCP connection to `addr` (`host:port`)
    pub async fn connect(addr: &str, config: LinkConfig) -> Result<Self, LinkError> {
        let stream = timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| LinkError::Timeout {
                after: config.connect_timeout,
            })??;
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);
        Ok(Self::new(stream, addr, config))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-open stream
    pub fn new(io: S, peer: impl Into<String>, config: LinkConfig) -> Self {
        Self {
            io,
            config,
            peer: peer.into(),
        }
    }

    /// Peer label used in logs
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Write one request frame
    pub async fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        debug!("TX {}: {:02X?}", self.peer, frame);
        self.io.write_all(frame).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Read whatever the device has sent, waiting up to the response timeout
    pub async fn receive(&mut self) -> Result<Vec<u8>, LinkError> {
        let after = self.config.response_timeout;
        let data = timeout(after, self.read_chunk())
            .await
            .map_err(|_| LinkError::Timeout { after })??;
        debug!("RX {}: {:02X?}", self.peer, data);
        Ok(data)
    }

    /// Send `frame` and decode the response
    ///
    /// Reads until `decode` stops reporting a truncated frame. Any other
    /// decode failure is returned as-is.
    pub async fn transact<T, F>(&mut self, frame: &[u8], decode: F) -> Result<T, LinkError>
    where
        F: Fn(&[u8]) -> Result<T, ProtocolError>,
    {
        self.discard_stale().await?;
        self.send(frame).await?;

        let after = self.config.response_timeout;
        let deadline = Instant::now() + after;
        let mut response = Vec::new();

        loop {
            let chunk = timeout_at(deadline, self.read_chunk())
                .await
                .map_err(|_| LinkError::Timeout { after })??;
            response.extend_from_slice(&chunk);

            match decode(&response) {
                Err(e) if e.is_truncated() => {
                    if response.len() >= self.config.max_response_len {
                        return Err(LinkError::ResponseTooLarge {
                            max: self.config.max_response_len,
                        });
                    }
                    trace!("Partial response from {} ({}), reading more", self.peer, e);
                }
                result => {
                    debug!("RX {}: {:02X?}", self.peer, response);
                    if let Err(ProtocolError::NegativeAcknowledge) = &result {
                        warn!("{} rejected command {:02X?}", self.peer, frame);
                    }
                    return result.map_err(LinkError::from);
                }
            }
        }
    }

    /// Drop bytes already waiting on the stream
    ///
    /// A reply can decode before its last chunk arrives; whatever trails it
    /// must not be taken as the answer to the next request.
    async fn discard_stale(&mut self) -> Result<(), LinkError> {
        let mut buf = [0u8; 64];
        loop {
            match timeout(Duration::ZERO, self.io.read(&mut buf)).await {
                Ok(Ok(0)) | Err(_) => return Ok(()),
                Ok(Ok(n)) => warn!(
                    "Discarding {} stale bytes from {}: {:02X?}",
                    n,
                    self.peer,
                    &buf[..n]
                ),
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn read_chunk(&mut self) -> Result<Vec<u8>, LinkError> {
        let mut buf = vec![0u8; self.config.max_response_len.max(1)];
        let n = self.io.read(&mut buf).await?;
        if n == 0 {
            return Err(LinkError::ConnectionClosed);
        }
        buf.truncate(n);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_protocol::pns;
    use tokio::io::duplex;

    fn config() -> LinkConfig {
        LinkConfig {
            response_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_transact_reassembles_split_response() {
        let (client, mut device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());

        let device_task = tokio::spawn(async move {
            let mut req = [0u8; 6];
            device.read_exact(&mut req).await.unwrap();
            device.write_all(&[0, 0, 0, 0, 0]).await.unwrap();
            device.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            device
                .write_all(&[0, 0, 0, 0x00, 1, 1, 1, 1, 1, 0])
                .await
                .unwrap();
            device
        });

        let frame = pns::encode(&pns::PnsCommand::GetData).unwrap();
        let status = conn.transact(&frame, pns::decode_status).await.unwrap();
        assert_eq!(status.mode, 0);
        device_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_transact_times_out_on_silence() {
        let (client, _device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());

        let err = conn.transact(&[0x00], pns::decode_ack).await.unwrap_err();
        assert!(matches!(err, LinkError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_transact_reports_closed_connection() {
        let (client, device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());
        drop(device);

        let err = conn.transact(&[], pns::decode_ack).await.unwrap_err();
        assert!(matches!(err, LinkError::ConnectionClosed | LinkError::Io(_)));
    }

    #[tokio::test]
    async fn test_transact_surfaces_nak() {
        let (client, mut device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());

        let device_task = tokio::spawn(async move {
            let mut req = [0u8; 6];
            device.read_exact(&mut req).await.unwrap();
            device.write_all(&[pns::NAK]).await.unwrap();
            device
        });

        let frame = pns::encode(&pns::PnsCommand::GetData).unwrap();
        let err = conn.transact(&frame, pns::decode_status).await.unwrap_err();
        assert!(err.is_negative_acknowledge());
        device_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_trailing_bytes_do_not_answer_next_request() {
        let (client, mut device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());

        let device_task = tokio::spawn(async move {
            let mut req = [0u8; 6];
            device.read_exact(&mut req).await.unwrap();
            // Full status record, then two more bytes of the same reply
            device
                .write_all(&[0, 0, 0, 0, 0, 0, 0, 0, 0x00, 1, 1, 1, 1, 1, 0])
                .await
                .unwrap();
            device.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            device.write_all(&[0x00, 0x00]).await.unwrap();

            device.read_exact(&mut req).await.unwrap();
            device.write_all(&[pns::NAK]).await.unwrap();
            device
        });

        let get_data = pns::encode(&pns::PnsCommand::GetData).unwrap();
        conn.transact(&get_data, pns::decode_status).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let clear = pns::encode(&pns::PnsCommand::Clear).unwrap();
        let err = conn.transact(&clear, pns::decode_ack).await.unwrap_err();
        assert!(err.is_negative_acknowledge());
        device_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_returns_one_chunk() {
        let (client, mut device) = duplex(64);
        let mut conn = Connection::new(client, "test", config());
        device.write_all(b"ACK").await.unwrap();

        assert_eq!(conn.receive().await.unwrap(), b"ACK".to_vec());
    }
}
