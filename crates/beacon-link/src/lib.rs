//! Signal Tower Transport
//!
//! Carries PNS and PHN frames over a single stream connection: one request,
//! one response, no pipelining. The codec in `beacon-protocol` stays pure;
//! this crate owns the socket, the response deadline, and reassembly of
//! responses that arrive in more than one read.
//!
//! # Example
//!
//! ```rust,no_run
//! use beacon_link::{LinkConfig, PnsClient};
//! use beacon_protocol::RunControlData;
//!
//! # async fn run() -> Result<(), beacon_link::LinkError> {
//! let mut client = PnsClient::connect("192.168.10.2:10000", LinkConfig::default()).await?;
//! client.run_control(RunControlData::new([1, 0, 0, 0, 2], 1)).await?;
//! let status = client.get_data().await?;
//! println!("mode byte: {}", status.mode);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;

pub use client::{PhnClient, PnsClient};
pub use connection::{Connection, LinkConfig, DEFAULT_PORT};
pub use error::LinkError;
