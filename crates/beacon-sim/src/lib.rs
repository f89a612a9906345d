//! Signal Tower Simulation Library
//!
//! This crate provides a virtual signal tower for exercising PNS/PHN clients
//! without physical hardware:
//!
//! - **VirtualBeacon**: Keeps device state and answers decoded requests
//! - **run_virtual_beacon_task**: Serves a beacon over any async stream
//!
//! # Example
//!
//! ```rust
//! use beacon_protocol::{pns, PnsCommand, Protocol};
//! use beacon_sim::VirtualBeacon;
//!
//! let mut beacon = VirtualBeacon::new("bench", Protocol::Pns);
//! let response = beacon.handle_pns(&PnsCommand::SmartMode { group: 3 });
//! assert_eq!(response, vec![pns::ACK]);
//! ```

pub mod device;
pub mod device_task;

pub use device::{VirtualBeacon, VirtualBeaconConfig};
pub use device_task::{run_virtual_beacon_task, VirtualBeaconCommand};
