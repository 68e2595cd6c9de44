//! The simulated protocols: the TCP session state machine, the OSI layer
//! generators with their composed exchanges, and the IoT protocol
//! simulators.

pub mod tcp;
pub use tcp::TcpSimulator;

pub mod layers;

pub mod iot;
pub use iot::IotStats;

pub mod coap;
pub mod mqtt;
pub mod zigbee;
pub mod zwave;

mod utility;
pub use utility::{checksum, ephemeral_port};
