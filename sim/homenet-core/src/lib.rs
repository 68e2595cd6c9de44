//! A discrete-event simulator of the traffic inside a small smart home, built
//! as a teaching aid for layered networking and IoT protocols.
//!
//! The core produces ordered, protocol-accurate sequences of synthetic
//! events between a central server and a controller in each room: TCP
//! handshakes, data transfer and teardown, the lower OSI layers underneath
//! them, DHCP and ping, and MQTT, CoAP, ZigBee and Z-Wave exchanges. Nothing
//! touches a real network.
//!
//! # Organization
//! - [`Scheduler`] is the single logical timeline every exchange runs on
//! - [`EventSink`] keeps bounded per-category logs of the recorded
//!   [`Event`]s and the global counters
//! - [`protocols`] holds the TCP session state machine, the OSI layer
//!   generators and the IoT simulators
//! - [`Simulation`] ties them together and exposes the trigger calls
//! - [`AutoAdvance`] moves a shared simulation forward in real time
//!
//! # Time
//!
//! Simulated time is a [`Duration`](std::time::Duration) from the start of
//! the simulation and only moves when the simulation is advanced. A trigger
//! call records its immediate events at the current time and schedules the
//! rest of its exchange as steps. Steps fire in order of due time, equal due
//! times in the order they were scheduled.

mod logging;

pub mod address;
pub use address::{Address, Endpoint, Ipv4Address, Mac};

pub mod config;
pub use config::{HomeConfig, Room, SimConfig};

pub mod scheduler;
pub use scheduler::{Scheduler, TaskId};

pub mod event;
pub use event::{Category, CoapMethod, Event, IotProtocol, Payload};

pub mod sink;
pub use sink::{EventSink, Filter, SinkStats, View};

pub mod protocols;
pub use protocols::{
    tcp::{Command, CommandDelivery, CommandKind, CommandPolicy, Session, SessionKey, TcpState},
    IotStats,
};

pub mod simulation;
pub use simulation::Simulation;

pub mod driver;
pub use driver::AutoAdvance;
