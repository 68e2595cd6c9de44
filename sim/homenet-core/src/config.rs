//! Static lookup data for the simulated home.
//!
//! Nothing here is computed by the simulator. Room identifiers, addressing
//! tables and mesh identifiers are supplied from outside (usually
//! [`HomeConfig::default`] or a JSON file) and resolved with explicit
//! fallbacks, so an unknown key never stops a simulation.

use crate::address::{Endpoint, Ipv4Address, Mac};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::{
    hash::{Hash, Hasher},
    time::Duration,
};

/// The ZigBee short address given to rooms missing from the table.
pub const DEFAULT_ZIGBEE_ADDRESS: u16 = 0x7869;

/// The Z-Wave node id given to rooms missing from the table.
pub const DEFAULT_ZWAVE_NODE: u8 = 6;

/// The ZigBee cluster used for message types without a dedicated cluster.
pub const DEFAULT_ZIGBEE_CLUSTER: u16 = 0x0000;

/// A room with its controller's addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub ip: Ipv4Address,
    pub mac: Mac,
    pub zigbee_address: u16,
    pub zwave_node: u8,
    /// Current temperature reported by telemetry, in Celsius.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    22.0
}

impl Room {
    fn new(
        id: &str,
        name: &str,
        ip: [u8; 4],
        mac: [u8; 6],
        zigbee_address: u16,
        zwave_node: u8,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ip: Ipv4Address::new(ip),
            mac: Mac::new(mac),
            zigbee_address,
            zwave_node,
            temperature: default_temperature(),
        }
    }

    /// The stand-in for a room id that is not configured. Its controller
    /// gets a link-local address derived from the id, so distinct unknown
    /// rooms keep distinct sessions.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            ip: link_local(id),
            mac: Mac::BROADCAST,
            zigbee_address: DEFAULT_ZIGBEE_ADDRESS,
            zwave_node: DEFAULT_ZWAVE_NODE,
            temperature: default_temperature(),
        }
    }
}

/// An address in `169.254.1.1` to `169.254.254.254`, the range a host
/// without a lease picks from.
fn link_local(id: &str) -> Ipv4Address {
    let mut hasher = FxHasher::default();
    id.hash(&mut hasher);
    let [high, low, ..] = hasher.finish().to_be_bytes();
    Ipv4Address::new([169, 254, 1 + high % 254, 1 + low % 254])
}

/// Addressing of the central controller and every room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    pub server: Endpoint,
    pub server_mac: Mac,
    pub rooms: Vec<Room>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            server: Endpoint::new(Ipv4Address::new([192, 168, 1, 1]), 8080),
            server_mac: Mac::new([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]),
            rooms: vec![
                Room::new(
                    "living-room",
                    "Living Room",
                    [192, 168, 1, 101],
                    [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb8],
                    0x7865,
                    2,
                ),
                Room::new(
                    "kitchen",
                    "Kitchen",
                    [192, 168, 1, 102],
                    [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb9],
                    0x7866,
                    3,
                ),
                Room::new(
                    "bedroom",
                    "Bedroom",
                    [192, 168, 1, 103],
                    [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xba],
                    0x7867,
                    4,
                ),
                Room::new(
                    "bathroom",
                    "Bathroom",
                    [192, 168, 1, 104],
                    [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xbb],
                    0x7868,
                    5,
                ),
            ],
        }
    }
}

impl HomeConfig {
    /// Gets a configured room.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Gets a room, substituting [`Room::placeholder`] for unknown ids.
    pub fn resolve(&self, id: &str) -> Room {
        self.room(id)
            .cloned()
            .unwrap_or_else(|| Room::placeholder(id))
    }

    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|room| room.id.as_str())
    }

    /// Maps a known host address to its MAC. Unknown hosts map to the
    /// broadcast MAC.
    pub fn mac_for(&self, ip: Ipv4Address) -> Mac {
        if ip == self.server.address {
            return self.server_mac;
        }
        self.rooms
            .iter()
            .find(|room| room.ip == ip)
            .map(|room| room.mac)
            .unwrap_or(Mac::BROADCAST)
    }

    pub fn zwave_node(&self, room_id: &str) -> u8 {
        self.room(room_id)
            .map(|room| room.zwave_node)
            .unwrap_or(DEFAULT_ZWAVE_NODE)
    }

    /// Sets the temperature telemetry reports for a room. Unknown rooms are
    /// ignored.
    pub fn set_temperature(&mut self, room_id: &str, temperature: f64) {
        if let Some(room) = self.rooms.iter_mut().find(|room| room.id == room_id) {
            room.temperature = temperature;
        }
    }
}

/// Maps a ZigBee message type to the cluster it is reported on.
pub fn zigbee_cluster(message_type: &str) -> u16 {
    match message_type {
        "temperature" => 0x0402,
        "occupancy" => 0x0406,
        "light" => 0x0006,
        "power" => 0x0702,
        _ => DEFAULT_ZIGBEE_CLUSTER,
    }
}

/// Knobs of a [`Simulation`](crate::Simulation) that are not part of the
/// home itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed for the default random source. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Period of the MQTT telemetry sweep over every room.
    pub telemetry_interval: Duration,
    /// Period of the CoAP observe sweep over every room.
    pub observe_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            telemetry_interval: Duration::from_secs(30),
            observe_interval: Duration::from_secs(60),
        }
    }
}

impl SimConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
