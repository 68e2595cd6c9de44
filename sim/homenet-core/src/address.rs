//! Addresses used to label the two ends of a simulated exchange.
//!
//! The simulator never puts anything on a wire, so these types only need to
//! identify parties and render the way a packet capture would show them.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error as ThisError;

/// Represents an IPv4 address of a simulated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ipv4Address([u8; 4]);

impl Ipv4Address {
    /// The address `0.0.0.0`.
    pub const CURRENT_NETWORK: Self = Self([0u8, 0, 0, 0]);

    /// The address `255.255.255.255`.
    pub const BROADCAST: Self = Self([255u8, 255, 255, 255]);

    pub const fn new(octets: [u8; 4]) -> Self {
        Self(octets)
    }
}

impl Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];
        let mut parts = s.split('.');
        for byte in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| ParseAddressError::Ipv4(s.to_string()))?;
            *byte = part
                .parse()
                .map_err(|_| ParseAddressError::Ipv4(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseAddressError::Ipv4(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; 4]> for Ipv4Address {
    fn from(n: [u8; 4]) -> Self {
        Self(n)
    }
}

impl From<Ipv4Address> for [u8; 4] {
    fn from(address: Ipv4Address) -> Self {
        address.0
    }
}

/// A hardware (Ethernet) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Mac([u8; 6]);

impl Mac {
    /// The unset address `00:00:00:00:00:00`, used by hosts that do not know
    /// their peer yet.
    pub const ZERO: Self = Self([0u8; 6]);

    /// The broadcast address `FF:FF:FF:FF:FF:FF`.
    pub const BROADCAST: Self = Self([0xffu8; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for Mac {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| ParseAddressError::Mac(s.to_string()))?;
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| ParseAddressError::Mac(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseAddressError::Mac(s.to_string()));
        }
        Ok(Self(octets))
    }
}

/// One side of a socket-style conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Endpoint {
    pub address: Ipv4Address,
    pub port: u16,
}

impl Endpoint {
    pub const fn new(address: Ipv4Address, port: u16) -> Self {
        Self { address, port }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseAddressError::Endpoint(s.to_string()))?;
        Ok(Self {
            address: address.parse()?,
            port: port
                .parse()
                .map_err(|_| ParseAddressError::Endpoint(s.to_string()))?,
        })
    }
}

/// The source or destination of an [`Event`](crate::Event).
///
/// IP traffic names sockets or hosts, while the low-power mesh protocols
/// address devices by short address or node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Socket(Endpoint),
    Host(Ipv4Address),
    /// A ZigBee 16-bit network address, shown as `0x7865`.
    ZigBee(u16),
    /// A Z-Wave node id. The controller is node 1.
    ZWaveNode(u8),
    Named(String),
}

impl Address {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Socket(endpoint) => endpoint.fmt(f),
            Address::Host(ip) => ip.fmt(f),
            Address::ZigBee(short) => write!(f, "{:#06x}", short),
            Address::ZWaveNode(node) => node.fmt(f),
            Address::Named(name) => f.write_str(name),
        }
    }
}

impl From<Endpoint> for Address {
    fn from(endpoint: Endpoint) -> Self {
        Self::Socket(endpoint)
    }
}

impl From<Ipv4Address> for Address {
    fn from(ip: Ipv4Address) -> Self {
        Self::Host(ip)
    }
}

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("Invalid IPv4 address: {0}")]
    Ipv4(String),
    #[error("Invalid MAC address: {0}")]
    Mac(String),
    #[error("Invalid endpoint, expected ip:port: {0}")]
    Endpoint(String),
}

macro_rules! serde_via_display {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(de::Error::custom)
                }
            }
        )*
    };
}

serde_via_display!(Ipv4Address, Mac, Endpoint);

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Address::ZWaveNode(node) => serializer.serialize_u8(*node),
            other => serializer.collect_str(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let ip: Ipv4Address = "192.168.1.101".parse().unwrap();
        assert_eq!(ip, Ipv4Address::new([192, 168, 1, 101]));
        assert_eq!(ip.to_string(), "192.168.1.101");
        assert!("192.168.1".parse::<Ipv4Address>().is_err());
        assert!("192.168.1.1.1".parse::<Ipv4Address>().is_err());

        let mac: Mac = "00:1B:44:11:3A:B7".parse().unwrap();
        assert_eq!(mac.to_string(), "00:1B:44:11:3A:B7");
        assert_eq!(Mac::BROADCAST.to_string(), "FF:FF:FF:FF:FF:FF");

        let endpoint: Endpoint = "192.168.1.1:8080".parse().unwrap();
        assert_eq!(endpoint.port, 8080);
        assert_eq!(endpoint.to_string(), "192.168.1.1:8080");
    }

    #[test]
    fn mesh_addresses() {
        assert_eq!(Address::ZigBee(0x7865).to_string(), "0x7865");
        assert_eq!(Address::ZigBee(0).to_string(), "0x0000");
        assert_eq!(
            serde_json::to_string(&Address::ZWaveNode(3)).unwrap(),
            "3"
        );
        assert_eq!(
            serde_json::to_string(&Address::named("broadcast")).unwrap(),
            "\"broadcast\""
        );
    }
}
