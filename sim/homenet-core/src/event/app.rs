//! Payloads of TCP segments and the application-layer exchanges carried over
//! them (HTTP between room controllers and the server, DHCP at boot).

use crate::{
    address::{Endpoint, Ipv4Address, Mac},
    protocols::tcp::TcpState,
};
use serde::{ser::SerializeSeq, Serialize, Serializer};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

/// The advertised receive window of every simulated segment.
pub const TCP_WINDOW: u16 = 65535;

/// The control bits of a TCP segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub psh: bool,
}

impl TcpFlags {
    pub const NONE: Self = Self::bits(false, false, false, false, false);
    pub const SYN: Self = Self::bits(true, false, false, false, false);
    pub const SYN_ACK: Self = Self::bits(true, true, false, false, false);
    pub const ACK: Self = Self::bits(false, true, false, false, false);
    pub const PSH_ACK: Self = Self::bits(false, true, false, false, true);
    pub const FIN_ACK: Self = Self::bits(false, true, true, false, false);

    const fn bits(syn: bool, ack: bool, fin: bool, rst: bool, psh: bool) -> Self {
        Self {
            syn,
            ack,
            fin,
            rst,
            psh,
        }
    }

    /// The names of the set bits, acknowledgment last.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.syn, "SYN"),
            (self.fin, "FIN"),
            (self.rst, "RST"),
            (self.psh, "PSH"),
            (self.ack, "ACK"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

impl Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("+"))
        }
    }
}

impl Serialize for TcpFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// A TCP segment as it would appear in a capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpSegment {
    pub src: Endpoint,
    pub dst: Endpoint,
    pub seq: u32,
    pub ack: u32,
    pub window: u16,
    pub flags: TcpFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The state the sending side's session moved to with this segment.
    #[serde(rename = "state", skip_serializing_if = "Option::is_none")]
    pub transition: Option<TcpState>,
}

impl TcpSegment {
    pub fn new(src: Endpoint, dst: Endpoint, seq: u32, ack: u32, flags: TcpFlags) -> Self {
        Self {
            src,
            dst,
            seq,
            ack,
            window: TCP_WINDOW,
            flags,
            data: None,
            transition: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_transition(mut self, state: TcpState) -> Self {
        self.transition = Some(state);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DhcpMessageType {
    Discover,
    Offer,
    Request,
    Ack,
}

impl DhcpMessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DhcpMessageType::Discover => "DISCOVER",
            DhcpMessageType::Offer => "OFFER",
            DhcpMessageType::Request => "REQUEST",
            DhcpMessageType::Ack => "ACK",
        }
    }
}

/// One step of a DHCP lease negotiation. Only the fields meaningful for the
/// message type are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpMessage {
    pub message_type: DhcpMessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_mac: Option<Mac>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_ip: Option<Ipv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_ip: Option<Ipv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Ipv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Ipv4Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_ip: Option<Ipv4Address>,
    /// Lease duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_time: Option<u32>,
}

impl DhcpMessage {
    fn empty(message_type: DhcpMessageType) -> Self {
        Self {
            message_type,
            client_mac: None,
            requested_ip: None,
            offered_ip: None,
            subnet: None,
            gateway: None,
            dns: None,
            assigned_ip: None,
            lease_time: None,
        }
    }

    pub fn discover(client_mac: Mac) -> Self {
        Self {
            client_mac: Some(client_mac),
            requested_ip: Some(Ipv4Address::CURRENT_NETWORK),
            ..Self::empty(DhcpMessageType::Discover)
        }
    }

    pub fn offer(
        offered_ip: Ipv4Address,
        subnet: Ipv4Address,
        gateway: Ipv4Address,
        dns: Ipv4Address,
        lease_time: u32,
    ) -> Self {
        Self {
            offered_ip: Some(offered_ip),
            subnet: Some(subnet),
            gateway: Some(gateway),
            dns: Some(dns),
            lease_time: Some(lease_time),
            ..Self::empty(DhcpMessageType::Offer)
        }
    }

    pub fn request(requested_ip: Ipv4Address) -> Self {
        Self {
            requested_ip: Some(requested_ip),
            ..Self::empty(DhcpMessageType::Request)
        }
    }

    pub fn ack(
        assigned_ip: Ipv4Address,
        subnet: Ipv4Address,
        gateway: Ipv4Address,
        dns: Ipv4Address,
        lease_time: u32,
    ) -> Self {
        Self {
            assigned_ip: Some(assigned_ip),
            subnet: Some(subnet),
            gateway: Some(gateway),
            dns: Some(dns),
            lease_time: Some(lease_time),
            ..Self::empty(DhcpMessageType::Ack)
        }
    }
}
