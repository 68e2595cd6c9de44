//! Recorded protocol events.
//!
//! An [`Event`] is one synthetic packet, frame or message. Its payload is a
//! [`Payload`] variant, and everything else that classifies the event (the
//! category that decides which ring buffer keeps it, the OSI layer, the
//! protocol name and the message type) is derived from that variant when the
//! event is built. A payload therefore cannot be filed under the wrong
//! category.

pub mod app;
pub mod iot;
pub mod layers;

use crate::address::Address;
use serde::{Serialize, Serializer};
use std::{
    fmt::{self, Display},
    str::FromStr,
    time::Duration,
};
use thiserror::Error as ThisError;

pub use app::{DhcpMessage, DhcpMessageType, HttpRequest, HttpResponse, TcpFlags, TcpSegment};
pub use iot::{
    CoapMessage, CoapMethod, CoapOption, ControllerMessage, DeviceCommand, DeviceMessage,
    IotProtocol, MqttPacket, ZWaveFrame, ZigBeeFrame,
};
pub use layers::{
    ArpMessage, ArpOperation, EthernetFrame, FrameType, IcmpMessage, IcmpType, Ipv4Packet,
    PhysicalSignal, PresentationMessage, SessionAction, SessionMessage, SignalStatus,
    TransportSegment, UdpDatagram,
};

/// The closed set of event categories. Each has its own ring buffer and
/// retention limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Tcp,
    App,
    Iot,
    Controller,
    Device,
    Physical,
    DataLink,
    Network,
    Transport,
    Session,
    Presentation,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 11] = [
        Category::Tcp,
        Category::App,
        Category::Iot,
        Category::Controller,
        Category::Device,
        Category::Physical,
        Category::DataLink,
        Category::Network,
        Category::Transport,
        Category::Session,
        Category::Presentation,
    ];

    /// The maximum number of events of this category that are retained.
    pub const fn capacity(self) -> usize {
        match self {
            Category::Tcp | Category::Iot => 100,
            Category::App | Category::Controller | Category::Device => 50,
            Category::Physical
            | Category::DataLink
            | Category::Network
            | Category::Transport
            | Category::Session
            | Category::Presentation => 30,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Tcp => "tcp",
            Category::App => "app",
            Category::Iot => "iot",
            Category::Controller => "controller",
            Category::Device => "device",
            Category::Physical => "physical",
            Category::DataLink => "dataLink",
            Category::Network => "network",
            Category::Transport => "transport",
            Category::Session => "session",
            Category::Presentation => "presentation",
        }
    }

    /// Position of the category in [`Category::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The OSI layer label carried by events of this category, if the
    /// category is a layer view.
    pub const fn layer(self) -> Option<&'static str> {
        match self {
            Category::Physical => Some("Physical"),
            Category::DataLink => Some("Data Link"),
            Category::Network => Some("Network"),
            Category::Transport => Some("Transport"),
            Category::Session => Some("Session"),
            Category::Presentation => Some("Presentation"),
            Category::App => Some("Application"),
            Category::Tcp | Category::Iot | Category::Controller | Category::Device => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
#[error("Unknown event category: {0}")]
pub struct ParseCategoryError(pub String);

/// The body of an event, one variant per kind of message the simulator
/// produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Tcp(TcpSegment),
    HttpRequest(HttpRequest),
    HttpResponse(HttpResponse),
    Dhcp(DhcpMessage),
    Mqtt(MqttPacket),
    Coap(CoapMessage),
    ZigBee(ZigBeeFrame),
    ZWave(ZWaveFrame),
    DeviceCommand(DeviceCommand),
    Controller(ControllerMessage),
    Device(DeviceMessage),
    Physical(PhysicalSignal),
    DataLink(EthernetFrame),
    Ipv4(Ipv4Packet),
    Arp(ArpMessage),
    Icmp(IcmpMessage),
    Udp(UdpDatagram),
    TcpTransport(TransportSegment),
    Session(SessionMessage),
    Presentation(PresentationMessage),
}

impl Payload {
    pub fn category(&self) -> Category {
        match self {
            Payload::Tcp(_) => Category::Tcp,
            Payload::HttpRequest(_) | Payload::HttpResponse(_) | Payload::Dhcp(_) => {
                Category::App
            }
            Payload::Mqtt(_)
            | Payload::Coap(_)
            | Payload::ZigBee(_)
            | Payload::ZWave(_)
            | Payload::DeviceCommand(_) => Category::Iot,
            Payload::Controller(_) => Category::Controller,
            Payload::Device(_) => Category::Device,
            Payload::Physical(_) => Category::Physical,
            Payload::DataLink(_) => Category::DataLink,
            Payload::Ipv4(_) | Payload::Arp(_) | Payload::Icmp(_) => Category::Network,
            Payload::Udp(_) | Payload::TcpTransport(_) => Category::Transport,
            Payload::Session(_) => Category::Session,
            Payload::Presentation(_) => Category::Presentation,
        }
    }

    pub fn protocol(&self) -> &'static str {
        match self {
            Payload::Tcp(_) | Payload::TcpTransport(_) => "TCP",
            Payload::HttpRequest(_) | Payload::HttpResponse(_) => "HTTP",
            Payload::Dhcp(_) => "DHCP",
            Payload::Mqtt(_) => IotProtocol::Mqtt.as_str(),
            Payload::Coap(_) => IotProtocol::Coap.as_str(),
            Payload::ZigBee(_) => IotProtocol::ZigBee.as_str(),
            Payload::ZWave(_) => IotProtocol::ZWave.as_str(),
            Payload::DeviceCommand(command) => command.protocol.as_str(),
            Payload::Controller(_) => "Controller",
            Payload::Device(_) => "Device",
            Payload::Physical(_) | Payload::DataLink(_) => "Ethernet",
            Payload::Ipv4(_) => "IPv4",
            Payload::Arp(_) => "ARP",
            Payload::Icmp(_) => "ICMP",
            Payload::Udp(_) => "UDP",
            Payload::Session(_) => "NetBIOS",
            Payload::Presentation(message) => {
                if message.encrypted {
                    "SSL/TLS"
                } else {
                    "MIME"
                }
            }
        }
    }

    pub fn message_type(&self) -> String {
        match self {
            Payload::Tcp(segment) => segment.flags.to_string(),
            Payload::TcpTransport(segment) => segment.flags.join("+"),
            Payload::HttpRequest(request) => request.method.clone(),
            Payload::HttpResponse(response) => response.status.clone(),
            Payload::Dhcp(message) => message.message_type.as_str().to_string(),
            Payload::Mqtt(packet) => packet.message_type().to_string(),
            Payload::Coap(message) => message.message_type().to_string(),
            Payload::ZigBee(frame) => frame.message_type().to_string(),
            Payload::ZWave(frame) => frame.message_type().to_string(),
            Payload::DeviceCommand(command) => command.message_type.clone(),
            Payload::Controller(message) => message.action.clone(),
            Payload::Device(message) => message.event.clone(),
            Payload::Physical(signal) => signal.status.as_str().to_string(),
            Payload::DataLink(frame) => frame.frame_type.as_str().to_string(),
            Payload::Ipv4(_) => "packet".to_string(),
            Payload::Arp(message) => message.operation.as_str().to_string(),
            Payload::Icmp(message) => message.kind.as_str().to_string(),
            Payload::Udp(_) => "datagram".to_string(),
            Payload::Session(message) => message.action.as_str().to_string(),
            Payload::Presentation(message) => message.data_type.clone(),
        }
    }
}

/// A single recorded event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: u64,
    #[serde(rename = "timestamp", serialize_with = "serialize_millis")]
    at: Duration,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer: Option<&'static str>,
    protocol: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dst: Option<Address>,
    message_type: String,
    #[serde(rename = "data")]
    payload: Payload,
}

impl Event {
    /// Builds an event, deriving its classification from the payload.
    pub fn new(
        id: u64,
        at: Duration,
        src: Option<Address>,
        dst: Option<Address>,
        payload: Payload,
    ) -> Self {
        let category = payload.category();
        Self {
            id,
            at,
            category,
            layer: category.layer(),
            protocol: payload.protocol(),
            src,
            dst,
            message_type: payload.message_type(),
            payload,
        }
    }

    /// A sink-unique, increasing identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The simulated time the event was recorded at.
    pub fn at(&self) -> Duration {
        self.at
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn layer(&self) -> Option<&'static str> {
        self.layer
    }

    pub fn protocol(&self) -> &'static str {
        self.protocol
    }

    pub fn src(&self) -> Option<&Address> {
        self.src.as_ref()
    }

    pub fn dst(&self) -> Option<&Address> {
        self.dst.as_ref()
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The length of the event's JSON form, used as the byte-volume proxy.
    pub fn serialized_len(&self) -> usize {
        json_len(self)
    }
}

/// The length of a value's compact JSON form.
pub fn json_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_string(value).map_or(0, |json| json.len())
}

fn serialize_millis<S: Serializer>(at: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(at.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Endpoint, Ipv4Address};

    #[test]
    fn categories_parse_and_bound() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
            assert_eq!(Category::ALL[category.index()], category);
        }
        assert_eq!(Category::Tcp.capacity(), 100);
        assert_eq!(Category::App.capacity(), 50);
        assert_eq!(Category::Session.capacity(), 30);
        assert!("datalink".parse::<Category>().is_err());
    }

    #[test]
    fn classification_follows_payload() {
        let udp = Payload::Udp(UdpDatagram {
            source_port: 68,
            destination_port: 67,
            length: 300,
            checksum: "0a0b0c0d".into(),
        });
        let event = Event::new(7, Duration::from_millis(1500), None, None, udp);
        assert_eq!(event.category(), Category::Transport);
        assert_eq!(event.layer(), Some("Transport"));
        assert_eq!(event.protocol(), "UDP");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], 1500);
        assert_eq!(json["category"], "transport");
        assert_eq!(json["data"]["sourcePort"], 68);
    }

    #[test]
    fn tcp_message_type_names_flags() {
        let endpoint = Endpoint::new(Ipv4Address::new([10, 0, 0, 1]), 80);
        let segment = TcpSegment::new(endpoint, endpoint, 1, 2, TcpFlags::SYN_ACK);
        let event = Event::new(0, Duration::ZERO, None, None, Payload::Tcp(segment));
        assert_eq!(event.message_type(), "SYN+ACK");
        assert_eq!(event.layer(), None);
        assert!(event.serialized_len() > 0);
    }
}
