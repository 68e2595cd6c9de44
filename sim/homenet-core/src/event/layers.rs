//! Payloads of the lower OSI layers.

use crate::address::{Ipv4Address, Mac};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Transmit,
    Receive,
    Idle,
}

impl SignalStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            SignalStatus::Transmit => "transmit",
            SignalStatus::Receive => "receive",
            SignalStatus::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalSignal {
    pub signal: &'static str,
    pub medium: &'static str,
    pub bitrate: &'static str,
    pub voltage: &'static str,
    pub status: SignalStatus,
}

impl PhysicalSignal {
    pub fn new(status: SignalStatus) -> Self {
        Self {
            signal: "Electrical/Optical Signal",
            medium: "CAT6 Cable",
            bitrate: "1000 Mbps",
            voltage: match status {
                SignalStatus::Transmit => "+2.5V to -2.5V",
                SignalStatus::Receive | SignalStatus::Idle => "0V",
            },
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    Data,
    Broadcast,
    Unicast,
}

impl FrameType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FrameType::Data => "data",
            FrameType::Broadcast => "broadcast",
            FrameType::Unicast => "unicast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetFrame {
    pub frame_type: FrameType,
    #[serde(rename = "sourceMAC")]
    pub source_mac: Mac,
    #[serde(rename = "destinationMAC")]
    pub destination_mac: Mac,
    /// Maximum frame size in bytes.
    pub frame_size: u16,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipv4Packet {
    #[serde(rename = "sourceIP")]
    pub source_ip: Ipv4Address,
    #[serde(rename = "destinationIP")]
    pub destination_ip: Ipv4Address,
    pub version: u8,
    pub header_length: u8,
    pub ttl: u8,
    pub fragment_offset: u16,
    pub checksum: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArpOperation {
    Request,
    Reply,
}

impl ArpOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            ArpOperation::Request => "request",
            ArpOperation::Reply => "reply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArpMessage {
    pub operation: ArpOperation,
    #[serde(rename = "senderMAC")]
    pub sender_mac: Mac,
    #[serde(rename = "senderIP")]
    pub sender_ip: Ipv4Address,
    /// Zero on requests, since the target is what is being asked for.
    #[serde(rename = "targetMAC")]
    pub target_mac: Mac,
    #[serde(rename = "targetIP")]
    pub target_ip: Ipv4Address,
    pub hardware_type: &'static str,
    pub protocol_type: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IcmpType {
    #[serde(rename = "echo request")]
    EchoRequest,
    #[serde(rename = "echo reply")]
    EchoReply,
}

impl IcmpType {
    pub const fn as_str(self) -> &'static str {
        match self {
            IcmpType::EchoRequest => "echo request",
            IcmpType::EchoReply => "echo reply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IcmpMessage {
    #[serde(rename = "type")]
    pub kind: IcmpType,
    pub code: u8,
    #[serde(rename = "sourceIP")]
    pub source_ip: Ipv4Address,
    #[serde(rename = "destinationIP")]
    pub destination_ip: Ipv4Address,
    pub sequence: u16,
    pub identifier: u16,
    pub data: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UdpDatagram {
    pub source_port: u16,
    pub destination_port: u16,
    /// Header plus payload length in bytes.
    pub length: u16,
    pub checksum: String,
}

/// The transport-layer view of a TCP segment, mirrored from the TCP log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSegment {
    #[serde(rename = "sourceIP")]
    pub source_ip: Ipv4Address,
    #[serde(rename = "destinationIP")]
    pub destination_ip: Ipv4Address,
    pub source_port: u16,
    pub destination_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Establish,
    Maintain,
    Terminate,
}

impl SessionAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionAction::Establish => "establish",
            SessionAction::Maintain => "maintain",
            SessionAction::Terminate => "terminate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub session_id: String,
    pub action: SessionAction,
    pub state: &'static str,
    pub keep_alive: bool,
}

impl SessionMessage {
    pub fn new(session_id: String, action: SessionAction) -> Self {
        Self {
            session_id,
            action,
            state: match action {
                SessionAction::Establish => "connecting",
                SessionAction::Maintain => "active",
                SessionAction::Terminate => "closing",
            },
            keep_alive: action == SessionAction::Maintain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMessage {
    pub data_type: String,
    pub encoding: &'static str,
    pub compression: &'static str,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<&'static str>,
}

impl PresentationMessage {
    pub fn new(data_type: impl Into<String>, encrypted: bool) -> Self {
        Self {
            data_type: data_type.into(),
            encoding: "UTF-8",
            compression: "gzip",
            encrypted,
            certificate: encrypted.then_some("Valid SSL Certificate"),
        }
    }
}
