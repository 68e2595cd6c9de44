//! Payloads of the IoT protocols and of the controller/device message logs.

use crate::address::Mac;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IotProtocol {
    #[serde(rename = "MQTT")]
    Mqtt,
    #[serde(rename = "CoAP")]
    Coap,
    #[serde(rename = "ZigBee")]
    ZigBee,
    #[serde(rename = "Z-Wave")]
    ZWave,
}

impl IotProtocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            IotProtocol::Mqtt => "MQTT",
            IotProtocol::Coap => "CoAP",
            IotProtocol::ZigBee => "ZigBee",
            IotProtocol::ZWave => "Z-Wave",
        }
    }
}

impl Display for IotProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MQTT control packets exchanged between a room client and the broker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MqttPacket {
    Connect {
        #[serde(rename = "clientId")]
        client_id: String,
        #[serde(rename = "cleanSession")]
        clean_session: bool,
    },
    ConnAck {
        #[serde(rename = "returnCode")]
        return_code: u8,
        #[serde(rename = "sessionPresent")]
        session_present: bool,
    },
    Publish {
        topic: String,
        qos: u8,
        retain: bool,
        payload: Value,
    },
    PubAck {
        #[serde(rename = "messageId")]
        message_id: u16,
    },
    PubRec {
        #[serde(rename = "messageId")]
        message_id: u16,
    },
}

impl MqttPacket {
    pub fn message_type(&self) -> &'static str {
        match self {
            MqttPacket::Connect { .. } => "CONNECT",
            MqttPacket::ConnAck { .. } => "CONNACK",
            MqttPacket::Publish { .. } => "PUBLISH",
            MqttPacket::PubAck { .. } => "PUBACK",
            MqttPacket::PubRec { .. } => "PUBREC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoapMethod {
    Get,
    Post,
    Put,
    Delete,
    Observe,
}

impl CoapMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            CoapMethod::Get => "GET",
            CoapMethod::Post => "POST",
            CoapMethod::Put => "PUT",
            CoapMethod::Delete => "DELETE",
            CoapMethod::Observe => "OBSERVE",
        }
    }
}

impl FromStr for CoapMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(CoapMethod::Get),
            "POST" => Ok(CoapMethod::Post),
            "PUT" => Ok(CoapMethod::Put),
            "DELETE" => Ok(CoapMethod::Delete),
            "OBSERVE" => Ok(CoapMethod::Observe),
            _ => Err(format!("Unknown CoAP method: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoapOption {
    pub number: u16,
    pub value: String,
}

/// A confirmable CoAP request or its piggybacked acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CoapMessage {
    Request {
        method: CoapMethod,
        path: String,
        #[serde(rename = "messageId")]
        message_id: u16,
        token: u32,
        payload: Option<Value>,
        options: Vec<CoapOption>,
    },
    Response {
        code: String,
        #[serde(rename = "messageId")]
        message_id: u16,
        token: u32,
        payload: Option<Value>,
    },
}

impl CoapMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            CoapMessage::Request { .. } => "CON",
            CoapMessage::Response { .. } => "ACK",
        }
    }
}

fn serialize_hex16<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:#06x}", value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZigBeeFrame {
    /// Broadcast by a device joining the network.
    DeviceAnnounce {
        #[serde(rename = "shortAddress", serialize_with = "serialize_hex16")]
        short_address: u16,
        #[serde(rename = "macAddress")]
        mac_address: Mac,
        capabilities: Vec<String>,
    },
    /// Unicast report from a device to the coordinator.
    Message {
        #[serde(skip)]
        message_type: String,
        #[serde(rename = "clusterId", serialize_with = "serialize_hex16")]
        cluster_id: u16,
        #[serde(rename = "profileId", serialize_with = "serialize_hex16")]
        profile_id: u16,
        payload: Value,
    },
}

impl ZigBeeFrame {
    pub fn message_type(&self) -> &str {
        match self {
            ZigBeeFrame::DeviceAnnounce { .. } => "Device Announce",
            ZigBeeFrame::Message { message_type, .. } => message_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZWaveFrame {
    Command {
        #[serde(rename = "commandClass")]
        command_class: String,
        command: String,
        payload: Option<Value>,
        #[serde(rename = "homeId", serialize_with = "serialize_home_id")]
        home_id: u32,
        security: &'static str,
    },
    Ack {
        status: &'static str,
        /// Received signal strength in dBm.
        rssi: f64,
    },
}

fn serialize_home_id<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:X}", value))
}

impl ZWaveFrame {
    pub fn message_type(&self) -> &'static str {
        match self {
            ZWaveFrame::Command { .. } => "Command",
            ZWaveFrame::Ack { .. } => "ACK",
        }
    }
}

/// A command or event exchanged between a room controller and one of its
/// devices, recorded alongside the protocol traffic that carried it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCommand {
    #[serde(skip)]
    pub protocol: IotProtocol,
    #[serde(skip)]
    pub message_type: String,
    pub data: Value,
}

/// An entry of the controller message log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerMessage {
    pub from: String,
    pub to: String,
    /// The kind of message (e.g. `status`, `command`). Used by view filters.
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    pub data: Value,
}

/// An entry of the device message log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMessage {
    pub device_id: String,
    /// The kind of device (e.g. `light`, `sensor`). Used by view filters.
    pub device_type: String,
    pub event: String,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mesh_identifiers_render_as_hex() {
        let frame = ZigBeeFrame::Message {
            message_type: "light".into(),
            cluster_id: 0x0006,
            profile_id: 0x0104,
            payload: json!({"value": 1}),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["clusterId"], "0x0006");
        assert_eq!(json["profileId"], "0x0104");
        assert_eq!(frame.message_type(), "light");

        let command = ZWaveFrame::Command {
            command_class: "BASIC".into(),
            command: "SET".into(),
            payload: None,
            home_id: 0x3e8,
            security: "S2",
        };
        assert_eq!(serde_json::to_value(&command).unwrap()["homeId"], "0x3E8");
    }

    #[test]
    fn coap_methods_parse() {
        assert_eq!("observe".parse(), Ok(CoapMethod::Observe));
        assert!("PATCH".parse::<CoapMethod>().is_err());
    }
}
