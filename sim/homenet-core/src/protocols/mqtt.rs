//! MQTT between a room's client and the broker on the server.
//!
//! Every publish opens a fresh clean session: CONNECT, CONNACK 500 ms later
//! immediately followed by the PUBLISH, then PUBACK (QoS 1) or PUBREC
//! (QoS 2) after another 200 ms.

use crate::{
    address::Endpoint,
    event::{MqttPacket, Payload},
    protocols::ephemeral_port,
    simulation::Context,
};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

pub const BROKER_PORT: u16 = 1883;
pub const CONNACK_DELAY: Duration = Duration::from_millis(500);
pub const ACK_DELAY: Duration = Duration::from_millis(200);

/// Resolves a topic kind to its topic. Unknown kinds get a topic of their
/// own under `/home`.
pub fn topic(kind: &str) -> String {
    match kind {
        "sensors" => "/home/sensors".into(),
        "actuators" => "/home/actuators".into(),
        "status" => "/home/status".into(),
        "telemetry" => "/home/telemetry".into(),
        other => format!("/home/{other}"),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MqttStats {
    pub messages: u64,
    pub errors: u64,
    /// Publishes per topic.
    pub topics: BTreeMap<String, u64>,
    pub subscriptions: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MqttStep {
    /// The broker accepts the connection and the client publishes.
    ConnAck {
        client: Endpoint,
        broker: Endpoint,
        topic: String,
        payload: Value,
    },
    /// The broker acknowledges a QoS 1 or 2 publish.
    Ack {
        client: Endpoint,
        broker: Endpoint,
        qos: u8,
    },
}

/// Connects a room's client and publishes `data` to the topic of
/// `topic_kind`.
pub fn simulate(ctx: &mut Context<'_>, room_id: &str, topic_kind: &str, data: Value) {
    let room = ctx.home.resolve(room_id);
    let broker = Endpoint::new(ctx.home.server.address, BROKER_PORT);
    let client = Endpoint::new(room.ip, ephemeral_port(&mut *ctx.rng));

    ctx.record(
        client,
        broker,
        Payload::Mqtt(MqttPacket::Connect {
            client_id: format!("{}_client", room.name),
            clean_session: true,
        }),
    );
    ctx.schedule(
        CONNACK_DELAY,
        MqttStep::ConnAck {
            client,
            broker,
            topic: topic(topic_kind),
            payload: data,
        },
    );
}

pub fn fire(ctx: &mut Context<'_>, stats: &mut MqttStats, step: MqttStep) {
    match step {
        MqttStep::ConnAck {
            client,
            broker,
            topic,
            payload,
        } => {
            ctx.record(
                broker,
                client,
                Payload::Mqtt(MqttPacket::ConnAck {
                    return_code: 0,
                    session_present: false,
                }),
            );

            let qos = ctx.rng.gen_range(0..3);
            let subscribes = payload.get("event").and_then(Value::as_str) == Some("subscribe");
            stats.messages += 1;
            *stats.topics.entry(topic.clone()).or_default() += 1;
            if subscribes {
                stats.subscriptions.insert(topic.clone());
            }
            ctx.record(
                client,
                broker,
                Payload::Mqtt(MqttPacket::Publish {
                    topic,
                    qos,
                    retain: false,
                    payload,
                }),
            );

            if qos > 0 {
                ctx.schedule(ACK_DELAY, MqttStep::Ack { client, broker, qos });
            }
        }
        MqttStep::Ack { client, broker, qos } => {
            let message_id = ctx.rng.gen();
            let packet = if qos == 1 {
                MqttPacket::PubAck { message_id }
            } else {
                MqttPacket::PubRec { message_id }
            };
            ctx.record(broker, client, Payload::Mqtt(packet));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_resolve_with_fallback() {
        assert_eq!(topic("telemetry"), "/home/telemetry");
        assert_eq!(topic("actuators"), "/home/actuators");
        assert_eq!(topic("alarms"), "/home/alarms");
    }
}
