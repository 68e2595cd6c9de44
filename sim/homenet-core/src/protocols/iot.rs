//! Shared state of the IoT simulators and the periodic sensor sweeps.

use super::{
    coap::{self, CoapStats, CoapStep},
    mqtt::{self, MqttStats, MqttStep},
    zigbee::ZigBeeStats,
    zwave::{self, ZWaveStats, ZWaveStep},
};
use crate::{
    address::Address,
    event::{CoapMethod, DeviceCommand, IotProtocol, Payload},
    simulation::Context,
};
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// The running statistics of every IoT protocol. Each record is only
/// changed by the simulator of its protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IotStats {
    pub mqtt: MqttStats,
    pub coap: CoapStats,
    pub zigbee: ZigBeeStats,
    pub zwave: ZWaveStats,
}

/// The recurring sweeps over every configured room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicStep {
    /// MQTT telemetry with the room's temperature and a humidity reading.
    Telemetry { every: Duration },
    /// A CoAP observe of the room's status resource.
    Observe { every: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IotStep {
    Mqtt(MqttStep),
    Coap(CoapStep),
    ZWave(ZWaveStep),
    Periodic(PeriodicStep),
}

pub fn fire(ctx: &mut Context<'_>, stats: &mut IotStats, step: IotStep) {
    match step {
        IotStep::Mqtt(step) => mqtt::fire(ctx, &mut stats.mqtt, step),
        IotStep::Coap(step) => coap::fire(ctx, &mut stats.coap, step),
        IotStep::ZWave(step) => zwave::fire(ctx, &mut stats.zwave, step),
        IotStep::Periodic(step) => sweep(ctx, stats, step),
    }
}

/// Runs one sweep and schedules the next. The next sweep inherits the task
/// of this one, so cancelling the task stops the cycle.
fn sweep(ctx: &mut Context<'_>, stats: &mut IotStats, step: PeriodicStep) {
    let home = ctx.home;
    match step {
        PeriodicStep::Telemetry { every } => {
            for room in &home.rooms {
                let reading = json!({
                    "temperature": room.temperature,
                    "humidity": 40.0 + ctx.rng.gen::<f64>() * 20.0,
                    "timestamp": ctx.now.as_millis() as u64,
                });
                mqtt::simulate(ctx, &room.id, "telemetry", reading);
            }
            ctx.schedule(every, step);
        }
        PeriodicStep::Observe { every } => {
            for room in &home.rooms {
                let resource = format!("/rooms/{}/status", room.id);
                coap::simulate(ctx, &mut stats.coap, &room.id, CoapMethod::Observe, &resource, None);
            }
            ctx.schedule(every, step);
        }
    }
}

/// Records a command or event passed between a room controller and one of
/// its devices over `protocol`.
pub fn log_command(
    ctx: &mut Context<'_>,
    protocol: IotProtocol,
    message_type: &str,
    src: impl Into<Address>,
    dst: impl Into<Address>,
    data: Value,
) -> u64 {
    ctx.record(
        src,
        dst,
        Payload::DeviceCommand(DeviceCommand {
            protocol,
            message_type: message_type.to_string(),
            data,
        }),
    )
}
