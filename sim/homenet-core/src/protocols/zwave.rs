//! Z-Wave commands from the controller to a room's device node.

use crate::{
    address::Address,
    event::{Payload, ZWaveFrame},
    simulation::Context,
};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const HOME_ID: u32 = 0x3e8;
/// The node id of the primary controller.
pub const CONTROLLER_NODE: u8 = 1;
pub const ACK_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZWaveStats {
    pub devices: u64,
    pub messages: u64,
    pub hops: u64,
    pub errors: u64,
}

/// The device's acknowledgment of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZWaveStep {
    pub node: u8,
}

pub fn simulate(
    ctx: &mut Context<'_>,
    room_id: &str,
    command_class: &str,
    command: &str,
    data: Option<Value>,
) {
    let node = ctx.home.zwave_node(room_id);
    ctx.record(
        Address::ZWaveNode(CONTROLLER_NODE),
        Address::ZWaveNode(node),
        Payload::ZWave(ZWaveFrame::Command {
            command_class: command_class.to_string(),
            command: command.to_string(),
            payload: data,
            home_id: HOME_ID,
            security: "S2",
        }),
    );
    ctx.schedule(ACK_DELAY, ZWaveStep { node });
}

pub fn fire(ctx: &mut Context<'_>, stats: &mut ZWaveStats, step: ZWaveStep) {
    let rssi = -65.0 + ctx.rng.gen::<f64>() * 20.0;
    ctx.record(
        Address::ZWaveNode(step.node),
        Address::ZWaveNode(CONTROLLER_NODE),
        Payload::ZWave(ZWaveFrame::Ack {
            status: "success",
            rssi,
        }),
    );
    stats.messages += 1;
}
