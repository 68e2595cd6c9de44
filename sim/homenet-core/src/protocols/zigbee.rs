//! ZigBee reports from a room's device to the coordinator.

use crate::{
    address::Address,
    config::zigbee_cluster,
    event::{Payload, ZigBeeFrame},
    simulation::Context,
};
use serde::Serialize;
use serde_json::Value;

/// The network address of the coordinator.
pub const COORDINATOR: u16 = 0x0000;
/// The Home Automation application profile.
pub const HOME_AUTOMATION_PROFILE: u16 = 0x0104;
pub const PAN_ID: u16 = 0x1a62;
pub const CHANNEL: u8 = 11;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZigBeeStats {
    pub devices: u64,
    pub messages: u64,
    pub routes: u64,
    pub errors: u64,
}

/// Sends a `message_type` report to the coordinator. A `join` is preceded
/// by a broadcast Device Announce.
///
/// Rooms missing from the address table report from the default short
/// address.
pub fn simulate(ctx: &mut Context<'_>, stats: &mut ZigBeeStats, room_id: &str, message_type: &str, data: Value) {
    let room = ctx.home.resolve(room_id);
    let device = room.zigbee_address;

    if message_type == "join" {
        ctx.record(
            Address::ZigBee(device),
            Address::named("broadcast"),
            Payload::ZigBee(ZigBeeFrame::DeviceAnnounce {
                short_address: device,
                mac_address: room.mac,
                capabilities: vec!["Router".into(), "Mains-powered".into()],
            }),
        );
        stats.devices += 1;
    }

    ctx.record(
        Address::ZigBee(device),
        Address::ZigBee(COORDINATOR),
        Payload::ZigBee(ZigBeeFrame::Message {
            message_type: message_type.to_string(),
            cluster_id: zigbee_cluster(message_type),
            profile_id: HOME_AUTOMATION_PROFILE,
            payload: data,
        }),
    );
    stats.messages += 1;
}
