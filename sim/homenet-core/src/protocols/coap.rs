//! CoAP requests from a room's device to the server, answered with a
//! piggybacked acknowledgment.

use crate::{
    address::Endpoint,
    event::{CoapMessage, CoapMethod, CoapOption, Payload},
    protocols::ephemeral_port,
    simulation::Context,
};
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const PORT: u16 = 5683;
pub const RESPONSE_DELAY: Duration = Duration::from_millis(300);

/// Exclusive upper bound of request tokens (24 bits).
const TOKEN_LIMIT: u32 = 0xff_ffff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoapStats {
    pub requests: u64,
    pub responses: u64,
    pub observes: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoapStep {
    pub client: Endpoint,
    pub server: Endpoint,
    pub method: CoapMethod,
    pub message_id: u16,
    pub token: u32,
}

/// The response code of a successful request: `2.05 Content` for GET,
/// `2.01 Created` for everything else.
pub fn response_code(method: CoapMethod) -> &'static str {
    match method {
        CoapMethod::Get => "2.05",
        _ => "2.01",
    }
}

/// Sends a confirmable request for `resource`.
pub fn simulate(
    ctx: &mut Context<'_>,
    stats: &mut CoapStats,
    room_id: &str,
    method: CoapMethod,
    resource: &str,
    payload: Option<Value>,
) {
    let room = ctx.home.resolve(room_id);
    let server = Endpoint::new(ctx.home.server.address, PORT);
    let client = Endpoint::new(room.ip, ephemeral_port(&mut *ctx.rng));
    let message_id = ctx.rng.gen();
    let token = ctx.rng.gen_range(0..TOKEN_LIMIT);

    if method == CoapMethod::Observe {
        stats.observes += 1;
    }
    ctx.record(
        client,
        server,
        Payload::Coap(CoapMessage::Request {
            method,
            path: resource.to_string(),
            message_id,
            token,
            payload,
            options: vec![
                CoapOption {
                    number: 11,
                    value: "device".into(),
                },
                CoapOption {
                    number: 12,
                    value: "60".into(),
                },
            ],
        }),
    );
    ctx.schedule(
        RESPONSE_DELAY,
        CoapStep {
            client,
            server,
            method,
            message_id,
            token,
        },
    );
}

pub fn fire(ctx: &mut Context<'_>, stats: &mut CoapStats, step: CoapStep) {
    let payload = match step.method {
        CoapMethod::Get => Some(json!({ "value": ctx.rng.gen::<f64>() * 100.0 })),
        _ => None,
    };
    ctx.record(
        step.server,
        step.client,
        Payload::Coap(CoapMessage::Response {
            code: response_code(step.method).to_string(),
            message_id: step.message_id,
            token: step.token,
            payload,
        }),
    );
    stats.requests += 1;
    stats.responses += 1;
}
