//! A simulated TCP connection between a room controller and the server.
//!
//! A full connection is a fixed chain of steps, each scheduled from its
//! predecessor:
//!
//! ```text
//!  t+0     full-stack composer (physical, data link, ARP, IP, session, TLS)
//!  t+500   client  SYN          CLOSED       -> SYN_SENT       seq += 1
//!  t+1000  server  SYN+ACK      SYN_SENT     -> SYN_RECEIVED   ack += base + 1
//!  t+1500  client  ACK          SYN_RECEIVED -> ESTABLISHED
//!  t+2000  client  PSH+ACK      occupancy report               seq += len
//!  t+2500  server  PSH+ACK      commands                       ack += len
//!  t+3500  client  FIN+ACK      ESTABLISHED  -> FIN_WAIT_1     seq += 1
//!  t+4000  server  FIN+ACK      FIN_WAIT_1   -> LAST_ACK       ack += 1
//!  t+4500  client  ACK          LAST_ACK     -> CLOSED
//! ```
//!
//! Every step checks the session is in the state it expects before touching
//! it. A step that finds anything else is rejected, logged and ends its
//! chain, so a session never moves out of order.

use crate::{
    address::Endpoint,
    config::{HomeConfig, Room},
    event::{json_len, HttpRequest, HttpResponse, Payload, TcpFlags, TcpSegment},
    logging,
    protocols::layers,
    simulation::Context,
};
use rand::{Rng, RngCore};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    time::Duration,
};
use thiserror::Error as ThisError;
use tokio::sync::mpsc::UnboundedSender;

/// The source port of a room controller's full connections.
pub const CLIENT_PORT: u16 = 5000;

/// The port room controllers use for quick messages.
pub const QUICK_MESSAGE_PORT: u16 = 1234;

/// The identifier the server puts on its HTTP responses.
pub const SERVER_ID: &str = "home-automation-001";

/// The states a simulated session passes through. `Closed` is both the
/// initial state and the terminal state, so a key can be reused for a new
/// connection once the previous one has closed.
///
/// `Listen` only tags the server's announcement segment; sessions never
/// enter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TcpState {
    #[default]
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    #[serde(rename = "FIN_WAIT_1")]
    FinWait1,
    LastAck,
}

impl TcpState {
    pub const fn as_str(self) -> &'static str {
        match self {
            TcpState::Closed => "CLOSED",
            TcpState::Listen => "LISTEN",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynReceived => "SYN_RECEIVED",
            TcpState::Established => "ESTABLISHED",
            TcpState::FinWait1 => "FIN_WAIT_1",
            TcpState::LastAck => "LAST_ACK",
        }
    }
}

impl Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a session by its ordered pair of endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub src: Endpoint,
    pub dst: Endpoint,
}

impl SessionKey {
    pub const fn new(src: Endpoint, dst: Endpoint) -> Self {
        Self { src, dst }
    }
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.src, self.dst)
    }
}

impl Serialize for SessionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
#[error("{step} expects a session in {expected}, found {found}")]
pub struct TransitionError {
    pub step: &'static str,
    pub expected: TcpState,
    pub found: TcpState,
}

/// The sequence space of one simulated connection.
///
/// Each transition returns the `(seq, ack)` pair carried by the segment it
/// sends. Counters only grow, wrapping at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub state: TcpState,
    pub seq: u32,
    pub ack: u32,
}

impl Session {
    /// A closed session with an initial sequence number in `[0, 1000)`.
    pub fn new(rng: &mut dyn RngCore) -> Self {
        Self {
            state: TcpState::Closed,
            seq: rng.gen_range(0..1000),
            ack: 0,
        }
    }

    fn require(&self, step: &'static str, expected: TcpState) -> Result<(), TransitionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransitionError {
                step,
                expected,
                found: self.state,
            })
        }
    }

    /// Client SYN.
    pub fn send_syn(&mut self) -> Result<(u32, u32), TransitionError> {
        self.require("SYN", TcpState::Closed)?;
        let segment = (self.seq, 0);
        self.state = TcpState::SynSent;
        self.seq = self.seq.wrapping_add(1);
        Ok(segment)
    }

    /// Server SYN+ACK. The server's initial sequence number `base` is added
    /// to the acknowledgment counter so a reused session stays monotonic.
    pub fn answer_syn(&mut self, base: u32) -> Result<(u32, u32), TransitionError> {
        self.require("SYN+ACK", TcpState::SynSent)?;
        self.ack = self.ack.wrapping_add(base);
        let segment = (self.ack, self.seq);
        self.state = TcpState::SynReceived;
        self.ack = self.ack.wrapping_add(1);
        Ok(segment)
    }

    /// Client ACK completing the handshake.
    pub fn acknowledge_syn(&mut self) -> Result<(u32, u32), TransitionError> {
        self.require("ACK", TcpState::SynReceived)?;
        self.state = TcpState::Established;
        Ok((self.seq, self.ack))
    }

    /// Client data of `len` bytes.
    pub fn send_data(&mut self, len: usize) -> Result<(u32, u32), TransitionError> {
        self.require("PSH+ACK", TcpState::Established)?;
        let segment = (self.seq, self.ack);
        self.seq = self.seq.wrapping_add(len as u32);
        Ok(segment)
    }

    /// Server data of `len` bytes.
    pub fn answer_data(&mut self, len: usize) -> Result<(u32, u32), TransitionError> {
        self.require("PSH+ACK", TcpState::Established)?;
        let segment = (self.ack, self.seq);
        self.ack = self.ack.wrapping_add(len as u32);
        Ok(segment)
    }

    /// Client FIN+ACK.
    pub fn send_fin(&mut self) -> Result<(u32, u32), TransitionError> {
        self.require("FIN+ACK", TcpState::Established)?;
        let segment = (self.seq, self.ack);
        self.state = TcpState::FinWait1;
        self.seq = self.seq.wrapping_add(1);
        Ok(segment)
    }

    /// Server FIN+ACK.
    pub fn answer_fin(&mut self) -> Result<(u32, u32), TransitionError> {
        self.require("FIN+ACK", TcpState::FinWait1)?;
        let segment = (self.ack, self.seq);
        self.state = TcpState::LastAck;
        self.ack = self.ack.wrapping_add(1);
        Ok(segment)
    }

    /// Client ACK of the server's FIN.
    pub fn acknowledge_fin(&mut self) -> Result<(u32, u32), TransitionError> {
        self.require("ACK", TcpState::LastAck)?;
        self.state = TcpState::Closed;
        Ok((self.seq, self.ack))
    }

    /// A single data segment outside of any connection lifecycle.
    pub fn send_quick(&mut self, len: usize) -> (u32, u32) {
        let segment = (self.seq, self.ack);
        self.seq = self.seq.wrapping_add(len as u32);
        segment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    SetLight,
    SetTemp,
    SetMode,
}

/// A device command the server sends back to a room controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub value: Value,
}

impl Command {
    pub fn set_light(on: bool) -> Self {
        Self {
            kind: CommandKind::SetLight,
            value: Value::from(if on { "ON" } else { "OFF" }),
        }
    }

    pub fn set_temp(celsius: u32) -> Self {
        Self {
            kind: CommandKind::SetTemp,
            value: Value::from(celsius),
        }
    }

    pub fn set_mode(mode: &str) -> Self {
        Self {
            kind: CommandKind::SetMode,
            value: Value::from(mode),
        }
    }
}

/// Decides which commands the server answers an occupancy report with.
pub trait CommandPolicy: Send {
    fn commands(&self, room: &Room, occupancy: u32) -> Vec<Command>;
}

/// Lights on and comfort temperature while a room is occupied, lights off
/// and setback temperature otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancyPolicy;

impl OccupancyPolicy {
    pub const COMFORT: u32 = 22;
    pub const SETBACK: u32 = 18;
}

impl CommandPolicy for OccupancyPolicy {
    fn commands(&self, _room: &Room, occupancy: u32) -> Vec<Command> {
        let occupied = occupancy > 0;
        vec![
            Command::set_light(occupied),
            Command::set_temp(if occupied {
                Self::COMFORT
            } else {
                Self::SETBACK
            }),
        ]
    }
}

/// Commands handed out of the simulation to a room's command consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDelivery {
    pub room_id: String,
    pub commands: Vec<Command>,
    /// The simulated time the server answered.
    pub at: Duration,
}

/// The room a chain of steps is running for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub key: SessionKey,
    pub room_id: String,
    pub occupancy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Syn,
    SynAck,
    Ack,
    Data,
    Response,
    Fin,
    ServerFin,
    FinalAck,
}

impl Phase {
    /// The phase scheduled after this one and how long after.
    const fn next(self) -> Option<(Phase, Duration)> {
        let half = Duration::from_millis(500);
        match self {
            Phase::Syn => Some((Phase::SynAck, half)),
            Phase::SynAck => Some((Phase::Ack, half)),
            Phase::Ack => Some((Phase::Data, half)),
            Phase::Data => Some((Phase::Response, half)),
            Phase::Response => Some((Phase::Fin, Duration::from_millis(1000))),
            Phase::Fin => Some((Phase::ServerFin, half)),
            Phase::ServerFin => Some((Phase::FinalAck, half)),
            Phase::FinalAck => None,
        }
    }
}

/// A scheduled step of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpStep {
    pub connection: Connection,
    pub phase: Phase,
}

/// Delay between the full-stack composer and the client's SYN.
pub const HANDSHAKE_DELAY: Duration = Duration::from_millis(500);

/// Owns every session and drives their state machines.
pub struct TcpSimulator {
    sessions: FxHashMap<SessionKey, Session>,
    /// Keys whose connection was triggered but has not sent its SYN yet.
    connecting: FxHashSet<SessionKey>,
    policy: Box<dyn CommandPolicy>,
    consumers: FxHashMap<String, UnboundedSender<CommandDelivery>>,
}

impl Default for TcpSimulator {
    fn default() -> Self {
        Self::new(Box::new(OccupancyPolicy))
    }
}

impl fmt::Debug for TcpSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpSimulator")
            .field("sessions", &self.sessions)
            .field("consumers", &self.consumers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TcpSimulator {
    pub fn new(policy: Box<dyn CommandPolicy>) -> Self {
        Self {
            sessions: FxHashMap::default(),
            connecting: FxHashSet::default(),
            policy,
            consumers: FxHashMap::default(),
        }
    }

    pub fn set_policy(&mut self, policy: Box<dyn CommandPolicy>) {
        self.policy = policy;
    }

    /// Registers the consumer of a room's server commands, replacing any
    /// previous one.
    pub fn register_consumer(&mut self, room_id: &str, consumer: UnboundedSender<CommandDelivery>) {
        self.consumers.insert(room_id.to_string(), consumer);
    }

    pub fn session(&self, key: &SessionKey) -> Option<Session> {
        self.sessions.get(key).copied()
    }

    /// Forgets every session. Registered consumers and the policy are kept.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.connecting.clear();
    }

    /// The key of a room's full connections to the server.
    pub fn connection_key(home: &HomeConfig, room_id: &str) -> SessionKey {
        let room = home.resolve(room_id);
        SessionKey::new(Endpoint::new(room.ip, CLIENT_PORT), home.server)
    }

    /// Starts a full connection for `room_id`: the full-stack exchange now,
    /// then handshake, data transfer and teardown.
    ///
    /// Does nothing if the room's session is still in the middle of a
    /// previous connection, including one triggered but not yet past its
    /// SYN.
    pub fn simulate_full_connection(&mut self, ctx: &mut Context<'_>, room_id: &str, occupancy: u32) {
        let key = Self::connection_key(ctx.home, room_id);
        let session = *self
            .sessions
            .entry(key)
            .or_insert_with(|| Session::new(&mut *ctx.rng));
        if session.state != TcpState::Closed || self.connecting.contains(&key) {
            logging::connection_busy(&key, session.state);
            return;
        }
        self.connecting.insert(key);

        layers::simulate_full_stack_communication(
            ctx,
            key.src.address,
            key.dst.address,
            json!({
                "type": "tcp_connection",
                "source": key.src,
                "destination": key.dst,
            }),
        );

        let connection = Connection {
            key,
            room_id: room_id.to_string(),
            occupancy,
        };
        ctx.schedule(
            HANDSHAKE_DELAY,
            TcpStep {
                connection,
                phase: Phase::Syn,
            },
        );
    }

    /// Tears down a room's established connection right away. A session in
    /// any other state is left untouched, although it is created if it did
    /// not exist yet.
    pub fn close_connection(&mut self, ctx: &mut Context<'_>, room_id: &str) {
        let key = Self::connection_key(ctx.home, room_id);
        let session = *self
            .sessions
            .entry(key)
            .or_insert_with(|| Session::new(&mut *ctx.rng));
        if session.state != TcpState::Established {
            logging::close_ignored(&key, session.state);
            return;
        }
        self.fire(
            ctx,
            TcpStep {
                connection: Connection {
                    key,
                    room_id: room_id.to_string(),
                    occupancy: 0,
                },
                phase: Phase::Fin,
            },
        );
    }

    /// Sends one data segment between two parties, either `"server"` or a
    /// room id. Only the sender's sequence number moves.
    pub fn send_quick_message(&mut self, ctx: &mut Context<'_>, from: &str, to: &str, command: Value) {
        let key = SessionKey::new(quick_endpoint(ctx, from), quick_endpoint(ctx, to));
        let len = json_len(&command);
        let session = self
            .sessions
            .entry(key)
            .or_insert_with(|| Session::new(&mut *ctx.rng));
        let (seq, ack) = session.send_quick(len);
        let segment = TcpSegment::new(key.src, key.dst, seq, ack, TcpFlags::PSH_ACK).with_data(command);
        ctx.record(key.src, key.dst, Payload::Tcp(segment));
        let now = ctx.now;
        ctx.sink.record_traffic(now, len);
    }

    /// Runs one step and schedules its successor. A rejected step ends the
    /// chain.
    pub fn fire(&mut self, ctx: &mut Context<'_>, step: TcpStep) {
        let key = step.connection.key;
        if step.phase == Phase::Syn {
            self.connecting.remove(&key);
        }
        match self.run(ctx, &step) {
            Ok(()) => {
                if let Some((phase, delay)) = step.phase.next() {
                    ctx.schedule(
                        delay,
                        TcpStep {
                            connection: step.connection,
                            phase,
                        },
                    );
                }
            }
            Err(error) => logging::transition_rejected(&key, &error),
        }
    }

    fn run(&mut self, ctx: &mut Context<'_>, step: &TcpStep) -> Result<(), TransitionError> {
        let Connection {
            key,
            room_id,
            occupancy,
        } = &step.connection;
        let (client, server) = (key.src, key.dst);
        let session = self
            .sessions
            .entry(*key)
            .or_insert_with(|| Session::new(&mut *ctx.rng));
        let before = session.state;

        match step.phase {
            Phase::Syn => {
                let (seq, ack) = session.send_syn()?;
                let segment = TcpSegment::new(client, server, seq, ack, TcpFlags::SYN);
                send(ctx, segment, before, session.state);
            }
            Phase::SynAck => {
                let base = ctx.rng.gen_range(0..1000);
                let (seq, ack) = session.answer_syn(base)?;
                let segment = TcpSegment::new(server, client, seq, ack, TcpFlags::SYN_ACK);
                send(ctx, segment, before, session.state);
            }
            Phase::Ack => {
                let (seq, ack) = session.acknowledge_syn()?;
                let segment = TcpSegment::new(client, server, seq, ack, TcpFlags::ACK);
                send(ctx, segment, before, session.state);
                ctx.sink.open_connection(*key);
            }
            Phase::Data => {
                let room = ctx.home.resolve(room_id);
                let report = json!({
                    "command": "PERSON_DETECTED",
                    "room": room.name,
                    "count": occupancy,
                    "timestamp": ctx.now.as_millis() as u64,
                });
                let (seq, ack) = session.send_data(json_len(&report))?;
                let segment = TcpSegment::new(client, server, seq, ack, TcpFlags::PSH_ACK)
                    .with_data(report.clone());
                send(ctx, segment, before, session.state);

                let token = mock_token(&mut *ctx.rng);
                let headers = BTreeMap::from([
                    ("Content-Type".to_string(), "application/json".to_string()),
                    ("X-Device-ID".to_string(), room.ip.to_string()),
                    ("Authorization".to_string(), format!("Bearer {token}")),
                ]);
                ctx.record(
                    client,
                    server,
                    Payload::HttpRequest(HttpRequest {
                        method: "POST".into(),
                        uri: format!("/api/sensors/{room_id}/motion"),
                        headers,
                        body: report,
                    }),
                );
            }
            Phase::Response => {
                let room = ctx.home.resolve(room_id);
                let commands = self.policy.commands(&room, *occupancy);
                let body = json!({ "commands": commands });
                let (seq, ack) = session.answer_data(json_len(&body))?;
                let segment = TcpSegment::new(server, client, seq, ack, TcpFlags::PSH_ACK)
                    .with_data(body.clone());
                send(ctx, segment, before, session.state);

                let headers = BTreeMap::from([
                    ("Content-Type".to_string(), "application/json".to_string()),
                    ("X-Server-ID".to_string(), SERVER_ID.to_string()),
                ]);
                ctx.record(
                    server,
                    client,
                    Payload::HttpResponse(HttpResponse {
                        status: "200 OK".into(),
                        headers,
                        body,
                    }),
                );
                self.deliver(CommandDelivery {
                    room_id: room_id.clone(),
                    commands,
                    at: ctx.now,
                });
            }
            Phase::Fin => {
                let (seq, ack) = session.send_fin()?;
                let segment = TcpSegment::new(client, server, seq, ack, TcpFlags::FIN_ACK);
                send(ctx, segment, before, session.state);
            }
            Phase::ServerFin => {
                let (seq, ack) = session.answer_fin()?;
                let segment = TcpSegment::new(server, client, seq, ack, TcpFlags::FIN_ACK);
                send(ctx, segment, before, session.state);
            }
            Phase::FinalAck => {
                let (seq, ack) = session.acknowledge_fin()?;
                let segment = TcpSegment::new(client, server, seq, ack, TcpFlags::ACK);
                send(ctx, segment, before, session.state);
                ctx.sink.close_connection(key);
            }
        }
        Ok(())
    }

    fn deliver(&mut self, delivery: CommandDelivery) {
        let Some(consumer) = self.consumers.get(&delivery.room_id) else {
            return;
        };
        let room_id = delivery.room_id.clone();
        if consumer.send(delivery).is_err() {
            logging::consumer_gone(&room_id);
            self.consumers.remove(&room_id);
        }
    }
}

/// Records a segment, tagging it with the sender's new state if it changed.
fn send(ctx: &mut Context<'_>, segment: TcpSegment, before: TcpState, after: TcpState) {
    let key = SessionKey::new(segment.src, segment.dst);
    let segment = if before != after {
        logging::session_transition(&key, before, after);
        segment.with_transition(after)
    } else {
        segment
    };
    ctx.record(segment.src, segment.dst, Payload::Tcp(segment));
}

fn quick_endpoint(ctx: &Context<'_>, party: &str) -> Endpoint {
    if party == "server" {
        ctx.home.server
    } else {
        Endpoint::new(ctx.home.resolve(party).ip, QUICK_MESSAGE_PORT)
    }
}

/// An opaque bearer token. Nothing ever checks it.
fn mock_token(rng: &mut dyn RngCore) -> String {
    format!("{:016x}.{:016x}.mock_signature", rng.next_u64(), rng.next_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv4Address;

    fn session(seq: u32) -> Session {
        Session {
            state: TcpState::Closed,
            seq,
            ack: 0,
        }
    }

    #[test]
    fn lifecycle_arithmetic() {
        let mut s = session(100);
        assert_eq!(s.send_syn(), Ok((100, 0)));
        assert_eq!(s.answer_syn(300), Ok((300, 101)));
        assert_eq!(s.ack, 301);
        assert_eq!(s.acknowledge_syn(), Ok((101, 301)));
        assert_eq!(s.send_data(57), Ok((101, 301)));
        assert_eq!(s.seq, 158);
        assert_eq!(s.answer_data(40), Ok((301, 158)));
        assert_eq!(s.ack, 341);
        assert_eq!(s.send_fin(), Ok((158, 341)));
        assert_eq!(s.answer_fin(), Ok((341, 159)));
        assert_eq!(s.acknowledge_fin(), Ok((159, 342)));
        assert_eq!(s.state, TcpState::Closed);
    }

    #[test]
    fn out_of_order_steps_are_rejected() {
        let mut s = session(5);
        let before = s;
        assert_eq!(
            s.send_fin(),
            Err(TransitionError {
                step: "FIN+ACK",
                expected: TcpState::Established,
                found: TcpState::Closed,
            })
        );
        assert_eq!(s, before);
        assert!(s.answer_syn(1).is_err());
        s.send_syn().unwrap();
        assert!(s.send_syn().is_err());
    }

    #[test]
    fn reused_session_stays_monotonic() {
        let mut s = session(0);
        s.send_syn().unwrap();
        s.answer_syn(900).unwrap();
        s.acknowledge_syn().unwrap();
        s.send_fin().unwrap();
        s.answer_fin().unwrap();
        s.acknowledge_fin().unwrap();
        let (seq, ack) = (s.seq, s.ack);

        s.send_syn().unwrap();
        s.answer_syn(0).unwrap();
        assert!(s.seq > seq);
        assert!(s.ack > ack);
    }

    #[test]
    fn occupancy_policy() {
        let room = Room::placeholder("den");
        let occupied = OccupancyPolicy.commands(&room, 2);
        assert_eq!(occupied, [Command::set_light(true), Command::set_temp(22)]);
        let empty = OccupancyPolicy.commands(&room, 0);
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!([{"type": "SET_LIGHT", "value": "OFF"}, {"type": "SET_TEMP", "value": 18}])
        );
    }

    #[test]
    fn key_and_state_rendering() {
        let key = SessionKey::new(
            Endpoint::new(Ipv4Address::new([192, 168, 1, 101]), CLIENT_PORT),
            Endpoint::new(Ipv4Address::new([192, 168, 1, 1]), 8080),
        );
        assert_eq!(key.to_string(), "192.168.1.101:5000-192.168.1.1:8080");
        assert_eq!(
            serde_json::to_value(TcpState::FinWait1).unwrap(),
            json!("FIN_WAIT_1")
        );
        assert_eq!(TcpState::SynReceived.to_string(), "SYN_RECEIVED");
    }
}
