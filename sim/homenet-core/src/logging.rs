//! Wrapper functions for the structured log events emitted by the core.
//!
//! Each function corresponds to one kind of occurrence and logs it under a
//! fixed target, so a subscriber can pick out recorded events (`EVENT`),
//! session state changes (`SESSION`) or task bookkeeping (`TASK`). Nothing
//! here installs a subscriber; that is left to the binary.

use crate::{
    event::Event,
    protocols::tcp::{SessionKey, TcpState, TransitionError},
    scheduler::TaskId,
};
use tracing::{event, Level};

/// An event was recorded by the sink.
pub fn event_recorded(recorded: &Event) {
    event!(
        target: "EVENT",
        Level::DEBUG,
        id = recorded.id(),
        at_ms = recorded.at().as_millis() as u64,
        category = %recorded.category(),
        protocol = recorded.protocol(),
        message_type = recorded.message_type(),
        src = %recorded.src().map_or_else(String::new, ToString::to_string),
        dst = %recorded.dst().map_or_else(String::new, ToString::to_string)
    );
}

pub fn session_transition(key: &SessionKey, from: TcpState, to: TcpState) {
    event!(target: "SESSION", Level::INFO, session = %key, %from, %to);
}

/// A scheduled step found its session in an unexpected state.
pub fn transition_rejected(key: &SessionKey, error: &TransitionError) {
    event!(target: "SESSION", Level::WARN, session = %key, %error, "step rejected");
}

/// A full connection was requested while the previous one is still running.
pub fn connection_busy(key: &SessionKey, state: TcpState) {
    event!(target: "SESSION", Level::INFO, session = %key, %state, "connection already in progress");
}

pub fn close_ignored(key: &SessionKey, state: TcpState) {
    event!(target: "SESSION", Level::INFO, session = %key, %state, "nothing to close");
}

/// The receiving half of a room's command channel was dropped.
pub fn consumer_gone(room_id: &str) {
    event!(target: "SESSION", Level::WARN, room = room_id, "command consumer dropped");
}

pub fn task_started(task: TaskId, name: &str) {
    event!(target: "TASK", Level::INFO, %task, name, "started");
}

pub fn task_cancelled(task: TaskId, removed: usize) {
    event!(target: "TASK", Level::INFO, %task, removed, "cancelled");
}

pub fn reset(dropped: usize) {
    event!(target: "TASK", Level::INFO, dropped, "simulation reset");
}
