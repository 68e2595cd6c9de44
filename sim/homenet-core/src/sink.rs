//! The event sink: bounded per-category logs plus running counters.
//!
//! Each [`Category`] has its own ring buffer, newest event first. When a
//! buffer grows past the category's capacity, the oldest event of that
//! category is evicted. Filters attached to the display views decide what is
//! shown but never what is kept.

use crate::{
    event::{Category, Event, Payload, TransportSegment},
    logging,
    protocols::tcp::SessionKey,
    Address,
};
use serde::Serialize;
use std::{
    collections::{BTreeSet, VecDeque},
    time::Duration,
};

/// How far back the traffic history reaches.
pub const TRAFFIC_WINDOW: Duration = Duration::from_secs(60);

/// Global counters exposed to displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkStats {
    pub total_events: u64,
    pub active_connection_count: usize,
    /// Sum of the serialized sizes of every recorded event.
    pub byte_volume: u64,
    /// Percentage of lost packets. The simulated network is lossless.
    pub packet_loss: f64,
}

/// A quick-message transfer volume at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrafficSample {
    #[serde(serialize_with = "serialize_millis")]
    pub at: Duration,
    pub bytes: usize,
}

fn serialize_millis<S: serde::Serializer>(at: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(at.as_millis() as u64)
}

/// A logical display over the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Every packet-level category (everything except controller and device
    /// messages).
    Packets,
    Controller,
    Device,
}

impl View {
    const fn index(self) -> usize {
        self as usize
    }
}

/// What a view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
    /// Controller message kind or device type.
    Tag(String),
}

#[derive(Debug)]
pub struct EventSink {
    logs: [VecDeque<Event>; Category::ALL.len()],
    recorded: [u64; Category::ALL.len()],
    next_id: u64,
    total_events: u64,
    byte_volume: u64,
    active_connections: BTreeSet<SessionKey>,
    traffic_history: VecDeque<TrafficSample>,
    filters: [Filter; 3],
}

impl Default for EventSink {
    fn default() -> Self {
        Self {
            logs: Default::default(),
            recorded: [0; Category::ALL.len()],
            next_id: 0,
            total_events: 0,
            byte_volume: 0,
            active_connections: BTreeSet::new(),
            traffic_history: VecDeque::new(),
            filters: Default::default(),
        }
    }
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event built from `payload` and returns its id.
    ///
    /// TCP segments are additionally recorded in the transport category as a
    /// derived view.
    pub fn record(
        &mut self,
        at: Duration,
        src: Option<Address>,
        dst: Option<Address>,
        payload: Payload,
    ) -> u64 {
        let mirror = match &payload {
            Payload::Tcp(segment) => Some(TransportSegment {
                source_ip: segment.src.address,
                destination_ip: segment.dst.address,
                source_port: segment.src.port,
                destination_port: segment.dst.port,
                seq: segment.seq,
                ack: segment.ack,
                flags: segment.flags.names(),
                payload: segment.data.clone(),
            }),
            _ => None,
        };

        let event = Event::new(self.next_id, at, src, dst, payload);
        self.next_id += 1;
        let id = event.id();
        self.insert(event);

        if let Some(segment) = mirror {
            let event = Event::new(
                self.next_id,
                at,
                None,
                None,
                Payload::TcpTransport(segment),
            );
            self.next_id += 1;
            self.insert(event);
        }
        id
    }

    fn insert(&mut self, event: Event) {
        logging::event_recorded(&event);
        let category = event.category();
        self.total_events += 1;
        self.byte_volume += event.serialized_len() as u64;
        self.recorded[category.index()] += 1;

        let log = &mut self.logs[category.index()];
        log.push_front(event);
        if log.len() > category.capacity() {
            log.pop_back();
        }
    }

    /// The retained events of a category, newest first.
    pub fn recent_events(&self, category: Category) -> impl Iterator<Item = &Event> + '_ {
        self.logs[category.index()].iter()
    }

    /// The newest retained event of a category.
    pub fn latest(&self, category: Category) -> Option<&Event> {
        self.logs[category.index()].front()
    }

    /// The number of retained events of a category.
    pub fn len(&self, category: Category) -> usize {
        self.logs[category.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.iter().all(VecDeque::is_empty)
    }

    /// The number of events ever recorded in a category, evicted ones
    /// included.
    pub fn recorded(&self, category: Category) -> u64 {
        self.recorded[category.index()]
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            total_events: self.total_events,
            active_connection_count: self.active_connections.len(),
            byte_volume: self.byte_volume,
            packet_loss: 0.0,
        }
    }

    /// Marks a connection as established.
    pub fn open_connection(&mut self, key: SessionKey) {
        self.active_connections.insert(key);
    }

    /// Marks a connection as closed.
    pub fn close_connection(&mut self, key: &SessionKey) {
        self.active_connections.remove(key);
    }

    pub fn is_active(&self, key: &SessionKey) -> bool {
        self.active_connections.contains(key)
    }

    pub fn active_connections(&self) -> impl Iterator<Item = &SessionKey> + '_ {
        self.active_connections.iter()
    }

    /// Adds a transfer volume sample, forgetting samples older than
    /// [`TRAFFIC_WINDOW`].
    pub fn record_traffic(&mut self, at: Duration, bytes: usize) {
        self.traffic_history.push_back(TrafficSample { at, bytes });
        while let Some(oldest) = self.traffic_history.front() {
            if at.saturating_sub(oldest.at) < TRAFFIC_WINDOW {
                break;
            }
            self.traffic_history.pop_front();
        }
    }

    /// Traffic samples within [`TRAFFIC_WINDOW`] of `now`, oldest first.
    pub fn traffic_history(&self, now: Duration) -> impl Iterator<Item = &TrafficSample> + '_ {
        self.traffic_history
            .iter()
            .filter(move |sample| now.saturating_sub(sample.at) < TRAFFIC_WINDOW)
    }

    pub fn set_filter(&mut self, view: View, filter: Filter) {
        self.filters[view.index()] = filter;
    }

    pub fn filter(&self, view: View) -> &Filter {
        &self.filters[view.index()]
    }

    /// The events a view currently shows, newest first.
    pub fn visible(&self, view: View) -> Vec<&Event> {
        let filter = self.filter(view);
        let mut events: Vec<&Event> = match view {
            View::Packets => Category::ALL
                .into_iter()
                .filter(|c| !matches!(c, Category::Controller | Category::Device))
                .flat_map(|c| self.recent_events(c))
                .collect(),
            View::Controller => self.recent_events(Category::Controller).collect(),
            View::Device => self.recent_events(Category::Device).collect(),
        };
        events.retain(|event| shows(filter, event));
        events.sort_by(|a, b| b.id().cmp(&a.id()));
        events
    }

    /// Restores the empty state. View filters are display state and are kept.
    pub fn clear(&mut self) {
        for log in self.logs.iter_mut() {
            log.clear();
        }
        self.recorded = [0; Category::ALL.len()];
        self.next_id = 0;
        self.total_events = 0;
        self.byte_volume = 0;
        self.active_connections.clear();
        self.traffic_history.clear();
    }
}

fn shows(filter: &Filter, event: &Event) -> bool {
    match filter {
        Filter::All => true,
        Filter::Category(category) => event.category() == *category,
        Filter::Tag(tag) => match event.payload() {
            Payload::Controller(message) => &message.kind == tag,
            Payload::Device(message) => &message.device_type == tag,
            _ => event.category().as_str() == tag,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PhysicalSignal, SignalStatus};
    use crate::{
        address::{Endpoint, Ipv4Address},
        event::{ControllerMessage, TcpFlags, TcpSegment},
    };
    use serde_json::json;

    fn physical() -> Payload {
        Payload::Physical(PhysicalSignal::new(SignalStatus::Transmit))
    }

    fn controller(kind: &str) -> Payload {
        Payload::Controller(ControllerMessage {
            from: "Server".into(),
            to: "All Controllers".into(),
            kind: kind.into(),
            action: "PING".into(),
            data: json!(null),
        })
    }

    #[test]
    fn evicts_oldest_of_same_category() {
        let mut sink = EventSink::new();
        sink.record(Duration::ZERO, None, None, controller("status"));
        for i in 0..45 {
            sink.record(Duration::from_millis(i), None, None, physical());
        }
        assert_eq!(sink.len(Category::Physical), 30);
        assert_eq!(sink.recorded(Category::Physical), 45);
        // The controller event is older than every physical event yet kept.
        assert_eq!(sink.len(Category::Controller), 1);

        let ids: Vec<u64> = sink.recent_events(Category::Physical).map(Event::id).collect();
        assert_eq!(ids.first(), Some(&45));
        assert_eq!(ids.last(), Some(&16));
        assert_eq!(sink.stats().total_events, 46);
    }

    #[test]
    fn tcp_segments_mirror_into_transport() {
        let mut sink = EventSink::new();
        let client = Endpoint::new(Ipv4Address::new([192, 168, 1, 101]), 5000);
        let server = Endpoint::new(Ipv4Address::new([192, 168, 1, 1]), 8080);
        let segment = TcpSegment::new(client, server, 10, 0, TcpFlags::SYN);
        sink.record(
            Duration::ZERO,
            Some(client.into()),
            Some(server.into()),
            Payload::Tcp(segment),
        );

        assert_eq!(sink.len(Category::Tcp), 1);
        let mirrored = sink.latest(Category::Transport).unwrap();
        assert_eq!(mirrored.protocol(), "TCP");
        match mirrored.payload() {
            Payload::TcpTransport(segment) => {
                assert_eq!(segment.source_port, 5000);
                assert_eq!(segment.flags, ["SYN"]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
        let stats = sink.stats();
        assert_eq!(stats.total_events, 2);
        assert!(stats.byte_volume > 0);
    }

    #[test]
    fn filters_do_not_touch_retention() {
        let mut sink = EventSink::new();
        sink.record(Duration::ZERO, None, None, controller("status"));
        sink.record(Duration::ZERO, None, None, controller("command"));
        sink.record(Duration::ZERO, None, None, physical());

        sink.set_filter(View::Controller, Filter::Tag("command".into()));
        assert_eq!(sink.visible(View::Controller).len(), 1);
        assert_eq!(sink.len(Category::Controller), 2);

        sink.set_filter(View::Packets, Filter::Category(Category::Network));
        assert!(sink.visible(View::Packets).is_empty());
        sink.set_filter(View::Packets, Filter::All);
        assert_eq!(sink.visible(View::Packets).len(), 1);
    }

    #[test]
    fn traffic_history_window() {
        let mut sink = EventSink::new();
        sink.record_traffic(Duration::from_secs(1), 40);
        sink.record_traffic(Duration::from_secs(30), 50);
        sink.record_traffic(Duration::from_secs(65), 60);
        let bytes: Vec<usize> = sink
            .traffic_history(Duration::from_secs(65))
            .map(|sample| sample.bytes)
            .collect();
        assert_eq!(bytes, [50, 60]);
    }
}
