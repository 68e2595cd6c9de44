//! Full TCP connections driven through the simulation.

use homenet_core::{
    event::{json_len, Payload, TcpFlags, TcpSegment},
    Category, Command, HomeConfig, SimConfig, Simulation, TcpState,
};
use rand::rngs::mock::StepRng;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_test::traced_test;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A simulation whose random source always yields zero.
fn zeroed() -> Simulation {
    Simulation::with_rng(
        HomeConfig::default(),
        SimConfig::default(),
        Box::new(StepRng::new(0, 0)),
    )
}

/// TCP segments recorded so far, oldest first.
fn segments(sim: &Simulation) -> Vec<TcpSegment> {
    let mut segments: Vec<TcpSegment> = sim
        .sink()
        .recent_events(Category::Tcp)
        .filter_map(|event| match event.payload() {
            Payload::Tcp(segment) => Some(segment.clone()),
            _ => None,
        })
        .collect();
    segments.reverse();
    segments
}

#[test]
fn states_follow_the_lifecycle() {
    for occupancy in [0, 1, 4] {
        let mut sim = Simulation::new(HomeConfig::default(), SimConfig::seeded(occupancy as u64));
        sim.simulate_full_connection("living-room", occupancy);
        sim.run_until_idle(Duration::from_secs(10));

        let states: Vec<TcpState> = segments(&sim)
            .iter()
            .filter_map(|segment| segment.transition)
            .collect();
        assert_eq!(
            states,
            [
                TcpState::SynSent,
                TcpState::SynReceived,
                TcpState::Established,
                TcpState::FinWait1,
                TcpState::LastAck,
                TcpState::Closed,
            ]
        );
        let flags: Vec<TcpFlags> = segments(&sim).iter().map(|s| s.flags).collect();
        assert_eq!(
            flags,
            [
                TcpFlags::SYN,
                TcpFlags::SYN_ACK,
                TcpFlags::ACK,
                TcpFlags::PSH_ACK,
                TcpFlags::PSH_ACK,
                TcpFlags::FIN_ACK,
                TcpFlags::FIN_ACK,
                TcpFlags::ACK,
            ]
        );
    }
}

#[test]
fn active_between_established_and_final_ack() {
    let mut sim = zeroed();
    let key = sim.connection_key("kitchen");
    sim.simulate_full_connection("kitchen", 1);

    sim.advance(ms(1499));
    assert!(!sim.sink().is_active(&key));
    assert_eq!(sim.session(&key).unwrap().state, TcpState::SynReceived);

    sim.advance(ms(1));
    assert!(sim.sink().is_active(&key));
    assert_eq!(sim.sink().stats().active_connection_count, 1);

    sim.advance(ms(2999));
    assert!(sim.sink().is_active(&key));
    assert_eq!(sim.session(&key).unwrap().state, TcpState::LastAck);

    sim.advance(ms(1));
    assert!(!sim.sink().is_active(&key));
    assert_eq!(sim.session(&key).unwrap().state, TcpState::Closed);
    assert_eq!(sim.pending(), 0);
}

#[test]
fn sequence_numbers_track_payload_lengths() {
    let mut sim = zeroed();
    let key = sim.connection_key("bedroom");
    sim.simulate_full_connection("bedroom", 3);

    sim.advance(ms(1500));
    let established = sim.session(&key).unwrap();
    assert_eq!((established.seq, established.ack), (1, 1));

    sim.advance(ms(500));
    let report = segments(&sim).last().and_then(|s| s.data.clone()).unwrap();
    assert_eq!(report["command"], "PERSON_DETECTED");
    assert_eq!(report["room"], "Bedroom");
    assert_eq!(report["count"], 3);
    assert_eq!(report["timestamp"], 2000);
    let after_data = sim.session(&key).unwrap();
    assert_eq!(after_data.seq, established.seq + json_len(&report) as u32);
    assert_eq!(after_data.ack, established.ack);

    sim.advance(ms(500));
    let response = segments(&sim).last().and_then(|s| s.data.clone()).unwrap();
    let after_response = sim.session(&key).unwrap();
    assert_eq!(after_response.ack, after_data.ack + json_len(&response) as u32);

    sim.run_until_idle(Duration::from_secs(10));
    let closed = sim.session(&key).unwrap();
    assert_eq!(closed.seq, after_data.seq + 1);
    assert_eq!(closed.ack, after_response.ack + 1);
}

#[test]
fn application_layer_mirrors_the_exchange() {
    let mut sim = zeroed();
    sim.simulate_full_connection("kitchen", 2);
    sim.run_until_idle(Duration::from_secs(10));

    let mut app: Vec<_> = sim.sink().recent_events(Category::App).collect();
    app.reverse();
    assert_eq!(app.len(), 2);
    match (app[0].payload(), app[1].payload()) {
        (Payload::HttpRequest(request), Payload::HttpResponse(response)) => {
            assert_eq!(request.method, "POST");
            assert_eq!(request.uri, "/api/sensors/kitchen/motion");
            assert_eq!(request.headers["X-Device-ID"], "192.168.1.102");
            assert!(request.headers["Authorization"].starts_with("Bearer "));
            assert_eq!(response.status, "200 OK");
            assert_eq!(response.headers["X-Server-ID"], "home-automation-001");
            assert_eq!(
                response.body,
                json!({"commands": [
                    {"type": "SET_LIGHT", "value": "ON"},
                    {"type": "SET_TEMP", "value": 22},
                ]})
            );
        }
        other => panic!("unexpected application events {other:?}"),
    }

    // Every TCP segment is mirrored into the transport view.
    assert_eq!(sim.sink().recorded(Category::Transport), 8);
}

#[test]
fn commands_reach_the_room_consumer() {
    let mut sim = zeroed();
    let (tx, mut rx) = mpsc::unbounded_channel();
    sim.register_consumer("bathroom", tx);

    sim.simulate_full_connection("bathroom", 0);
    sim.advance(ms(2499));
    assert!(rx.try_recv().is_err());
    sim.advance(ms(1));

    let delivery = rx.try_recv().unwrap();
    assert_eq!(delivery.room_id, "bathroom");
    assert_eq!(delivery.at, ms(2500));
    assert_eq!(delivery.commands, [Command::set_light(false), Command::set_temp(18)]);
}

#[test]
fn overlapping_connection_is_ignored() {
    let mut sim = zeroed();
    sim.simulate_full_connection("kitchen", 1);
    sim.advance(ms(1000));
    sim.simulate_full_connection("kitchen", 5);
    sim.run_until_idle(Duration::from_secs(10));

    assert_eq!(sim.sink().recorded(Category::Tcp), 8);
    assert_eq!(sim.sink().recorded(Category::App), 2);
}

#[traced_test]
#[test]
fn connection_waiting_for_its_syn_is_busy() {
    let mut sim = zeroed();
    sim.simulate_full_connection("living-room", 1);
    sim.advance(ms(100));
    sim.simulate_full_connection("living-room", 3);
    assert!(logs_contain("connection already in progress"));
    sim.run_until_idle(Duration::from_secs(10));

    // One preamble and one lifecycle, nothing left over from the second call.
    assert_eq!(sim.sink().recorded(Category::Physical), 1);
    assert_eq!(sim.sink().recorded(Category::Tcp), 8);
    assert!(!logs_contain("step rejected"));

    // Once the first SYN is out and the session has closed again, the room
    // can connect again.
    sim.simulate_full_connection("living-room", 0);
    sim.run_until_idle(Duration::from_secs(10));
    assert_eq!(sim.sink().recorded(Category::Tcp), 16);
}

#[test]
fn unknown_rooms_have_separate_sessions() {
    let mut sim = zeroed();
    sim.simulate_full_connection("attic", 1);
    sim.advance(ms(1000));
    sim.simulate_full_connection("garage", 1);
    sim.advance(ms(1000));

    let attic = sim.connection_key("attic");
    let garage = sim.connection_key("garage");
    assert_ne!(attic, garage);
    assert_eq!(sim.session(&attic).map(|s| s.state), Some(TcpState::Established));
    assert_eq!(sim.session(&garage).map(|s| s.state), Some(TcpState::SynReceived));

    sim.run_until_idle(Duration::from_secs(10));
    assert_eq!(sim.sink().recorded(Category::Tcp), 16);
    assert_eq!(sim.session(&garage).map(|s| s.state), Some(TcpState::Closed));
}

#[test]
fn sessions_are_independent() {
    let mut sim = zeroed();
    sim.simulate_full_connection("kitchen", 1);
    sim.advance(ms(700));
    sim.simulate_full_connection("bedroom", 1);
    sim.advance(ms(1500));

    let kitchen = sim.connection_key("kitchen");
    let bedroom = sim.connection_key("bedroom");
    assert!(sim.sink().is_active(&kitchen));
    assert!(sim.sink().is_active(&bedroom));
    assert_eq!(sim.sink().stats().active_connection_count, 2);

    sim.run_until_idle(Duration::from_secs(10));
    assert_eq!(sim.sink().recorded(Category::Tcp), 16);
    assert_eq!(sim.sink().stats().active_connection_count, 0);
}

#[test]
fn reused_key_keeps_counters_growing() {
    let mut sim = Simulation::new(HomeConfig::default(), SimConfig::seeded(7));
    let key = sim.connection_key("living-room");
    sim.simulate_full_connection("living-room", 1);
    sim.run_until_idle(Duration::from_secs(10));
    let first = sim.session(&key).unwrap();

    sim.simulate_full_connection("living-room", 0);
    sim.run_until_idle(Duration::from_secs(10));
    let second = sim.session(&key).unwrap();

    assert_eq!(second.state, TcpState::Closed);
    assert!(second.seq > first.seq);
    assert!(second.ack > first.ack);
    assert_eq!(sim.sink().recorded(Category::Tcp), 16);
}

#[test]
#[traced_test]
fn closing_an_unopened_session_does_nothing() {
    let mut sim = zeroed();
    let key = sim.connection_key("kitchen");
    sim.close_connection("kitchen");

    assert_eq!(sim.sink().stats().total_events, 0);
    assert_eq!(sim.pending(), 0);
    assert_eq!(sim.session(&key).unwrap().state, TcpState::Closed);
    assert!(logs_contain("nothing to close"));
}

#[test]
#[traced_test]
fn early_close_ends_the_chain() {
    let mut sim = zeroed();
    let key = sim.connection_key("kitchen");
    sim.simulate_full_connection("kitchen", 1);
    sim.advance(ms(1600));
    assert!(sim.sink().is_active(&key));

    sim.close_connection("kitchen");
    assert_eq!(sim.session(&key).unwrap().state, TcpState::FinWait1);
    sim.run_until_idle(Duration::from_secs(10));

    assert_eq!(sim.session(&key).unwrap().state, TcpState::Closed);
    assert!(!sim.sink().is_active(&key));
    // SYN, SYN+ACK, ACK and the three teardown segments. The data step found
    // the session closed and stopped the first chain.
    assert_eq!(sim.sink().recorded(Category::Tcp), 6);
    assert!(logs_contain("step rejected"));
}

#[test]
fn quick_messages_only_move_the_sender() {
    let mut sim = zeroed();
    let command = json!({"type": "STATUS_REQUEST"});
    let len = json_len(&command);

    sim.send_quick_message("server", "kitchen", command.clone());
    sim.send_quick_message("server", "kitchen", command);

    let segments = segments(&sim);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].src.port, 8080);
    assert_eq!(segments[0].dst.port, 1234);
    assert_eq!(segments[1].seq, segments[0].seq + len as u32);
    assert_eq!(segments[1].ack, segments[0].ack);
    assert!(segments.iter().all(|s| s.transition.is_none()));

    let history: Vec<usize> = sim
        .sink()
        .traffic_history(sim.now())
        .map(|sample| sample.bytes)
        .collect();
    assert_eq!(history, [len, len]);
}
