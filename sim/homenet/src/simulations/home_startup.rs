use crate::home::Home;
use homenet_core::{
    event::{TcpFlags, TcpSegment},
    Endpoint, Ipv4Address, Payload, TcpState,
};
use serde_json::json;
use std::time::Duration;

/// How long after startup the server pings every room.
pub const PING_DELAY: Duration = Duration::from_secs(2);

/// Brings the home up: the server starts listening and announces itself,
/// every room registers its devices, joins the ZigBee network, subscribes
/// to its MQTT status topic and leases an address, and the periodic sensor
/// sweeps start. Two seconds later the server pings every room.
pub fn home_startup(home: &mut Home) {
    let sim = home.simulation_mut();
    let server = sim.home().server;
    let nowhere = Endpoint::new(Ipv4Address::CURRENT_NETWORK, 0);
    let listen = TcpSegment::new(server, nowhere, 0, 0, TcpFlags::NONE)
        .with_data(json!("Home Automation Server initialized"))
        .with_transition(TcpState::Listen);
    sim.log_packet(server, nowhere, Payload::Tcp(listen));

    sim.log_controller_message(
        "Server",
        "All Controllers",
        "status",
        "SYSTEM_INITIALIZATION",
        json!({ "status": "ready", "timestamp": sim.now().as_millis() as u64 }),
    );

    let rooms: Vec<(String, Ipv4Address)> = sim
        .home()
        .rooms
        .iter()
        .map(|room| (room.id.clone(), room.ip))
        .collect();
    for (room, ip) in &rooms {
        let devices = [
            ("light", "light", "Light", json!(["ON_OFF", "BRIGHTNESS"])),
            ("thermostat", "thermostat", "Thermostat", json!(["TEMPERATURE", "MODE"])),
            ("motion", "sensor", "Motion Sensor", json!(["MOTION_DETECTION"])),
        ];
        for (suffix, device_type, label, capabilities) in devices {
            sim.log_device_message(
                &format!("{room}-{suffix}"),
                device_type,
                "DEVICE_REGISTERED",
                json!({ "name": format!("{room} {label}"), "capabilities": capabilities }),
            );
        }
        sim.simulate_zigbee(
            room,
            "join",
            json!({ "capabilities": ["Router", "Mains-powered"] }),
        );
        sim.simulate_mqtt(
            room,
            "status",
            json!({ "event": "subscribe", "topic": format!("/home/{room}/control") }),
        );
        sim.simulate_dhcp(*ip);
    }
    sim.start_periodic_updates();

    home.advance(PING_DELAY);
    let sim = home.simulation_mut();
    for (_, ip) in &rooms {
        sim.simulate_ping(server.address, *ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homenet_core::{Category, Simulation};

    #[test]
    fn every_room_comes_up() {
        let mut home = Home::new(Simulation::default());
        home_startup(&mut home);
        let sim = home.simulation();
        let sink = sim.sink();

        assert_eq!(sink.recorded(Category::Controller), 1);
        assert_eq!(sink.recorded(Category::Device), 12);
        assert_eq!(sink.recorded(Category::App), 16);
        assert_eq!(sim.iot_stats().zigbee.devices, 4);
        assert_eq!(sim.iot_stats().mqtt.subscriptions.len(), 1);
        assert!(sim.periodic_task().is_some());
        assert_eq!(sim.now(), PING_DELAY);

        let listen = sink
            .recent_events(Category::Tcp)
            .last()
            .and_then(|event| match event.payload() {
                Payload::Tcp(segment) => segment.transition,
                _ => None,
            });
        assert_eq!(listen, Some(TcpState::Listen));
    }
}
