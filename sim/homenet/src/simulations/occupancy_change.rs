use crate::home::Home;

/// Someone walks into (or everyone leaves) a room: the new head count is
/// reported over a full connection and every IoT protocol, whether or not
/// it differs from the last one.
pub fn occupancy_change(home: &mut Home, room_id: &str, people: u32) {
    home.report_occupancy(room_id, people);
}

#[cfg(test)]
mod tests {
    use super::*;
    use homenet_core::{Category, Simulation, TcpState};
    use std::time::Duration;

    #[test]
    fn report_reaches_every_protocol() {
        let mut home = Home::new(Simulation::default());
        occupancy_change(&mut home, "bedroom", 2);
        home.advance(Duration::from_secs(10));

        let sim = home.simulation();
        let key = sim.connection_key("bedroom");
        assert_eq!(sim.session(&key).map(|s| s.state), Some(TcpState::Closed));
        assert_eq!(sim.sink().recorded(Category::Tcp), 8);

        let stats = sim.iot_stats();
        // Sensor report, motion event and the light command.
        assert_eq!(stats.mqtt.topics["/home/sensors"], 2);
        assert_eq!(stats.mqtt.topics["/home/actuators"], 1);
        // Status update and the thermostat command.
        assert_eq!(stats.coap.requests, 2);
        // Occupancy report, motion event and the light command.
        assert_eq!(stats.zigbee.messages, 3);
        // Light level and thermostat setpoint.
        assert_eq!(stats.zwave.messages, 2);

        let controller = home.controller("bedroom").unwrap();
        assert!(controller.states().light.on);
        assert_eq!(controller.states().thermostat.target, 22.0);
    }
}
