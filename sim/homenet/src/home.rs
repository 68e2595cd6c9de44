//! A simulation together with the controllers of its rooms and the people
//! in them.

use crate::applications::RoomController;
use homenet_core::Simulation;
use serde_json::json;
use std::{collections::BTreeMap, time::Duration};

/// Lighting and heating a room settles on for a head count at a given hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomConditions {
    pub light_on: bool,
    pub temperature: f64,
}

impl RoomConditions {
    pub fn at(hour: u32, people: u32) -> Self {
        let daytime = (7..19).contains(&hour);
        let temperature = if people == 0 {
            18.0
        } else if (6..=9).contains(&hour) {
            23.0
        } else if (17..=22).contains(&hour) {
            24.0
        } else if hour >= 22 || hour <= 6 {
            20.0
        } else {
            22.0
        };
        Self {
            light_on: people > 0 && !daytime,
            temperature,
        }
    }
}

pub struct Home {
    simulation: Simulation,
    controllers: Vec<RoomController>,
    occupancy: BTreeMap<String, u32>,
    hour: u32,
}

impl Home {
    /// The evening hour a home starts at.
    pub const DEFAULT_HOUR: u32 = 20;

    /// Attaches a controller to every configured room.
    pub fn new(mut simulation: Simulation) -> Self {
        let rooms: Vec<String> = simulation.home().room_ids().map(str::to_string).collect();
        let controllers = rooms
            .iter()
            .map(|room| RoomController::attach(&mut simulation, room))
            .collect();
        Self {
            simulation,
            controllers,
            occupancy: rooms.into_iter().map(|room| (room, 0)).collect(),
            hour: Self::DEFAULT_HOUR,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn controller(&self, room_id: &str) -> Option<&RoomController> {
        self.controllers.iter().find(|c| c.room_id() == room_id)
    }

    pub fn controllers(&self) -> &[RoomController] {
        &self.controllers
    }

    pub fn occupancy(&self, room_id: &str) -> u32 {
        self.occupancy.get(room_id).copied().unwrap_or(0)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn set_hour(&mut self, hour: u32) {
        self.hour = hour % 24;
    }

    /// Records a new head count for a room. A change is reported to the
    /// server, an unchanged count only refreshes the motion sensor.
    pub fn set_occupancy(&mut self, room_id: &str, people: u32) {
        if self.occupancy(room_id) == people {
            self.refresh(room_id, people);
        } else {
            self.report_occupancy(room_id, people);
        }
    }

    /// Records a head count and reports it: a full connection to the server
    /// plus a report over each IoT protocol.
    pub fn report_occupancy(&mut self, room_id: &str, people: u32) {
        let conditions = self.refresh(room_id, people);
        tracing::info!(room = room_id, people, hour = self.hour, "occupancy changed");

        let sim = &mut self.simulation;
        sim.simulate_full_connection(room_id, people);
        sim.simulate_mqtt(
            room_id,
            "sensors",
            json!({
                "occupancy": people,
                "light": u8::from(conditions.light_on),
                "temperature": conditions.temperature,
            }),
        );
        sim.simulate_coap(
            room_id,
            homenet_core::CoapMethod::Post,
            &format!("/rooms/{room_id}/status"),
            Some(json!({
                "occupancy": people,
                "light": conditions.light_on,
                "temp": conditions.temperature,
            })),
        );
        sim.simulate_zigbee(
            room_id,
            "occupancy",
            json!({ "count": people, "detected": people > 0 }),
        );
        let level = if conditions.light_on { 255 } else { 0 };
        sim.simulate_zwave(room_id, "BASIC", "SET", Some(json!({ "value": level })));
    }

    fn refresh(&mut self, room_id: &str, people: u32) -> RoomConditions {
        self.occupancy.insert(room_id.to_string(), people);
        let conditions = RoomConditions::at(self.hour, people);
        self.simulation.set_temperature(room_id, conditions.temperature);
        if let Some(controller) = self.controllers.iter_mut().find(|c| c.room_id() == room_id) {
            controller.update_motion(&mut self.simulation, people);
        }
        conditions
    }

    /// Advances the simulation by `by`, letting each controller act on its
    /// commands at the moment they are delivered.
    pub fn advance(&mut self, by: Duration) {
        let until = self.simulation.now() + by;
        while let Some(due) = self.simulation.next_due().filter(|due| *due <= until) {
            let now = self.simulation.now();
            self.simulation.advance(due.saturating_sub(now));
            self.apply_commands();
        }
        let now = self.simulation.now();
        self.simulation.advance(until.saturating_sub(now));
    }

    /// Lets every controller act on the commands delivered so far.
    pub fn apply_commands(&mut self) -> usize {
        let Self {
            simulation,
            controllers,
            ..
        } = self;
        controllers
            .iter_mut()
            .map(|controller| controller.apply_pending(simulation))
            .sum()
    }

    /// Splits the home so the simulation can be shared with a real-time
    /// driver. Occupancy and the hour of day are dropped.
    pub fn into_parts(self) -> (Simulation, Vec<RoomController>) {
        (self.simulation, self.controllers)
    }

    /// Reassembles a home from [`Home::into_parts`]. Every room starts out
    /// empty.
    pub fn from_parts(simulation: Simulation, controllers: Vec<RoomController>) -> Self {
        let occupancy = simulation
            .home()
            .room_ids()
            .map(|room| (room.to_string(), 0))
            .collect();
        Self {
            simulation,
            controllers,
            occupancy,
            hour: Self::DEFAULT_HOUR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_follow_the_clock() {
        assert_eq!(RoomConditions::at(12, 0), RoomConditions { light_on: false, temperature: 18.0 });
        assert_eq!(RoomConditions::at(12, 2), RoomConditions { light_on: false, temperature: 22.0 });
        assert_eq!(RoomConditions::at(7, 1), RoomConditions { light_on: false, temperature: 23.0 });
        assert_eq!(RoomConditions::at(18, 1), RoomConditions { light_on: true, temperature: 24.0 });
        assert_eq!(RoomConditions::at(23, 1), RoomConditions { light_on: true, temperature: 20.0 });
        assert_eq!(RoomConditions::at(6, 1), RoomConditions { light_on: true, temperature: 23.0 });
    }

    #[test]
    fn unchanged_occupancy_is_not_reported() {
        let mut home = Home::new(Simulation::default());
        home.set_occupancy("kitchen", 0);
        assert_eq!(home.simulation().pending(), 0);
        assert_eq!(home.simulation().sink().stats().total_events, 0);

        home.set_occupancy("kitchen", 2);
        assert_eq!(home.occupancy("kitchen"), 2);
        assert!(home.simulation().pending() > 0);
        assert!(home.controller("kitchen").unwrap().states().motion_detecting);
    }

    #[test]
    fn commands_apply_when_delivered() {
        let mut home = Home::new(Simulation::default());
        home.report_occupancy("living-room", 1);
        home.advance(Duration::from_millis(2499));
        assert!(!home.controller("living-room").unwrap().states().light.on);

        home.advance(Duration::from_secs(5));
        let controller = home.controller("living-room").unwrap();
        assert!(controller.states().light.on);
        assert_eq!(home.simulation().now(), Duration::from_millis(7499));

        // The controller acted at the delivery time, not at the end.
        let command = home
            .simulation()
            .sink()
            .recent_events(homenet_core::Category::Iot)
            .find(|event| event.message_type() == "COMMAND")
            .unwrap();
        assert_eq!(command.at(), Duration::from_millis(2500));
    }
}
