use homenet_core::{
    protocols::tcp::CLIENT_PORT, Address, CoapMethod, Command, CommandDelivery, CommandKind,
    Endpoint, IotProtocol, Simulation,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// The thermostat target a controller starts with.
pub const DEFAULT_TARGET: f64 = 22.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightState {
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermostatState {
    pub target: f64,
    pub mode: String,
}

/// What a controller believes its devices are doing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStates {
    pub light: LightState,
    pub thermostat: ThermostatState,
    pub motion_detecting: bool,
}

impl Default for DeviceStates {
    fn default() -> Self {
        Self {
            light: LightState { on: false },
            thermostat: ThermostatState {
                target: DEFAULT_TARGET,
                mode: "AUTO".into(),
            },
            motion_detecting: false,
        }
    }
}

/// The controller in one room. It carries out the commands the server sends
/// at the end of each full connection by talking to its devices over the
/// IoT protocols, and reports motion changes back.
///
/// Light commands travel over ZigBee with an MQTT copy, thermostat commands
/// over Z-Wave with a CoAP copy.
#[derive(Debug)]
pub struct RoomController {
    room_id: String,
    endpoint: Endpoint,
    states: DeviceStates,
    commands: UnboundedReceiver<CommandDelivery>,
}

impl RoomController {
    /// Creates the controller for `room_id` and registers it as the
    /// consumer of the room's commands.
    pub fn attach(simulation: &mut Simulation, room_id: &str) -> Self {
        let (sender, commands) = mpsc::unbounded_channel();
        simulation.register_consumer(room_id, sender);
        let ip = simulation.home().resolve(room_id).ip;
        Self {
            room_id: room_id.to_string(),
            endpoint: Endpoint::new(ip, CLIENT_PORT),
            states: DeviceStates::default(),
            commands,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn states(&self) -> &DeviceStates {
        &self.states
    }

    /// Carries out every delivery received so far. Returns how many
    /// deliveries were handled.
    pub fn apply_pending(&mut self, simulation: &mut Simulation) -> usize {
        let mut handled = 0;
        while let Ok(delivery) = self.commands.try_recv() {
            tracing::debug!(
                room = %self.room_id,
                commands = delivery.commands.len(),
                "applying server commands"
            );
            for command in &delivery.commands {
                self.apply(simulation, command);
            }
            handled += 1;
        }
        handled
    }

    pub fn apply(&mut self, simulation: &mut Simulation, command: &Command) {
        match command.kind {
            CommandKind::SetLight => {
                self.set_light(simulation, command.value.as_str() == Some("ON"));
            }
            CommandKind::SetTemp => match command.value.as_f64() {
                Some(celsius) => self.set_temperature(simulation, celsius),
                None => tracing::warn!(room = %self.room_id, value = %command.value, "ignoring SET_TEMP"),
            },
            CommandKind::SetMode => match command.value.as_str() {
                Some(mode) => self.set_mode(simulation, mode),
                None => tracing::warn!(room = %self.room_id, value = %command.value, "ignoring SET_MODE"),
            },
        }
    }

    pub fn set_light(&mut self, simulation: &mut Simulation, on: bool) {
        let value = if on { "ON" } else { "OFF" };
        let device = format!("{}-light", self.room_id);
        simulation.simulate_zigbee(
            &self.room_id,
            "light",
            json!({ "command": "ON_OFF", "value": u8::from(on) }),
        );
        simulation.simulate_mqtt(
            &self.room_id,
            "actuators",
            json!({ "deviceId": device, "command": "SET_LIGHT", "value": value }),
        );
        self.states.light.on = on;
        simulation.log_iot_command(
            IotProtocol::ZigBee,
            "COMMAND",
            self.endpoint,
            Address::named(device),
            json!({ "command": "SET_LIGHT", "value": value, "timestamp": millis(simulation) }),
        );
    }

    pub fn set_temperature(&mut self, simulation: &mut Simulation, celsius: f64) {
        let device = format!("{}-thermostat", self.room_id);
        simulation.simulate_zwave(
            &self.room_id,
            "THERMOSTAT_SETPOINT",
            "SET",
            Some(json!({ "value": celsius, "scale": "Celsius" })),
        );
        simulation.simulate_coap(
            &self.room_id,
            CoapMethod::Put,
            &format!("/thermostat/{}", self.room_id),
            Some(json!({ "targetTemp": celsius })),
        );
        self.states.thermostat.target = celsius;
        simulation.log_iot_command(
            IotProtocol::ZWave,
            "COMMAND",
            self.endpoint,
            Address::named(device),
            json!({ "command": "SET_TEMP", "value": celsius, "timestamp": millis(simulation) }),
        );
    }

    pub fn set_mode(&mut self, simulation: &mut Simulation, mode: &str) {
        let previous = std::mem::replace(&mut self.states.thermostat.mode, mode.to_string());
        simulation.log_device_message(
            &format!("{}-thermostat", self.room_id),
            "thermostat",
            "MODE_CHANGED",
            json!({ "from": previous, "to": mode }),
        );
    }

    /// Feeds the room's head count to the motion sensor. Only a change in
    /// detection is reported. Returns whether it changed.
    pub fn update_motion(&mut self, simulation: &mut Simulation, people: u32) -> bool {
        let detecting = people > 0;
        if detecting == self.states.motion_detecting {
            return false;
        }
        let device = format!("{}-motion", self.room_id);
        simulation.simulate_zigbee(
            &self.room_id,
            "occupancy",
            json!({ "count": people, "detected": detecting }),
        );
        simulation.simulate_mqtt(
            &self.room_id,
            "sensors",
            json!({
                "deviceId": device,
                "event": "MOTION_DETECTED",
                "value": detecting,
                "peopleCount": people,
            }),
        );
        self.states.motion_detecting = detecting;
        simulation.log_iot_command(
            IotProtocol::ZigBee,
            "EVENT",
            Address::named(device),
            self.endpoint,
            json!({ "event": "MOTION_DETECTED", "detecting": detecting, "timestamp": millis(simulation) }),
        );
        true
    }

    pub fn status(&self, simulation: &Simulation) -> Value {
        json!({
            "roomId": self.room_id,
            "devices": self.states,
            "timestamp": millis(simulation),
        })
    }
}

fn millis(simulation: &Simulation) -> u64 {
    simulation.now().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use homenet_core::{Category, Payload};
    use std::time::Duration;

    #[test]
    fn applies_delivered_commands() {
        let mut sim = Simulation::default();
        let mut controller = RoomController::attach(&mut sim, "kitchen");
        sim.simulate_full_connection("kitchen", 2);
        sim.advance(Duration::from_millis(2500));

        assert_eq!(controller.apply_pending(&mut sim), 1);
        assert!(controller.states().light.on);
        assert_eq!(controller.states().thermostat.target, 22.0);
        assert_eq!(controller.apply_pending(&mut sim), 0);

        let commands: Vec<String> = sim
            .sink()
            .recent_events(Category::Iot)
            .filter(|event| event.message_type() == "COMMAND")
            .map(|event| event.protocol().to_string())
            .collect();
        assert_eq!(commands, ["Z-Wave", "ZigBee"]);
    }

    #[test]
    fn motion_reports_only_changes() {
        let mut sim = Simulation::default();
        let mut controller = RoomController::attach(&mut sim, "bedroom");
        assert!(!controller.update_motion(&mut sim, 0));
        assert!(controller.update_motion(&mut sim, 2));
        assert!(!controller.update_motion(&mut sim, 3));
        assert!(controller.update_motion(&mut sim, 0));
        assert_eq!(sim.iot_stats().zigbee.messages, 2);
    }

    #[test]
    fn mode_changes_are_device_messages() {
        let mut sim = Simulation::default();
        let mut controller = RoomController::attach(&mut sim, "bathroom");
        controller.apply(&mut sim, &Command::set_mode("ECO"));

        assert_eq!(controller.states().thermostat.mode, "ECO");
        let event = sim.sink().latest(Category::Device).unwrap();
        match event.payload() {
            Payload::Device(message) => {
                assert_eq!(message.device_id, "bathroom-thermostat");
                assert_eq!(message.data, json!({"from": "AUTO", "to": "ECO"}));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(controller.status(&sim)["devices"]["thermostat"]["mode"], "ECO");
    }
}
