//! The entry point of the core: a [`Simulation`] owns the timeline, the
//! sink, every session and the protocol statistics, and exposes the trigger
//! calls that start exchanges.
//!
//! Trigger calls never block and never fail. They record whatever happens
//! immediately and leave the rest of the exchange on the scheduler, which
//! only moves when the simulation is advanced.

use crate::{
    address::{Address, Ipv4Address},
    config::{HomeConfig, SimConfig},
    event::{CoapMethod, ControllerMessage, DeviceMessage, IotProtocol, Payload},
    logging,
    protocols::{
        coap::{self, CoapStep},
        iot::{self, IotStats, IotStep, PeriodicStep},
        layers::{self, LayerStep},
        mqtt::{self, MqttStep},
        tcp::{CommandDelivery, CommandPolicy, Session, SessionKey, TcpSimulator, TcpStep},
        zigbee,
        zwave::{self, ZWaveStep},
    },
    scheduler::{Scheduler, TaskId},
    sink::{EventSink, Filter, View},
};
use rand::{rngs::SmallRng, RngCore, SeedableRng};
use serde_json::Value;
use std::{fmt, time::Duration};
use tokio::sync::mpsc::UnboundedSender;

/// A deferred action on the simulation's timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Tcp(TcpStep),
    Layers(LayerStep),
    Iot(IotStep),
}

impl From<TcpStep> for Step {
    fn from(step: TcpStep) -> Self {
        Step::Tcp(step)
    }
}

impl From<LayerStep> for Step {
    fn from(step: LayerStep) -> Self {
        Step::Layers(step)
    }
}

impl From<IotStep> for Step {
    fn from(step: IotStep) -> Self {
        Step::Iot(step)
    }
}

impl From<MqttStep> for Step {
    fn from(step: MqttStep) -> Self {
        Step::Iot(IotStep::Mqtt(step))
    }
}

impl From<CoapStep> for Step {
    fn from(step: CoapStep) -> Self {
        Step::Iot(IotStep::Coap(step))
    }
}

impl From<ZWaveStep> for Step {
    fn from(step: ZWaveStep) -> Self {
        Step::Iot(IotStep::ZWave(step))
    }
}

impl From<PeriodicStep> for Step {
    fn from(step: PeriodicStep) -> Self {
        Step::Iot(IotStep::Periodic(step))
    }
}

/// What a protocol component may touch while it runs: the clock reading,
/// the home's lookup tables, the sink, the scheduler and the random source.
pub struct Context<'a> {
    pub now: Duration,
    pub home: &'a HomeConfig,
    pub sink: &'a mut EventSink,
    pub scheduler: &'a mut Scheduler<Step>,
    pub rng: &'a mut dyn RngCore,
}

impl Context<'_> {
    /// Records an event at the current time.
    pub fn record(
        &mut self,
        src: impl Into<Address>,
        dst: impl Into<Address>,
        payload: Payload,
    ) -> u64 {
        self.sink
            .record(self.now, Some(src.into()), Some(dst.into()), payload)
    }

    /// Schedules a step `delay` from now.
    pub fn schedule(&mut self, delay: Duration, step: impl Into<Step>) {
        self.scheduler.schedule(delay, step.into());
    }
}

pub struct Simulation {
    home: HomeConfig,
    config: SimConfig,
    scheduler: Scheduler<Step>,
    sink: EventSink,
    tcp: TcpSimulator,
    iot: IotStats,
    rng: Box<dyn RngCore + Send>,
    periodic: Option<TaskId>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(HomeConfig::default(), SimConfig::default())
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.scheduler.now())
            .field("pending", &self.scheduler.pending())
            .field("tcp", &self.tcp)
            .field("iot", &self.iot)
            .field("periodic", &self.periodic)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation drawing its randomness from a [`SmallRng`]
    /// seeded with `config.seed`, or from entropy without one.
    pub fn new(home: HomeConfig, config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(home, config, Box::new(rng))
    }

    /// Creates a simulation with a specific random source.
    pub fn with_rng(home: HomeConfig, config: SimConfig, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            home,
            config,
            scheduler: Scheduler::new(),
            sink: EventSink::new(),
            tcp: TcpSimulator::default(),
            iot: IotStats::default(),
            rng,
            periodic: None,
        }
    }

    fn parts(&mut self) -> (Context<'_>, &mut TcpSimulator, &mut IotStats) {
        let Self {
            home,
            scheduler,
            sink,
            tcp,
            iot,
            rng,
            ..
        } = self;
        let ctx = Context {
            now: scheduler.now(),
            home,
            sink,
            scheduler,
            rng: &mut **rng,
        };
        (ctx, tcp, iot)
    }

    // Trigger calls

    /// Runs a full connection for a room: lower-layer preamble, handshake,
    /// occupancy report, server commands and teardown.
    pub fn simulate_full_connection(&mut self, room_id: &str, occupancy: u32) {
        let (mut ctx, tcp, _) = self.parts();
        tcp.simulate_full_connection(&mut ctx, room_id, occupancy);
    }

    /// Tears down a room's established connection. Any other state is left
    /// alone.
    pub fn close_connection(&mut self, room_id: &str) {
        let (mut ctx, tcp, _) = self.parts();
        tcp.close_connection(&mut ctx, room_id);
    }

    /// Sends a single data segment between `"server"` and a room, or between
    /// two rooms.
    pub fn send_quick_message(&mut self, from: &str, to: &str, command: Value) {
        let (mut ctx, tcp, _) = self.parts();
        tcp.send_quick_message(&mut ctx, from, to, command);
    }

    pub fn simulate_mqtt(&mut self, room_id: &str, topic_kind: &str, data: Value) {
        let (mut ctx, _, _) = self.parts();
        mqtt::simulate(&mut ctx, room_id, topic_kind, data);
    }

    pub fn simulate_coap(
        &mut self,
        room_id: &str,
        method: CoapMethod,
        resource: &str,
        payload: Option<Value>,
    ) {
        let (mut ctx, _, iot) = self.parts();
        coap::simulate(&mut ctx, &mut iot.coap, room_id, method, resource, payload);
    }

    pub fn simulate_zigbee(&mut self, room_id: &str, message_type: &str, data: Value) {
        let (mut ctx, _, iot) = self.parts();
        zigbee::simulate(&mut ctx, &mut iot.zigbee, room_id, message_type, data);
    }

    pub fn simulate_zwave(
        &mut self,
        room_id: &str,
        command_class: &str,
        command: &str,
        data: Option<Value>,
    ) {
        let (mut ctx, _, _) = self.parts();
        zwave::simulate(&mut ctx, room_id, command_class, command, data);
    }

    pub fn simulate_full_stack_communication(
        &mut self,
        src: Ipv4Address,
        dst: Ipv4Address,
        data: Value,
    ) {
        let (mut ctx, _, _) = self.parts();
        layers::simulate_full_stack_communication(&mut ctx, src, dst, data);
    }

    pub fn simulate_ping(&mut self, src: Ipv4Address, dst: Ipv4Address) {
        let (mut ctx, _, _) = self.parts();
        layers::simulate_ping(&mut ctx, src, dst);
    }

    pub fn simulate_dhcp(&mut self, client: Ipv4Address) {
        let (mut ctx, _, _) = self.parts();
        layers::simulate_dhcp(&mut ctx, client);
    }

    /// Starts the telemetry and observe sweeps as one cancellable task. The
    /// first sweeps happen one interval from now. Starting twice keeps the
    /// running task.
    pub fn start_periodic_updates(&mut self) -> TaskId {
        if let Some(task) = self.periodic {
            return task;
        }
        let task = self.scheduler.spawn_task();
        let telemetry = self.config.telemetry_interval;
        let observe = self.config.observe_interval;
        self.scheduler.schedule_in(
            task,
            telemetry,
            PeriodicStep::Telemetry { every: telemetry }.into(),
        );
        self.scheduler.schedule_in(
            task,
            observe,
            PeriodicStep::Observe { every: observe }.into(),
        );
        self.periodic = Some(task);
        logging::task_started(task, "periodic updates");
        task
    }

    /// Cancels the periodic sweeps together with every exchange they have
    /// started but not finished. Returns whether a task was running.
    pub fn stop_periodic_updates(&mut self) -> bool {
        match self.periodic.take() {
            Some(task) => {
                let removed = self.scheduler.cancel(task);
                logging::task_cancelled(task, removed);
                true
            }
            None => false,
        }
    }

    /// Drops every pending step, session, recorded event and statistic. The
    /// clock keeps its reading; registered command consumers stay.
    pub fn reset(&mut self) {
        let dropped = self.scheduler.pending();
        self.scheduler.clear();
        self.periodic = None;
        self.tcp.clear();
        self.sink.clear();
        self.iot = IotStats::default();
        logging::reset(dropped);
    }

    pub fn log_controller_message(
        &mut self,
        from: &str,
        to: &str,
        kind: &str,
        action: &str,
        data: Value,
    ) -> u64 {
        let message = ControllerMessage {
            from: from.to_string(),
            to: to.to_string(),
            kind: kind.to_string(),
            action: action.to_string(),
            data,
        };
        let (mut ctx, _, _) = self.parts();
        ctx.record(
            Address::named(from),
            Address::named(to),
            Payload::Controller(message),
        )
    }

    pub fn log_device_message(
        &mut self,
        device_id: &str,
        device_type: &str,
        event: &str,
        data: Value,
    ) -> u64 {
        let message = DeviceMessage {
            device_id: device_id.to_string(),
            device_type: device_type.to_string(),
            event: event.to_string(),
            data,
        };
        let (mut ctx, _, _) = self.parts();
        ctx.record(
            Address::named(device_id),
            Address::named("controller"),
            Payload::Device(message),
        )
    }

    /// Records a controller-to-device command or a device event carried by
    /// an IoT protocol.
    pub fn log_iot_command(
        &mut self,
        protocol: IotProtocol,
        message_type: &str,
        src: impl Into<Address>,
        dst: impl Into<Address>,
        data: Value,
    ) -> u64 {
        let (mut ctx, _, _) = self.parts();
        iot::log_command(&mut ctx, protocol, message_type, src, dst, data)
    }

    /// Records an arbitrary event at the current time.
    pub fn log_packet(
        &mut self,
        src: impl Into<Address>,
        dst: impl Into<Address>,
        payload: Payload,
    ) -> u64 {
        let (mut ctx, _, _) = self.parts();
        ctx.record(src, dst, payload)
    }

    // Wiring

    /// Registers the consumer of the commands the server sends to a room.
    pub fn register_consumer(&mut self, room_id: &str, consumer: UnboundedSender<CommandDelivery>) {
        self.tcp.register_consumer(room_id, consumer);
    }

    pub fn set_policy(&mut self, policy: Box<dyn CommandPolicy>) {
        self.tcp.set_policy(policy);
    }

    /// Sets the temperature that telemetry reports for a room.
    pub fn set_temperature(&mut self, room_id: &str, celsius: f64) {
        self.home.set_temperature(room_id, celsius);
    }

    pub fn set_filter(&mut self, view: View, filter: Filter) {
        self.sink.set_filter(view, filter);
    }

    // Time

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// The number of steps waiting to fire.
    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    /// When the earliest pending step is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Moves the clock forward by `by`, firing every step due on the way.
    /// Returns how many steps fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now() + by;
        let fired = self.fire_until(until);
        self.scheduler.advance_clock(until);
        fired
    }

    /// Fires steps until nothing is pending or the next step is more than
    /// `limit` away from the current time. The clock stops at the last step
    /// fired.
    pub fn run_until_idle(&mut self, limit: Duration) -> usize {
        let until = self.scheduler.now() + limit;
        self.fire_until(until)
    }

    fn fire_until(&mut self, until: Duration) -> usize {
        let mut fired = 0;
        while let Some(scheduled) = self.scheduler.pop_due(until) {
            self.scheduler.enter(scheduled.task);
            let (mut ctx, tcp, iot) = self.parts();
            match scheduled.action {
                Step::Tcp(step) => tcp.fire(&mut ctx, step),
                Step::Layers(step) => layers::fire(&mut ctx, step),
                Step::Iot(step) => iot::fire(&mut ctx, iot, step),
            }
            self.scheduler.leave();
            fired += 1;
        }
        fired
    }

    // Reads

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    pub fn iot_stats(&self) -> &IotStats {
        &self.iot
    }

    pub fn session(&self, key: &SessionKey) -> Option<Session> {
        self.tcp.session(key)
    }

    /// The key of a room's full connections.
    pub fn connection_key(&self, room_id: &str) -> SessionKey {
        TcpSimulator::connection_key(&self.home, room_id)
    }

    pub fn home(&self) -> &HomeConfig {
        &self.home
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The running periodic task, if any.
    pub fn periodic_task(&self) -> Option<TaskId> {
        self.periodic
    }
}
