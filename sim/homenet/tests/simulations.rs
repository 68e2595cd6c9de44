use homenet::{
    simulations::{daily_schedule, home_startup, occupancy_change},
    summary::Summary,
    Home,
};
use homenet_core::{Category, HomeConfig, Payload, SimConfig, Simulation, TcpState};
use rand::{rngs::SmallRng, SeedableRng};
use std::time::Duration;

fn home(seed: u64) -> Home {
    Home::new(Simulation::new(HomeConfig::default(), SimConfig::seeded(seed)))
}

#[test]
fn startup() {
    let mut home = home(1);
    home_startup(&mut home);
    home.advance(Duration::from_secs(30));

    let sim = home.simulation();
    // Every room answered its ping.
    let icmp = sim
        .sink()
        .recent_events(Category::Network)
        .filter(|event| matches!(event.payload(), Payload::Icmp(_)))
        .count();
    assert_eq!(icmp, 8);
    assert!(sim.iot_stats().coap.requests > 0);
    assert!(sim.iot_stats().mqtt.messages > 4);
}

#[test]
fn occupancy() {
    let mut home = home(2);
    home_startup(&mut home);
    occupancy_change(&mut home, "kitchen", 3);
    home.advance(Duration::from_secs(10));

    let key = home.simulation().connection_key("kitchen");
    assert_eq!(
        home.simulation().session(&key).map(|session| session.state),
        Some(TcpState::Closed)
    );
    let controller = home.controller("kitchen").unwrap();
    assert!(controller.states().light.on);
    assert!(controller.states().motion_detecting);

    let status = controller.status(home.simulation());
    assert_eq!(status["roomId"], "kitchen");
    assert_eq!(status["devices"]["light"]["on"], true);
}

#[test]
fn daily() {
    let mut home = home(3);
    home_startup(&mut home);
    let mut rng = SmallRng::seed_from_u64(3);
    daily_schedule(&mut home, &mut rng, Duration::from_secs(5));

    assert!(home.occupancy("bedroom") >= 1);
    assert!(home.controller("bedroom").unwrap().states().light.on);
    assert!(!home.controller("kitchen").unwrap().states().light.on);
}

#[test]
fn seeded_runs_repeat() {
    let run = || {
        let mut home = home(7);
        home_startup(&mut home);
        let mut rng = SmallRng::seed_from_u64(7);
        daily_schedule(&mut home, &mut rng, Duration::from_secs(5));
        Summary::new(home.simulation()).to_string()
    };
    assert_eq!(run(), run());
}
