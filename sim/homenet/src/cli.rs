//! Parses the command line arguments and runs the chosen scenario.
//!
//! Running the startup scenario for two simulated minutes with logging on:
//!
//! ```cargo run -p homenet -- --scenario startup --duration 120 --log```

use crate::{
    config::{load_home, ConfigError},
    home::Home,
    simulations::{daily_schedule, home_startup, occupancy_change},
    summary::Summary,
};
use clap::{Parser, ValueEnum};
use homenet_core::{AutoAdvance, SimConfig, Simulation};
use rand::{rngs::SmallRng, SeedableRng};
use std::{
    fs::{create_dir_all, OpenOptions},
    io,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use thiserror::Error as ThisError;
use tokio::{sync::Mutex, time};
use tracing_subscriber::FmtSubscriber;

/// How often the real-time driver advances the simulation.
const TICK: Duration = Duration::from_millis(100);

/// Simulated length of an hour in the daily schedule.
const HOUR: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Server and room startup, then periodic sensor updates
    Startup,
    /// Startup followed by a change of head count in one room
    Occupancy,
    /// Startup followed by a day of people moving between rooms
    Daily,
}

/// Stores the different command line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Simulates the network traffic of a smart home")]
pub struct Args {
    /// Logging flag. Writes JSON logs to ./logs instead of stderr.
    #[arg(short, long)]
    pub log: bool,
    /// Seed for every random choice. Omit for a different run each time.
    #[arg(short, long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = Scenario::Startup)]
    pub scenario: Scenario,
    /// Room for the occupancy scenario
    #[arg(long, default_value = "living-room")]
    pub room: String,
    /// Head count for the occupancy scenario
    #[arg(long, default_value_t = 2)]
    pub people: u32,
    /// Simulated seconds to run after the scenario has been set up
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,
    /// JSON file describing the server and the rooms
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Advance in real time instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,
    /// Simulated seconds per real second when running in real time
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
}

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not open the log file: {0}")]
    Log(#[from] io::Error),
    #[error("Could not install the log subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Parses command line arguments and runs the simulation they describe.
pub async fn initialize_from_arguments() -> Result<(), CliError> {
    let args = Args::parse();
    initialize_logging(args.log)?;
    let home = load_home(args.config.as_deref())?;
    let config = SimConfig {
        seed: args.seed,
        ..Default::default()
    };
    let mut home = Home::new(Simulation::new(home, config));
    run_scenario(&mut home, &args);

    let duration = Duration::from_secs(args.duration);
    let home = if args.realtime {
        run_realtime(home, duration, args.speed).await
    } else {
        home.advance(duration);
        home
    };
    println!("{}", Summary::new(home.simulation()));
    Ok(())
}

/// Sets up the scenario the arguments select.
pub fn run_scenario(home: &mut Home, args: &Args) {
    home_startup(home);
    match args.scenario {
        Scenario::Startup => {}
        Scenario::Occupancy => occupancy_change(home, &args.room, args.people),
        Scenario::Daily => {
            let mut rng = match args.seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            daily_schedule(home, &mut rng, HOUR);
        }
    }
}

/// Lets the simulation run against the wall clock for `duration` of
/// simulated time, or until interrupted.
async fn run_realtime(home: Home, duration: Duration, speed: f64) -> Home {
    let (simulation, mut controllers) = home.into_parts();
    let shared = Arc::new(Mutex::new(simulation));
    let driver = AutoAdvance::start(shared.clone(), TICK, speed);
    let wall = if speed > 0.0 {
        duration.div_f64(speed)
    } else {
        duration
    };

    let deadline = time::sleep(wall);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(deadline, interrupt);
    let mut interval = time::interval(TICK);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut interrupt => {
                tracing::info!("interrupted");
                break;
            }
            _ = interval.tick() => {
                let mut simulation = shared.lock().await;
                for controller in controllers.iter_mut() {
                    controller.apply_pending(&mut simulation);
                }
            }
        }
    }
    driver.stop().await;

    let simulation = std::mem::take(&mut *shared.lock().await);
    Home::from_parts(simulation, controllers)
}

/// Installs the log subscriber. Only should be called once.
///
/// With `to_file` set, JSON logs go to a dated file under `./logs`;
/// otherwise warnings and errors are written to stderr.
fn initialize_logging(to_file: bool) -> Result<(), CliError> {
    if to_file {
        let main_path = "./logs";
        create_dir_all(main_path)?;
        let file_path = format!(
            "{}/debug-{}.log",
            main_path,
            chrono::offset::Local::now().format("%y-%m-%d_%H-%M-%S")
        );
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(file_path)?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(Arc::new(file))
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(tracing::Level::WARN)
            .with_writer(io::stderr)
            .compact()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["homenet"]);
        assert_eq!(args.scenario, Scenario::Startup);
        assert_eq!(args.duration, 60);
        assert!(!args.realtime);
        assert!(args.seed.is_none());
    }

    #[test]
    fn occupancy_arguments() {
        let args = Args::parse_from([
            "homenet",
            "--scenario",
            "occupancy",
            "--room",
            "kitchen",
            "--people",
            "3",
            "--seed",
            "9",
        ]);
        assert_eq!(args.scenario, Scenario::Occupancy);
        assert_eq!(args.room, "kitchen");
        assert_eq!(args.people, 3);
        assert_eq!(args.seed, Some(9));
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_stops_at_the_deadline() {
        let mut home = Home::new(Simulation::new(Default::default(), SimConfig::seeded(1)));
        occupancy_change(&mut home, "kitchen", 1);
        let home = run_realtime(home, Duration::from_secs(10), 10.0).await;

        let now = home.simulation().now();
        assert!(now >= Duration::from_secs(9) && now <= Duration::from_secs(10));
        assert!(home.controller("kitchen").unwrap().states().light.on);
    }
}
