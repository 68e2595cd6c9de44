//! Advancing a shared simulation in real time.

use crate::Simulation;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// A background task that advances a simulation by `tick * speed` of
/// simulated time every `tick` of real time.
///
/// Stopping cancels the task as a whole: once [`AutoAdvance::stop`] has been
/// called no further tick reaches the simulation.
#[derive(Debug)]
pub struct AutoAdvance {
    simulation: Arc<Mutex<Simulation>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    /// Spawns the task on the current tokio runtime.
    pub fn start(simulation: Arc<Mutex<Simulation>>, tick: Duration, speed: f64) -> Self {
        let cancel = CancellationToken::new();
        let step = tick.mul_f64(speed.max(0.0));
        let token = cancel.clone();
        let shared = simulation.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut simulation = shared.lock().await;
                        if token.is_cancelled() {
                            break;
                        }
                        simulation.advance(step);
                    }
                }
            }
            tracing::debug!(target: "TASK", "auto-advance stopped");
        });
        Self {
            simulation,
            cancel,
            handle,
        }
    }

    /// A token that stops the task when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the task and waits for it to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(error) = self.handle.await {
            tracing::warn!(target: "TASK", %error, "auto-advance task failed");
        }
    }

    /// Stops the task, then resets the simulation it was driving. The reset
    /// only happens once no tick can reach the simulation any more.
    pub async fn reset(self) {
        let simulation = self.simulation.clone();
        self.stop().await;
        simulation.lock().await.reset();
    }
}
