//! Periodic timer driving the engine
//!
//! Simulated time always advances by the configured tick length. The wall
//! clock period is that length divided by the speed factor, so a run can be
//! watched in real time or fast-forwarded.

use crate::{
    execution::{engine::SimulationEngine, random::RandomSource},
    store::PipelineStore,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const MAX_WALL_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Why the runner returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The running set became empty
    Completed,
    Shutdown,
    TickLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub ticks: u64,
    /// Simulated time of the last tick
    pub simulated_end: DateTime<Utc>,
}

/// Requests the runner to stop after the current tick
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }
}

pub struct SimulationRunner<R> {
    store: Arc<Mutex<PipelineStore>>,
    engine: SimulationEngine<R>,
    speed: f64,
    max_ticks: Option<u64>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<R: RandomSource> SimulationRunner<R> {
    pub fn new(store: PipelineStore, engine: SimulationEngine<R>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            store: Arc::new(Mutex::new(store)),
            engine,
            speed: 1.0,
            max_ticks: None,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Wall-clock speed-up factor; values <= 0 are ignored
    pub fn with_speed(mut self, speed: f64) -> Self {
        if speed > 0.0 {
            self.speed = speed;
        }
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            sender: self.shutdown_tx.clone(),
        }
    }

    /// Shared store, for observers rendering progress between ticks
    pub fn store(&self) -> Arc<Mutex<PipelineStore>> {
        self.store.clone()
    }

    pub fn engine(&self) -> &SimulationEngine<R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimulationEngine<R> {
        &mut self.engine
    }

    /// Wall-clock time between ticks, clamped to `[1 ms, 1 day]`
    fn wall_period(&self) -> Duration {
        let secs = self.engine.settings().tick_interval_secs as f64 / self.speed;
        Duration::try_from_secs_f64(secs.max(0.001))
            .unwrap_or(MAX_WALL_PERIOD)
            .min(MAX_WALL_PERIOD)
    }

    /// Tick until no partner is running, shutdown is requested, or the tick
    /// limit is reached
    pub async fn run(&mut self, start: DateTime<Utc>) -> RunOutcome {
        let period = self.wall_period();
        let step = self.engine.settings().tick_interval();
        info!("Runner started (wall period {:?}, speed x{})", period, self.speed);

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick resolves immediately
        interval.tick().await;

        let mut now = start;
        let mut ticks = 0;

        loop {
            let shutdown = *self.shutdown_rx.borrow();
            let reason = if shutdown {
                Some(StopReason::Shutdown)
            } else if self.store.lock().await.running_partners().is_empty() {
                Some(StopReason::Completed)
            } else if self.max_ticks.is_some_and(|max| ticks >= max) {
                Some(StopReason::TickLimit)
            } else {
                None
            };
            if let Some(reason) = reason {
                info!("Runner stopped after {} tick(s): {:?}", ticks, reason);
                return RunOutcome {
                    reason,
                    ticks,
                    simulated_end: now,
                };
            }

            tokio::select! {
                _ = interval.tick() => {}
                _ = self.shutdown_rx.changed() => continue,
            }

            now += step;
            ticks += 1;
            let mut store = self.store.lock().await;
            let events = self.engine.tick(&mut store, now);
            debug!("Simulated {} ({} event(s))", now, events.len());
        }
    }
}
