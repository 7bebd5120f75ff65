//! Pipeline simulation

pub mod engine;
pub mod random;
pub mod runner;
pub mod scheduler;

pub use engine::{EventHandler, RunError, SimulationEngine, SimulationEvent};
pub use random::{RandomSource, SequenceRandom, ThreadRandom};
pub use runner::{RunOutcome, ShutdownHandle, SimulationRunner, StopReason};
