mod context;
mod dispatcher;
mod display;
mod policy;
mod process;
mod queue;
mod runner;
mod stats;
mod worker;

use std::time::Duration;

pub use context::{SchedulerContext, SharedState};
pub use dispatcher::Dispatcher;
pub use display::{DisplayTerminal, PlainTable, SnapshotSink};
pub use policy::{Algorithm, Preemption};
pub use process::{Process, ProcessSnapshot, ProcessState};
pub use queue::ReadyQueue;
pub use runner::{ProcessRunner, SimulationReport};
pub use stats::{RunStatistics, Throughput};
pub use worker::{evaluate, CoreWorker, Release};

/// Dispatcher tick: one sixtieth of a second.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_micros(16_667);

/// Longest a core sleeps between two checks of the process it holds.
pub const DEFAULT_POLL_RATE: Duration = Duration::from_millis(1);
