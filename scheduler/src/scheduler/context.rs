use super::{Algorithm, Process, ProcessSnapshot, ReadyQueue};
use parking_lot::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Everything the cores and the dispatcher share, behind one lock.
#[derive(Debug)]
pub struct SharedState {
    pub ready: ReadyQueue,
    pub blocked: Vec<Process>,
    pub terminated: Vec<Process>,
    /// Last published view of the process held by each core.
    pub running: Vec<Option<ProcessSnapshot>>,
    pub all_terminated: bool,
    pub half_terminated_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SharedState {
    /// Snapshots of every launched process, ordered by pid.
    pub fn snapshots(&self, now: Instant) -> Vec<ProcessSnapshot> {
        let mut snapshots: Vec<_> = self
            .ready
            .iter()
            .chain(&self.blocked)
            .chain(&self.terminated)
            .map(|process| process.snapshot(now))
            .chain(self.running.iter().flatten().cloned())
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.pid);
        snapshots
    }
}

#[derive(Debug)]
pub struct SchedulerContext {
    algorithm: Algorithm,
    context_switch: Duration,
    cores: u8,
    start: Instant,
    state: Mutex<SharedState>,
}

impl SchedulerContext {
    pub fn new(algorithm: Algorithm, context_switch: Duration, cores: u8, start: Instant) -> Self {
        let state = SharedState {
            ready: ReadyQueue::new(algorithm),
            blocked: Vec::new(),
            terminated: Vec::new(),
            running: vec![None; cores as usize],
            all_terminated: false,
            half_terminated_at: None,
            finished_at: None,
        };

        Self {
            algorithm,
            context_switch,
            cores,
            start,
            state: Mutex::new(state),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn context_switch(&self) -> Duration {
        self.context_switch
    }

    pub fn cores(&self) -> u8 {
        self.cores
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock()
    }

    pub fn into_state(self) -> SharedState {
        self.state.into_inner()
    }
}
