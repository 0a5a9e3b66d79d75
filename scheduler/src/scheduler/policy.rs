use super::Process;
use std::{
    cmp::Ordering,
    time::{Duration, Instant},
};

/// Scheduling algorithm of a run. Each variant owns one ordering rule for
/// the ready queue and one preemption rule for running processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// First come, first served.
    Fcfs,
    /// Shortest remaining CPU time first, non-preemptive.
    Sjf,
    RoundRobin { time_slice: Duration },
    /// Lower priority number first; a running process yields to a strictly
    /// higher-priority ready one.
    PreemptivePriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preemption {
    SliceExpired,
    Displaced { by: u16 },
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Fcfs => "First Come First Served",
            Algorithm::Sjf => "Shortest Job First",
            Algorithm::RoundRobin { .. } => "Round Robin",
            Algorithm::PreemptivePriority => "Preemptive Priority",
        }
    }

    /// Whether the ready queue is kept sorted, rather than in arrival order.
    pub fn reorders(&self) -> bool {
        matches!(self, Algorithm::Sjf | Algorithm::PreemptivePriority)
    }

    /// Ready-queue order of two processes. `Equal` keeps insertion order.
    pub fn compare(&self, a: &Process, b: &Process, now: Instant) -> Ordering {
        match self {
            Algorithm::Fcfs | Algorithm::RoundRobin { .. } => Ordering::Equal,
            Algorithm::Sjf => a.remaining_time(now).cmp(&b.remaining_time(now)),
            Algorithm::PreemptivePriority => a.priority().cmp(&b.priority()),
        }
    }

    /// Decides whether `running` must give up its core. `head` is the process
    /// at the front of the ready queue, read under the shared lock.
    pub fn preemption(
        &self,
        running: &Process,
        head: Option<&Process>,
        now: Instant,
    ) -> Option<Preemption> {
        match self {
            Algorithm::RoundRobin { time_slice } if running.burst_elapsed(now) >= *time_slice => {
                Some(Preemption::SliceExpired)
            }
            Algorithm::PreemptivePriority => head
                .filter(|head| head.priority() < running.priority())
                .map(|head| Preemption::Displaced { by: head.pid() }),
            _ => None,
        }
    }

    /// Time until the current slice expires, for algorithms that slice.
    pub fn slice_left(&self, running: &Process, now: Instant) -> Option<Duration> {
        match self {
            Algorithm::RoundRobin { time_slice } => {
                Some(time_slice.saturating_sub(running.burst_elapsed(now)))
            }
            _ => None,
        }
    }
}
