use super::{Algorithm, Preemption, Process, SchedulerContext};
use log::{debug, trace};
use std::{
    thread,
    time::{Duration, Instant},
};

/// What a core does with the process it holds after one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Terminate,
    Block,
    Preempt(Preemption),
}

/// Checks a running process in order: termination, burst completion, then
/// the algorithm's preemption rule. The first match wins.
pub fn evaluate(
    algorithm: Algorithm,
    running: &Process,
    head: Option<&Process>,
    now: Instant,
) -> Option<Release> {
    if running.remaining_time(now).is_zero() {
        Some(Release::Terminate)
    } else if running.burst_elapsed(now) >= running.burst_remaining() {
        Some(Release::Block)
    } else {
        algorithm
            .preemption(running, head, now)
            .map(Release::Preempt)
    }
}

enum Step {
    Exit,
    Idle,
    Running(Duration),
    Switch,
}

/// Drives processes on one simulated core.
pub struct CoreWorker<'a> {
    id: u8,
    context: &'a SchedulerContext,
    poll: Duration,
    current: Option<Process>,
}

impl<'a> CoreWorker<'a> {
    pub fn new(id: u8, context: &'a SchedulerContext, poll: Duration) -> Self {
        Self {
            id,
            context,
            poll,
            current: None,
        }
    }

    /// Runs until the dispatcher raises the termination flag.
    pub fn run(mut self) {
        debug!("core {} online", self.id);
        loop {
            // Sleeping happens with the lock released.
            match self.step() {
                Step::Exit => break,
                Step::Idle => thread::sleep(self.poll),
                Step::Running(next_event) => thread::sleep(next_event.min(self.poll)),
                Step::Switch => thread::sleep(self.context.context_switch()),
            }
        }
        debug!("core {} offline", self.id);
    }

    fn step(&mut self) -> Step {
        let mut state = self.context.lock();
        let now = Instant::now();
        let slot = self.id as usize;

        if state.all_terminated {
            return Step::Exit;
        }

        let mut process = match self.current.take() {
            Some(process) => process,
            None => match state.ready.pop() {
                Some(mut process) => {
                    process.dispatch(self.id, now);
                    debug!("core {}: dispatched process {}", self.id, process.pid());
                    process
                }
                None => return Step::Idle,
            },
        };

        let algorithm = self.context.algorithm();
        match evaluate(algorithm, &process, state.ready.peek(), now) {
            Some(Release::Terminate) => {
                process.terminate(now);
                debug!("core {}: process {} terminated", self.id, process.pid());
                state.terminated.push(process);
            }
            Some(Release::Block) => {
                process.block(now);
                debug!("core {}: process {} blocked on i/o", self.id, process.pid());
                state.blocked.push(process);
            }
            Some(Release::Preempt(reason)) => {
                process.preempt(now);
                debug!(
                    "core {}: process {} preempted ({reason:?})",
                    self.id,
                    process.pid()
                );
                state.ready.push(process);
            }
            None => {
                let burst_left = process
                    .burst_remaining()
                    .saturating_sub(process.burst_elapsed(now));
                let next_event = algorithm
                    .slice_left(&process, now)
                    .map_or(burst_left, |slice| slice.min(burst_left));
                trace!("core {}: process {} running", self.id, process.pid());
                state.running[slot] = Some(process.snapshot(now));
                self.current = Some(process);
                return Step::Running(next_event);
            }
        }

        state.running[slot] = None;
        Step::Switch
    }
}
