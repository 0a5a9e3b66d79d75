use super::{Process, ProcessState, SchedulerContext, SnapshotSink};
use log::{debug, info};
use std::{
    mem, thread,
    time::{Duration, Instant},
};

/// Admission and bookkeeping loop, run on the simulation's main thread.
pub struct Dispatcher<'a> {
    context: &'a SchedulerContext,
    pending: Vec<Process>,
    total: usize,
    tick_rate: Duration,
}

impl<'a> Dispatcher<'a> {
    /// `pending` holds the processes that are not launched yet; `total`
    /// counts every process of the run.
    pub fn new(
        context: &'a SchedulerContext,
        pending: Vec<Process>,
        total: usize,
        tick_rate: Duration,
    ) -> Self {
        Self {
            context,
            pending,
            total,
            tick_rate,
        }
    }

    /// Ticks until every process has terminated.
    pub fn run<S: SnapshotSink>(mut self, sink: &mut S) {
        info!(
            "dispatching {} processes on {} cores ({})",
            self.total,
            self.context.cores(),
            self.context.algorithm().name()
        );
        while !self.tick(sink) {
            thread::sleep(self.tick_rate);
        }
        info!("all processes terminated");
    }

    /// One pass under the lock. Returns true once the run is over.
    fn tick<S: SnapshotSink>(&mut self, sink: &mut S) -> bool {
        let (snapshots, done) = {
            let mut state = self.context.lock();
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(self.context.start());

            let (arrived, pending) = mem::take(&mut self.pending)
                .into_iter()
                .partition::<Vec<_>, _>(|process| process.has_arrived(elapsed));
            self.pending = pending;
            for mut process in arrived {
                process.launch(now);
                debug!("process {} launched", process.pid());
                state.ready.push(process);
            }

            let (finished_io, blocked) = mem::take(&mut state.blocked)
                .into_iter()
                .partition::<Vec<_>, _>(|process| process.io_complete(now));
            state.blocked = blocked;
            for mut process in finished_io {
                process.finish_io(now);
                if process.state() == ProcessState::Terminated {
                    debug!("process {} terminated after i/o", process.pid());
                    state.terminated.push(process);
                } else {
                    debug!("process {} back from i/o", process.pid());
                    state.ready.push(process);
                }
            }

            state.ready.sort(now);

            let terminated = state.terminated.len();
            if state.half_terminated_at.is_none() && terminated * 2 >= self.total {
                state.half_terminated_at = Some(now);
            }
            if terminated == self.total {
                state.all_terminated = true;
                state.finished_at = Some(now);
            }

            (state.snapshots(now), state.all_terminated)
        };

        sink.show(&snapshots);
        done
    }
}
