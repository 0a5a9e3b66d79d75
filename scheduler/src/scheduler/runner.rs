use super::{
    CoreWorker, Dispatcher, Process, ProcessState, RunStatistics, SchedulerContext, SnapshotSink,
    DEFAULT_POLL_RATE, DEFAULT_TICK_RATE,
};
use crate::config::SchedulerConfig;
use std::{
    fmt, thread,
    time::{Duration, Instant},
};

/// Outcome of a finished run.
#[derive(Debug)]
pub struct SimulationReport {
    /// Terminated processes, ordered by pid.
    pub processes: Vec<Process>,
    pub statistics: RunStatistics,
    end: Instant,
}

impl SimulationReport {
    pub fn process(&self, pid: u16) -> Option<&Process> {
        self.processes.iter().find(|process| process.pid() == pid)
    }

    pub fn end(&self) -> Instant {
        self.end
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "| {:>5} | {:>8} | {:>9} | {:>9} | {:>8} | {:>10} |",
            "PID", "Priority", "Turn Time", "Wait Time", "CPU Time", "Dispatches"
        )?;
        for process in &self.processes {
            writeln!(
                f,
                "| {:>5} | {:>8} | {:>9.3} | {:>9.3} | {:>8.3} | {:>10} |",
                process.pid(),
                process.priority(),
                process.turnaround_time(self.end).as_secs_f64(),
                process.wait_time(self.end).as_secs_f64(),
                process.cpu_time(self.end).as_secs_f64(),
                process.dispatches()
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", self.statistics)
    }
}

/// Runs one simulation: one thread per core plus the dispatcher on the
/// calling thread.
pub struct ProcessRunner {
    config: SchedulerConfig,
    tick_rate: Duration,
    poll_rate: Duration,
}

impl ProcessRunner {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            tick_rate: DEFAULT_TICK_RATE,
            poll_rate: DEFAULT_POLL_RATE,
        }
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_poll_rate(mut self, poll_rate: Duration) -> Self {
        self.poll_rate = poll_rate;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn run<S: SnapshotSink>(&self, sink: &mut S) -> SimulationReport {
        let config = &self.config;
        let start = Instant::now();
        let context =
            SchedulerContext::new(config.algorithm, config.context_switch, config.cores, start);

        let mut pending = Vec::new();
        {
            let mut state = context.lock();
            for details in &config.processes {
                let process = Process::new(details, start);
                match process.state() {
                    ProcessState::Ready => state.ready.push(process),
                    _ => pending.push(process),
                }
            }
            // No core may dequeue before the initial order is settled.
            state.ready.sort(start);
        }

        let dispatcher =
            Dispatcher::new(&context, pending, config.processes.len(), self.tick_rate);
        thread::scope(|scope| {
            for id in 0..config.cores {
                let worker = CoreWorker::new(id, &context, self.poll_rate);
                scope.spawn(move || worker.run());
            }
            dispatcher.run(sink);
        });

        let state = context.into_state();
        let end = state.finished_at.unwrap_or_else(Instant::now);
        let mut processes = state.terminated;
        processes.sort_by_key(Process::pid);

        let statistics = RunStatistics::compute(
            &processes,
            config.cores,
            start,
            state.half_terminated_at,
            end,
        );

        SimulationReport {
            processes,
            statistics,
            end,
        }
    }
}
