use crate::config::ProcessDetails;
use std::{
    fmt,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Ready,
    Running,
    Blocked,
    Terminated,
}

impl ProcessState {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessState::NotStarted => "not started",
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Blocked => "i/o",
            ProcessState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Point-in-time view of a process, as handed to the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: u16,
    pub priority: u8,
    pub state: ProcessState,
    pub core: Option<u8>,
    pub turnaround: Duration,
    pub wait: Duration,
    pub cpu: Duration,
    pub remaining: Duration,
}

/// A synthetic process moving through the scheduler.
///
/// Timing is kept as checkpoints (launch, burst start, queue entry, past
/// waits) and every metric is recomputed from them for a given `now`, so
/// observing a process any number of times never changes what it reports.
#[derive(Debug)]
pub struct Process {
    pid: u16,
    priority: u8,
    start_time: Duration,
    // Residual time of every burst. CPU entries shrink when a slice is cut short.
    bursts: Vec<Duration>,
    burst_totals: Vec<Duration>,
    total_cpu: Duration,
    current_burst: usize,
    state: ProcessState,
    core: Option<u8>,
    dispatches: u32,
    launch_time: Option<Instant>,
    burst_start: Option<Instant>,
    queued_at: Option<Instant>,
    waits: Vec<Duration>,
    finish_time: Option<Instant>,
}

impl Process {
    /// Creates the process at simulation start. Processes arriving at offset
    /// zero are launched immediately.
    pub fn new(details: &ProcessDetails, sim_start: Instant) -> Self {
        let total_cpu: Duration = details.bursts.iter().step_by(2).sum();
        let mut process = Self {
            pid: details.pid,
            priority: details.priority,
            start_time: details.start_time,
            bursts: details.bursts.clone(),
            burst_totals: details.bursts.clone(),
            total_cpu,
            current_burst: 0,
            state: ProcessState::NotStarted,
            core: None,
            dispatches: 0,
            launch_time: None,
            burst_start: None,
            queued_at: None,
            waits: Vec::new(),
            finish_time: None,
        };
        if details.start_time.is_zero() {
            process.launch(sim_start);
        }
        process
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn core(&self) -> Option<u8> {
        self.core
    }

    pub fn current_burst(&self) -> usize {
        self.current_burst
    }

    pub fn bursts(&self) -> &[Duration] {
        &self.bursts
    }

    pub fn dispatches(&self) -> u32 {
        self.dispatches
    }

    pub fn finish_time(&self) -> Option<Instant> {
        self.finish_time
    }

    pub fn has_arrived(&self, elapsed: Duration) -> bool {
        elapsed >= self.start_time
    }

    /// Residual duration of the current burst, zero once past the end.
    pub fn burst_remaining(&self) -> Duration {
        self.bursts
            .get(self.current_burst)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Time spent in the current burst (or slice of it) so far.
    pub fn burst_elapsed(&self, now: Instant) -> Duration {
        self.burst_start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or(Duration::ZERO)
    }

    /// `NotStarted -> Ready`.
    pub fn launch(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::NotStarted);
        self.launch_time.get_or_insert(now);
        self.enter_ready(now);
    }

    /// `Ready -> Running` on `core`.
    pub fn dispatch(&mut self, core: u8, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Ready);
        if let Some(queued_at) = self.queued_at.take() {
            self.waits.push(now.saturating_duration_since(queued_at));
        }
        self.state = ProcessState::Running;
        self.core = Some(core);
        self.burst_start = Some(now);
        self.dispatches += 1;
    }

    /// `Running -> Ready` before the burst is over. The residual of the
    /// current burst shrinks by the slice just consumed.
    pub fn preempt(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Running);
        let slice = self.burst_elapsed(now);
        if let Some(burst) = self.bursts.get_mut(self.current_burst) {
            *burst = burst.saturating_sub(slice);
        }
        self.burst_start = None;
        self.core = None;
        self.enter_ready(now);
    }

    /// `Running -> Blocked` once the CPU burst is done; the process now sits
    /// on its IO burst.
    pub fn block(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Running);
        self.current_burst += 1;
        self.state = ProcessState::Blocked;
        self.core = None;
        self.burst_start = Some(now);
    }

    pub fn io_complete(&self, now: Instant) -> bool {
        self.state == ProcessState::Blocked && self.burst_elapsed(now) >= self.burst_remaining()
    }

    /// `Blocked -> Ready`, or `Blocked -> Terminated` when the plan has no
    /// CPU burst left after the IO.
    pub fn finish_io(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Blocked);
        self.current_burst += 1;
        self.burst_start = None;
        if self.current_burst < self.bursts.len() {
            self.enter_ready(now);
        } else {
            self.state = ProcessState::Terminated;
            self.finish_time = Some(now);
        }
    }

    /// `Running -> Terminated` after the final CPU burst.
    pub fn terminate(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Running);
        self.current_burst = self.bursts.len();
        self.state = ProcessState::Terminated;
        self.core = None;
        self.burst_start = None;
        self.finish_time = Some(now);
    }

    fn enter_ready(&mut self, now: Instant) {
        self.state = ProcessState::Ready;
        self.queued_at = Some(now);
    }

    pub fn turnaround_time(&self, now: Instant) -> Duration {
        match self.launch_time {
            Some(launch) => self
                .finish_time
                .unwrap_or(now)
                .saturating_duration_since(launch),
            None => Duration::ZERO,
        }
    }

    pub fn wait_time(&self, now: Instant) -> Duration {
        let past: Duration = self.waits.iter().sum();
        match (self.state, self.queued_at) {
            (ProcessState::Ready, Some(queued_at)) => past + now.saturating_duration_since(queued_at),
            _ => past,
        }
    }

    pub fn cpu_time(&self, now: Instant) -> Duration {
        if self.state == ProcessState::Terminated {
            return self.total_cpu;
        }

        let finished: Duration = self
            .burst_totals
            .iter()
            .take(self.current_burst)
            .step_by(2)
            .sum();

        // Only a CPU burst can be partially consumed.
        if self.current_burst % 2 != 0 {
            return finished;
        }
        let residual = self.burst_remaining();
        let earlier_slices = self
            .burst_totals
            .get(self.current_burst)
            .map_or(Duration::ZERO, |total| total.saturating_sub(residual));
        let current_slice = match self.state {
            ProcessState::Running => self.burst_elapsed(now).min(residual),
            _ => Duration::ZERO,
        };
        finished + earlier_slices + current_slice
    }

    pub fn remaining_time(&self, now: Instant) -> Duration {
        self.total_cpu.saturating_sub(self.cpu_time(now))
    }

    pub fn snapshot(&self, now: Instant) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: self.pid,
            priority: self.priority,
            state: self.state,
            core: self.core,
            turnaround: self.turnaround_time(now),
            wait: self.wait_time(now),
            cpu: self.cpu_time(now),
            remaining: self.remaining_time(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn details(start: u64, bursts: &[u64]) -> ProcessDetails {
        ProcessDetails::new(1, 2, ms(start), bursts.iter().copied().map(ms).collect())
    }

    #[test]
    fn initial_state_follows_arrival() {
        let t0 = Instant::now();
        let ready = Process::new(&details(0, &[100]), t0);
        assert_eq!(ready.state(), ProcessState::Ready);
        assert_eq!(ready.turnaround_time(t0 + ms(30)), ms(30));

        let pending = Process::new(&details(500, &[100]), t0);
        assert_eq!(pending.state(), ProcessState::NotStarted);
        assert_eq!(pending.turnaround_time(t0 + ms(30)), Duration::ZERO);
        assert!(!pending.has_arrived(ms(499)));
        assert!(pending.has_arrived(ms(500)));
    }

    #[test]
    fn required_cpu_ignores_io_bursts() {
        let t0 = Instant::now();
        let process = Process::new(&details(0, &[100, 1000, 50]), t0);
        assert_eq!(process.remaining_time(t0), ms(150));
        assert_eq!(process.cpu_time(t0), Duration::ZERO);
    }

    #[test]
    fn full_lifecycle_accounts_every_phase() {
        let t0 = Instant::now();
        let mut process = Process::new(&details(0, &[100, 200, 50]), t0);

        process.dispatch(0, t0 + ms(20));
        assert_eq!(process.core(), Some(0));
        assert_eq!(process.wait_time(t0 + ms(60)), ms(20));
        assert_eq!(process.cpu_time(t0 + ms(60)), ms(40));
        assert_eq!(process.remaining_time(t0 + ms(60)), ms(110));

        process.block(t0 + ms(120));
        assert_eq!(process.state(), ProcessState::Blocked);
        assert_eq!(process.current_burst(), 1);
        assert_eq!(process.core(), None);
        assert_eq!(process.cpu_time(t0 + ms(200)), ms(100));
        assert!(!process.io_complete(t0 + ms(319)));
        assert!(process.io_complete(t0 + ms(320)));

        process.finish_io(t0 + ms(320));
        assert_eq!(process.state(), ProcessState::Ready);
        assert_eq!(process.current_burst(), 2);
        assert_eq!(process.wait_time(t0 + ms(330)), ms(30));

        process.dispatch(1, t0 + ms(330));
        process.terminate(t0 + ms(380));
        assert_eq!(process.state(), ProcessState::Terminated);
        assert_eq!(process.dispatches(), 2);

        let end = t0 + ms(1000);
        assert_eq!(process.turnaround_time(end), ms(380));
        assert_eq!(process.cpu_time(end), ms(150));
        assert_eq!(process.wait_time(end), ms(30));
        assert_eq!(process.remaining_time(end), Duration::ZERO);
        // 150 cpu + 30 wait + 200 io
        assert!(process.turnaround_time(end) >= process.cpu_time(end) + process.wait_time(end));
    }

    #[test]
    fn preemption_keeps_residual_without_double_counting() {
        let t0 = Instant::now();
        let mut process = Process::new(&details(0, &[250]), t0);

        process.dispatch(0, t0);
        process.preempt(t0 + ms(100));
        assert_eq!(process.bursts()[0], ms(150));
        assert_eq!(process.cpu_time(t0 + ms(150)), ms(100));
        assert_eq!(process.wait_time(t0 + ms(150)), ms(50));

        process.dispatch(0, t0 + ms(150));
        assert_eq!(process.cpu_time(t0 + ms(200)), ms(150));
        assert_eq!(process.remaining_time(t0 + ms(200)), ms(100));
        process.preempt(t0 + ms(250));
        assert_eq!(process.bursts()[0], ms(50));

        process.dispatch(0, t0 + ms(260));
        // Late observation never pushes cpu time past the burst.
        assert_eq!(process.cpu_time(t0 + ms(400)), ms(250));
        assert_eq!(process.remaining_time(t0 + ms(400)), Duration::ZERO);
        process.terminate(t0 + ms(310));

        let end = t0 + ms(310);
        assert_eq!(process.dispatches(), 3);
        assert_eq!(process.cpu_time(end), ms(250));
        assert_eq!(process.wait_time(end), ms(60));
        assert_eq!(
            process.turnaround_time(end),
            process.cpu_time(end) + process.wait_time(end)
        );
    }

    #[test]
    fn remaining_time_only_drops_while_running() {
        let t0 = Instant::now();
        let mut process = Process::new(&details(0, &[100, 10, 100]), t0);
        let mut last = process.remaining_time(t0);

        assert_eq!(process.remaining_time(t0 + ms(50)), last);
        process.dispatch(0, t0 + ms(50));
        for step in 0..=10 {
            let now = t0 + ms(50 + step * 10);
            let remaining = process.remaining_time(now);
            assert!(remaining <= last);
            last = remaining;
        }
        process.block(t0 + ms(150));
        assert_eq!(process.remaining_time(t0 + ms(155)), ms(100));
        assert_eq!(process.remaining_time(t0 + ms(900)), ms(100));
    }

    #[test]
    fn snapshots_are_idempotent() {
        let t0 = Instant::now();
        let mut process = Process::new(&details(0, &[300]), t0);
        process.dispatch(3, t0 + ms(10));

        let now = t0 + ms(70);
        let first = process.snapshot(now);
        assert_eq!(first, process.snapshot(now));
        assert_eq!(first, process.snapshot(now));
        assert_eq!(first.core, Some(3));
        assert_eq!(first.state, ProcessState::Running);
        assert_eq!(first.cpu, ms(60));
        assert_eq!(first.remaining, ms(240));
    }

    #[test]
    fn io_at_the_end_of_the_plan_terminates() {
        let t0 = Instant::now();
        let mut process = Process::new(&details(0, &[10, 20]), t0);
        process.dispatch(0, t0);
        process.block(t0 + ms(10));
        process.finish_io(t0 + ms(30));
        assert_eq!(process.state(), ProcessState::Terminated);
        assert_eq!(process.remaining_time(t0 + ms(30)), Duration::ZERO);
    }

    #[test]
    fn state_labels() {
        assert_eq!(ProcessState::Blocked.to_string(), "i/o");
        assert_eq!(format!("{:>12}", ProcessState::NotStarted), " not started");
    }
}
