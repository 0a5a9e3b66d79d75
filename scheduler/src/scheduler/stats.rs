use super::Process;
use std::{
    fmt,
    time::{Duration, Instant},
};

/// Completed processes per second over `span`, or `None` for an empty span.
fn rate(count: usize, span: Duration) -> Option<f64> {
    (!span.is_zero()).then(|| count as f64 / span.as_secs_f64())
}

fn average(total: Duration, count: usize) -> Option<Duration> {
    (count > 0).then(|| total / count as u32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub first_half: Option<f64>,
    pub second_half: Option<f64>,
    pub overall: Option<f64>,
}

/// End-of-run aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub duration: Duration,
    /// Total CPU time of all processes over the run's wall-clock duration, in percent.
    pub cpu_utilization: Option<f64>,
    /// `cpu_utilization` spread over the cores.
    pub core_utilization: Option<f64>,
    pub throughput: Throughput,
    pub average_turnaround: Option<Duration>,
    pub average_wait: Option<Duration>,
}

impl RunStatistics {
    /// `half` is the instant at which at least half of the processes had
    /// terminated; processes finished by then form the first half.
    pub fn compute(
        processes: &[Process],
        cores: u8,
        start: Instant,
        half: Option<Instant>,
        end: Instant,
    ) -> Self {
        let duration = end.saturating_duration_since(start);
        let total = processes.len();

        let cpu: Duration = processes.iter().map(|p| p.cpu_time(end)).sum();
        let turnaround: Duration = processes.iter().map(|p| p.turnaround_time(end)).sum();
        let wait: Duration = processes.iter().map(|p| p.wait_time(end)).sum();

        let cpu_utilization =
            (!duration.is_zero()).then(|| cpu.as_secs_f64() / duration.as_secs_f64() * 100.0);
        let core_utilization = cpu_utilization.map(|percent| percent / f64::from(cores.max(1)));

        let half = half.unwrap_or(end);
        let first_half = processes
            .iter()
            .filter(|p| p.finish_time().map_or(false, |finished| finished <= half))
            .count();
        let throughput = Throughput {
            first_half: rate(first_half, half.saturating_duration_since(start)),
            second_half: rate(total - first_half, end.saturating_duration_since(half)),
            overall: rate(total, duration),
        };

        Self {
            duration,
            cpu_utilization,
            core_utilization,
            throughput,
            average_turnaround: average(turnaround, total),
            average_wait: average(wait, total),
        }
    }
}

struct Stat<T>(Option<T>);

impl fmt::Display for Stat<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.3}"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Stat<Duration> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.3} s", value.as_secs_f64()),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run time: {:.3} s", self.duration.as_secs_f64())?;
        writeln!(f, "CPU utilization: {} %", Stat(self.cpu_utilization))?;
        writeln!(f, "  per core: {} %", Stat(self.core_utilization))?;
        writeln!(f, "Throughput (processes/s):")?;
        writeln!(f, "  first 50%:  {}", Stat(self.throughput.first_half))?;
        writeln!(f, "  second 50%: {}", Stat(self.throughput.second_half))?;
        writeln!(f, "  overall:    {}", Stat(self.throughput.overall))?;
        writeln!(f, "Average turnaround time: {}", Stat(self.average_turnaround))?;
        write!(f, "Average waiting time: {}", Stat(self.average_wait))
    }
}
