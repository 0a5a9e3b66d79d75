use crate::scheduler::Algorithm;
use serde::Deserialize;
use std::{collections::HashSet, fs, io, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

pub const MAX_PRIORITY: u8 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("at least one core is required")]
    NoCores,
    #[error("round-robin requires a time slice greater than zero")]
    MissingTimeSlice,
    #[error("process {pid}: {reason}")]
    InvalidProcess { pid: u16, reason: &'static str },
    #[error("process id {0} is used more than once")]
    DuplicatePid(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum AlgorithmKind {
    #[serde(rename = "FCFS")]
    Fcfs,
    #[serde(rename = "SJF")]
    Sjf,
    #[serde(rename = "RR")]
    RoundRobin,
    #[serde(rename = "PP")]
    PreemptivePriority,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    cores: u8,
    algorithm: AlgorithmKind,
    #[serde(default)]
    context_switch: u64,
    #[serde(default)]
    time_slice: u64,
    #[serde(default)]
    processes: Vec<RawProcess>,
}

#[derive(Debug, Deserialize)]
struct RawProcess {
    pid: u16,
    #[serde(default)]
    priority: u8,
    #[serde(default)]
    start_time: u64,
    bursts: Vec<u64>,
}

/// Descriptor of one synthetic process, as read from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDetails {
    pub pid: u16,
    pub priority: u8,
    /// Offset after the simulation start at which the process is launched.
    pub start_time: Duration,
    /// Alternating CPU and IO bursts, starting and ending with a CPU burst.
    pub bursts: Vec<Duration>,
}

impl ProcessDetails {
    pub fn new(pid: u16, priority: u8, start_time: Duration, bursts: Vec<Duration>) -> Self {
        Self {
            pid,
            priority,
            start_time,
            bursts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub cores: u8,
    pub algorithm: Algorithm,
    pub context_switch: Duration,
    pub processes: Vec<ProcessDetails>,
}

impl SchedulerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.cores == 0 {
            return Err(ConfigError::NoCores);
        }

        let algorithm = match raw.algorithm {
            AlgorithmKind::Fcfs => Algorithm::Fcfs,
            AlgorithmKind::Sjf => Algorithm::Sjf,
            AlgorithmKind::PreemptivePriority => Algorithm::PreemptivePriority,
            AlgorithmKind::RoundRobin if raw.time_slice == 0 => {
                return Err(ConfigError::MissingTimeSlice)
            }
            AlgorithmKind::RoundRobin => Algorithm::RoundRobin {
                time_slice: Duration::from_millis(raw.time_slice),
            },
        };

        let mut seen = HashSet::new();
        let processes = raw
            .processes
            .into_iter()
            .map(|process| {
                if !seen.insert(process.pid) {
                    return Err(ConfigError::DuplicatePid(process.pid));
                }
                validate_process(&process)?;
                Ok(ProcessDetails::new(
                    process.pid,
                    process.priority,
                    Duration::from_millis(process.start_time),
                    process.bursts.into_iter().map(Duration::from_millis).collect(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cores: raw.cores,
            algorithm,
            context_switch: Duration::from_millis(raw.context_switch),
            processes,
        })
    }
}

fn validate_process(process: &RawProcess) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidProcess {
        pid: process.pid,
        reason,
    };

    if process.priority > MAX_PRIORITY {
        return Err(invalid("priority must be between 0 and 4"));
    }
    if process.bursts.is_empty() {
        return Err(invalid("at least one CPU burst is required"));
    }
    if process.bursts.len() % 2 == 0 {
        return Err(invalid("bursts must start and end with a CPU burst"));
    }
    if process.bursts.contains(&0) {
        return Err(invalid("burst durations must be greater than zero"));
    }
    Ok(())
}

impl FromStr for SchedulerConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_raw(toml::from_str(text)?)
    }
}
