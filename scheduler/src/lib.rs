//! Multi-core CPU scheduling simulator.
//!
//! Synthetic processes with alternating CPU and IO bursts are scheduled on a
//! fixed number of simulated cores, one thread each, under FCFS, SJF,
//! round-robin or preemptive priority scheduling.

pub mod config;
pub mod scheduler;
