use super::{Algorithm, Process};
use std::{collections::VecDeque, time::Instant};

/// Ready processes, ordered by the run's algorithm.
///
/// FIFO algorithms never reorder. Sorting algorithms use a stable sort, so
/// processes with equal keys keep the order in which they became ready.
#[derive(Debug)]
pub struct ReadyQueue {
    algorithm: Algorithm,
    processes: VecDeque<Process>,
}

impl ReadyQueue {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            processes: VecDeque::new(),
        }
    }

    /// Enqueues at the tail.
    pub fn push(&mut self, process: Process) {
        self.processes.push_back(process);
    }

    pub fn pop(&mut self) -> Option<Process> {
        self.processes.pop_front()
    }

    pub fn peek(&self) -> Option<&Process> {
        self.processes.front()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn sort(&mut self, now: Instant) {
        if !self.algorithm.reorders() {
            return;
        }
        let algorithm = self.algorithm;
        self.processes
            .make_contiguous()
            .sort_by(|a, b| algorithm.compare(a, b, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessDetails;
    use std::time::Duration;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn process(pid: u16, priority: u8, cpu: u64, t0: Instant) -> Process {
        Process::new(&ProcessDetails::new(pid, priority, ms(0), vec![ms(cpu)]), t0)
    }

    fn drain(queue: &mut ReadyQueue) -> Vec<u16> {
        std::iter::from_fn(|| queue.pop()).map(|p| p.pid()).collect()
    }

    fn filled(algorithm: Algorithm, t0: Instant) -> ReadyQueue {
        let mut queue = ReadyQueue::new(algorithm);
        queue.push(process(1, 3, 400, t0));
        queue.push(process(2, 1, 100, t0));
        queue.push(process(3, 3, 100, t0));
        queue.push(process(4, 0, 900, t0));
        queue.push(process(5, 1, 400, t0));
        queue
    }

    #[test]
    fn fifo_algorithms_keep_insertion_order() {
        let t0 = Instant::now();
        for algorithm in [Algorithm::Fcfs, Algorithm::RoundRobin { time_slice: ms(50) }] {
            let mut queue = filled(algorithm, t0);
            queue.sort(t0);
            assert_eq!(drain(&mut queue), vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn sjf_sorts_by_remaining_time_with_stable_ties() {
        let t0 = Instant::now();
        let mut queue = filled(Algorithm::Sjf, t0);
        queue.sort(t0);
        assert_eq!(queue.peek().map(Process::pid), Some(2));
        assert_eq!(drain(&mut queue), vec![2, 3, 1, 5, 4]);
    }

    #[test]
    fn sjf_uses_residual_after_preemption() {
        let t0 = Instant::now();
        let mut queue = ReadyQueue::new(Algorithm::Sjf);
        let mut partly_run = process(1, 0, 500, t0);
        partly_run.dispatch(0, t0);
        partly_run.preempt(t0 + ms(450));
        queue.push(process(2, 0, 100, t0));
        queue.push(partly_run);

        queue.sort(t0 + ms(450));
        assert_eq!(drain(&mut queue), vec![1, 2]);
    }

    #[test]
    fn priority_sorts_by_priority_with_stable_ties() {
        let t0 = Instant::now();
        let mut queue = filled(Algorithm::PreemptivePriority, t0);
        queue.sort(t0);
        assert_eq!(drain(&mut queue), vec![4, 2, 5, 1, 3]);
    }

    #[test]
    fn push_appends_until_next_sort() {
        let t0 = Instant::now();
        let mut queue = filled(Algorithm::PreemptivePriority, t0);
        queue.sort(t0);
        queue.push(process(6, 0, 10, t0));
        assert_eq!(queue.iter().last().map(Process::pid), Some(6));

        queue.sort(t0);
        assert_eq!(queue.len(), 6);
        assert_eq!(drain(&mut queue), vec![4, 6, 2, 5, 1, 3]);
        assert!(queue.is_empty());
    }
}
