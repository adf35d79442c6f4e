// scheduling policies

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use anyhow::{bail, Result};

use crate::process::Process;

const NO_QUANTUM: i32 = 10_000;
const DEFAULT_MAXPRIO: i32 = 4;

/// The pluggable scheduling discipline. Each variant owns its run queue(s);
/// the event loop only talks to it through the small operation set below.
pub enum Policy {
    Fcfs {
        queue: VecDeque<usize>,
    },
    Lcfs {
        stack: Vec<usize>,
    },
    Srtf {
        // keyed by (cpu_time_remaining, pid); remaining time never changes
        // while a process sits in the queue
        heap: BinaryHeap<Reverse<(i32, usize)>>,
    },
    RoundRobin {
        quantum: i32,
        queue: VecDeque<usize>,
    },
    Prio {
        quantum: i32,
        maxprio: i32,
        preemptive: bool,
        active: Vec<VecDeque<usize>>,
        expired: Vec<VecDeque<usize>>,
    },
}

impl Policy {
    pub fn fcfs() -> Self {
        Policy::Fcfs {
            queue: VecDeque::new(),
        }
    }

    pub fn lcfs() -> Self {
        Policy::Lcfs { stack: Vec::new() }
    }

    pub fn srtf() -> Self {
        Policy::Srtf {
            heap: BinaryHeap::new(),
        }
    }

    pub fn round_robin(quantum: i32) -> Self {
        Policy::RoundRobin {
            quantum,
            queue: VecDeque::new(),
        }
    }

    pub fn prio(quantum: i32, maxprio: i32, preemptive: bool) -> Self {
        Policy::Prio {
            quantum,
            maxprio,
            preemptive,
            active: (0..maxprio).map(|_| VecDeque::new()).collect(),
            expired: (0..maxprio).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Parse a `-s` specification: `F|FCFS`, `L|LCFS`, `S|SRTF`, `R<q>`,
    /// `P<q>[:<maxprio>]`, `E<q>[:<maxprio>]`.
    pub fn from_spec(spec: &str) -> Result<Self> {
        match spec {
            "F" | "FCFS" => return Ok(Policy::fcfs()),
            "L" | "LCFS" => return Ok(Policy::lcfs()),
            "S" | "SRTF" => return Ok(Policy::srtf()),
            _ => {}
        }
        let kind = match spec.chars().next() {
            Some(c) => c,
            None => bail!("scheduler specification required"),
        };
        let rest = &spec[1..];
        match kind {
            'R' => {
                let quantum: i32 = rest.parse().unwrap_or(0);
                if quantum <= 0 {
                    bail!("invalid quantum in scheduler spec {:?}", spec);
                }
                Ok(Policy::round_robin(quantum))
            }
            'P' | 'E' => {
                let (q, mp) = match rest.split_once(':') {
                    Some((q, mp)) => (q.parse().unwrap_or(0), mp.parse().unwrap_or(0)),
                    None => (rest.parse().unwrap_or(0), DEFAULT_MAXPRIO),
                };
                if q <= 0 || mp <= 0 {
                    bail!("invalid quantum/maxprio in scheduler spec {:?}", spec);
                }
                Ok(Policy::prio(q, mp, kind == 'E'))
            }
            _ => bail!("invalid or unsupported scheduler specification: {}", spec),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Policy::Fcfs { .. } => "FCFS".into(),
            Policy::Lcfs { .. } => "LCFS".into(),
            Policy::Srtf { .. } => "SRTF".into(),
            Policy::RoundRobin { quantum, .. } => format!("RR {}", quantum),
            Policy::Prio {
                quantum,
                preemptive: false,
                ..
            } => format!("PRIO {}", quantum),
            Policy::Prio { quantum, .. } => format!("PREPRIO {}", quantum),
        }
    }

    pub fn quantum(&self) -> i32 {
        match self {
            Policy::RoundRobin { quantum, .. } | Policy::Prio { quantum, .. } => *quantum,
            _ => NO_QUANTUM,
        }
    }

    pub fn maxprio(&self) -> i32 {
        match self {
            Policy::Prio { maxprio, .. } => *maxprio,
            _ => DEFAULT_MAXPRIO,
        }
    }

    /// Enqueue a READY process. The priority disciplines place a decayed
    /// process (dynamic priority below zero) on the expired side and reset
    /// its dynamic priority; round robin resets on every re-entry.
    pub fn add_process(&mut self, proc: &mut Process) {
        let pid = proc.pid;
        match self {
            Policy::Fcfs { queue } => queue.push_back(pid),
            Policy::Lcfs { stack } => stack.push(pid),
            Policy::Srtf { heap } => heap.push(Reverse((proc.cpu_time_remaining, pid))),
            Policy::RoundRobin { queue, .. } => {
                proc.dynamic_priority = proc.static_priority - 1;
                queue.push_back(pid);
            }
            Policy::Prio {
                active, expired, ..
            } => {
                if proc.dynamic_priority < 0 {
                    proc.dynamic_priority = proc.static_priority - 1;
                    expired[proc.dynamic_priority as usize].push_back(pid);
                } else {
                    active[proc.dynamic_priority as usize].push_back(pid);
                }
            }
        }
    }

    pub fn get_next_process(&mut self) -> Option<usize> {
        match self {
            Policy::Fcfs { queue } => queue.pop_front(),
            Policy::Lcfs { stack } => stack.pop(),
            Policy::Srtf { heap } => heap.pop().map(|Reverse((_, pid))| pid),
            Policy::RoundRobin { queue, .. } => queue.pop_front(),
            Policy::Prio {
                active, expired, ..
            } => {
                if let Some(pid) = Self::pop_highest(active) {
                    return Some(pid);
                }
                std::mem::swap(active, expired);
                Self::pop_highest(active)
            }
        }
    }

    fn pop_highest(levels: &mut [VecDeque<usize>]) -> Option<usize> {
        levels.iter_mut().rev().find_map(|q| q.pop_front())
    }

    /// Should `incoming` preempt `running` right now? Only the preemptive
    /// priority discipline ever says yes, and it stands down when the
    /// running process already has an event pending at the current time.
    pub fn test_preempt(
        &self,
        incoming: &Process,
        running: &Process,
        running_pending_now: bool,
    ) -> bool {
        match self {
            Policy::Prio {
                preemptive: true, ..
            } => incoming.dynamic_priority > running.dynamic_priority && !running_pending_now,
            _ => false,
        }
    }

    /// Dynamic-priority adjustment on a quantum preemption.
    pub fn on_preempt(&self, proc: &mut Process) {
        match self {
            Policy::RoundRobin { .. } => proc.dynamic_priority = proc.static_priority - 1,
            Policy::Prio { .. } => proc.dynamic_priority -= 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_with_prio(pid: usize, static_prio: i32) -> Process {
        Process::new(pid, 0, 100, 10, 10, static_prio)
    }

    #[test]
    fn spec_strings_parse() {
        assert_eq!(Policy::from_spec("FCFS").unwrap().name(), "FCFS");
        assert_eq!(Policy::from_spec("L").unwrap().name(), "LCFS");
        assert_eq!(Policy::from_spec("S").unwrap().name(), "SRTF");
        assert_eq!(Policy::from_spec("R4").unwrap().name(), "RR 4");
        let p = Policy::from_spec("P2:6").unwrap();
        assert_eq!(p.name(), "PRIO 2");
        assert_eq!(p.maxprio(), 6);
        assert_eq!(Policy::from_spec("E5").unwrap().name(), "PREPRIO 5");
        assert!(Policy::from_spec("R0").is_err());
        assert!(Policy::from_spec("P2:0").is_err());
        assert!(Policy::from_spec("X").is_err());
    }

    #[test]
    fn non_quantum_policies_use_sentinel_quantum() {
        assert_eq!(Policy::from_spec("F").unwrap().quantum(), 10_000);
        assert_eq!(Policy::from_spec("R7").unwrap().quantum(), 7);
    }

    #[test]
    fn srtf_breaks_ties_by_pid() {
        let mut p = Policy::srtf();
        let mut a = proc_with_prio(3, 2);
        let mut b = proc_with_prio(1, 2);
        a.cpu_time_remaining = 50;
        b.cpu_time_remaining = 50;
        p.add_process(&mut a);
        p.add_process(&mut b);
        assert_eq!(p.get_next_process(), Some(1));
        assert_eq!(p.get_next_process(), Some(3));
    }

    #[test]
    fn lcfs_is_a_stack() {
        let mut p = Policy::lcfs();
        for pid in 0..3 {
            p.add_process(&mut proc_with_prio(pid, 2));
        }
        assert_eq!(p.get_next_process(), Some(2));
        assert_eq!(p.get_next_process(), Some(1));
        assert_eq!(p.get_next_process(), Some(0));
        assert_eq!(p.get_next_process(), None);
    }

    #[test]
    fn decayed_process_lands_on_expired_queue() {
        let mut p = Policy::prio(2, 4, false);
        let mut hot = proc_with_prio(0, 4); // dynamic 3
        let mut decayed = proc_with_prio(1, 3);
        decayed.dynamic_priority = -1;
        p.add_process(&mut hot);
        p.add_process(&mut decayed);
        assert_eq!(decayed.dynamic_priority, 2);

        // active side drains first, then the expired side is swapped in
        assert_eq!(p.get_next_process(), Some(0));
        assert_eq!(p.get_next_process(), Some(1));
        assert_eq!(p.get_next_process(), None);
    }

    #[test]
    fn preprio_preempts_only_on_higher_priority_without_pending_event() {
        let pre = Policy::prio(2, 4, true);
        let mut high = proc_with_prio(0, 4);
        let mut low = proc_with_prio(1, 2);
        high.dynamic_priority = 3;
        low.dynamic_priority = 1;
        assert!(pre.test_preempt(&high, &low, false));
        assert!(!pre.test_preempt(&high, &low, true));
        assert!(!pre.test_preempt(&low, &high, false));

        let plain = Policy::prio(2, 4, false);
        assert!(!plain.test_preempt(&high, &low, false));
    }
}
