// the discrete event simulation layer

use anyhow::{Context, Result};
use log::debug;
use randvals::RandStream;

use crate::event::{Event, EventQueue, Transition};
use crate::policy::Policy;
use crate::process::{ProcState, Process};

pub struct Simulation {
    pub processes: Vec<Process>,
    policy: Policy,
    rng: RandStream,
    queue: EventQueue,
    current_time: i32,
    running: Option<usize>,
    call_scheduler: bool,
    // number of processes currently blocked on io
    io_count: i32,
    cpu_busy_time: i32,
    io_busy_time: i32,
    last_event_time: i32,
}

impl Simulation {
    pub fn new(policy: Policy, rng: RandStream) -> Self {
        Simulation {
            processes: Vec::new(),
            policy,
            rng,
            queue: EventQueue::new(),
            current_time: 0,
            running: None,
            call_scheduler: false,
            io_count: 0,
            cpu_busy_time: 0,
            io_busy_time: 0,
            last_event_time: 0,
        }
    }

    /// Input is whitespace-separated quadruples `AT TC CB IO`, one process
    /// per quadruple. The static priority draw happens here, in input order,
    /// so it consumes the random stream before any burst draw.
    pub fn load_processes(&mut self, input: &str) -> Result<()> {
        let mut tokens = input.split_whitespace().map(|t| {
            t.parse::<i32>()
                .with_context(|| format!("bad number {:?} in input file", t))
        });
        while let Some(at) = tokens.next() {
            let at = at?;
            let tc = tokens.next().context("truncated process quadruple")??;
            let cb = tokens.next().context("truncated process quadruple")??;
            let io = tokens.next().context("truncated process quadruple")??;
            self.add_process(at, tc, cb, io);
        }
        Ok(())
    }

    pub fn add_process(&mut self, at: i32, tc: i32, cb: i32, io: i32) {
        let pid = self.processes.len();
        let static_priority = self.rng.draw(self.policy.maxprio());
        let proc = Process::new(pid, at, tc, cb, io, static_priority);
        debug!(
            "read process {}: arrival={} total_cpu={} cpu_burst={} io_burst={} prio={}",
            pid, at, tc, cb, io, static_priority
        );
        self.processes.push(proc);
        self.queue.push(Event::new(at, pid, Transition::ToReady));
    }

    pub fn run(&mut self) {
        while let Some(evt) = self.queue.pop() {
            let pid = evt.pid;
            self.current_time = evt.timestamp;
            let time_in_prev = self.current_time - self.processes[pid].state_ts;

            if self.processes[pid].state == ProcState::Ready {
                self.processes[pid].cpu_waiting_time += time_in_prev;
            }
            // io-busy counts wall intervals with at least one blocked
            // process, not one interval per blocked process
            if self.io_count > 0 {
                self.io_busy_time += self.current_time - self.last_event_time;
            }
            self.last_event_time = self.current_time;

            debug!(
                "time {}: pid {} {:?} (in prev state {})",
                self.current_time, pid, evt.transition, time_in_prev
            );

            match evt.transition {
                Transition::ToReady => self.on_ready(pid),
                Transition::ToRun => self.on_run(pid),
                Transition::ToBlock => self.on_block(pid, time_in_prev),
                Transition::ToPreempt => self.on_preempt(pid, time_in_prev),
            }

            if self.call_scheduler {
                // drain all events at this timestamp before scheduling
                if self.queue.next_time() == Some(self.current_time) {
                    continue;
                }
                self.call_scheduler = false;
                if self.running.is_none() {
                    if let Some(next) = self.policy.get_next_process() {
                        self.running = Some(next);
                        self.queue
                            .push(Event::new(self.current_time, next, Transition::ToRun));
                    }
                }
            }
        }
    }

    fn on_ready(&mut self, pid: usize) {
        let now = self.current_time;
        {
            let proc = &mut self.processes[pid];
            if proc.state == ProcState::Blocked {
                proc.io_time += now - proc.state_ts;
                self.io_count -= 1;
                proc.dynamic_priority = proc.static_priority - 1;
            }
            proc.state = ProcState::Ready;
            proc.state_ts = now;
        }

        if let Some(rpid) = self.running {
            let running_pending_now = self.queue.has_event_at(rpid, now);
            let preempt = self.policy.test_preempt(
                &self.processes[pid],
                &self.processes[rpid],
                running_pending_now,
            );
            if preempt {
                // the running process has one outstanding event (its burst
                // end or quantum expiry); replace it with an immediate
                // preemption
                self.queue.remove_for(rpid);
                self.queue.push(Event::new(now, rpid, Transition::ToPreempt));
                debug!("time {}: pid {} preempts pid {}", now, pid, rpid);
            }
        }

        self.policy.add_process(&mut self.processes[pid]);
        self.call_scheduler = true;
    }

    fn on_run(&mut self, pid: usize) {
        let now = self.current_time;
        let quantum = self.policy.quantum();
        let proc = &mut self.processes[pid];
        proc.state = ProcState::Running;
        proc.state_ts = now;

        if proc.current_cpu_burst == 0 {
            let burst = self.rng.draw(proc.max_cpu_burst);
            proc.current_cpu_burst = burst.min(proc.cpu_time_remaining);
        }

        if proc.current_cpu_burst > quantum {
            self.queue
                .push(Event::new(now + quantum, pid, Transition::ToPreempt));
        } else {
            self.queue.push(Event::new(
                now + proc.current_cpu_burst,
                pid,
                Transition::ToBlock,
            ));
        }
    }

    fn on_block(&mut self, pid: usize, time_in_prev: i32) {
        let now = self.current_time;
        self.cpu_busy_time += time_in_prev;
        let max_io_burst = self.processes[pid].max_io_burst;
        {
            let proc = &mut self.processes[pid];
            proc.cpu_time_remaining -= proc.current_cpu_burst;
            proc.current_cpu_burst = 0;
            proc.state_ts = now;
        }

        if self.processes[pid].cpu_time_remaining <= 0 {
            let proc = &mut self.processes[pid];
            proc.state = ProcState::Finished;
            proc.finish_time = now;
        } else {
            self.processes[pid].state = ProcState::Blocked;
            self.io_count += 1;
            let io_burst = self.rng.draw(max_io_burst);
            self.queue
                .push(Event::new(now + io_burst, pid, Transition::ToReady));
        }

        self.running = None;
        self.call_scheduler = true;
    }

    fn on_preempt(&mut self, pid: usize, time_in_prev: i32) {
        let now = self.current_time;
        self.cpu_busy_time += time_in_prev;
        {
            let proc = &mut self.processes[pid];
            proc.cpu_time_remaining -= time_in_prev;
            proc.current_cpu_burst -= time_in_prev;
            proc.state = ProcState::Ready;
            proc.state_ts = now;
        }
        self.policy.on_preempt(&mut self.processes[pid]);
        self.policy.add_process(&mut self.processes[pid]);
        self.running = None;
        self.call_scheduler = true;
    }

    pub fn summary(&self) -> Summary {
        let nproc = self.processes.len();
        let last_finish = self
            .processes
            .iter()
            .map(|p| p.finish_time)
            .max()
            .unwrap_or(0);
        let total_turnaround: i32 = self.processes.iter().map(|p| p.turnaround()).sum();
        let total_cpu_wait: i32 = self.processes.iter().map(|p| p.cpu_waiting_time).sum();
        Summary {
            last_finish,
            cpu_util: percent_of(self.cpu_busy_time, last_finish),
            io_util: percent_of(self.io_busy_time, last_finish),
            avg_turnaround: ratio(total_turnaround, nproc),
            avg_cpu_wait: ratio(total_cpu_wait, nproc),
            throughput: percent_of(nproc as i32, last_finish),
        }
    }

    pub fn print_report(&self) {
        println!("{}", self.policy.name());
        for p in &self.processes {
            println!(
                "{:04}: {:4} {:4} {:4} {:4} {:1} | {:5} {:5} {:5} {:5}",
                p.pid,
                p.arrival_time,
                p.total_cpu_time,
                p.max_cpu_burst,
                p.max_io_burst,
                p.static_priority,
                p.finish_time,
                p.turnaround(),
                p.io_time,
                p.cpu_waiting_time
            );
        }
        let s = self.summary();
        println!(
            "SUM: {} {:.2} {:.2} {:.2} {:.2} {:.3}",
            s.last_finish, s.cpu_util, s.io_util, s.avg_turnaround, s.avg_cpu_wait, s.throughput
        );
    }

    pub fn cpu_busy_time(&self) -> i32 {
        self.cpu_busy_time
    }

    pub fn io_busy_time(&self) -> i32 {
        self.io_busy_time
    }
}

pub struct Summary {
    pub last_finish: i32,
    pub cpu_util: f64,
    pub io_util: f64,
    pub avg_turnaround: f64,
    pub avg_cpu_wait: f64,
    pub throughput: f64,
}

fn percent_of(part: i32, whole: i32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

fn ratio(total: i32, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    total as f64 / n as f64
}
