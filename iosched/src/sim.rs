// the head movement loop

use log::debug;

use crate::policy::DiskPolicy;
use crate::request::IoRequest;

#[derive(Clone, Copy, Default)]
pub struct Options {
    pub verbose: bool,     // -v
    pub show_queue: bool,  // -q
    pub show_flook: bool,  // -f
}

pub struct DiskSimulator {
    pub requests: Vec<IoRequest>,
    policy: DiskPolicy,
    opts: Options,

    current_track: i32,
    current_time: i32,
    active: Option<usize>,
    total_movement: i32,
    io_busy_time: i32,
}

impl DiskSimulator {
    pub fn new(policy: DiskPolicy, requests: Vec<IoRequest>, opts: Options) -> Self {
        DiskSimulator {
            requests,
            policy,
            opts,
            current_track: 0,
            current_time: 0,
            active: None,
            total_movement: 0,
            io_busy_time: 0,
        }
    }

    pub fn run(&mut self) {
        if self.opts.verbose {
            println!("TRACE");
        }

        // admissions go by arrival time, ties by id (stable over input order)
        let mut order: Vec<usize> = (0..self.requests.len()).collect();
        order.sort_by_key(|&i| self.requests[i].arrival_time);
        let mut next_arrival = 0;

        loop {
            while next_arrival < order.len()
                && self.requests[order[next_arrival]].arrival_time <= self.current_time
            {
                let idx = order[next_arrival];
                if self.opts.verbose {
                    println!(
                        "{}: {} add {}",
                        self.current_time, self.requests[idx].id, self.requests[idx].track
                    );
                }
                self.policy.add_request(idx);
                if self.opts.show_queue {
                    println!("  {}", self.policy.state(&self.requests));
                }
                next_arrival += 1;
            }

            if self.active.is_none() {
                if let Some(idx) = self.policy.next_request(&self.requests, self.current_track) {
                    let req = &mut self.requests[idx];
                    req.start_time = self.current_time.max(req.arrival_time);
                    if self.opts.verbose {
                        println!(
                            "{}: {} issue {} {}",
                            req.start_time, req.id, req.track, self.current_track
                        );
                    }
                    self.active = Some(idx);
                }
            }

            if let Some(idx) = self.active {
                if self.current_track == self.requests[idx].track {
                    self.finish(idx);
                } else {
                    self.move_head(idx);
                }
            } else if next_arrival == order.len() && self.policy.is_empty() {
                break;
            } else {
                self.current_time += 1;
            }

            if self.opts.show_flook {
                if let DiskPolicy::Flook { .. } = self.policy {
                    println!("  {}", self.policy.state(&self.requests));
                }
            }
        }
    }

    fn finish(&mut self, idx: usize) {
        let req = &mut self.requests[idx];
        req.end_time = self.current_time;
        if self.opts.verbose {
            println!("{}: {} finish {}", self.current_time, req.id, req.turnaround());
        }
        debug!(
            "request {} served: track {} wait {}",
            req.id,
            req.track,
            req.wait()
        );
        self.active = None;
    }

    fn move_head(&mut self, idx: usize) {
        let step = if self.requests[idx].track > self.current_track {
            1
        } else {
            -1
        };
        self.current_track += step;
        self.current_time += 1;
        self.total_movement += 1;
        self.io_busy_time += 1;
    }

    pub fn summary(&self) -> Summary {
        let n = self.requests.len();
        let total_turnaround: i32 = self.requests.iter().map(|r| r.turnaround()).sum();
        let total_wait: i32 = self.requests.iter().map(|r| r.wait()).sum();
        Summary {
            total_time: self.current_time,
            total_movement: self.total_movement,
            io_utilization: if self.current_time > 0 {
                self.io_busy_time as f64 / self.current_time as f64
            } else {
                0.0
            },
            avg_turnaround: total_turnaround as f64 / n as f64,
            avg_wait: total_wait as f64 / n as f64,
            max_wait: self.requests.iter().map(|r| r.wait()).max().unwrap_or(0),
        }
    }

    pub fn print_report(&self) {
        for req in &self.requests {
            println!(
                "{:5}: {:5} {:5} {:5}",
                req.id, req.arrival_time, req.start_time, req.end_time
            );
        }
        let s = self.summary();
        println!(
            "SUM: {} {} {:.4} {:.2} {:.2} {}",
            s.total_time, s.total_movement, s.io_utilization, s.avg_turnaround, s.avg_wait, s.max_wait
        );
    }

    pub fn total_movement(&self) -> i32 {
        self.total_movement
    }

    pub fn total_time(&self) -> i32 {
        self.current_time
    }
}

pub struct Summary {
    pub total_time: i32,
    pub total_movement: i32,
    pub io_utilization: f64,
    pub avg_turnaround: f64,
    pub avg_wait: f64,
    pub max_wait: i32,
}
