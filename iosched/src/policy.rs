// disk head scheduling policies

use std::collections::VecDeque;

use anyhow::{bail, Result};

use crate::request::IoRequest;

/// The pluggable head discipline. Variants queue request indices; the track
/// lookups go through the shared request slice so the selection rules can
/// compare seek distances.
pub enum DiskPolicy {
    Fifo {
        queue: VecDeque<usize>,
    },
    Sstf {
        queue: Vec<usize>,
    },
    Look {
        queue: Vec<usize>,
        up: bool,
    },
    Clook {
        queue: Vec<usize>,
    },
    // two queues: arrivals land on `add` and only become visible when the
    // active queue drains; the sweep direction survives the swap
    Flook {
        active: Vec<usize>,
        add: Vec<usize>,
        up: bool,
    },
}

impl DiskPolicy {
    pub fn from_algo(algo: char) -> Result<Self> {
        Ok(match algo {
            'N' => DiskPolicy::Fifo {
                queue: VecDeque::new(),
            },
            'S' => DiskPolicy::Sstf { queue: Vec::new() },
            'L' => DiskPolicy::Look {
                queue: Vec::new(),
                up: true,
            },
            'C' => DiskPolicy::Clook { queue: Vec::new() },
            'F' => DiskPolicy::Flook {
                active: Vec::new(),
                add: Vec::new(),
                up: true,
            },
            _ => bail!("invalid scheduler type: {}", algo),
        })
    }

    pub fn add_request(&mut self, idx: usize) {
        match self {
            DiskPolicy::Fifo { queue } => queue.push_back(idx),
            DiskPolicy::Sstf { queue }
            | DiskPolicy::Look { queue, .. }
            | DiskPolicy::Clook { queue } => queue.push(idx),
            DiskPolicy::Flook { add, .. } => add.push(idx),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DiskPolicy::Fifo { queue } => queue.is_empty(),
            DiskPolicy::Sstf { queue }
            | DiskPolicy::Look { queue, .. }
            | DiskPolicy::Clook { queue } => queue.is_empty(),
            DiskPolicy::Flook { active, add, .. } => active.is_empty() && add.is_empty(),
        }
    }

    pub fn next_request(&mut self, requests: &[IoRequest], current_track: i32) -> Option<usize> {
        match self {
            DiskPolicy::Fifo { queue } => queue.pop_front(),

            DiskPolicy::Sstf { queue } => {
                let pos = queue
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, &idx)| (requests[idx].track - current_track).abs())
                    .map(|(pos, _)| pos)?;
                Some(queue.remove(pos))
            }

            DiskPolicy::Look { queue, up } => {
                let pos = match sweep_closest(queue, requests, current_track, *up) {
                    Some(pos) => pos,
                    None => {
                        *up = !*up;
                        sweep_closest(queue, requests, current_track, *up)?
                    }
                };
                Some(queue.remove(pos))
            }

            DiskPolicy::Clook { queue } => {
                if queue.is_empty() {
                    return None;
                }
                // onward in the up direction, or wrap to the lowest track
                let pos = sweep_closest(queue, requests, current_track, true).unwrap_or_else(|| {
                    queue
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, &idx)| requests[idx].track)
                        .map(|(pos, _)| pos)
                        .unwrap()
                });
                Some(queue.remove(pos))
            }

            DiskPolicy::Flook { active, add, up } => {
                if active.is_empty() {
                    if add.is_empty() {
                        return None;
                    }
                    std::mem::swap(active, add);
                }
                let pos = match sweep_closest(active, requests, current_track, *up) {
                    Some(pos) => pos,
                    None => {
                        *up = !*up;
                        sweep_closest(active, requests, current_track, *up)?
                    }
                };
                Some(active.remove(pos))
            }
        }
    }

    /// Queue contents for the `-q`/`-f` diagnostics, in `id:track` pairs.
    pub fn state(&self, requests: &[IoRequest]) -> String {
        let fmt = |q: &[usize]| {
            q.iter()
                .map(|&idx| format!("{}:{} ", requests[idx].id, requests[idx].track))
                .collect::<String>()
        };
        match self {
            DiskPolicy::Fifo { queue } => {
                let items: Vec<usize> = queue.iter().copied().collect();
                format!("Queue: [{}]", fmt(&items))
            }
            DiskPolicy::Sstf { queue }
            | DiskPolicy::Look { queue, .. }
            | DiskPolicy::Clook { queue } => format!("Queue: [{}]", fmt(queue)),
            DiskPolicy::Flook { active, add, .. } => {
                format!("Active: [{}] Add: [{}]", fmt(active), fmt(add))
            }
        }
    }
}

/// The closest queued request in the given sweep direction (a request on
/// the current track counts for either direction). Ties go to the earliest
/// queue position.
fn sweep_closest(
    queue: &[usize],
    requests: &[IoRequest],
    current_track: i32,
    up: bool,
) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (pos, &idx) in queue.iter().enumerate() {
        let track = requests[idx].track;
        let in_direction = if up {
            track >= current_track
        } else {
            track <= current_track
        };
        if !in_direction {
            continue;
        }
        let distance = (track - current_track).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((pos, distance));
        }
    }
    best.map(|(pos, _)| pos)
}
