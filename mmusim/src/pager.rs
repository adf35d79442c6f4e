// frame replacement policies

use anyhow::{bail, Result};
use randvals::RandStream;

use crate::frame::Frame;
use crate::proc::Proc;

const NRU_RESET_INTERVAL: u64 = 48;
const WORKING_SET_TAU: u64 = 49;

/// The pluggable replacement policy. Each variant keeps its own clock hand
/// or bookkeeping; victims are frame indices and the caller owns the actual
/// unmap/map work.
pub enum Pager {
    Fifo { hand: usize },
    Random { rng: RandStream },
    Clock { hand: usize },
    Nru { hand: usize, last_reset: u64 },
    Aging { hand: usize },
    WorkingSet { hand: usize },
}

impl Pager {
    pub fn from_algo(algo: char, rng: Option<RandStream>) -> Result<Self> {
        Ok(match algo {
            'f' => Pager::Fifo { hand: 0 },
            'r' => match rng {
                Some(rng) => Pager::Random { rng },
                None => bail!("the random pager needs a random file"),
            },
            'c' => Pager::Clock { hand: 0 },
            'e' => Pager::Nru {
                hand: 0,
                last_reset: 0,
            },
            'a' => Pager::Aging { hand: 0 },
            'w' => Pager::WorkingSet { hand: 0 },
            _ => bail!("unknown replacement algorithm: {}", algo),
        })
    }

    /// Pick a victim frame. Only called once every frame is in use, so
    /// every frame back-references a valid (pid, vpage).
    pub fn select_victim_frame(
        &mut self,
        frames: &mut [Frame],
        procs: &mut [Proc],
        inst_count: u64,
    ) -> usize {
        let n = frames.len();
        match self {
            Pager::Fifo { hand } => {
                let victim = *hand;
                *hand = (*hand + 1) % n;
                victim
            }

            Pager::Random { rng } => rng.next_value().rem_euclid(n as i32) as usize,

            Pager::Clock { hand } => loop {
                let f = frames[*hand];
                let pte = &mut procs[f.pid as usize].page_table[f.vpage as usize];
                if !pte.referenced() {
                    let victim = *hand;
                    *hand = (*hand + 1) % n;
                    break victim;
                }
                pte.set_referenced(false);
                *hand = (*hand + 1) % n;
            },

            Pager::Nru { hand, last_reset } => {
                let needs_reset = inst_count - *last_reset >= NRU_RESET_INTERVAL;
                let mut class_victims: [Option<usize>; 4] = [None; 4];
                let mut victim = None;

                let start = *hand;
                let mut i = start;
                loop {
                    let f = frames[i];
                    let pte = &mut procs[f.pid as usize].page_table[f.vpage as usize];
                    let class = ((pte.referenced() as usize) << 1) | pte.modified() as usize;

                    if class_victims[class].is_none() {
                        class_victims[class] = Some(i);
                        if class == 0 && !needs_reset {
                            victim = Some(i);
                            break;
                        }
                    }
                    if needs_reset {
                        pte.set_referenced(false);
                    }

                    i = (i + 1) % n;
                    if i == start {
                        break;
                    }
                }

                if needs_reset {
                    *last_reset = inst_count;
                }
                let victim =
                    victim.unwrap_or_else(|| class_victims.iter().flatten().copied().next().unwrap());
                *hand = (victim + 1) % n;
                victim
            }

            Pager::Aging { hand } => {
                // age every frame first, then take the smallest
                let start = *hand;
                let mut i = start;
                loop {
                    let f = &mut frames[i];
                    let pte = &mut procs[f.pid as usize].page_table[f.vpage as usize];
                    f.age >>= 1;
                    if pte.referenced() {
                        f.age |= 0x8000_0000;
                        pte.set_referenced(false);
                    }
                    i = (i + 1) % n;
                    if i == start {
                        break;
                    }
                }

                let mut victim = start;
                let mut min_age = u32::MAX;
                let mut i = start;
                loop {
                    if frames[i].age < min_age {
                        min_age = frames[i].age;
                        victim = i;
                    }
                    i = (i + 1) % n;
                    if i == start {
                        break;
                    }
                }
                *hand = (victim + 1) % n;
                victim
            }

            Pager::WorkingSet { hand } => {
                let start = *hand;
                let mut victim = None;
                let mut max_age = 0u64;

                let mut i = start;
                loop {
                    let f = &mut frames[i];
                    let pte = &mut procs[f.pid as usize].page_table[f.vpage as usize];
                    let age = inst_count - f.last_used;

                    if !pte.referenced() && age > WORKING_SET_TAU {
                        victim = Some(i);
                        break;
                    }
                    if pte.referenced() {
                        f.last_used = inst_count;
                        pte.set_referenced(false);
                    } else if age > max_age {
                        max_age = age;
                        victim = Some(i);
                    }

                    i = (i + 1) % n;
                    if i == start {
                        break;
                    }
                }

                let victim = victim.unwrap_or(start);
                *hand = (victim + 1) % n;
                victim
            }
        }
    }

    /// Called when a frame gets (re)mapped.
    pub fn reset_age(&self, frame: &mut Frame, inst_count: u64) {
        match self {
            Pager::Aging { .. } => frame.age = 0,
            Pager::WorkingSet { .. } => frame.last_used = inst_count,
            _ => {}
        }
    }
}
