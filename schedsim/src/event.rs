// the event queue: ordered by timestamp, FIFO among equal timestamps

use std::collections::VecDeque;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Transition {
    ToReady,
    ToRun,
    ToBlock,
    ToPreempt,
}

#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub timestamp: i32,
    pub pid: usize,
    pub transition: Transition,
}

impl Event {
    pub fn new(timestamp: i32, pid: usize, transition: Transition) -> Self {
        Event {
            timestamp,
            pid,
            transition,
        }
    }
}

/// Keeps events sorted by timestamp with insertion order preserved among
/// equal timestamps. Insertion scans for the first later event, so a new
/// event lands behind everything already queued for its timestamp; that
/// FIFO tie-break is observable in the simulation output. Also supports
/// pulling a process's single pending event back out, which the preemption
/// path needs.
pub struct EventQueue {
    q: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { q: VecDeque::new() }
    }

    pub fn push(&mut self, evt: Event) {
        let t = evt.timestamp;
        if self.q.back().map_or(true, |m| t >= m.timestamp) {
            self.q.push_back(evt);
            return;
        }
        let i = self
            .q
            .iter()
            .position(|m| m.timestamp > t)
            .unwrap_or(self.q.len());
        self.q.insert(i, evt);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.q.pop_front()
    }

    pub fn next_time(&self) -> Option<i32> {
        self.q.front().map(|e| e.timestamp)
    }

    /// Is there a pending event for `pid` at exactly `time`?
    pub fn has_event_at(&self, pid: usize, time: i32) -> bool {
        self.q
            .iter()
            .take_while(|e| e.timestamp <= time)
            .any(|e| e.pid == pid && e.timestamp == time)
    }

    /// Remove the pending event for `pid`, wherever it sits.
    pub fn remove_for(&mut self, pid: usize) -> Option<Event> {
        let i = self.q.iter().position(|e| e.pid == pid)?;
        self.q.remove(i)
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
