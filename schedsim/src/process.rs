// process control blocks

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ProcState {
    Created,
    Ready,
    Running,
    Blocked,
    Finished,
}

pub struct Process {
    pub pid: usize,
    pub arrival_time: i32,
    pub total_cpu_time: i32,
    pub max_cpu_burst: i32,
    pub max_io_burst: i32,
    pub static_priority: i32,

    pub state: ProcState,
    pub state_ts: i32,
    pub dynamic_priority: i32,
    pub cpu_time_remaining: i32,
    // remaining portion of an active cpu burst, zero when none active
    pub current_cpu_burst: i32,

    pub finish_time: i32,
    pub cpu_waiting_time: i32,
    pub io_time: i32,
}

impl Process {
    pub fn new(pid: usize, at: i32, tc: i32, cb: i32, io: i32, static_priority: i32) -> Self {
        Process {
            pid,
            arrival_time: at,
            total_cpu_time: tc,
            max_cpu_burst: cb,
            max_io_burst: io,
            static_priority,
            state: ProcState::Created,
            state_ts: at,
            dynamic_priority: static_priority - 1,
            cpu_time_remaining: tc,
            current_cpu_burst: 0,
            finish_time: 0,
            cpu_waiting_time: 0,
            io_time: 0,
        }
    }

    pub fn turnaround(&self) -> i32 {
        self.finish_time - self.arrival_time
    }
}
