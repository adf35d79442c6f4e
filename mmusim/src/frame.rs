// the global frame table

pub const MAX_FRAMES: usize = 128;

/// One physical frame. `pid`/`vpage` are -1 while the frame is free; `age`
/// is the aging pager's shift register and `last_used` the working-set
/// pager's timestamp — the other pagers ignore both.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    pub pid: i32,
    pub vpage: i32,
    pub age: u32,
    pub last_used: u64,
}

impl Frame {
    pub fn free() -> Self {
        Frame {
            pid: -1,
            vpage: -1,
            age: 0,
            last_used: 0,
        }
    }

    pub fn in_use(&self) -> bool {
        self.pid >= 0
    }

    pub fn release(&mut self) {
        self.pid = -1;
        self.vpage = -1;
    }
}
