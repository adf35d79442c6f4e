// io requests

use anyhow::{bail, Context, Result};

/// One disk request. `start_time` is stamped when the head begins servicing
/// it, `end_time` when the head reaches the track.
#[derive(Clone, Copy, Debug)]
pub struct IoRequest {
    pub id: usize,
    pub arrival_time: i32,
    pub track: i32,
    pub start_time: i32,
    pub end_time: i32,
}

impl IoRequest {
    pub fn new(id: usize, arrival_time: i32, track: i32) -> Self {
        IoRequest {
            id,
            arrival_time,
            track,
            start_time: 0,
            end_time: 0,
        }
    }

    pub fn turnaround(&self) -> i32 {
        self.end_time - self.arrival_time
    }

    pub fn wait(&self) -> i32 {
        self.start_time - self.arrival_time
    }
}

/// Parse `arrival_time track` lines; `#` starts a comment.
pub fn parse(input: &str) -> Result<Vec<IoRequest>> {
    let mut requests = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let arrival: i32 = fields
            .next()
            .context("empty request line")?
            .parse()
            .with_context(|| format!("bad arrival time in line {:?}", line))?;
        let track: i32 = fields
            .next()
            .with_context(|| format!("missing track in line {:?}", line))?
            .parse()
            .with_context(|| format!("bad track in line {:?}", line))?;
        if track < 0 {
            bail!("negative track in line {:?}", line);
        }
        requests.push(IoRequest::new(requests.len(), arrival, track));
    }
    if requests.is_empty() {
        bail!("no io requests found in the input file");
    }
    Ok(requests)
}
