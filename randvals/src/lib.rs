// a cyclic stream of pre-generated random values, read from a file

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// A deterministic random-value stream. The file format is a count followed
/// by that many integers; the cursor wraps around at the end, so the stream
/// never runs dry. Every simulator run owns its own cursor.
pub struct RandStream {
    values: Vec<i32>,
    pos: usize,
}

impl RandStream {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("cannot open random file: {}", path.display()))?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let count: usize = tokens
            .next()
            .context("random file is empty")?
            .parse()
            .context("random file: count expected")?;
        let mut values = Vec::with_capacity(count);
        for tok in tokens.take(count) {
            let v: i32 = tok
                .parse()
                .with_context(|| format!("random file: bad value {:?}", tok))?;
            values.push(v);
        }
        if values.len() < count {
            bail!(
                "random file has {} values, header promised {}",
                values.len(),
                count
            );
        }
        if values.is_empty() {
            bail!("random file holds no values");
        }
        Ok(RandStream { values, pos: 0 })
    }

    /// For tests and in-memory setups.
    pub fn from_values(values: Vec<i32>) -> Self {
        assert!(!values.is_empty());
        RandStream { values, pos: 0 }
    }

    /// The raw value at the cursor.
    pub fn next_value(&mut self) -> i32 {
        if self.pos >= self.values.len() {
            self.pos = 0;
        }
        let v = self.values[self.pos];
        self.pos += 1;
        v
    }

    /// A draw in `1..=n`.
    pub fn draw(&mut self, n: i32) -> i32 {
        1 + self.next_value() % n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_is_one_based() {
        let mut r = RandStream::from_values(vec![0, 1, 9, 10]);
        assert_eq!(r.draw(10), 1);
        assert_eq!(r.draw(10), 2);
        assert_eq!(r.draw(10), 10);
        assert_eq!(r.draw(10), 1);
    }

    #[test]
    fn cursor_wraps() {
        let mut r = RandStream::from_values(vec![3, 7]);
        assert_eq!(r.next_value(), 3);
        assert_eq!(r.next_value(), 7);
        assert_eq!(r.next_value(), 3);
    }

    #[test]
    fn parse_reads_count_then_values() {
        let r = RandStream::parse("4\n10 20\n30 40\n").unwrap();
        assert_eq!(r.values, vec![10, 20, 30, 40]);
    }

    #[test]
    fn parse_rejects_short_file() {
        assert!(RandStream::parse("5\n1 2 3\n").is_err());
        assert!(RandStream::parse("").is_err());
        assert!(RandStream::parse("0\n").is_err());
    }

    #[test]
    fn identical_inputs_identical_draws() {
        let mut a = RandStream::parse("3\n5 6 7").unwrap();
        let mut b = RandStream::parse("3\n5 6 7").unwrap();
        let da: Vec<i32> = (0..10).map(|_| a.draw(4)).collect();
        let db: Vec<i32> = (0..10).map(|_| b.draw(4)).collect();
        assert_eq!(da, db);
    }
}
