//! Monotonic id generation
//!
//! Generated ids are `{prefix}-{n}` with `n` drawn from a per-process counter.
//! Wall-clock time is never used, so two ids minted in the same millisecond
//! cannot collide.

/// Per-process id counter shared by every store
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Mint the next id with the given prefix
    pub fn next_id(&mut self, prefix: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("{}-{}", prefix, n)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
