//! Unbounded dense bucket store.
//!
//! Counts live in a contiguous `Vec<u64>`; slot 0 holds bucket `offset`. The
//! vector grows at either end to cover every index seen so far.

#[derive(Debug, Clone, Default)]
pub struct DenseStore {
    bins: Vec<u64>,
    offset: i32,
    total: u64,
}

impl DenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, index: i32, count: u64) {
        if count == 0 {
            return;
        }
        let slot = self.slot_for(index);
        self.bins[slot] = self.bins[slot].saturating_add(count);
        self.total = self.total.saturating_add(count);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Non-empty buckets in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        let offset = self.offset;
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(move |(i, c)| (offset + i as i32, *c))
    }

    fn slot_for(&mut self, index: i32) -> usize {
        if self.bins.is_empty() {
            self.offset = index;
            self.bins.push(0);
            return 0;
        }
        if index < self.offset {
            // Grow by at least half the current length to keep prepends amortized.
            let needed = (self.offset - index) as usize;
            let grow = needed.max(self.bins.len() / 2);
            self.bins.splice(0..0, std::iter::repeat(0).take(grow));
            self.offset -= grow as i32;
            return (index - self.offset) as usize;
        }
        let slot = (index - self.offset) as usize;
        if slot >= self.bins.len() {
            self.bins.resize(slot + 1, 0);
        }
        slot
    }
}
