use std::collections::HashMap;

/// Orders sources so the least recently serviced are visited first.
///
/// A source that has never completed a fetch pass sorts before every
/// serviced source. Only relative recency matters, so each source keeps a
/// single sequence number.
#[derive(Debug, Default)]
pub struct PriorityScheduler {
    next_seq: u64,
    last_serviced: HashMap<String, u64>,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort `sources` ascending by last-serviced recency. Ties (never
    /// serviced) keep their discovery order.
    pub fn order(&self, mut sources: Vec<String>) -> Vec<String> {
        sources.sort_by_key(|source| self.last_serviced.get(source).copied());
        sources
    }

    /// Move `source` to the most recently serviced end.
    pub fn mark_serviced(&mut self, source: &str) {
        self.next_seq += 1;
        self.last_serviced.insert(source.to_string(), self.next_seq);
    }

    pub fn last_serviced(&self, source: &str) -> Option<u64> {
        self.last_serviced.get(source).copied()
    }
}
