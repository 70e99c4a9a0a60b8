use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 20;

/// Fixed-capacity time series; pushing past capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingHistory<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> RollingHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.samples.iter().copied()
    }
}

impl<T: Copy> Default for RollingHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
