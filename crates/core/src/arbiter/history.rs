use std::collections::{BTreeMap, VecDeque};

use crate::shared::constants::{HISTORY_CAPACITY, STABLE_MIN_VOTES};
use crate::shared::group::Group;

/// Sliding window of recent per-frame majorities.
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<Group>,
    capacity: usize,
    min_votes: usize,
}

impl History {
    /// `min_votes` is both the minimum window fill before a vote is taken
    /// and the count the winner needs.
    pub fn new(capacity: usize, min_votes: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            min_votes,
        }
    }

    /// Appends `group`, dropping the oldest entry once full.
    pub fn push(&mut self, group: Group) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(group);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Group> {
        self.entries.iter()
    }

    pub fn count(&self, group: &Group) -> usize {
        self.entries.iter().filter(|g| *g == group).count()
    }

    /// The most frequent group if it has at least `min_votes` entries.
    ///
    /// Nothing is decided before the window holds `min_votes` entries. Ties
    /// go to the group earliest in catalog order.
    pub fn stable_majority(&self) -> Option<&Group> {
        if self.entries.len() < self.min_votes {
            return None;
        }
        let mut counts: BTreeMap<&Group, usize> = BTreeMap::new();
        for g in &self.entries {
            *counts.entry(g).or_default() += 1;
        }

        let mut best: Option<(&Group, usize)> = None;
        for (group, n) in counts {
            if best.map_or(true, |(_, top)| n > top) {
                best = Some((group, n));
            }
        }
        best.filter(|(_, n)| *n >= self.min_votes).map(|(g, _)| g)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY, STABLE_MIN_VOTES)
    }
}
