//! Pre-roll ring buffer
//!
//! Keeps the most recent `margin` samples while no presence is detected, so a
//! record can start some time before the event that triggered it.

use crate::core::types::Sample;

/// Fixed-capacity circular store of the most recent samples
///
/// Slots are allocated once. `last` points at the most recently written slot
/// and is `None` until the first write after creation or [`reset`](Self::reset).
/// `live` counts the slots written since then, so stale slots from a previous
/// event are never read back.
pub struct PreRollRing {
    slots: Vec<Option<Sample>>,
    last: Option<usize>,
    live: usize,
}

impl PreRollRing {
    /// Create a ring holding up to `margin` samples (0 disables pre-roll)
    pub fn new(margin: usize) -> Self {
        Self {
            slots: vec![None; margin],
            last: None,
            live: 0,
        }
    }

    /// Configured margin
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of samples written since the last reset, capped at capacity
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Store a sample, overwriting the oldest once full. No-op when capacity is 0.
    #[inline]
    pub fn push(&mut self, sample: Sample) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }
        let next = match self.last {
            Some(last) => (last + 1) % capacity,
            None => 0,
        };
        self.slots[next] = Some(sample);
        self.last = Some(next);
        self.live = (self.live + 1).min(capacity);
    }

    /// Slot index of the oldest live sample
    fn oldest_index(&self) -> Option<usize> {
        let last = self.last?;
        let capacity = self.slots.len();
        // Walk back live-1 slots from the newest, wrapping
        Some((last + capacity + 1 - self.live) % capacity)
    }

    /// Oldest live sample, if any
    pub fn oldest(&self) -> Option<&Sample> {
        self.oldest_index().and_then(|i| self.slots[i].as_ref())
    }

    /// Live samples in chronological order (oldest first). Does not mutate.
    pub fn snapshot_chronological(&self) -> Vec<Sample> {
        let Some(first) = self.oldest_index() else {
            return Vec::new();
        };
        let capacity = self.slots.len();
        (0..self.live)
            .filter_map(|i| self.slots[(first + i) % capacity])
            .collect()
    }

    /// Logically empty the ring. Slot contents are left in place.
    pub fn reset(&mut self) {
        self.last = None;
        self.live = 0;
    }
}
