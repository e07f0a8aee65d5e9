//! Time-bounded history buffers.
//!
//! Entries are kept in insertion order, which is also time order, so eviction
//! only ever pops from the front.

use std::collections::VecDeque;

use contracts::{Sample, StepEvent};

/// Anything carrying a device timestamp
pub trait Timestamped {
    fn timestamp_ms(&self) -> i64;
}

impl Timestamped for Sample {
    #[inline]
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

impl Timestamped for StepEvent {
    #[inline]
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

/// History bounded by time span rather than count.
///
/// After `evict(now)` every entry satisfies `now - timestamp <= span_ms`.
#[derive(Debug, Clone)]
pub struct TimeWindow<T> {
    entries: VecDeque<T>,
    span_ms: i64,
}

/// Accepted samples, owned by the ingest stage
pub type SampleWindow = TimeWindow<Sample>;

/// Detected steps, owned by the step detector
pub type StepHistory = TimeWindow<StepEvent>;

impl<T: Timestamped> TimeWindow<T> {
    pub fn new(span_ms: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            span_ms: i64::try_from(span_ms).unwrap_or(i64::MAX),
        }
    }

    /// Append and evict relative to the new entry's timestamp
    pub fn push(&mut self, entry: T) {
        let now = entry.timestamp_ms();
        self.entries.push_back(entry);
        self.evict(now);
    }

    /// Drop every entry older than `now - span_ms`
    pub fn evict(&mut self, now: i64) {
        let cutoff = now.saturating_sub(self.span_ms);
        while self
            .entries
            .front()
            .is_some_and(|e| e.timestamp_ms() < cutoff)
        {
            self.entries.pop_front();
        }
    }

    pub fn span_ms(&self) -> i64 {
        self.span_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator {
        self.entries.iter()
    }

    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
