use embassy_time::Instant;
use heapless::Deque;

use crate::flicker::{TickEvent, TickReport};
use crate::tick_scheduler::TickResult;

/// One recorded tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    /// When the tick fired
    pub at: Instant,
    pub report: TickReport,
}

/// Ring of the most recent ticks
///
/// N is the number of ticks kept; the oldest is dropped when full.
#[derive(Debug, Default)]
pub struct TickHistory<const N: usize> {
    inner: Deque<TickRecord, N>,
}

impl<const N: usize> TickHistory<N> {
    pub const fn new() -> Self {
        Self {
            inner: Deque::new(),
        }
    }

    /// Record a tick, evicting the oldest one if the ring is full
    pub fn push(&mut self, record: TickRecord) {
        if self.inner.is_full() {
            self.inner.pop_front();
        }
        // Cannot fail, a slot was freed above
        let _ = self.inner.push_back(record);
    }

    /// Record a scheduler result that fired at `at`
    pub fn record(&mut self, at: Instant, result: &TickResult) {
        self.push(TickRecord {
            at,
            report: result.report,
        });
    }

    /// Records from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TickRecord> {
        self.inner.iter()
    }

    pub fn latest(&self) -> Option<&TickRecord> {
        self.inner.back()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Number of bursts started within the kept window
    pub fn bursts_started(&self) -> usize {
        self.iter()
            .filter(|record| matches!(record.report.event, TickEvent::BurstStarted { .. }))
            .count()
    }
}
