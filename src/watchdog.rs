//! Liveness watchdog model
//!
//! The candle has exactly one recovery path: if the supervisor stops feeding
//! the watchdog, the whole device restarts from its initial state. On
//! hardware the watchdog is a peripheral; [`SoftWatchdog`] models it against
//! an externally advanced clock so the host (and the preview) can exercise
//! the restart.

use embassy_time::{Duration, Instant};

use crate::Watchdog;

/// Watchdog timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Longest allowed gap between two feeds
    pub timeout: Duration,
}

impl WatchdogConfig {
    /// 1:262144 divider on the 31 kHz LFINTOSC, about 8 s
    pub const DEFAULT: Self = Self {
        timeout: Duration::from_secs(8),
    };
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Software watchdog driven by synthetic time
#[derive(Debug, Clone)]
pub struct SoftWatchdog {
    timeout: Duration,
    now: Instant,
    last_feed: Instant,
    feeds: u32,
}

impl SoftWatchdog {
    pub const fn new(config: WatchdogConfig) -> Self {
        Self {
            timeout: config.timeout,
            now: Instant::from_millis(0),
            last_feed: Instant::from_millis(0),
            feeds: 0,
        }
    }

    /// Move the watchdog clock forward
    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    /// True once the last feed is older than the timeout
    pub fn is_starved(&self) -> bool {
        self.now.saturating_duration_since(self.last_feed) > self.timeout
    }

    /// Check for starvation and rearm after a bite
    ///
    /// Returns `true` when the device must restart. The watchdog itself
    /// restarts counting from the bite.
    pub fn poll(&mut self) -> bool {
        if !self.is_starved() {
            return false;
        }
        self.last_feed = self.now;
        true
    }

    /// Number of feeds since creation
    pub const fn feeds(&self) -> u32 {
        self.feeds
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Watchdog for SoftWatchdog {
    fn feed(&mut self) {
        self.last_feed = self.now;
        self.feeds = self.feeds.wrapping_add(1);
    }
}
