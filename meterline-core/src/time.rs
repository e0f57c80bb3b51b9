//! Time management for the sampling loop
//!
//! Provides:
//! - [`SystemTime`] wall clock (std only)
//! - [`MockTimeSource`] controllable clock for tests
//! - [`CycleClock`] which stamps each sampling cycle with a sequence number
//! - [`IntervalSchedule`] which gates sampling and sending

use core::cell::Cell;

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Controllable time source for testing
///
/// Uses interior mutability so a test can advance the clock while a
/// [`CycleClock`] holds a shared reference to it.
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    timestamp: Cell<Timestamp>,
    wall_clock: bool,
}

impl MockTimeSource {
    /// Monotonic mock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
            wall_clock: false,
        }
    }

    /// Wall-clock mock starting at `timestamp` (ms since Unix epoch)
    pub fn wall_clock(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
            wall_clock: true,
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }

    fn is_wall_clock(&self) -> bool {
        self.wall_clock
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}

/// Identity of one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleStamp {
    /// Monotonically increasing cycle number, starting at the clock's origin
    pub sequence: u64,
    /// When acquisition for this cycle started
    pub timestamp: Timestamp,
    /// Whether `timestamp` is milliseconds since the Unix epoch
    pub wall_clock: bool,
}

/// Hands out one [`CycleStamp`] per sampling cycle
///
/// The sequence counter lives here, outside the snapshot builder, so a
/// snapshot never depends on state from an earlier cycle.
#[derive(Debug)]
pub struct CycleClock<T> {
    source: T,
    next_sequence: u64,
}

impl<T: TimeSource> CycleClock<T> {
    /// Number cycles from 0
    pub fn new(source: T) -> Self {
        Self::starting_at(source, 0)
    }

    /// Resume numbering at `sequence` (e.g. after a warm restart)
    pub fn starting_at(source: T, sequence: u64) -> Self {
        Self {
            source,
            next_sequence: sequence,
        }
    }

    /// Stamp the next cycle
    pub fn next_stamp(&mut self) -> CycleStamp {
        let stamp = CycleStamp {
            sequence: self.next_sequence,
            timestamp: self.source.now(),
            wall_clock: self.source.is_wall_clock(),
        };
        self.next_sequence = self.next_sequence.wrapping_add(1);
        stamp
    }

    /// Underlying time source
    pub fn source(&self) -> &T {
        &self.source
    }
}

/// Fixed-interval gate driven by a millisecond clock
///
/// The first poll is always due; afterwards a poll is due once `interval_ms`
/// has elapsed since the last due poll. A clock that steps backwards makes
/// the gate wait for the full interval again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSchedule {
    interval_ms: u64,
    last: Option<Timestamp>,
}

impl IntervalSchedule {
    /// Gate that opens every `interval_ms`
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms as u64,
            last: None,
        }
    }

    /// Configured interval
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` and re-arms the gate when the interval has elapsed
    pub fn poll(&mut self, now: Timestamp) -> bool {
        let due = match self.last {
            None => true,
            Some(last) if now < last => {
                self.last = Some(now);
                false
            }
            Some(last) => now - last >= self.interval_ms,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Milliseconds until the next due poll
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        match self.last {
            None => 0,
            Some(last) => self
                .interval_ms
                .saturating_sub(now.saturating_sub(last)),
        }
    }
}
