//! Time Source Abstraction
//!
//! [`TimeSource`] lets the cycle scheduler and the payload timestamp work the
//! same way on a bare-metal timer, an SNTP-synchronized RTC, or a test clock.

use crate::time::Timestamp;

/// Source of time for the system
///
/// ## Example Implementation
///
/// ```rust
/// use meterline_core::traits::TimeSource;
/// use meterline_core::time::Timestamp;
///
/// struct SntpClock {
///     offset_ms: u64,
///     boot_ms: u64,
/// }
///
/// impl TimeSource for SntpClock {
///     fn now(&self) -> Timestamp {
///         self.offset_ms + self.boot_ms
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current timestamp in milliseconds
    ///
    /// - Monotonic sources: milliseconds since boot
    /// - Wall clock sources: milliseconds since the Unix epoch
    fn now(&self) -> Timestamp;

    /// Whether [`now`](TimeSource::now) is anchored to the Unix epoch
    fn is_wall_clock(&self) -> bool;
}
