//! Time-Related Constants
//!
//! Time intervals and conversion factors used for cycle scheduling.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== CYCLE INTERVALS =====

/// Interval between sampling cycles (milliseconds).
///
/// One snapshot per second keeps the display responsive.
pub const SAMPLE_INTERVAL_MS: u32 = 1000;

/// Interval between telemetry transmissions (milliseconds).
///
/// Also reported as `agg.window_s` in the payload.
pub const SEND_INTERVAL_MS: u32 = 5000;
