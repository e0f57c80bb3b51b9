//! Signal Acquisition
//!
//! ## Overview
//!
//! The acquirer is the only part of the core that talks to pins. It reduces a
//! burst of raw reads to a small summary and hands that summary to
//! [`derivation`](crate::derivation), which never sees the hardware.
//!
//! ### Analog windows
//!
//! [`acquire_analog`] performs `sample_count` sequential reads with a fixed
//! pause between them and keeps a running sum, minimum and maximum:
//!
//! ```text
//!  code
//!  4000 ┤   ╭─╮       ╭─╮        max ─────────────┐
//!       │  ╱   ╲     ╱   ╲                        │ peak-to-peak
//!   100 ┤─╯     ╰───╯     ╰──    min ─────────────┘
//!       └──────────────────────▶ sample (1 ms apart)
//! ```
//!
//! Only min/max/sum/count survive; the individual samples are never stored.
//!
//! ### Digital votes
//!
//! [`acquire_digital_vote`] samples a line `votes` times and accepts the level
//! only when strictly more than half the reads agree with `active_level`. A
//! tie counts as inactive, so a 2-of-4 vote reports no motion.
//!
//! ## Failure Policy
//!
//! Nothing here returns an error. A failed analog read is counted and left out
//! of the statistics; if every read fails the window is empty and derivation
//! marks the channel invalid. A failed digital read counts as a vote against.

use crate::errors::HalError;
use crate::traits::{AnalogInput, DelayMs, DigitalInput, DigitalOutput, Level};

/// Summary of one analog acquisition window
///
/// Created and consumed within a single sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// ADC channel the window was taken from
    pub channel: u8,
    /// Successful reads folded into the statistics
    pub count: u16,
    /// Reads that returned an error
    pub failed: u16,
    /// Lowest code seen (`u16::MAX` when empty)
    pub min: u16,
    /// Highest code seen (0 when empty)
    pub max: u16,
    /// Sum of all codes
    pub sum: u32,
}

impl RawSample {
    /// Window with no reads folded in yet
    pub const fn empty(channel: u8) -> Self {
        Self {
            channel,
            count: 0,
            failed: 0,
            min: u16::MAX,
            max: 0,
            sum: 0,
        }
    }

    /// Build a window from already-collected codes
    pub fn from_codes(channel: u8, codes: &[u16]) -> Self {
        codes.iter().fold(Self::empty(channel), |mut raw, &code| {
            raw.record(code);
            raw
        })
    }

    /// Fold one successful read into the statistics
    pub fn record(&mut self, code: u16) {
        self.count = self.count.saturating_add(1);
        self.sum = self.sum.saturating_add(code as u32);
        self.min = self.min.min(code);
        self.max = self.max.max(code);
    }

    /// Count one failed read
    pub fn record_failure(&mut self) {
        self.failed = self.failed.saturating_add(1);
    }

    /// True when no read succeeded
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `max - min`, or 0 for an empty window
    pub fn peak_to_peak(&self) -> u16 {
        if self.is_empty() {
            0
        } else {
            self.max - self.min
        }
    }

    /// Average code (the DC bias of an AC sensor), or `None` when empty
    pub fn mean(&self) -> Option<u16> {
        if self.is_empty() {
            None
        } else {
            Some((self.sum / self.count as u32) as u16)
        }
    }
}

/// Read `channel` `sample_count` times, `delay_ms` apart
pub fn acquire_analog<B>(board: &mut B, channel: u8, sample_count: u16, delay_ms: u32) -> RawSample
where
    B: AnalogInput + DelayMs,
{
    let mut raw = RawSample::empty(channel);
    let mut last_error: Option<HalError> = None;

    for _ in 0..sample_count {
        match nb::block!(board.read(channel)) {
            Ok(code) => raw.record(code),
            Err(e) => {
                raw.record_failure();
                last_error = Some(e);
            }
        }
        board.delay_ms(delay_ms);
    }

    if let Some(e) = last_error {
        log_warn!(
            "ADC channel {}: {} of {} reads failed ({})",
            channel,
            raw.failed,
            sample_count,
            e
        );
    }
    raw
}

/// Tally of one digital majority vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    /// Reads that matched the active level
    pub active: u8,
    /// Reads attempted
    pub total: u8,
    /// Reads that returned an error (counted as inactive)
    pub failed: u8,
}

impl VoteTally {
    /// Strict majority: more than half of all reads were active
    pub const fn is_majority(&self) -> bool {
        self.active as u16 * 2 > self.total as u16
    }

    /// True when no read succeeded
    pub const fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }
}

/// Sample `pin` `votes` times, `delay_ms` apart, and count active reads
///
/// No pause follows the final read.
pub fn tally_digital_vote<B>(
    board: &mut B,
    pin: u8,
    votes: u8,
    active_level: Level,
    delay_ms: u32,
) -> VoteTally
where
    B: DigitalInput + DelayMs,
{
    let mut tally = VoteTally { active: 0, total: votes, failed: 0 };

    for i in 0..votes {
        match board.read_level(pin) {
            Ok(level) if level == active_level => tally.active += 1,
            Ok(_) => {}
            Err(e) => {
                tally.failed += 1;
                log_warn!("GPIO {} read failed: {}", pin, e);
            }
        }
        if i + 1 < votes {
            board.delay_ms(delay_ms);
        }
    }
    tally
}

/// Majority vote over `votes` reads of `pin`
///
/// True iff strictly more than half the reads equal `active_level`.
pub fn acquire_digital_vote<B>(
    board: &mut B,
    pin: u8,
    votes: u8,
    active_level: Level,
    delay_ms: u32,
) -> bool
where
    B: DigitalInput + DelayMs,
{
    tally_digital_vote(board, pin, votes, active_level, delay_ms).is_majority()
}

/// Drive an indicator so it mirrors `on`
///
/// Failures are logged and dropped; the indicator never affects readings.
pub fn mirror_indicator<B>(board: &mut B, pin: u8, active_level: Level, on: bool)
where
    B: DigitalOutput,
{
    if let Err(e) = board.write_level(pin, Level::for_state(on, active_level)) {
        log_warn!("indicator GPIO {} write failed: {}", pin, e);
    }
}
