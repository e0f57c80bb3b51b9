//! Sensor acquisition core for the Meterline energy meter
//!
//! Samples AC mains sensors, a motion detector and a climate sensor, turns raw
//! codes into calibrated values, evaluates alarm thresholds and freezes the
//! result into one immutable snapshot per cycle.
//!
//! Key constraints:
//! - Runs on an ESP32 without an allocator
//! - Single-threaded, run-to-completion cycles
//! - A bad reading never stops the sampling loop
//!
//! ```text
//! acquisition ──▶ derivation ──▶ threshold ──▶ snapshot ──▶ (payload encoder)
//! ```
//!
//! ```no_run
//! use meterline_core::{MeterConfig, SnapshotBuilder, Peripherals};
//! use meterline_core::time::{CycleClock, SystemTime};
//! # use meterline_core::traits::*;
//! # use meterline_core::errors::*;
//! # struct Board;
//! # impl AnalogInput for Board { fn read(&mut self, _: u8) -> nb::Result<u16, HalError> { Ok(0) } }
//! # impl DigitalInput for Board { fn read_level(&mut self, _: u8) -> HalResult<Level> { Ok(Level::Low) } }
//! # impl DigitalOutput for Board { fn write_level(&mut self, _: u8, _: Level) -> HalResult<()> { Ok(()) } }
//! # impl DelayMs for Board { fn delay_ms(&mut self, _: u32) {} }
//!
//! let config = MeterConfig { climate: None, ..MeterConfig::default() };
//! let mut builder = SnapshotBuilder::new(&config, Peripherals::new(Board))?;
//! let mut clock = CycleClock::new(SystemTime);
//!
//! let snapshot = builder.build(clock.next_stamp());
//! if snapshot.flags().any() {
//!     // raise the alarm
//! }
//! # Ok::<(), ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(any(test, feature = "std", feature = "mock"))]
extern crate alloc;

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

pub mod acquisition;
pub mod config;
pub mod constants;
pub mod derivation;
pub mod display;
pub mod errors;
pub mod numeric;
pub mod snapshot;
pub mod threshold;
pub mod time;
pub mod traits;

#[cfg(any(test, feature = "std", feature = "mock"))]
pub mod mock;

// Public API
pub use acquisition::{acquire_analog, acquire_digital_vote, RawSample};
pub use config::MeterConfig;
pub use derivation::{
    derive_analog_quantity, derive_environmental, derive_from_external_meter, DerivedReading,
    MeterReading,
};
pub use errors::{ConfigError, ConfigResult, HalError, HalResult};
pub use snapshot::{Peripherals, SensorSnapshot, SnapshotBuilder};
pub use threshold::{evaluate, Bounds, ThresholdFlags};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
