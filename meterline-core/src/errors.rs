//! Error Types for Configuration and Hardware Access
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules as everything else on the sampling path:
//!
//! 1. **Small Size**: Variants carry only `&'static str` reasons and scalars, so
//!    every error is `Copy` and fits in a couple of machine words.
//!
//! 2. **No Heap Allocation**: Nothing here needs `alloc`; the core builds for
//!    bare-metal targets without an allocator.
//!
//! 3. **Two Lifetimes**: A [`ConfigError`] can only be produced while the device
//!    is starting up. A [`HalError`] can be produced on any read, but the
//!    acquisition layer absorbs it into an invalid reading instead of passing
//!    it up the sampling cycle.
//!
//! ## Error Categories
//!
//! ### Configuration Faults (startup only)
//! - `NonPositive` / `NotFinite`: a calibration, reference or resolution
//!   constant that would make derivation meaningless (e.g. zero resolution)
//! - `InvalidBounds`: threshold bounds with `min >= max`
//! - `ConflictingPowerSource`: analog mains sensors and an external meter
//!   wired in the same build
//! - `MissingPeripheral`: a channel is configured but its driver was not handed
//!   to the snapshot builder
//!
//! ### Transient Sensor Faults (any cycle)
//! - `HalError::Timeout`, `HalError::Bus`, `HalError::Unavailable`
//!
//! ```rust
//! use meterline_core::{ConfigError, MeterConfig};
//!
//! let mut config = MeterConfig::default();
//! config.adc.resolution = 0.0;
//!
//! match config.validate() {
//!     Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, "adc.resolution"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for hardware access
pub type HalResult<T> = Result<T, HalError>;

/// Startup-time configuration faults
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A constant that must be strictly positive is zero or negative
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Dotted path of the offending field
        field: &'static str,
        /// The rejected value
        value: f32,
    },

    /// A constant is NaN or infinite
    #[error("{field} is not a finite number")]
    NotFinite {
        /// Dotted path of the offending field
        field: &'static str,
    },

    /// A count that must be at least one is zero
    #[error("{field} must be at least 1")]
    ZeroCount {
        /// Dotted path of the offending field
        field: &'static str,
    },

    /// Lower bound is not below upper bound
    #[error("{field}: lower bound {min} is not below upper bound {max}")]
    InvalidBounds {
        /// Threshold pair being checked
        field: &'static str,
        /// Configured lower bound
        min: f32,
        /// Configured upper bound
        max: f32,
    },

    /// Analog mains channels and an external meter are both configured
    #[error("analog mains channels and an external meter cannot be combined")]
    ConflictingPowerSource,

    /// Two channels claim the same pin
    #[error("pin {pin} is assigned to more than one channel")]
    PinConflict {
        /// The shared pin number
        pin: u8,
    },

    /// A configured channel has no driver attached
    #[error("{channel} is configured but no driver was provided")]
    MissingPeripheral {
        /// Channel name
        channel: &'static str,
    },

    /// Configuration document could not be parsed
    #[error("configuration could not be parsed: {reason}")]
    Parse {
        /// Short description from the loader
        reason: &'static str,
    },
}

/// Hardware access faults reported by platform drivers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// The peripheral did not answer in time
    #[error("peripheral timed out")]
    Timeout,

    /// Bus-level failure (checksum, framing, NACK)
    #[error("bus error: {reason}")]
    Bus {
        /// Short description from the driver
        reason: &'static str,
    },

    /// The peripheral was used before initialization
    #[error("peripheral not initialized")]
    NotInitialized,

    /// The channel or pin does not exist on this board
    #[error("channel {channel} unavailable")]
    Unavailable {
        /// Requested channel or pin
        channel: u8,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonPositive { field, value } =>
                defmt::write!(fmt, "{} must be positive, got {}", field, value),
            Self::NotFinite { field } =>
                defmt::write!(fmt, "{} not finite", field),
            Self::ZeroCount { field } =>
                defmt::write!(fmt, "{} must be >= 1", field),
            Self::InvalidBounds { field, min, max } =>
                defmt::write!(fmt, "{}: {} !< {}", field, min, max),
            Self::ConflictingPowerSource =>
                defmt::write!(fmt, "Conflicting power source"),
            Self::PinConflict { pin } =>
                defmt::write!(fmt, "Pin {} reused", pin),
            Self::MissingPeripheral { channel } =>
                defmt::write!(fmt, "{} has no driver", channel),
            Self::Parse { reason } =>
                defmt::write!(fmt, "Config parse: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::Bus { reason } => defmt::write!(fmt, "Bus: {}", reason),
            Self::NotInitialized => defmt::write!(fmt, "Not initialized"),
            Self::Unavailable { channel } => defmt::write!(fmt, "Channel {} unavailable", channel),
        }
    }
}
