//! Core Traits and Abstractions
//!
//! - [`hal`] - hardware primitives consumed by the acquisition layer
//! - [`time`] - time source abstraction for scheduling and timestamps
//!
//! Both follow the same rule: small traits, static dispatch, no allocation.
//! A board crate implements them once; everything above them is portable and
//! testable on the host with the doubles in [`crate::mock`] (`std` or `mock` feature).

pub mod hal;
pub mod time;

pub use hal::{
    Absent, AnalogInput, ClimateHandle, ClimateSensor, DelayMs, DigitalInput, DigitalOutput,
    Level, MeterSample, PowerMeter,
};

pub use time::TimeSource;

/// Values that can be checked for numeric sanity
pub trait Validatable {
    /// False for NaN and infinities
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}
