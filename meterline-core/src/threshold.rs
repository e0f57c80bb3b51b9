//! Threshold Evaluation
//!
//! Compares derived readings against configured safe ranges and produces the
//! alarm flags carried by every snapshot.
//!
//! ## Rules
//!
//! ```text
//! reading.valid == false           → false   (missing data never alarms)
//! two-sided [lower, upper]         → value < lower || value > upper
//! one-sided (upper only)           → value > upper
//! ```
//!
//! Both comparisons are strict, so a value sitting exactly on a bound is in
//! range. Evaluation is stateless: no hysteresis and no debounce window, each
//! cycle is judged on its own readings.

use crate::config::ThresholdConfig;
use crate::derivation::DerivedReading;

/// Safe range for one quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// `None` for quantities that only alarm when too high
    pub lower: Option<f32>,
    /// Highest safe value
    pub upper: f32,
}

impl Bounds {
    /// Alarm below `lower` or above `upper`
    pub const fn two_sided(lower: f32, upper: f32) -> Self {
        Self { lower: Some(lower), upper }
    }

    /// Alarm above `upper` only
    pub const fn upper(upper: f32) -> Self {
        Self { lower: None, upper }
    }

    /// Whether `value` falls outside this range
    pub fn violated_by(&self, value: f32) -> bool {
        let below = self.lower.is_some_and(|lower| value < lower);
        below || value > self.upper
    }
}

/// Alarm state of one reading; always `false` for invalid readings
pub fn evaluate(reading: &DerivedReading, bounds: &Bounds) -> bool {
    reading.valid && bounds.violated_by(reading.value)
}

/// Alarm flags for one sampling cycle
///
/// A flag whose channel is not fitted stays `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ThresholdFlags {
    /// Mains voltage below `volt_min` or above `volt_max`
    pub voltage_out_of_range: bool,
    /// Load current above `current_max`
    pub current_overlimit: bool,
    /// Room temperature outside `temp_low..temp_high`
    pub temp_out_of_range: bool,
    /// Relative humidity outside `hum_low..hum_high`
    pub hum_out_of_range: bool,
}

impl ThresholdFlags {
    /// True when any alarm is raised
    pub fn any(&self) -> bool {
        self.voltage_out_of_range
            || self.current_overlimit
            || self.temp_out_of_range
            || self.hum_out_of_range
    }
}

/// The four configured ranges, in evaluation-ready form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    /// Mains voltage band in volts
    pub voltage: Bounds,
    /// Current ceiling in amperes
    pub current: Bounds,
    /// Temperature band in degrees Celsius
    pub temperature: Bounds,
    /// Relative humidity band in percent
    pub humidity: Bounds,
}

impl From<&ThresholdConfig> for ThresholdSet {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            voltage: Bounds::two_sided(config.volt_min, config.volt_max),
            current: Bounds::upper(config.current_max),
            temperature: Bounds::two_sided(config.temp_low, config.temp_high),
            humidity: Bounds::two_sided(config.hum_low, config.hum_high),
        }
    }
}
