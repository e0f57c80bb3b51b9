//! Constants for Meterline Core
//!
//! Centralized defaults for the reference hardware. Every value here is only a
//! default: the running firmware reads the validated
//! [`MeterConfig`](crate::config::MeterConfig) instead.
//!
//! ## Organization
//!
//! - **Adc**: converter reference, resolution and sampling pacing
//! - **Sensors**: pins and calibration factors per physical sensor
//! - **Thresholds**: default alarm bounds
//! - **Time**: conversions and cycle intervals

/// Converter reference, resolution and sampling pacing.
pub mod adc;

/// Pin assignments and calibration factors for the reference board.
pub mod sensors;

/// Default alarm bounds.
pub mod thresholds;

/// Time conversions and cycle intervals.
pub mod time;

pub use adc::{ADC_REFERENCE_V, ADC_RESOLUTION, ANALOG_SAMPLE_COUNT, DIGITAL_VOTES};
pub use thresholds::{CURRENT_MAX, HUM_HIGH, HUM_LOW, TEMP_HIGH, TEMP_LOW, VOLT_MAX, VOLT_MIN};
pub use time::{MS_PER_SECOND, SAMPLE_INTERVAL_MS, SEND_INTERVAL_MS};
