//! Calibration & Derivation
//!
//! Converts acquisition summaries into physical units. Every function here is
//! pure: same inputs, same [`DerivedReading`].
//!
//! ## Analog AC quantities
//!
//! ```text
//! peak_to_peak = max - min                          (codes)
//! swing_v      = peak_to_peak / resolution * vref   (volts at the ADC pin)
//! value        = swing_v * calibration / 2          (V or A)
//! ```
//!
//! The final `/ 2` turns a peak-to-peak swing into an amplitude. This is an
//! approximation for clean sinusoids, not a sampled root-mean-square: no
//! squaring, no integration, no 1/√2 factor. Calibration factors on deployed
//! boards were tuned against exactly this formula, so it must stay as is.
//!
//! A channel is *active* only when the swing clears its activity threshold
//! (strictly greater). Below that the transformer is idle or disconnected and
//! the computed value is noise.
//!
//! ## External meter
//!
//! A serial power meter already reports physical units. The only decision is
//! whether the meter answered: voltage must be a number and above zero.
//!
//! ## Environmental
//!
//! Temperature and humidity pass through unchanged, except that NaN becomes an
//! explicit invalid reading so it cannot reach threshold comparisons.
//!
//! Division by the ADC resolution is safe here because
//! [`MeterConfig::validate`](crate::config::MeterConfig::validate) rejects a
//! zero or negative resolution at startup.

use crate::acquisition::RawSample;
use crate::traits::{MeterSample, Validatable};

/// A physical value plus whether it can be trusted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedReading {
    /// Value in physical units (meaningless when `valid` is false)
    pub value: f32,
    /// Signal was live (analog), answered (meter) or read cleanly (climate)
    pub valid: bool,
}

impl DerivedReading {
    /// Trusted value
    pub const fn valid(value: f32) -> Self {
        Self { value, valid: true }
    }

    /// Untrusted value that is still worth reporting (e.g. analog noise level)
    pub const fn inactive(value: f32) -> Self {
        Self { value, valid: false }
    }

    /// No usable value at all
    pub const fn invalid() -> Self {
        Self { value: 0.0, valid: false }
    }

    /// Wrap a driver value, mapping NaN and infinities to [`invalid`](Self::invalid)
    pub fn from_measurement(value: f32) -> Self {
        if value.is_valid() {
            Self::valid(value)
        } else {
            Self::invalid()
        }
    }

    /// The value if the reading is valid
    pub fn get(&self) -> Option<f32> {
        self.valid.then_some(self.value)
    }
}

/// Peak-to-peak/2 amplitude estimate for an AC sensor window
pub fn derive_analog_quantity(
    raw: &RawSample,
    calibration: f32,
    adc_reference: f32,
    adc_resolution: f32,
    activity_threshold: u16,
) -> DerivedReading {
    if raw.is_empty() {
        return DerivedReading::invalid();
    }

    let peak_to_peak = raw.peak_to_peak();
    let swing_v = (peak_to_peak as f32 / adc_resolution) * adc_reference;
    let value = swing_v * calibration / 2.0;

    if peak_to_peak > activity_threshold {
        DerivedReading::valid(value)
    } else {
        DerivedReading::inactive(value)
    }
}

/// Readings taken from a serial power meter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    /// Meter answered with a live voltage
    pub active: bool,
    /// RMS voltage in volts
    pub voltage: DerivedReading,
    /// RMS current in amperes
    pub current: DerivedReading,
    /// Active power in watts
    pub power: DerivedReading,
    /// Accumulated energy in kilowatt-hours
    pub energy: DerivedReading,
    /// Line frequency in hertz
    pub frequency: DerivedReading,
    /// Power factor, 0 to 1
    pub power_factor: DerivedReading,
}

/// Take meter values as-is; active iff voltage is present and above zero
pub fn derive_from_external_meter(sample: &MeterSample) -> MeterReading {
    let active = sample.voltage.is_valid() && sample.voltage > 0.0;
    let take = |value: f32| {
        if active {
            DerivedReading::from_measurement(value)
        } else {
            DerivedReading::invalid()
        }
    };

    MeterReading {
        active,
        voltage: take(sample.voltage),
        current: take(sample.current),
        power: take(sample.power),
        energy: take(sample.energy),
        frequency: take(sample.frequency),
        power_factor: take(sample.power_factor),
    }
}

/// Pass temperature and humidity through, NaN becoming invalid
pub fn derive_environmental(raw_temp: f32, raw_humidity: f32) -> (DerivedReading, DerivedReading) {
    (
        DerivedReading::from_measurement(raw_temp),
        DerivedReading::from_measurement(raw_humidity),
    )
}
