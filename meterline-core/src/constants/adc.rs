//! ADC and Sampling Constants
//!
//! Defaults for the ESP32 SAR ADC as used by the mains sensors. Boards with a
//! different converter override these through [`crate::config::AdcConfig`].

/// ADC reference voltage (V).
///
/// ESP32 full-scale input with 11 dB attenuation is nominally 3.3 V.
pub const ADC_REFERENCE_V: f32 = 3.3;

/// ADC full-scale code for a 12-bit converter.
///
/// Used as the divisor when normalizing peak-to-peak codes to volts.
pub const ADC_RESOLUTION: f32 = 4095.0;

/// Samples per analog acquisition window.
///
/// 100 reads at 1 ms pacing cover five full 50 Hz mains periods.
pub const ANALOG_SAMPLE_COUNT: u16 = 100;

/// Pause between consecutive analog reads (ms).
pub const ANALOG_SAMPLE_DELAY_MS: u32 = 1;

/// Reads per digital majority vote.
pub const DIGITAL_VOTES: u8 = 3;

/// Pause between consecutive digital reads during a vote (ms).
pub const DIGITAL_VOTE_DELAY_MS: u32 = 2;
