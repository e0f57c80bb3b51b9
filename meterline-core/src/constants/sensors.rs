//! Sensor Calibration and Wiring Defaults
//!
//! Defaults for the reference board: ZMPT101B voltage transformer, SCT-013
//! current clamp, HC-SR501 PIR, DHT22 climate sensor, and the optional
//! PZEM-004T serial power meter.

// ===== ZMPT101B VOLTAGE SENSOR =====

/// ZMPT101B analog input pin.
pub const ZMPT_PIN: u8 = 35;

/// Volts of mains per volt of peak-to-peak ADC swing (before the /2 step).
///
/// Tuned against the peak-to-peak/2 approximation in
/// [`crate::derivation::derive_analog_quantity`]; do not reuse with a true RMS
/// integrator.
pub const ZMPT_CALIBRATION: f32 = 250.0;

/// Peak-to-peak code swing a live mains signal must exceed.
///
/// Idle ZMPT modules show 20-60 codes of noise.
pub const ZMPT_ACTIVITY_THRESHOLD: u16 = 100;

// ===== SCT-013 CURRENT CLAMP =====

/// SCT-013 analog input pin.
pub const SCT_PIN: u8 = 34;

/// Amps per volt of peak-to-peak ADC swing (before the /2 step).
pub const SCT_CALIBRATION: f32 = 111.1;

/// Peak-to-peak code swing a loaded clamp must exceed.
pub const SCT_ACTIVITY_THRESHOLD: u16 = 50;

// ===== HC-SR501 PIR =====

/// PIR output pin.
pub const PIR_PIN: u8 = 27;

/// On-board LED used to mirror motion state.
pub const LED_PIN: u8 = 2;

// ===== DHT22 =====

/// DHT22 data pin.
pub const DHT22_PIN: u8 = 4;
