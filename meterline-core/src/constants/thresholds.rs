//! Default Alarm Bounds
//!
//! Safe operating ranges for a 230 V single-phase installation in a
//! climate-controlled room. Deployments override them in
//! [`crate::config::ThresholdConfig`].

/// Lowest acceptable mains voltage (V).
pub const VOLT_MIN: f32 = 180.0;

/// Highest acceptable mains voltage (V).
pub const VOLT_MAX: f32 = 250.0;

/// Current above which the load is flagged as over limit (A).
pub const CURRENT_MAX: f32 = 16.0;

/// Lowest acceptable room temperature (°C).
pub const TEMP_LOW: f32 = 18.0;

/// Highest acceptable room temperature (°C).
pub const TEMP_HIGH: f32 = 30.0;

/// Lowest acceptable relative humidity (%).
pub const HUM_LOW: f32 = 30.0;

/// Highest acceptable relative humidity (%).
pub const HUM_HIGH: f32 = 70.0;
