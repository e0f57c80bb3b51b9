//! Validated Meter Configuration
//!
//! ## Overview
//!
//! Everything the core needs to know about the hardware and the alarm policy
//! lives in one [`MeterConfig`], assembled once at startup, checked by
//! [`MeterConfig::validate`], and then passed by reference to every component.
//! Nothing in the sampling path mutates it.
//!
//! ## Channel Presence
//!
//! Optional sections (`voltage`, `current`, `external_meter`, `motion`,
//! `climate`) describe which physical sensors a build has. A channel that is
//! `None` is simply not sampled and has no entry in the payload; there are no
//! placeholder readings for hardware that is not there.
//!
//! ## Loading
//!
//! With the `std` feature a configuration can be read from JSON. Missing
//! fields fall back to [`Default`], and the result is validated before it is
//! returned:
//!
//! ```rust
//! use meterline_core::MeterConfig;
//!
//! let config = MeterConfig::from_json_str(r#"{
//!     "thresholds": { "volt_min": 200.0, "volt_max": 240.0 }
//! }"#)?;
//! assert_eq!(config.thresholds.volt_max, 240.0);
//! assert_eq!(config.adc.sample_count, 100);
//! # Ok::<(), meterline_core::ConfigError>(())
//! ```

use crate::constants::{adc, sensors, thresholds, time};
use crate::errors::{ConfigError, ConfigResult};
use crate::traits::Level;

/// ADC reference and sampling pacing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdcConfig {
    /// Reference voltage (V) corresponding to full scale
    pub reference_v: f32,
    /// Full-scale code (4095.0 for 12 bit)
    pub resolution: f32,
    /// Reads per analog acquisition window
    pub sample_count: u16,
    /// Pause between reads (ms)
    pub sample_delay_ms: u32,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            reference_v: adc::ADC_REFERENCE_V,
            resolution: adc::ADC_RESOLUTION,
            sample_count: adc::ANALOG_SAMPLE_COUNT,
            sample_delay_ms: adc::ANALOG_SAMPLE_DELAY_MS,
        }
    }
}

/// One analog AC sensor (voltage transformer or current clamp)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogChannelConfig {
    /// ADC channel / GPIO number
    pub pin: u8,
    /// Physical units per volt of peak-to-peak swing
    pub calibration: f32,
    /// Peak-to-peak codes a live signal must exceed
    pub activity_threshold: u16,
}

impl AnalogChannelConfig {
    /// ZMPT101B voltage transformer on the reference board
    pub const fn zmpt101b() -> Self {
        Self {
            pin: sensors::ZMPT_PIN,
            calibration: sensors::ZMPT_CALIBRATION,
            activity_threshold: sensors::ZMPT_ACTIVITY_THRESHOLD,
        }
    }

    /// SCT-013 current clamp on the reference board
    pub const fn sct013() -> Self {
        Self {
            pin: sensors::SCT_PIN,
            calibration: sensors::SCT_CALIBRATION,
            activity_threshold: sensors::SCT_ACTIVITY_THRESHOLD,
        }
    }
}

/// Serial power meter (PZEM-004T class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExternalMeterConfig {
    /// Modbus slave address
    pub address: u8,
}

/// Output pin that mirrors the motion vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorConfig {
    /// Output pin driving the indicator
    pub pin: u8,
    /// Level that turns the indicator on
    pub active_level: Level,
}

/// Digital motion sensor with majority-vote debouncing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Input pin of the motion sensor
    pub pin: u8,
    /// Level the sensor drives while motion is present
    pub active_level: Level,
    /// Reads per vote
    pub votes: u8,
    /// Pause between reads (ms)
    pub vote_delay_ms: u32,
    /// Optional LED mirroring the vote result
    pub indicator: Option<IndicatorConfig>,
}

impl MotionConfig {
    /// HC-SR501 with the on-board LED as indicator
    pub const fn hc_sr501() -> Self {
        Self {
            pin: sensors::PIR_PIN,
            active_level: Level::High,
            votes: adc::DIGITAL_VOTES,
            vote_delay_ms: adc::DIGITAL_VOTE_DELAY_MS,
            indicator: Some(IndicatorConfig {
                pin: sensors::LED_PIN,
                active_level: Level::High,
            }),
        }
    }
}

/// Temperature/humidity sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClimateConfig {
    /// Data pin of the climate sensor
    pub pin: u8,
}

/// Alarm bounds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdConfig {
    /// Lowest acceptable mains voltage
    pub volt_min: f32,
    /// Highest acceptable mains voltage
    pub volt_max: f32,
    /// Upper bound only; current has no lower alarm
    pub current_max: f32,
    /// Lower temperature alarm in degrees Celsius
    pub temp_low: f32,
    /// Upper temperature alarm in degrees Celsius
    pub temp_high: f32,
    /// Lower humidity alarm in percent
    pub hum_low: f32,
    /// Upper humidity alarm in percent
    pub hum_high: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            volt_min: thresholds::VOLT_MIN,
            volt_max: thresholds::VOLT_MAX,
            current_max: thresholds::CURRENT_MAX,
            temp_low: thresholds::TEMP_LOW,
            temp_high: thresholds::TEMP_HIGH,
            hum_low: thresholds::HUM_LOW,
            hum_high: thresholds::HUM_HIGH,
        }
    }
}

/// Cycle pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Period between acquisition cycles
    pub sample_interval_ms: u32,
    /// Period between transmissions
    pub send_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: time::SAMPLE_INTERVAL_MS,
            send_interval_ms: time::SEND_INTERVAL_MS,
        }
    }
}

/// Complete configuration for one firmware build
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeterConfig {
    /// Shared ADC settings
    pub adc: AdcConfig,
    /// AC voltage transformer, if fitted
    pub voltage: Option<AnalogChannelConfig>,
    /// AC current clamp, if fitted
    pub current: Option<AnalogChannelConfig>,
    /// Serial power meter, if fitted (excludes `voltage`/`current`)
    pub external_meter: Option<ExternalMeterConfig>,
    /// Motion sensor, if fitted
    pub motion: Option<MotionConfig>,
    /// Climate sensor, if fitted
    pub climate: Option<ClimateConfig>,
    /// Alarm limits
    pub thresholds: ThresholdConfig,
    /// Cycle and send periods
    pub timing: TimingConfig,
}

impl Default for MeterConfig {
    /// Reference board: ZMPT101B + SCT-013 + HC-SR501 + DHT22
    fn default() -> Self {
        Self {
            adc: AdcConfig::default(),
            voltage: Some(AnalogChannelConfig::zmpt101b()),
            current: Some(AnalogChannelConfig::sct013()),
            external_meter: None,
            motion: Some(MotionConfig::hc_sr501()),
            climate: Some(ClimateConfig {
                pin: sensors::DHT22_PIN,
            }),
            thresholds: ThresholdConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl MeterConfig {
    /// Board variant using a serial power meter instead of analog sensors
    pub fn with_external_meter() -> Self {
        Self {
            voltage: None,
            current: None,
            external_meter: Some(ExternalMeterConfig::default()),
            ..Self::default()
        }
    }

    /// Whether any analog mains channel is configured
    pub fn has_analog_mains(&self) -> bool {
        self.voltage.is_some() || self.current.is_some()
    }

    /// Check every constant the sampling path divides by, scales with or
    /// compares against
    pub fn validate(&self) -> ConfigResult<()> {
        positive("adc.reference_v", self.adc.reference_v)?;
        positive("adc.resolution", self.adc.resolution)?;
        if self.adc.sample_count == 0 {
            return Err(ConfigError::ZeroCount { field: "adc.sample_count" });
        }

        if let Some(channel) = &self.voltage {
            positive("voltage.calibration", channel.calibration)?;
        }
        if let Some(channel) = &self.current {
            positive("current.calibration", channel.calibration)?;
        }
        if self.external_meter.is_some() && self.has_analog_mains() {
            return Err(ConfigError::ConflictingPowerSource);
        }

        if let Some(motion) = &self.motion {
            if motion.votes == 0 {
                return Err(ConfigError::ZeroCount { field: "motion.votes" });
            }
            if let Some(indicator) = &motion.indicator {
                if indicator.pin == motion.pin {
                    return Err(ConfigError::PinConflict { pin: motion.pin });
                }
            }
        }

        self.check_pins()?;

        let t = &self.thresholds;
        bounds("thresholds.volt", t.volt_min, t.volt_max)?;
        finite("thresholds.current_max", t.current_max)?;
        bounds("thresholds.temp", t.temp_low, t.temp_high)?;
        bounds("thresholds.hum", t.hum_low, t.hum_high)?;

        if self.timing.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroCount { field: "timing.sample_interval_ms" });
        }
        if self.timing.send_interval_ms == 0 {
            return Err(ConfigError::ZeroCount { field: "timing.send_interval_ms" });
        }

        log_debug!("meter configuration accepted");
        Ok(())
    }

    fn check_pins(&self) -> ConfigResult<()> {
        let pins: [Option<u8>; 5] = [
            self.voltage.map(|c| c.pin),
            self.current.map(|c| c.pin),
            self.motion.map(|m| m.pin),
            self.motion.and_then(|m| m.indicator).map(|i| i.pin),
            self.climate.map(|c| c.pin),
        ];
        for (i, pin) in pins.iter().enumerate() {
            let Some(pin) = pin else { continue };
            if pins[i + 1..].iter().flatten().any(|other| other == pin) {
                return Err(ConfigError::PinConflict { pin: *pin });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document
    #[cfg(feature = "std")]
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log_warn!("configuration rejected: {}", e);
            ConfigError::Parse { reason: "invalid JSON configuration" }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    #[cfg(feature = "std")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            log_warn!("cannot read {}: {}", path.as_ref().display(), e);
            ConfigError::Parse { reason: "configuration file unreadable" }
        })?;
        Self::from_json_str(&text)
    }
}

fn finite(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> ConfigResult<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn bounds(field: &'static str, min: f32, max: f32) -> ConfigResult<()> {
    finite(field, min)?;
    finite(field, max)?;
    if min < max {
        Ok(())
    } else {
        Err(ConfigError::InvalidBounds { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MeterConfig::default().validate(), Ok(()));
        assert_eq!(MeterConfig::with_external_meter().validate(), Ok(()));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let mut config = MeterConfig::default();
        config.adc.resolution = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "adc.resolution", value: 0.0 })
        );
    }

    #[test]
    fn nan_calibration_is_rejected() {
        let mut config = MeterConfig::default();
        if let Some(voltage) = config.voltage.as_mut() {
            voltage.calibration = f32::NAN;
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "voltage.calibration" })
        );
    }

    #[test]
    fn analog_and_external_meter_conflict() {
        let mut config = MeterConfig::default();
        config.external_meter = Some(ExternalMeterConfig::default());
        assert_eq!(config.validate(), Err(ConfigError::ConflictingPowerSource));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut config = MeterConfig::default();
        config.thresholds.hum_low = 80.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { field: "thresholds.hum", .. })
        ));
    }

    #[test]
    fn zero_votes_are_rejected() {
        let mut config = MeterConfig::default();
        if let Some(motion) = config.motion.as_mut() {
            motion.votes = 0;
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount { field: "motion.votes" })
        );
    }

    #[test]
    fn shared_pins_are_rejected() {
        let mut config = MeterConfig::default();
        if let Some(climate) = config.climate.as_mut() {
            climate.pin = sensors::SCT_PIN;
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::PinConflict { pin: sensors::SCT_PIN })
        );
    }

    #[test]
    fn indicator_on_motion_pin_is_rejected() {
        let mut config = MeterConfig::default();
        if let Some(motion) = config.motion.as_mut() {
            motion.indicator = Some(IndicatorConfig {
                pin: motion.pin,
                active_level: Level::Low,
            });
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::PinConflict { pin: sensors::PIR_PIN })
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_overrides_merge_with_defaults() {
        let config = MeterConfig::from_json_str(
            r#"{ "climate": null, "motion": { "pin": 13, "active_level": "low",
                 "votes": 5, "vote_delay_ms": 1, "indicator": null } }"#,
        )
        .unwrap();
        assert!(config.climate.is_none());
        let motion = config.motion.unwrap();
        assert_eq!(motion.active_level, Level::Low);
        assert_eq!(motion.votes, 5);
        assert_eq!(config.voltage, Some(AnalogChannelConfig::zmpt101b()));
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_is_validated_after_parsing() {
        let result = MeterConfig::from_json_str(r#"{ "adc": { "sample_count": 0 } }"#);
        assert_eq!(result, Err(ConfigError::ZeroCount { field: "adc.sample_count" }));

        let result = MeterConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
