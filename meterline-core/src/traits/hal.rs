//! Hardware Abstraction for the Acquisition Boundary
//!
//! The core never touches registers. Everything it needs from the host
//! platform is expressed by the small traits in this module:
//!
//! | Trait           | Original primitive          | Used by                    |
//! |-----------------|-----------------------------|----------------------------|
//! | [`AnalogInput`] | `analogRead(pin)`           | analog acquisition         |
//! | [`DigitalInput`]| `digitalRead(pin)`          | majority vote              |
//! | [`DigitalOutput`]| `digitalWrite(pin, level)` | motion indicator           |
//! | [`DelayMs`]     | `delay(ms)`                 | pacing inside both loops   |
//! | [`ClimateSensor`]| DHT driver                 | environmental derivation   |
//! | [`PowerMeter`]  | serial power meter driver   | external meter derivation  |
//!
//! A board support package usually implements the first four on one struct
//! and hands it to [`SnapshotBuilder`](crate::snapshot::SnapshotBuilder).
//!
//! ## Non-blocking reads
//!
//! [`AnalogInput::read`] follows the `nb` convention so drivers backed by a
//! conversion-complete flag can return `WouldBlock` instead of spinning
//! themselves. The acquirer blocks on it with `nb::block!`, which matches the
//! busy-wait pacing of the sampling loop.
//!
//! ## Example Implementation
//!
//! ```rust
//! use meterline_core::traits::{AnalogInput, DelayMs};
//! use meterline_core::errors::HalError;
//!
//! struct FakeAdc {
//!     code: u16,
//! }
//!
//! impl AnalogInput for FakeAdc {
//!     fn read(&mut self, channel: u8) -> nb::Result<u16, HalError> {
//!         match channel {
//!             34 | 35 => Ok(self.code),
//!             _ => Err(nb::Error::Other(HalError::Unavailable { channel })),
//!         }
//!     }
//! }
//!
//! impl DelayMs for FakeAdc {
//!     fn delay_ms(&mut self, _ms: u32) {}
//! }
//! ```

use crate::errors::{HalError, HalResult};

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Pin driven or read low
    Low,
    /// Pin driven or read high
    High,
}

impl Level {
    /// The opposite level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Level to drive so that an output with `active` polarity shows `on`
    pub const fn for_state(on: bool, active: Self) -> Self {
        if on {
            active
        } else {
            active.inverted()
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        self.inverted()
    }
}

/// Raw ADC access
pub trait AnalogInput {
    /// Start or complete one conversion on `channel` and return its code
    fn read(&mut self, channel: u8) -> nb::Result<u16, HalError>;
}

/// Digital line sampling
pub trait DigitalInput {
    /// Sample the current level of `pin`
    fn read_level(&mut self, pin: u8) -> HalResult<Level>;
}

/// Digital line driving
pub trait DigitalOutput {
    /// Drive `pin` to `level`
    fn write_level(&mut self, pin: u8, level: Level) -> HalResult<()>;
}

/// Millisecond pacing primitive
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Temperature and humidity sensor driver
///
/// Readers return NaN when the bus transaction fails, mirroring the common
/// DHT driver API. The derivation layer turns NaN into an invalid reading.
pub trait ClimateSensor {
    /// One-time bus setup; called by [`ClimateHandle::initialize`] only
    fn begin(&mut self) -> HalResult<()>;

    /// Air temperature in °C, NaN on failure
    fn read_temperature(&mut self) -> f32;

    /// Relative humidity in %, NaN on failure
    fn read_humidity(&mut self) -> f32;
}

/// Precomputed readings from a serial power meter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSample {
    /// RMS voltage (V), NaN when the meter did not answer
    pub voltage: f32,
    /// RMS current (A)
    pub current: f32,
    /// Active power (W)
    pub power: f32,
    /// Accumulated energy (kWh); the counter is owned by the meter
    pub energy: f32,
    /// Line frequency (Hz)
    pub frequency: f32,
    /// Power factor (0.0-1.0)
    pub power_factor: f32,
}

impl MeterSample {
    /// Sample representing a meter that did not respond
    pub const fn unavailable() -> Self {
        Self {
            voltage: f32::NAN,
            current: f32::NAN,
            power: f32::NAN,
            energy: f32::NAN,
            frequency: f32::NAN,
            power_factor: f32::NAN,
        }
    }
}

/// External power meter collaborator (PZEM-004T class)
pub trait PowerMeter {
    /// Poll the meter once
    fn read(&mut self) -> MeterSample;
}

/// Climate sensor that has completed its one-time initialization
///
/// The only way to obtain a handle is [`ClimateHandle::initialize`], so the
/// sampling path never has to ask whether `begin` already ran.
#[derive(Debug)]
pub struct ClimateHandle<S> {
    sensor: S,
}

impl<S: ClimateSensor> ClimateHandle<S> {
    /// Run the sensor's setup once and take ownership of it
    pub fn initialize(mut sensor: S) -> HalResult<Self> {
        sensor.begin()?;
        Ok(Self { sensor })
    }

    /// Read temperature and humidity, in that order
    pub fn read(&mut self) -> (f32, f32) {
        let temperature = self.sensor.read_temperature();
        let humidity = self.sensor.read_humidity();
        (temperature, humidity)
    }

    /// Give the driver back
    pub fn release(self) -> S {
        self.sensor
    }
}

/// Placeholder driver type for channels a build does not have
///
/// Uninhabited, so a `None` of this type costs nothing and can never be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absent {}

impl ClimateSensor for Absent {
    fn begin(&mut self) -> HalResult<()> {
        match *self {}
    }

    fn read_temperature(&mut self) -> f32 {
        match *self {}
    }

    fn read_humidity(&mut self) -> f32 {
        match *self {}
    }
}

impl PowerMeter for Absent {
    fn read(&mut self) -> MeterSample {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSensor {
        begins: u32,
    }

    impl ClimateSensor for CountingSensor {
        fn begin(&mut self) -> HalResult<()> {
            self.begins += 1;
            Ok(())
        }

        fn read_temperature(&mut self) -> f32 {
            21.5
        }

        fn read_humidity(&mut self) -> f32 {
            48.0
        }
    }

    struct BrokenSensor;

    impl ClimateSensor for BrokenSensor {
        fn begin(&mut self) -> HalResult<()> {
            Err(HalError::Timeout)
        }

        fn read_temperature(&mut self) -> f32 {
            f32::NAN
        }

        fn read_humidity(&mut self) -> f32 {
            f32::NAN
        }
    }

    #[test]
    fn level_inversion() {
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(Level::for_state(true, Level::Low), Level::Low);
        assert_eq!(Level::for_state(false, Level::Low), Level::High);
    }

    #[test]
    fn climate_handle_begins_once() {
        let mut handle = ClimateHandle::initialize(CountingSensor { begins: 0 }).unwrap();
        assert_eq!(handle.read(), (21.5, 48.0));
        assert_eq!(handle.read(), (21.5, 48.0));
        assert_eq!(handle.release().begins, 1);
    }

    #[test]
    fn climate_handle_propagates_setup_failure() {
        let result = ClimateHandle::initialize(BrokenSensor);
        assert!(matches!(result, Err(HalError::Timeout)));
    }

    #[test]
    fn unavailable_meter_sample_is_nan() {
        let sample = MeterSample::unavailable();
        assert!(sample.voltage.is_nan());
        assert!(sample.power_factor.is_nan());
    }
}
