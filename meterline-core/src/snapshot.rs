//! Sensor Snapshot Builder
//!
//! ## Overview
//!
//! One call to [`SnapshotBuilder::build`] is one sampling cycle:
//!
//! ```text
//! for each configured channel, in fixed order:
//!     acquire  →  derive  →  evaluate thresholds
//! then freeze everything into a SensorSnapshot
//! ```
//!
//! Channel order is voltage, current, external meter, motion, climate. It never
//! changes within a build, which is what keeps the payload's `data` array
//! stable downstream.
//!
//! ## Ownership
//!
//! The builder owns the peripherals and borrows the validated configuration.
//! A [`SensorSnapshot`] is returned by value and only exposes getters, so once
//! built nothing can change it. Display and transmission can read the same
//! snapshot freely; the next cycle produces a new one.
//!
//! ## Example
//!
//! ```rust
//! use meterline_core::mock::{MockBoard, ScriptedClimate};
//! use meterline_core::snapshot::{Peripherals, SnapshotBuilder};
//! use meterline_core::time::{CycleClock, MockTimeSource};
//! use meterline_core::traits::{ClimateHandle, Level};
//! use meterline_core::MeterConfig;
//!
//! let config = MeterConfig::default();
//! let mut board = MockBoard::new();
//! board.script_analog(35, &[100, 4000]);
//! board.script_analog(34, &[2040, 2060]);
//! board.script_digital(27, &[Level::Low]);
//!
//! let climate = ClimateHandle::initialize(ScriptedClimate::constant(22.0, 45.0)).unwrap();
//! let peripherals = Peripherals::new(board).with_climate(climate);
//! let mut builder = SnapshotBuilder::new(&config, peripherals).unwrap();
//!
//! let mut clock = CycleClock::new(MockTimeSource::new(0));
//! let snapshot = builder.build(clock.next_stamp());
//! assert!(snapshot.flags().voltage_out_of_range);
//! ```

use crate::acquisition::{self, RawSample, VoteTally};
use crate::config::{AnalogChannelConfig, MeterConfig};
use crate::derivation::{self, DerivedReading, MeterReading};
use crate::errors::{ConfigError, ConfigResult};
use crate::threshold::{evaluate, Bounds, ThresholdFlags, ThresholdSet};
use crate::time::CycleStamp;
use crate::traits::{
    Absent, AnalogInput, ClimateHandle, ClimateSensor, DelayMs, DigitalInput, DigitalOutput,
    PowerMeter,
};

/// One analog AC channel after derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogReading {
    /// Calibrated amplitude
    pub reading: DerivedReading,
    /// Window statistics the reading was derived from
    pub raw: RawSample,
}

impl AnalogReading {
    /// Whether the ADC produced any sample at all
    pub fn read_failed(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Debounced motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionReading {
    /// Majority of reads were active
    pub detected: bool,
    /// Individual read counts
    pub tally: VoteTally,
}

impl MotionReading {
    /// Whether every read in the vote failed
    pub fn read_failed(&self) -> bool {
        self.tally.all_failed()
    }
}

/// Temperature and humidity from the climate sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// Air temperature (°C)
    pub temperature: DerivedReading,
    /// Relative humidity (%)
    pub humidity: DerivedReading,
}

impl ClimateReading {
    /// Both values were read cleanly
    pub fn is_valid(&self) -> bool {
        self.temperature.valid && self.humidity.valid
    }
}

/// Everything measured in one sampling cycle
///
/// A channel that is not configured is `None`; a configured channel is always
/// `Some`, even when its reading is invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    stamp: CycleStamp,
    voltage: Option<AnalogReading>,
    current: Option<AnalogReading>,
    meter: Option<MeterReading>,
    motion: Option<MotionReading>,
    climate: Option<ClimateReading>,
    flags: ThresholdFlags,
}

impl SensorSnapshot {
    /// When and in which cycle this was taken
    pub fn stamp(&self) -> CycleStamp {
        self.stamp
    }

    /// Analog voltage channel, if fitted
    pub fn voltage(&self) -> Option<&AnalogReading> {
        self.voltage.as_ref()
    }

    /// Analog current channel, if fitted
    pub fn current(&self) -> Option<&AnalogReading> {
        self.current.as_ref()
    }

    /// External meter, if fitted
    pub fn meter(&self) -> Option<&MeterReading> {
        self.meter.as_ref()
    }

    /// Motion vote, if fitted
    pub fn motion(&self) -> Option<&MotionReading> {
        self.motion.as_ref()
    }

    /// Temperature and humidity, if fitted
    pub fn climate(&self) -> Option<&ClimateReading> {
        self.climate.as_ref()
    }

    /// Alarm flags
    pub fn flags(&self) -> &ThresholdFlags {
        &self.flags
    }

    /// Mains voltage from whichever power source is fitted
    pub fn mains_voltage(&self) -> Option<DerivedReading> {
        self.voltage
            .map(|v| v.reading)
            .or_else(|| self.meter.map(|m| m.voltage))
    }

    /// Load current from whichever power source is fitted
    pub fn load_current(&self) -> Option<DerivedReading> {
        self.current
            .map(|c| c.reading)
            .or_else(|| self.meter.map(|m| m.current))
    }
}

/// Drivers handed to the snapshot builder
///
/// `C` and `M` default to [`Absent`] for builds without a climate sensor or
/// power meter.
#[derive(Debug)]
pub struct Peripherals<B, C = Absent, M = Absent> {
    board: B,
    climate: Option<ClimateHandle<C>>,
    meter: Option<M>,
}

impl<B> Peripherals<B> {
    /// Board with ADC, GPIO and delay only
    pub fn new(board: B) -> Self {
        Self {
            board,
            climate: None,
            meter: None,
        }
    }
}

impl<B, C, M> Peripherals<B, C, M> {
    /// Attach an initialized climate sensor
    pub fn with_climate<C2>(self, handle: ClimateHandle<C2>) -> Peripherals<B, C2, M> {
        Peripherals {
            board: self.board,
            climate: Some(handle),
            meter: self.meter,
        }
    }

    /// Attach a serial power meter
    pub fn with_meter<M2>(self, meter: M2) -> Peripherals<B, C, M2> {
        Peripherals {
            board: self.board,
            climate: self.climate,
            meter: Some(meter),
        }
    }

    /// The ADC/GPIO board
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The ADC/GPIO board, mutably
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Take the drivers apart again
    pub fn into_parts(self) -> (B, Option<ClimateHandle<C>>, Option<M>) {
        (self.board, self.climate, self.meter)
    }
}

/// Runs sampling cycles against a validated configuration
#[derive(Debug)]
pub struct SnapshotBuilder<'a, B, C = Absent, M = Absent> {
    config: &'a MeterConfig,
    thresholds: ThresholdSet,
    peripherals: Peripherals<B, C, M>,
}

impl<'a, B, C, M> SnapshotBuilder<'a, B, C, M>
where
    B: AnalogInput + DigitalInput + DigitalOutput + DelayMs,
    C: ClimateSensor,
    M: PowerMeter,
{
    /// Validate `config` and check that every configured channel has a driver
    pub fn new(config: &'a MeterConfig, peripherals: Peripherals<B, C, M>) -> ConfigResult<Self> {
        config.validate()?;

        if config.climate.is_some() && peripherals.climate.is_none() {
            return Err(ConfigError::MissingPeripheral { channel: "climate" });
        }
        if config.external_meter.is_some() && peripherals.meter.is_none() {
            return Err(ConfigError::MissingPeripheral { channel: "external_meter" });
        }

        Ok(Self {
            config,
            thresholds: ThresholdSet::from(&config.thresholds),
            peripherals,
        })
    }

    /// Configuration this builder was validated against
    pub fn config(&self) -> &MeterConfig {
        self.config
    }

    /// Hardware handles, for indicator writes between cycles
    pub fn peripherals_mut(&mut self) -> &mut Peripherals<B, C, M> {
        &mut self.peripherals
    }

    /// Give the drivers back
    pub fn into_peripherals(self) -> Peripherals<B, C, M> {
        self.peripherals
    }

    /// Run one complete sampling cycle
    pub fn build(&mut self, stamp: CycleStamp) -> SensorSnapshot {
        let config = self.config;
        let board = &mut self.peripherals.board;
        let adc = &config.adc;

        let mut analog = |channel: &AnalogChannelConfig| {
            let raw = acquisition::acquire_analog(board, channel.pin, adc.sample_count, adc.sample_delay_ms);
            let reading = derivation::derive_analog_quantity(
                &raw,
                channel.calibration,
                adc.reference_v,
                adc.resolution,
                channel.activity_threshold,
            );
            AnalogReading { reading, raw }
        };
        let voltage = config.voltage.as_ref().map(&mut analog);
        let current = config.current.as_ref().map(&mut analog);

        let meter = match (&config.external_meter, self.peripherals.meter.as_mut()) {
            (Some(_), Some(driver)) => Some(derivation::derive_from_external_meter(&driver.read())),
            _ => None,
        };

        let motion = config.motion.as_ref().map(|motion| {
            let board = &mut self.peripherals.board;
            let tally = acquisition::tally_digital_vote(
                board,
                motion.pin,
                motion.votes,
                motion.active_level,
                motion.vote_delay_ms,
            );
            let detected = tally.is_majority();
            if let Some(indicator) = &motion.indicator {
                acquisition::mirror_indicator(board, indicator.pin, indicator.active_level, detected);
            }
            MotionReading { detected, tally }
        });

        let climate = match (&config.climate, self.peripherals.climate.as_mut()) {
            (Some(_), Some(handle)) => {
                let (raw_temp, raw_humidity) = handle.read();
                let (temperature, humidity) = derivation::derive_environmental(raw_temp, raw_humidity);
                Some(ClimateReading { temperature, humidity })
            }
            _ => None,
        };

        let mut snapshot = SensorSnapshot {
            stamp,
            voltage,
            current,
            meter,
            motion,
            climate,
            flags: ThresholdFlags::default(),
        };
        snapshot.flags = self.evaluate(&snapshot);
        snapshot
    }

    fn evaluate(&self, snapshot: &SensorSnapshot) -> ThresholdFlags {
        let t = &self.thresholds;
        let check = |reading: Option<DerivedReading>, bounds: &Bounds| {
            reading.is_some_and(|r| evaluate(&r, bounds))
        };

        ThresholdFlags {
            voltage_out_of_range: check(snapshot.mains_voltage(), &t.voltage),
            current_overlimit: check(snapshot.load_current(), &t.current),
            temp_out_of_range: check(snapshot.climate.map(|c| c.temperature), &t.temperature),
            hum_out_of_range: check(snapshot.climate.map(|c| c.humidity), &t.humidity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalMeterConfig;
    use crate::mock::{MockBoard, ScriptedClimate, ScriptedMeter};
    use crate::traits::{Level, MeterSample};

    fn stamp(sequence: u64) -> CycleStamp {
        CycleStamp { sequence, timestamp: sequence * 1000, wall_clock: false }
    }

    fn reference_board() -> MockBoard {
        let mut board = MockBoard::new();
        board.script_analog(35, &[100, 4000]);
        board.script_analog(34, &[2000, 2300]);
        board.script_digital(27, &[Level::High, Level::High, Level::Low]);
        board
    }

    #[test]
    fn reference_cycle() {
        let config = MeterConfig::default();
        let climate = ClimateHandle::initialize(ScriptedClimate::constant(24.0, 55.0)).unwrap();
        let peripherals = Peripherals::new(reference_board()).with_climate(climate);
        let mut builder = SnapshotBuilder::new(&config, peripherals).unwrap();

        let snapshot = builder.build(stamp(7));

        assert_eq!(snapshot.stamp().sequence, 7);
        let voltage = snapshot.voltage().unwrap();
        assert!(voltage.reading.valid);
        assert_eq!(voltage.raw.count, 100);
        assert!(snapshot.flags().voltage_out_of_range);

        let current = snapshot.current().unwrap();
        assert!(current.reading.valid);
        assert!(!snapshot.flags().current_overlimit);

        assert!(snapshot.motion().unwrap().detected);
        assert!(snapshot.climate().unwrap().is_valid());
        assert!(snapshot.meter().is_none());

        let led = builder.peripherals_mut().board().writes().last().copied();
        assert_eq!(led, Some((2, Level::High)));
    }

    #[test]
    fn missing_climate_driver_is_config_error() {
        let config = MeterConfig::default();
        let result = SnapshotBuilder::new(&config, Peripherals::new(reference_board()));
        assert!(matches!(
            result,
            Err(ConfigError::MissingPeripheral { channel: "climate" })
        ));
    }

    #[test]
    fn unconfigured_channels_are_not_sampled() {
        let config = MeterConfig {
            voltage: None,
            current: None,
            motion: None,
            climate: None,
            ..MeterConfig::default()
        };
        let mut builder = SnapshotBuilder::new(&config, Peripherals::new(MockBoard::new())).unwrap();
        let snapshot = builder.build(stamp(0));

        assert!(snapshot.voltage().is_none());
        assert!(snapshot.motion().is_none());
        assert_eq!(*snapshot.flags(), ThresholdFlags::default());
        assert!(builder.peripherals_mut().board().delays().is_empty());
    }

    #[test]
    fn climate_nan_suppresses_alarm() {
        let config = MeterConfig {
            voltage: None,
            current: None,
            motion: None,
            ..MeterConfig::default()
        };
        let climate = ClimateHandle::initialize(ScriptedClimate::constant(45.0, f32::NAN)).unwrap();
        let peripherals = Peripherals::new(MockBoard::new()).with_climate(climate);
        let mut builder = SnapshotBuilder::new(&config, peripherals).unwrap();

        let snapshot = builder.build(stamp(1));

        assert!(snapshot.flags().temp_out_of_range);
        assert!(!snapshot.flags().hum_out_of_range);
        assert!(!snapshot.climate().unwrap().is_valid());
    }

    #[test]
    fn external_meter_variant() {
        let mut config = MeterConfig::with_external_meter();
        config.motion = None;
        config.climate = None;
        config.external_meter = Some(ExternalMeterConfig { address: 0xF8 });

        let meter = ScriptedMeter::new(&[MeterSample {
            voltage: 262.0,
            current: 20.0,
            power: 5000.0,
            energy: 1.0,
            frequency: 50.0,
            power_factor: 0.95,
        }]);
        let peripherals = Peripherals::new(MockBoard::new()).with_meter(meter);
        let mut builder = SnapshotBuilder::new(&config, peripherals).unwrap();

        let snapshot = builder.build(stamp(2));

        assert!(snapshot.meter().unwrap().active);
        assert!(snapshot.flags().voltage_out_of_range);
        assert!(snapshot.flags().current_overlimit);
    }

    #[test]
    fn silent_meter_forces_flags_false() {
        let mut config = MeterConfig::with_external_meter();
        config.motion = None;
        config.climate = None;

        let meter = ScriptedMeter::new(&[MeterSample { voltage: 0.0, ..MeterSample::unavailable() }]);
        let peripherals = Peripherals::new(MockBoard::new()).with_meter(meter);
        let mut builder = SnapshotBuilder::new(&config, peripherals).unwrap();

        let snapshot = builder.build(stamp(3));

        assert!(!snapshot.meter().unwrap().active);
        assert!(!snapshot.flags().voltage_out_of_range);
        assert!(!snapshot.flags().current_overlimit);
    }

    #[test]
    fn each_cycle_is_a_fresh_snapshot() {
        let config = MeterConfig {
            current: None,
            motion: None,
            climate: None,
            ..MeterConfig::default()
        };
        let mut board = MockBoard::new();
        board.script_analog(35, &[1800, 2300]);
        let mut builder = SnapshotBuilder::new(&config, Peripherals::new(board)).unwrap();

        let first = builder.build(stamp(10));
        builder.peripherals_mut().board_mut().script_analog(35, &[2040, 2050]);
        let second = builder.build(stamp(11));

        assert!(first.voltage().unwrap().reading.valid);
        assert!(!second.voltage().unwrap().reading.valid);
        assert_eq!(first.stamp().sequence, 10);
    }
}
