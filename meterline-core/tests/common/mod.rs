//! Shared fixtures for integration tests
//!
//! Waveform generators produce ADC code windows whose peak-to-peak is known
//! exactly, so expected readings can be computed from the derivation formula
//! instead of hard-coded.

#![allow(dead_code)]

use std::f64::consts::PI;

use meterline_core::config::AnalogChannelConfig;
use meterline_core::mock::{MockBoard, ScriptedClimate, ScriptedMeter};
use meterline_core::snapshot::Peripherals;
use meterline_core::traits::{ClimateHandle, Level, MeterSample};
use meterline_core::MeterConfig;

/// Codes per simulated mains period
pub const CODES_PER_PERIOD: usize = 20;

/// Mid-scale bias of the AC sensor front ends
pub const ADC_BIAS: u16 = 2048;

/// One mains period of a sine centred on `bias` swinging `amplitude` codes
///
/// Indices 5 and 15 land on the crests, so `max - min == 2 * amplitude`.
pub fn sine_codes(bias: u16, amplitude: u16) -> Vec<u16> {
    (0..CODES_PER_PERIOD)
        .map(|i| {
            let phase = 2.0 * PI * i as f64 / CODES_PER_PERIOD as f64;
            (bias as f64 + amplitude as f64 * phase.sin()).round() as u16
        })
        .collect()
}

/// Flat line with a little noise, for a sensor with nothing connected
pub fn noise_codes(bias: u16, jitter: u16) -> Vec<u16> {
    vec![bias, bias + jitter, bias, bias.saturating_sub(jitter)]
}

/// Peak-to-peak codes that make `channel` report `value`
pub fn amplitude_for(value: f32, channel: &AnalogChannelConfig, config: &MeterConfig) -> u16 {
    let swing_v = value * 2.0 / channel.calibration;
    let peak_to_peak = swing_v / config.adc.reference_v * config.adc.resolution;
    (peak_to_peak / 2.0).round() as u16
}

/// Value the derivation step produces for a given peak-to-peak
pub fn expected_value(peak_to_peak: u16, channel: &AnalogChannelConfig, config: &MeterConfig) -> f32 {
    (peak_to_peak as f32 / config.adc.resolution) * config.adc.reference_v * channel.calibration / 2.0
}

/// What the sensors on the reference board are exposed to
#[derive(Debug, Clone)]
pub struct Conditions {
    pub voltage_codes: Vec<u16>,
    pub current_codes: Vec<u16>,
    pub motion: Vec<Level>,
    pub climate: (f32, f32),
}

impl Conditions {
    /// Live 230 V mains, 5 A load, empty room, comfortable climate
    pub fn nominal(config: &MeterConfig) -> Self {
        let voltage = config.voltage.unwrap_or_else(AnalogChannelConfig::zmpt101b);
        let current = config.current.unwrap_or_else(AnalogChannelConfig::sct013);
        Self {
            voltage_codes: sine_codes(ADC_BIAS, amplitude_for(230.0, &voltage, config)),
            current_codes: sine_codes(ADC_BIAS, amplitude_for(5.0, &current, config)),
            motion: vec![Level::Low],
            climate: (22.5, 45.0),
        }
    }
}

/// Reference board wired up under `conditions`
pub fn reference_board(
    config: &MeterConfig,
    conditions: &Conditions,
) -> Peripherals<MockBoard, ScriptedClimate> {
    let mut board = MockBoard::new();
    if let Some(voltage) = &config.voltage {
        board.script_analog(voltage.pin, &conditions.voltage_codes);
    }
    if let Some(current) = &config.current {
        board.script_analog(current.pin, &conditions.current_codes);
    }
    if let Some(motion) = &config.motion {
        board.script_digital(motion.pin, &conditions.motion);
    }

    let (temperature, humidity) = conditions.climate;
    let climate = ClimateHandle::initialize(ScriptedClimate::constant(temperature, humidity))
        .expect("scripted climate sensor always starts");
    Peripherals::new(board).with_climate(climate)
}

/// Meter-variant board answering with `samples`
pub fn meter_board(config: &MeterConfig, samples: &[MeterSample]) -> Peripherals<MockBoard, ScriptedClimate, ScriptedMeter> {
    let conditions = Conditions::nominal(config);
    reference_board(config, &conditions).with_meter(ScriptedMeter::new(samples))
}

/// A healthy PZEM-style reading
pub fn meter_sample(voltage: f32, current: f32) -> MeterSample {
    MeterSample {
        voltage,
        current,
        power: voltage * current * 0.95,
        energy: 12.5,
        frequency: 50.0,
        power_factor: 0.95,
    }
}
