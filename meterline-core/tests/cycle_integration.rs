//! End-to-end sampling cycles on scripted hardware
//!
//! Each test wires a configuration to a mock board, runs one or more cycles
//! through the snapshot builder and checks the readings and alarm flags that
//! come out the other end.

mod common;

use meterline_core::config::AnalogChannelConfig;
use meterline_core::mock::{MockBoard, ScriptedClimate};
use meterline_core::snapshot::{Peripherals, SnapshotBuilder};
use meterline_core::time::{CycleClock, IntervalSchedule, MockTimeSource, TimeSource};
use meterline_core::traits::{ClimateHandle, Level};
use meterline_core::{ConfigError, MeterConfig, SensorSnapshot};

use common::{
    expected_value, meter_board, meter_sample, noise_codes, reference_board, sine_codes, Conditions,
    ADC_BIAS,
};

fn one_cycle(config: &MeterConfig, conditions: &Conditions) -> SensorSnapshot {
    let mut builder = SnapshotBuilder::new(config, reference_board(config, conditions))
        .expect("reference configuration is valid");
    let time = MockTimeSource::new(0);
    let mut clock = CycleClock::new(&time);
    builder.build(clock.next_stamp())
}

#[test]
fn nominal_mains_raises_no_alarm() {
    let config = MeterConfig::default();
    let snapshot = one_cycle(&config, &Conditions::nominal(&config));

    let voltage = snapshot.voltage().expect("voltage channel fitted");
    assert!(voltage.reading.valid);
    assert!((voltage.reading.value - 230.0).abs() < 0.5);
    assert_eq!(voltage.raw.count, config.adc.sample_count);
    assert_eq!(voltage.raw.mean(), Some(ADC_BIAS));

    let current = snapshot.current().expect("current channel fitted");
    assert!(current.reading.valid);
    assert!((current.reading.value - 5.0).abs() < 0.1);

    assert!(!snapshot.flags().any());
}

#[test]
fn overvoltage_window_from_min_max_codes() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        voltage_codes: vec![100, 4000],
        ..Conditions::nominal(&config)
    };
    let snapshot = one_cycle(&config, &conditions);

    let voltage = snapshot.voltage().expect("voltage channel fitted");
    assert_eq!(voltage.raw.peak_to_peak(), 3900);
    assert!((voltage.reading.value - 392.86).abs() < 0.01);
    assert!(snapshot.flags().voltage_out_of_range);
    assert!(!snapshot.flags().current_overlimit);
}

#[test]
fn unplugged_clamp_reports_inactive_without_alarm() {
    let config = MeterConfig {
        thresholds: meterline_core::config::ThresholdConfig {
            current_max: 0.0,
            ..Default::default()
        },
        ..MeterConfig::default()
    };
    let conditions = Conditions {
        current_codes: noise_codes(ADC_BIAS, 6),
        ..Conditions::nominal(&config)
    };
    let snapshot = one_cycle(&config, &conditions);

    let current = snapshot.current().expect("current channel fitted");
    assert!(!current.reading.valid);
    assert!(current.reading.value > 0.0);
    assert!(!snapshot.flags().current_overlimit);
}

#[test]
fn overload_trips_current_alarm() {
    let config = MeterConfig::default();
    let clamp = AnalogChannelConfig::sct013();
    let conditions = Conditions {
        current_codes: sine_codes(ADC_BIAS, common::amplitude_for(20.0, &clamp, &config)),
        ..Conditions::nominal(&config)
    };
    let snapshot = one_cycle(&config, &conditions);

    let current = snapshot.current().expect("current channel fitted");
    let expected = expected_value(current.raw.peak_to_peak(), &clamp, &config);
    assert_eq!(current.reading.value, expected);
    assert!(snapshot.flags().current_overlimit);
    assert!(!snapshot.flags().voltage_out_of_range);
}

#[test]
fn dead_adc_channel_yields_invalid_reading() {
    let config = MeterConfig::default();
    let mut peripherals = reference_board(&config, &Conditions::nominal(&config));
    peripherals.board_mut().fail_analog_after(35, 0);

    let mut builder = SnapshotBuilder::new(&config, peripherals).expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    let voltage = snapshot.voltage().expect("voltage channel fitted");
    assert!(voltage.read_failed());
    assert_eq!(voltage.raw.failed, config.adc.sample_count);
    assert!(!voltage.reading.valid);
    // a failing channel still gets the full window of attempts
    let board = builder.peripherals_mut().board();
    assert_eq!(board.analog_reads(35), usize::from(config.adc.sample_count));
    assert!(!snapshot.flags().voltage_out_of_range);

    // other channels keep working
    assert!(snapshot.current().is_some_and(|c| c.reading.valid));
    assert!(snapshot.climate().is_some_and(|c| c.is_valid()));
}

#[test]
fn humidity_nan_is_invalid_and_silent() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        climate: (24.0, f32::NAN),
        ..Conditions::nominal(&config)
    };
    let snapshot = one_cycle(&config, &conditions);

    let climate = snapshot.climate().expect("climate channel fitted");
    assert!(climate.temperature.valid);
    assert!(!climate.humidity.valid);
    assert!(!climate.is_valid());
    assert!(!snapshot.flags().hum_out_of_range);
    assert!(!snapshot.flags().temp_out_of_range);
}

#[test]
fn hot_room_raises_temperature_alarm() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        climate: (31.5, 50.0),
        ..Conditions::nominal(&config)
    };
    let snapshot = one_cycle(&config, &conditions);

    assert!(snapshot.flags().temp_out_of_range);
    assert!(!snapshot.flags().hum_out_of_range);
}

#[test]
fn motion_vote_drives_indicator() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        motion: vec![Level::High, Level::Low, Level::High],
        ..Conditions::nominal(&config)
    };
    let mut builder = SnapshotBuilder::new(&config, reference_board(&config, &conditions))
        .expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    let motion = snapshot.motion().expect("motion channel fitted");
    assert!(motion.detected);
    assert_eq!(motion.tally.active, 2);

    let writes = builder.peripherals_mut().board().writes().to_vec();
    assert_eq!(writes, [(2, Level::High)]);
}

#[test]
fn single_motion_blip_is_rejected() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        motion: vec![Level::Low, Level::High, Level::Low],
        ..Conditions::nominal(&config)
    };
    let mut builder = SnapshotBuilder::new(&config, reference_board(&config, &conditions))
        .expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    assert!(snapshot.motion().is_some_and(|m| !m.detected));
    assert_eq!(builder.peripherals_mut().board().writes(), [(2, Level::Low)]);
}

#[test]
fn meter_at_zero_volts_is_inactive() {
    let config = MeterConfig::with_external_meter();
    let peripherals = meter_board(&config, &[meter_sample(0.0, 20.0)]);
    let mut builder = SnapshotBuilder::new(&config, peripherals).expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    assert!(snapshot.voltage().is_none());
    assert!(snapshot.current().is_none());
    let meter = snapshot.meter().expect("meter fitted");
    assert!(!meter.active);
    assert!(!meter.current.valid);
    assert!(!snapshot.flags().voltage_out_of_range);
    assert!(!snapshot.flags().current_overlimit);
}

#[test]
fn live_meter_feeds_threshold_checks() {
    let config = MeterConfig::with_external_meter();
    let peripherals = meter_board(&config, &[meter_sample(255.0, 17.0)]);
    let mut builder = SnapshotBuilder::new(&config, peripherals).expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    let meter = snapshot.meter().expect("meter fitted");
    assert!(meter.active);
    assert_eq!(meter.frequency.get(), Some(50.0));
    assert!(snapshot.flags().voltage_out_of_range);
    assert!(snapshot.flags().current_overlimit);
}

#[test]
fn stripped_down_build_skips_unfitted_channels() {
    let config = MeterConfig {
        current: None,
        motion: None,
        climate: None,
        ..MeterConfig::default()
    };
    let mut board = MockBoard::new();
    board.script_analog(35, &[100, 4000]);

    let mut builder = SnapshotBuilder::new(&config, Peripherals::new(board)).expect("valid configuration");
    let snapshot = builder.build(CycleClock::new(MockTimeSource::new(0)).next_stamp());

    assert!(snapshot.voltage().is_some());
    assert!(snapshot.current().is_none());
    assert!(snapshot.motion().is_none());
    assert!(snapshot.climate().is_none());
    assert!(builder.peripherals_mut().board().writes().is_empty());
}

#[test]
fn climate_channel_without_driver_is_rejected() {
    let config = MeterConfig::default();
    let result = SnapshotBuilder::new(&config, Peripherals::new(MockBoard::new()));
    assert!(matches!(result, Err(ConfigError::MissingPeripheral { .. })));
}

#[test]
fn climate_sensor_started_once_across_cycles() {
    let config = MeterConfig::default();
    let conditions = Conditions::nominal(&config);
    let mut builder = SnapshotBuilder::new(&config, reference_board(&config, &conditions))
        .expect("valid configuration");
    let time = MockTimeSource::new(0);
    let mut clock = CycleClock::new(&time);

    for _ in 0..5 {
        builder.build(clock.next_stamp());
        time.advance(1000);
    }

    let (_, climate, _) = builder.into_peripherals().into_parts();
    let climate: ScriptedClimate = climate.map(ClimateHandle::release).expect("climate handle attached");
    assert_eq!(climate.begin_calls, 1);
}

#[test]
fn schedules_pace_sampling_and_sending() {
    let config = MeterConfig::default();
    let conditions = Conditions::nominal(&config);
    let mut builder = SnapshotBuilder::new(&config, reference_board(&config, &conditions))
        .expect("valid configuration");

    let time = MockTimeSource::new(0);
    let mut clock = CycleClock::new(&time);
    let mut sample_gate = IntervalSchedule::new(config.timing.sample_interval_ms);
    let mut send_gate = IntervalSchedule::new(config.timing.send_interval_ms);

    let mut latest: Option<SensorSnapshot> = None;
    let mut sampled = 0;
    let mut sent = Vec::new();

    for _ in 0..=100 {
        let now = time.now();
        if sample_gate.poll(now) {
            latest = Some(builder.build(clock.next_stamp()));
            sampled += 1;
        }
        if send_gate.poll(now) {
            if let Some(snapshot) = &latest {
                sent.push((snapshot.stamp().sequence, snapshot.stamp().timestamp));
            }
        }
        time.advance(100);
    }

    assert_eq!(sampled, 11);
    assert_eq!(sent, [(0, 0), (5, 5000), (10, 10_000)]);
}

#[test]
fn each_cycle_produces_a_fresh_snapshot() {
    let config = MeterConfig::default();
    let conditions = Conditions {
        climate: (22.0, 45.0),
        ..Conditions::nominal(&config)
    };
    let climate = ClimateHandle::initialize(ScriptedClimate::new(&[(22.0, 45.0), (35.0, 45.0)]))
        .expect("scripted climate sensor always starts");
    let peripherals = reference_board(&config, &conditions).with_climate(climate);

    let mut builder = SnapshotBuilder::new(&config, peripherals).expect("valid configuration");
    let time = MockTimeSource::new(0);
    let mut clock = CycleClock::new(&time);

    let first = builder.build(clock.next_stamp());
    time.advance(1000);
    let second = builder.build(clock.next_stamp());

    assert!(!first.flags().temp_out_of_range);
    assert!(second.flags().temp_out_of_range);
    assert_eq!(first.stamp().sequence + 1, second.stamp().sequence);
    assert_ne!(first, second);
}
