//! Snapshot to payload mapping
//!
//! ## Status Mapping
//!
//! ```text
//! analog channel   window empty        → error    [adc_read_failed]
//!                  p2p > threshold     → ok
//!                  otherwise           → inactive (value still reported)
//! motion           every read failed   → error    [sensor_read_failed]
//!                  otherwise           → ok
//! climate          both values read    → ok
//!                  either NaN          → error    [sensor_read_failed]
//! external meter   voltage > 0         → ok
//!                  otherwise           → error    [communication_failed]
//! ```
//!
//! ## Precision
//!
//! | quantity             | decimals |
//! |----------------------|----------|
//! | voltage, power factor| 2        |
//! | current, energy      | 3        |
//! | temperature, humidity, power, frequency, percentages | 1 |

use chrono::{DateTime, SecondsFormat};
use meterline_core::constants::MS_PER_SECOND;
use meterline_core::derivation::{DerivedReading, MeterReading};
use meterline_core::numeric::round_to;
use meterline_core::snapshot::{AnalogReading, ClimateReading, MotionReading};
use meterline_core::time::CycleStamp;
use meterline_core::SensorSnapshot;

use crate::catalog::{ErrorCode, SensorKind};
use crate::document::{NetworkInfo, Observations, Quality, Resources, SensorEntry, TelemetryDocument};
use crate::metrics::{NetworkMetrics, SystemMetrics};
use crate::profile::DeviceProfile;
use crate::{EncodeError, EncodeResult, PAYLOAD_VERSION};

const VOLTAGE_DECIMALS: u8 = 2;
const CURRENT_DECIMALS: u8 = 3;
const CLIMATE_DECIMALS: u8 = 1;
const POWER_DECIMALS: u8 = 1;
const ENERGY_DECIMALS: u8 = 3;
const FREQUENCY_DECIMALS: u8 = 1;
const POWER_FACTOR_DECIMALS: u8 = 2;
const PERCENT_DECIMALS: u8 = 1;

/// Builds payloads for one device
///
/// Holds only the static profile. Every call is independent, so the same
/// snapshot can be encoded again for a resend.
#[derive(Debug, Clone, Default)]
pub struct TelemetryEncoder {
    profile: DeviceProfile,
}

impl TelemetryEncoder {
    pub fn new(profile: DeviceProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Assemble the document without serializing it
    pub fn document<'a>(
        &'a self,
        snapshot: &SensorSnapshot,
        system: &SystemMetrics,
        network: &'a NetworkMetrics,
    ) -> EncodeResult<TelemetryDocument<'a>> {
        let stamp = snapshot.stamp();
        Ok(TelemetryDocument {
            version: PAYLOAD_VERSION,
            ts: timestamp(&stamp)?,
            seq: stamp.sequence,
            tenant: &self.profile.tenant,
            device: &self.profile.device,
            network: NetworkInfo {
                conn: &network.conn,
                ip: &network.ip,
                rssi_dbm: network.rssi_dbm,
                snr_db: fixed(network.snr_db, 1),
                mac: &network.mac,
            },
            power: &self.profile.power,
            resources: resources(system),
            agg: &self.profile.agg,
            data: sensor_entries(snapshot),
        })
    }

    /// Serialize the document for `snapshot` to compact JSON
    pub fn encode(
        &self,
        snapshot: &SensorSnapshot,
        system: &SystemMetrics,
        network: &NetworkMetrics,
    ) -> EncodeResult<String> {
        let document = self.document(snapshot, system, network)?;
        let payload = serde_json::to_string(&document)?;
        log::debug!("encoded cycle {} ({} bytes)", document.seq, payload.len());
        Ok(payload)
    }
}

/// One entry per fitted channel, in snapshot order
pub fn sensor_entries(snapshot: &SensorSnapshot) -> Vec<SensorEntry> {
    let mut data = Vec::with_capacity(5);

    if let Some(voltage) = snapshot.voltage() {
        data.push(analog_entry(SensorKind::Zmpt101b, voltage, VOLTAGE_DECIMALS, |voltage_v| {
            Observations::Voltage { voltage_v }
        }));
    }
    if let Some(current) = snapshot.current() {
        data.push(analog_entry(SensorKind::Sct013, current, CURRENT_DECIMALS, |current_a| {
            Observations::Current { current_a }
        }));
    }
    if let Some(meter) = snapshot.meter() {
        data.push(meter_entry(meter));
    }
    if let Some(motion) = snapshot.motion() {
        data.push(motion_entry(motion));
    }
    if let Some(climate) = snapshot.climate() {
        data.push(climate_entry(climate));
    }
    data
}

fn analog_entry(
    kind: SensorKind,
    analog: &AnalogReading,
    decimals: u8,
    observe: impl FnOnce(Option<f64>) -> Observations,
) -> SensorEntry {
    let descriptor = kind.descriptor();
    if analog.read_failed() {
        return SensorEntry::new(descriptor, observe(None), Quality::error(descriptor, ErrorCode::AdcReadFailed));
    }

    let quality = if analog.reading.valid {
        Quality::ok(descriptor)
    } else {
        Quality::inactive(descriptor)
    };
    SensorEntry::new(descriptor, observe(fixed(Some(analog.reading.value), decimals)), quality)
}

fn meter_entry(meter: &MeterReading) -> SensorEntry {
    let descriptor = SensorKind::Pzem004t.descriptor();
    let observations = Observations::Meter {
        voltage_v: derived(&meter.voltage, VOLTAGE_DECIMALS),
        current_a: derived(&meter.current, CURRENT_DECIMALS),
        power_w: derived(&meter.power, POWER_DECIMALS),
        energy_kwh: derived(&meter.energy, ENERGY_DECIMALS),
        frequency_hz: derived(&meter.frequency, FREQUENCY_DECIMALS),
        power_factor: derived(&meter.power_factor, POWER_FACTOR_DECIMALS),
    };
    let quality = if meter.active {
        Quality::ok(descriptor)
    } else {
        Quality::error(descriptor, ErrorCode::CommunicationFailed)
    };
    SensorEntry::new(descriptor, observations, quality)
}

fn motion_entry(motion: &MotionReading) -> SensorEntry {
    let descriptor = SensorKind::HcSr501.descriptor();
    if motion.read_failed() {
        return SensorEntry::new(
            descriptor,
            Observations::Motion { motion_detected: None },
            Quality::error(descriptor, ErrorCode::SensorReadFailed),
        );
    }
    SensorEntry::new(
        descriptor,
        Observations::Motion { motion_detected: Some(motion.detected) },
        Quality::ok(descriptor),
    )
}

fn climate_entry(climate: &ClimateReading) -> SensorEntry {
    let descriptor = SensorKind::Dht22.descriptor();
    let observations = Observations::Climate {
        temperature_c: derived(&climate.temperature, CLIMATE_DECIMALS),
        humidity_pct: derived(&climate.humidity, CLIMATE_DECIMALS),
    };
    let quality = if climate.is_valid() {
        Quality::ok(descriptor)
    } else {
        Quality::error(descriptor, ErrorCode::SensorReadFailed)
    };
    SensorEntry::new(descriptor, observations, quality)
}

fn resources(system: &SystemMetrics) -> Resources {
    Resources {
        uptime_s: system.uptime_s,
        cpu_pct: fixed(system.cpu_pct, PERCENT_DECIMALS),
        mem_pct: system.mem_pct().map(|pct| round_to(pct, PERCENT_DECIMALS)),
        fs_used_pct: fixed(system.fs_used_pct, PERCENT_DECIMALS),
        heap_free_kb: system.heap_free_kb(),
        flash_free_kb: system.flash_free_kb,
        temp_c: fixed(system.temp_c, CLIMATE_DECIMALS),
    }
}

fn derived(reading: &DerivedReading, decimals: u8) -> Option<f64> {
    fixed(reading.get(), decimals)
}

/// Round to `decimals`; NaN and infinities become `None`
fn fixed(value: Option<f32>, decimals: u8) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| round_to(v as f64, decimals))
}

fn timestamp(stamp: &CycleStamp) -> EncodeResult<Option<String>> {
    if !stamp.wall_clock {
        return Ok(None);
    }
    let millis = stamp.timestamp;
    let secs = i64::try_from(millis / MS_PER_SECOND).map_err(|_| EncodeError::TimestampOutOfRange { millis })?;
    DateTime::from_timestamp(secs, 0)
        .map(|ts| Some(ts.to_rfc3339_opts(SecondsFormat::Secs, true)))
        .ok_or(EncodeError::TimestampOutOfRange { millis })
}
