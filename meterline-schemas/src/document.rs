//! Telemetry document types
//!
//! Field order in these structs is the key order on the wire. The document
//! borrows the static parts (profile, network strings) from its caller, so
//! building one per cycle allocates little more than the `data` array.

use serde::Serialize;

use crate::catalog::{ErrorCode, SensorDescriptor};
use crate::profile::{Aggregation, DeviceInfo, PowerInfo};

/// Unit system tag written into every sensor entry
pub const UNIT_SYSTEM: &str = "SI";

/// One complete payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryDocument<'a> {
    pub version: &'static str,
    /// RFC 3339 UTC, `null` until the device has wall-clock time
    pub ts: Option<String>,
    pub seq: u64,
    pub tenant: &'a str,
    pub device: &'a DeviceInfo,
    pub network: NetworkInfo<'a>,
    pub power: &'a PowerInfo,
    pub resources: Resources,
    pub agg: &'a Aggregation,
    pub data: Vec<SensorEntry>,
}

/// `network` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo<'a> {
    pub conn: &'a str,
    pub ip: &'a str,
    pub rssi_dbm: i32,
    pub snr_db: Option<f64>,
    pub mac: &'a str,
}

/// `resources` block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resources {
    pub uptime_s: u64,
    pub cpu_pct: Option<f64>,
    pub mem_pct: Option<f64>,
    pub fs_used_pct: Option<f64>,
    pub heap_free_kb: u32,
    pub flash_free_kb: Option<u32>,
    pub temp_c: Option<f64>,
}

/// One element of `data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorEntry {
    pub sensor: &'static str,
    pub category: &'static str,
    pub iface: &'static str,
    pub unit_system: &'static str,
    pub observations: Observations,
    pub quality: Quality,
}

impl SensorEntry {
    pub(crate) fn new(descriptor: &SensorDescriptor, observations: Observations, quality: Quality) -> Self {
        Self {
            sensor: descriptor.name,
            category: descriptor.category,
            iface: descriptor.iface,
            unit_system: UNIT_SYSTEM,
            observations,
            quality,
        }
    }
}

/// Physical quantities of one sensor
///
/// Serialized without a tag: each variant's keys identify the sensor type.
/// Every key of a variant is always present; unknown values are `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Observations {
    Voltage {
        voltage_v: Option<f64>,
    },
    Current {
        current_a: Option<f64>,
    },
    Motion {
        motion_detected: Option<bool>,
    },
    Climate {
        temperature_c: Option<f64>,
        humidity_pct: Option<f64>,
    },
    Meter {
        voltage_v: Option<f64>,
        current_a: Option<f64>,
        power_w: Option<f64>,
        energy_kwh: Option<f64>,
        frequency_hz: Option<f64>,
        power_factor: Option<f64>,
    },
}

/// Operational state reported in `quality.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    /// Live signal, clean read
    Ok,
    /// Sensor answered but showed no live signal
    Inactive,
    /// Sensor could not be read
    Error,
}

/// `quality` block of a sensor entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quality {
    pub status: QualityStatus,
    pub calibrated: bool,
    /// Ordered, empty unless `status` is `error`
    pub errors: Vec<ErrorCode>,
    pub notes: &'static str,
}

impl Quality {
    pub(crate) fn ok(descriptor: &SensorDescriptor) -> Self {
        Self::with_status(descriptor, QualityStatus::Ok)
    }

    pub(crate) fn inactive(descriptor: &SensorDescriptor) -> Self {
        Self::with_status(descriptor, QualityStatus::Inactive)
    }

    pub(crate) fn error(descriptor: &SensorDescriptor, code: ErrorCode) -> Self {
        Self {
            errors: vec![code],
            ..Self::with_status(descriptor, QualityStatus::Error)
        }
    }

    fn with_status(descriptor: &SensorDescriptor, status: QualityStatus) -> Self {
        Self {
            status,
            calibrated: true,
            errors: Vec::new(),
            notes: descriptor.notes,
        }
    }
}
