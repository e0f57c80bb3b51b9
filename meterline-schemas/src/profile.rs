//! Static per-device payload metadata
//!
//! Everything in the document that does not change between cycles: tenant,
//! device identity and location, power supply and aggregation settings.
//! Loaded once at startup alongside the meter configuration.

use serde::{Deserialize, Serialize};

use crate::{EncodeError, EncodeResult};

/// Where the device is installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub room: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub alt_m: Option<f64>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            room: "unassigned".into(),
            lat: None,
            lng: None,
            alt_m: None,
        }
    }
}

/// Device identity block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fw: String,
    pub name: String,
    pub location: Location,
    pub tags: Vec<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            id: "meterline-0001".into(),
            kind: "esp32".into(),
            fw: env!("CARGO_PKG_VERSION").into(),
            name: "Meterline Energy Meter".into(),
            location: Location::default(),
            tags: Vec::new(),
        }
    }
}

/// Power supply block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerInfo {
    /// `None` for mains-powered boards
    pub battery_pct: Option<f32>,
    pub voltage_v: Option<f32>,
    pub charging: Option<bool>,
}

impl Default for PowerInfo {
    /// USB-powered board without a battery
    fn default() -> Self {
        Self {
            battery_pct: None,
            voltage_v: Some(5.0),
            charging: Some(true),
        }
    }
}

/// How readings were aggregated before sending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregation {
    pub window_s: u32,
    pub method: String,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self {
            window_s: 5,
            method: "raw".into(),
        }
    }
}

/// Payload metadata that is fixed for the lifetime of the firmware
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub tenant: String,
    pub device: DeviceInfo,
    pub power: PowerInfo,
    pub agg: Aggregation,
}

impl DeviceProfile {
    /// Parse a profile from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> EncodeResult<Self> {
        let profile: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("device profile rejected: {}", e);
            EncodeError::Profile { reason: "invalid JSON profile" }
        })?;
        if profile.device.id.is_empty() {
            return Err(EncodeError::Profile { reason: "device.id is empty" });
        }
        Ok(profile)
    }

    /// Read and parse a profile file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> EncodeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            log::warn!("cannot read {}: {}", path.as_ref().display(), e);
            EncodeError::Profile { reason: "profile file unreadable" }
        })?;
        Self::from_json_str(&text)
    }
}
