//! Sensor catalog
//!
//! Static description of every physical sensor a Meterline board can carry:
//! the name, category and interface that appear in each `data` entry, plus
//! the human-readable note attached to its quality block.

use serde::Serialize;

/// Physical sensors known to the payload format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// AC voltage transformer module
    Zmpt101b,
    /// Split-core AC current clamp
    Sct013,
    /// Passive infrared motion detector
    HcSr501,
    /// Temperature and humidity sensor
    Dht22,
    /// Serial power meter
    Pzem004t,
}

/// Catalog entry for one sensor type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: &'static str,
    pub category: &'static str,
    pub iface: &'static str,
    pub notes: &'static str,
}

const ZMPT101B: SensorDescriptor = SensorDescriptor {
    name: "zmpt101b",
    category: "power",
    iface: "analog",
    notes: "AC voltage sensor ZMPT101B for electrical monitoring.",
};

const SCT013: SensorDescriptor = SensorDescriptor {
    name: "sct013",
    category: "power",
    iface: "analog",
    notes: "AC current sensor SCT013 for electrical load monitoring.",
};

const HC_SR501: SensorDescriptor = SensorDescriptor {
    name: "hc-sr501",
    category: "motion",
    iface: "digital",
    notes: "PIR motion sensor HC-SR501 for presence detection.",
};

const DHT22: SensorDescriptor = SensorDescriptor {
    name: "dht22",
    category: "env",
    iface: "digital",
    notes: "DHT22 sensor for room temperature and humidity monitoring.",
};

const PZEM004T: SensorDescriptor = SensorDescriptor {
    name: "pzem004t",
    category: "power",
    iface: "uart",
    notes: "PZEM-004T energy meter for voltage, current, power and energy monitoring.",
};

impl SensorKind {
    pub const fn descriptor(self) -> &'static SensorDescriptor {
        match self {
            SensorKind::Zmpt101b => &ZMPT101B,
            SensorKind::Sct013 => &SCT013,
            SensorKind::HcSr501 => &HC_SR501,
            SensorKind::Dht22 => &DHT22,
            SensorKind::Pzem004t => &PZEM004T,
        }
    }

    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }
}

/// Stable error codes reported in `quality.errors`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A digital sensor returned NaN or did not answer
    SensorReadFailed,
    /// The serial meter did not report a live voltage
    CommunicationFailed,
    /// Every ADC read in the acquisition window failed
    AdcReadFailed,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::SensorReadFailed => "sensor_read_failed",
            ErrorCode::CommunicationFailed => "communication_failed",
            ErrorCode::AdcReadFailed => "adc_read_failed",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
