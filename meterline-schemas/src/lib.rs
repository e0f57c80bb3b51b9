//! Telemetry Payload Documents for Meterline
//!
//! ## Overview
//!
//! Turns one [`SensorSnapshot`](meterline_core::SensorSnapshot) plus system and
//! network metadata into the JSON document the backend ingests:
//!
//! ```json
//! {
//!   "version": "1.2",
//!   "ts": "2025-09-22T14:20:15Z",
//!   "seq": 141463,
//!   "tenant": "hospital-abc",
//!   "device": { "id": "...", "type": "esp32", "fw": "2.1.0", "name": "...",
//!               "location": { "room": "ICU-01", "lat": -6.2, "lng": 106.8, "alt_m": 45.0 },
//!               "tags": ["demo"] },
//!   "network": { "conn": "wifi", "ip": "...", "rssi_dbm": -61, "snr_db": null, "mac": "..." },
//!   "power": { "battery_pct": null, "voltage_v": 5.0, "charging": true },
//!   "resources": { "uptime_s": 3600, "cpu_pct": null, "mem_pct": 62.5, ... },
//!   "agg": { "window_s": 5, "method": "raw" },
//!   "data": [
//!     { "sensor": "zmpt101b", "category": "power", "iface": "analog", "unit_system": "SI",
//!       "observations": { "voltage_v": 229.87 },
//!       "quality": { "status": "ok", "calibrated": true, "errors": [], "notes": "..." } }
//!   ]
//! }
//! ```
//!
//! ## Schema Stability
//!
//! Key order is the declaration order of the document structs, and every
//! sensor entry always carries the same keys for its sensor type. A value
//! that could not be measured is `null`, never missing. `data` follows the
//! snapshot's fixed channel order, so one firmware build always emits the
//! same shape.
//!
//! ## Determinism
//!
//! Floats are rounded to a fixed number of decimals per quantity before
//! serialization, and the encoder holds no state between calls. Encoding the
//! same snapshot and metadata twice yields byte-identical strings, which is
//! what makes resending a payload safe without sampling again.
//!
//! ## Avro
//!
//! [`schemas::telemetry_document_v1`] describes the same document as an Avro
//! record for ingest-side consumers that store payloads in Avro containers.
//!
//! ## Usage Example
//!
//! ```rust
//! use meterline_core::mock::{MockBoard, ScriptedClimate};
//! use meterline_core::snapshot::{Peripherals, SnapshotBuilder};
//! use meterline_core::time::{CycleClock, MockTimeSource};
//! use meterline_core::traits::{ClimateHandle, Level};
//! use meterline_core::MeterConfig;
//! use meterline_schemas::{DeviceProfile, NetworkMetrics, SystemMetrics, TelemetryEncoder};
//!
//! let config = MeterConfig::default();
//! let mut board = MockBoard::new();
//! board.script_analog(35, &[100, 4000]);
//! board.script_analog(34, &[2040, 2060]);
//! board.script_digital(27, &[Level::Low]);
//! let climate = ClimateHandle::initialize(ScriptedClimate::constant(22.0, 45.0))?;
//! let mut builder = SnapshotBuilder::new(&config, Peripherals::new(board).with_climate(climate))?;
//! let snapshot = builder.build(CycleClock::new(MockTimeSource::wall_clock(1_758_550_815_000)).next_stamp());
//!
//! let encoder = TelemetryEncoder::new(DeviceProfile::default());
//! let payload = encoder.encode(&snapshot, &SystemMetrics::default(), &NetworkMetrics::default())?;
//! assert!(payload.starts_with(r#"{"version":"1.2","ts":"2025-09-22T14:20:15Z","seq":0"#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod document;
pub mod encoder;
pub mod metrics;
pub mod profile;
pub mod schemas;

pub use catalog::{ErrorCode, SensorKind};
pub use document::{Observations, Quality, QualityStatus, SensorEntry, TelemetryDocument};
pub use encoder::TelemetryEncoder;
pub use metrics::{NetworkMetrics, SystemMetrics};
pub use profile::DeviceProfile;

/// Payload version written into every document
pub const PAYLOAD_VERSION: &str = "1.2";

/// Errors raised while assembling or serializing a payload
///
/// Any of these means "skip transmission for this cycle"; none of them is
/// fatal to the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
pub enum EncodeError {
    /// Wall-clock timestamp cannot be represented as a calendar date
    #[error("timestamp {millis} ms is out of range")]
    TimestampOutOfRange { millis: u64 },

    /// JSON serialization failed
    #[error("serialization failed: {reason}")]
    Serialization { reason: &'static str },

    /// Avro schema definition was rejected by the parser
    #[error("schema rejected: {reason}")]
    Schema { reason: &'static str },

    /// Device profile could not be loaded
    #[error("device profile invalid: {reason}")]
    Profile { reason: &'static str },
}

/// Result type for payload encoding
pub type EncodeResult<T> = Result<T, EncodeError>;

impl From<serde_json::Error> for EncodeError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;

        log::warn!("payload serialization failed: {}", e);
        let reason = match e.classify() {
            Category::Io => "i/o error",
            Category::Syntax => "syntax error",
            Category::Data => "value not representable",
            Category::Eof => "unexpected end of input",
        };
        EncodeError::Serialization { reason }
    }
}
