//! Meterline Avro schemas
//!
//! Mirrors the JSON payload so ingest services can validate documents and
//! archive them in Avro containers. Nullable JSON values map to
//! `["null", T]` unions with a `null` default.

use apache_avro::Schema;
use serde_json::{json, Value};

use crate::{EncodeError, EncodeResult};

fn nullable(name: &str, ty: &str) -> Value {
    json!({ "name": name, "type": ["null", ty], "default": null })
}

fn record(name: &str, fields: Vec<Value>) -> Value {
    json!({ "type": "record", "name": name, "fields": fields })
}

fn field(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty })
}

fn device() -> Value {
    let location = record(
        "Location",
        vec![
            field("room", json!("string")),
            nullable("lat", "double"),
            nullable("lng", "double"),
            nullable("alt_m", "double"),
        ],
    );
    record(
        "Device",
        vec![
            field("id", json!("string")),
            field("type", json!("string")),
            field("fw", json!("string")),
            field("name", json!("string")),
            field("location", location),
            field("tags", json!({ "type": "array", "items": "string" })),
        ],
    )
}

fn network() -> Value {
    record(
        "Network",
        vec![
            field("conn", json!("string")),
            field("ip", json!("string")),
            field("rssi_dbm", json!("int")),
            nullable("snr_db", "double"),
            field("mac", json!("string")),
        ],
    )
}

fn power() -> Value {
    record(
        "Power",
        vec![
            nullable("battery_pct", "float"),
            nullable("voltage_v", "float"),
            nullable("charging", "boolean"),
        ],
    )
}

fn resources() -> Value {
    record(
        "Resources",
        vec![
            field("uptime_s", json!("long")),
            nullable("cpu_pct", "double"),
            nullable("mem_pct", "double"),
            nullable("fs_used_pct", "double"),
            field("heap_free_kb", json!("int")),
            nullable("flash_free_kb", "int"),
            nullable("temp_c", "double"),
        ],
    )
}

fn aggregation() -> Value {
    record(
        "Aggregation",
        vec![field("window_s", json!("int")), field("method", json!("string"))],
    )
}

fn observations() -> Value {
    json!([
        record("VoltageObservation", vec![nullable("voltage_v", "double")]),
        record("CurrentObservation", vec![nullable("current_a", "double")]),
        record("MotionObservation", vec![nullable("motion_detected", "boolean")]),
        record(
            "ClimateObservation",
            vec![nullable("temperature_c", "double"), nullable("humidity_pct", "double")],
        ),
        record(
            "MeterObservation",
            vec![
                nullable("voltage_v", "double"),
                nullable("current_a", "double"),
                nullable("power_w", "double"),
                nullable("energy_kwh", "double"),
                nullable("frequency_hz", "double"),
                nullable("power_factor", "double"),
            ],
        ),
    ])
}

fn quality() -> Value {
    let status = json!({
        "type": "enum",
        "name": "QualityStatus",
        "symbols": ["ok", "inactive", "error"]
    });
    let error_code = json!({
        "type": "enum",
        "name": "ErrorCode",
        "symbols": ["sensor_read_failed", "communication_failed", "adc_read_failed"]
    });
    record(
        "Quality",
        vec![
            field("status", status),
            field("calibrated", json!("boolean")),
            field("errors", json!({ "type": "array", "items": error_code })),
            field("notes", json!("string")),
        ],
    )
}

fn sensor_entry() -> Value {
    record(
        "SensorEntry",
        vec![
            field("sensor", json!("string")),
            field("category", json!("string")),
            field("iface", json!("string")),
            field("unit_system", json!("string")),
            field("observations", observations()),
            field("quality", quality()),
        ],
    )
}

/// Telemetry document schema v1 (payload version 1.2)
pub fn telemetry_document_v1() -> EncodeResult<Schema> {
    let schema_json = json!({
        "namespace": "io.meterline.telemetry.v1",
        "type": "record",
        "name": "TelemetryDocument",
        "doc": "One sampling cycle of an energy/environment meter",
        "fields": [
            { "name": "version", "type": "string" },
            {
                "name": "ts",
                "type": ["null", "string"],
                "default": null,
                "doc": "RFC 3339 UTC; null until the device has wall-clock time"
            },
            { "name": "seq", "type": "long" },
            { "name": "tenant", "type": "string" },
            { "name": "device", "type": device() },
            { "name": "network", "type": network() },
            { "name": "power", "type": power() },
            { "name": "resources", "type": resources() },
            { "name": "agg", "type": aggregation() },
            { "name": "data", "type": { "type": "array", "items": sensor_entry() } }
        ]
    });

    Schema::parse(&schema_json).map_err(|e| {
        log::warn!("telemetry schema rejected: {}", e);
        EncodeError::Schema { reason: "telemetry document schema" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_telemetry_schema() {
        let schema = telemetry_document_v1();
        assert!(schema.is_ok());
    }

    #[test]
    fn top_level_fields_follow_payload_order() {
        let Schema::Record(record) = telemetry_document_v1().unwrap() else {
            panic!("expected a record schema");
        };
        let names: Vec<_> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "version", "ts", "seq", "tenant", "device", "network", "power", "resources", "agg",
                "data"
            ]
        );
    }
}
