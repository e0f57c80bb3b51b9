//! Loading device profiles from JSON files

use std::io::Write;

use meterline_schemas::{DeviceProfile, EncodeError};

fn write_profile(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write profile");
    file
}

#[test]
fn profile_from_file() {
    let file = write_profile(
        r#"{
            "tenant": "hospital-abc",
            "device": {
                "id": "esp32-icu-01",
                "fw": "2.1.0",
                "location": { "room": "ICU-01", "lat": -6.2, "lng": 106.8 },
                "tags": ["demo", "multisensor"]
            },
            "agg": { "window_s": 10, "method": "mean" }
        }"#,
    );
    let profile = DeviceProfile::from_json_file(file.path()).expect("valid profile");

    assert_eq!(profile.tenant, "hospital-abc");
    assert_eq!(profile.device.id, "esp32-icu-01");
    assert_eq!(profile.device.location.lng, Some(106.8));
    assert_eq!(profile.device.tags, ["demo", "multisensor"]);
    assert_eq!(profile.agg.window_s, 10);
    // power block was not in the file
    assert_eq!(profile.power.voltage_v, Some(5.0));
}

#[test]
fn empty_device_id_rejected_at_load() {
    let file = write_profile(r#"{ "tenant": "hospital-abc", "device": { "id": "" } }"#);
    assert_eq!(
        DeviceProfile::from_json_file(file.path()),
        Err(EncodeError::Profile { reason: "device.id is empty" })
    );
}

#[test]
fn malformed_json_is_a_profile_error() {
    let file = write_profile("{ \"device\": ");
    assert_eq!(
        DeviceProfile::from_json_file(file.path()),
        Err(EncodeError::Profile { reason: "invalid JSON profile" })
    );
}

#[test]
fn missing_file_is_a_profile_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = DeviceProfile::from_json_file(dir.path().join("profile.json"));
    assert_eq!(result, Err(EncodeError::Profile { reason: "profile file unreadable" }));
}
