#![no_main]
use libfuzzer_sys::fuzz_target;
use seeker_config::preferences::parse_preferences;

// Preference files and telemetry recordings are both user-edited; reject, never panic.
fuzz_target!(|data: &str| {
    if let Ok(values) = parse_preferences(data) {
        assert!(values.keys().all(|k| !k.is_empty()));
    }
    let _ = seeker_config::parse_telemetry_csv(data.as_bytes());
});
