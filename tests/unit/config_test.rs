//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use parking_space_ledger::config::{FeeConfig, ParkingConfig, StoreBackendConfig};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = ParkingConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.default_page_size, 10);
    assert_eq!(cfg.fee, FeeConfig { rate_per_period: 10, period_secs: 3600 });
    assert_eq!(cfg.store, StoreBackendConfig::InMemory);
}

#[test]
fn test_invalid_values_rejected() {
    let zero_timeout = ParkingConfig {
        store_timeout_ms: 0,
        ..ParkingConfig::default()
    };
    assert!(zero_timeout.validate().is_err());

    let zero_page = ParkingConfig {
        default_page_size: 0,
        ..ParkingConfig::default()
    };
    assert!(zero_page.validate().is_err());

    let zero_period = ParkingConfig {
        fee: FeeConfig { rate_per_period: 10, period_secs: 0 },
        ..ParkingConfig::default()
    };
    assert!(zero_period.validate().is_err());

    let blank_dir = ParkingConfig {
        store: StoreBackendConfig::File { dir: " ".into(), stream: "parking".into() },
        ..ParkingConfig::default()
    };
    assert!(blank_dir.validate().is_err());
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = ParkingConfig::from_json_str(
        r#"{"default_page_size": 25, "store": {"file": {"dir": "/tmp/p", "stream": "lots"}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.default_page_size, 25);
    assert_eq!(cfg.max_claim_attempts, 8);
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File { dir: "/tmp/p".into(), stream: "lots".into() }
    );
    assert!(ParkingConfig::from_json_str(r#"{"max_claim_attempts": 0}"#).is_err());
    assert!(ParkingConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_lookup_overrides() {
    let cfg = ParkingConfig::from_lookup(lookup(&[
        ("PARKING_STORE_TIMEOUT_MS", "250"),
        ("PARKING_FEE_RATE", "4"),
        ("PARKING_FEE_PERIOD_SECS", "900"),
        ("PARKING_STORE", "file"),
        ("PARKING_STORE_DIR", "/var/lib/parking"),
    ]))
    .unwrap();
    assert_eq!(cfg.store_timeout_ms, 250);
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File { dir: "/var/lib/parking".into(), stream: "parking".into() }
    );

    let settings = cfg.settings();
    assert_eq!(settings.store.timeout, Duration::from_millis(250));
    assert_eq!(settings.fees.period, Duration::from_secs(900));
    assert_eq!(settings.fees.fee_for(3_600_000), 16);
}

#[test]
fn test_from_lookup_rejects_bad_values() {
    assert!(ParkingConfig::from_lookup(lookup(&[("PARKING_PAGE_SIZE", "ten")])).is_err());
    assert!(ParkingConfig::from_lookup(lookup(&[("PARKING_PAGE_SIZE", "0")])).is_err());
    assert!(ParkingConfig::from_lookup(lookup(&[("PARKING_STORE", "redis")])).is_err());
    assert!(ParkingConfig::from_lookup(lookup(&[("PARKING_STORE", "file")])).is_err());
    assert_eq!(
        ParkingConfig::from_lookup(lookup(&[])).unwrap(),
        ParkingConfig::default()
    );
}
