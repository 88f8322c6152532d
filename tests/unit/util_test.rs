//! Tests for utility functions

use parking_space_ledger::util::{now_ms, Clock, ManualClock, SystemClock, DEFAULT_LOG_FILTER};

#[test]
fn test_system_clock_tracks_now() {
    let before = now_ms();
    let reading = SystemClock.now_ms();
    assert!(reading >= before);
}

#[test]
fn test_manual_clock_only_moves_when_told() {
    let clock = ManualClock::new(42);
    assert_eq!(clock.now_ms(), 42);
    assert_eq!(clock.now_ms(), 42);
    clock.advance_secs(1);
    assert_eq!(clock.now_ms(), 1_042);
}

#[test]
fn test_default_log_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("parking_space_ledger"));
}

#[test]
fn test_init_tracing_is_idempotent() {
    parking_space_ledger::util::init_tracing();
    parking_space_ledger::util::init_tracing();
    tracing::info!("tracing initialised");
}
