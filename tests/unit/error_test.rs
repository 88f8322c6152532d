//! Tests for error types

use parking_space_ledger::core::{ErrorKind, ParkingError};

#[test]
fn test_display_messages() {
    assert_eq!(
        ParkingError::NoSpaceAvailable(3).to_string(),
        "no parking space available in lot 3"
    );
    assert_eq!(
        ParkingError::AlreadyClosed(9).to_string(),
        "reservation 9 already closed"
    );
    assert_eq!(
        ParkingError::Timeout("claim_space").to_string(),
        "storage operation `claim_space` timed out"
    );
    assert_eq!(
        ParkingError::Backend("connection failed".to_string()).to_string(),
        "backend error: connection failed"
    );
}

#[test]
fn test_kinds() {
    assert_eq!(ParkingError::UnknownLot(1).kind(), ErrorKind::NotFound);
    assert_eq!(ParkingError::UnknownSpace(1).kind(), ErrorKind::NotFound);
    assert_eq!(ParkingError::SpaceBooked(1).kind(), ErrorKind::Conflict);
    assert_eq!(ParkingError::NoSpaceAvailable(1).kind(), ErrorKind::Unavailable);
    assert_eq!(
        ParkingError::Invariant("x".into()).kind(),
        ErrorKind::Invariant
    );
}

#[test]
fn test_only_storage_failures_are_transient() {
    assert!(ParkingError::Timeout("space").is_transient());
    assert!(ParkingError::Backend("down".into()).is_transient());
    assert!(!ParkingError::AlreadyClosed(1).is_transient());
    assert!(!ParkingError::Invariant("x".into()).is_transient());
    assert!(!ParkingError::Validation("x".into()).is_transient());
}
