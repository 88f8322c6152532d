//! Tests for builder modules

use std::sync::Arc;

use parking_space_ledger::builders::{build_configured_coordinator, build_coordinator, open_store};
use parking_space_ledger::config::{ParkingConfig, StoreBackendConfig};
use parking_space_ledger::core::{ParkingError, ParkingStore, SpaceStatus};
use parking_space_ledger::infra::InMemoryStore;
use parking_space_ledger::util::ManualClock;

#[tokio::test]
async fn test_build_coordinator_applies_settings() {
    let cfg = ParkingConfig {
        default_page_size: 3,
        max_claim_attempts: 2,
        ..ParkingConfig::default()
    };
    let coord = build_coordinator(
        &cfg,
        |_| Ok(Arc::new(InMemoryStore::new())),
        Arc::new(ManualClock::new(0)),
    )
    .unwrap();
    assert_eq!(coord.settings().default_page_size, 3);
    assert_eq!(coord.settings().max_claim_attempts, 2);

    for n in 0..4 {
        coord.create_lot(&format!("lot {n}")).await.unwrap();
    }
    assert_eq!(coord.list_lots(1, None).await.unwrap().data.len(), 3);
}

#[test]
fn test_build_coordinator_rejects_invalid_config() {
    let cfg = ParkingConfig {
        max_claim_attempts: 0,
        ..ParkingConfig::default()
    };
    let result = build_coordinator(
        &cfg,
        |_| Ok(Arc::new(InMemoryStore::new())),
        Arc::new(ManualClock::new(0)),
    );
    assert!(matches!(result, Err(ParkingError::Validation(_))));
}

#[tokio::test]
async fn test_configured_file_store_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("parking-builder-{}", uuid::Uuid::new_v4()));
    let cfg = ParkingConfig {
        store: StoreBackendConfig::File {
            dir: dir.display().to_string(),
            stream: "ledger".into(),
        },
        ..ParkingConfig::default()
    };

    let (lot, space) = {
        let coord = build_configured_coordinator(&cfg).unwrap();
        let lot = coord.create_lot("Persistent").await.unwrap();
        let space = coord.register_space(lot).await.unwrap();
        coord.park(lot, 1).await.unwrap();
        (lot, space)
    };

    let store = open_store(&cfg).unwrap();
    assert!(store.lot_exists(lot).await.unwrap());
    assert_eq!(
        store.space(space).await.unwrap().unwrap().status,
        SpaceStatus::Booked
    );
    let _ = std::fs::remove_dir_all(dir);
}
