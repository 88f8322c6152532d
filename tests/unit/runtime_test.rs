//! Tests for the request handlers

use std::sync::Arc;

use parking_space_ledger::core::{CoordinatorSettings, ErrorKind, LifecycleCoordinator};
use parking_space_ledger::infra::InMemoryStore;
use parking_space_ledger::runtime::api;
use parking_space_ledger::util::ManualClock;

fn coordinator() -> (LifecycleCoordinator<InMemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let coord = LifecycleCoordinator::new(
        Arc::new(InMemoryStore::new()),
        CoordinatorSettings::default(),
        clock.clone(),
    );
    (coord, clock)
}

#[tokio::test]
async fn test_full_request_flow() {
    let (coord, clock) = coordinator();

    let lot = api::create_lot(&coord, br#"{"name": "Central"}"#).await.unwrap();
    assert_eq!(lot.status, 201);
    let lot_id = lot.body.id.to_string();

    let space = api::create_space(&coord, &lot_id).await.unwrap();
    assert_eq!(space.status, 201);

    let listed = api::list_spaces(&coord, &lot_id).await.unwrap();
    assert_eq!(listed.body.data.len(), 1);
    assert_eq!(listed.body.data[0].slot_number, 1);
    let json = serde_json::to_value(&listed.body).unwrap();
    assert_eq!(json["data"][0]["status"], "AVAILABLE");

    let parked = api::park(&coord, &lot_id, br#"{"user_id": 77}"#).await.unwrap();
    assert_eq!(parked.status, 201);

    clock.advance_secs(3_601);
    let unparked = api::unpark(&coord, &parked.body.id.to_string()).await.unwrap();
    assert_eq!(unparked.status, 201);
    assert_eq!(unparked.body.fee, 20);

    let again = api::unpark(&coord, &parked.body.id.to_string()).await.unwrap_err();
    assert_eq!(again.status, 400);
    assert_eq!(again.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_list_lots_paging() {
    let (coord, _clock) = coordinator();
    for n in 0..12 {
        let body = format!(r#"{{"name": "lot {n}"}}"#);
        api::create_lot(&coord, body.as_bytes()).await.unwrap();
    }

    let first = api::list_lots(&coord, None).await.unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.body.current_page, 1);
    assert_eq!(first.body.total_count, 12);
    assert_eq!(first.body.data.len(), 10);

    let second = api::list_lots(&coord, Some("2")).await.unwrap();
    assert_eq!(second.body.data.len(), 2);

    for bad in ["0", "-1", "abc"] {
        let err = api::list_lots(&coord, Some(bad)).await.unwrap_err();
        assert_eq!(err.status, 400, "page {bad}");
    }
}

#[tokio::test]
async fn test_input_validation() {
    let (coord, _clock) = coordinator();
    let lot = api::create_lot(&coord, br#"{"name": "Central"}"#).await.unwrap();
    let lot_id = lot.body.id.to_string();

    assert_eq!(api::create_lot(&coord, br#"{"name": "  "}"#).await.unwrap_err().status, 400);
    assert_eq!(api::create_lot(&coord, b"{").await.unwrap_err().status, 400);
    assert_eq!(api::create_space(&coord, "0").await.unwrap_err().status, 400);
    assert_eq!(api::create_space(&coord, "999").await.unwrap_err().status, 400);

    let missing_user = api::park(&coord, &lot_id, b"{}").await.unwrap_err();
    assert_eq!(missing_user.kind, ErrorKind::Validation);

    let full = api::park(&coord, &lot_id, br#"{"user_id": 1}"#).await.unwrap_err();
    assert_eq!(full.status, 400);
    assert_eq!(full.kind, ErrorKind::Unavailable);
}

#[tokio::test]
async fn test_maintenance_handler() {
    let (coord, _clock) = coordinator();
    let lot = api::create_lot(&coord, br#"{"name": "Central"}"#).await.unwrap();
    let lot_id = lot.body.id.to_string();
    let space = api::create_space(&coord, &lot_id).await.unwrap();
    let space_id = space.body.id.to_string();

    let ok = api::set_maintenance(&coord, &lot_id, &space_id, br#"{"maintenance": true}"#)
        .await
        .unwrap();
    assert_eq!(ok.status, 200);
    let err = api::park(&coord, &lot_id, br#"{"user_id": 3}"#).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unavailable);

    api::set_maintenance(&coord, &lot_id, &space_id, br#"{"maintenance": false}"#)
        .await
        .unwrap();
    api::park(&coord, &lot_id, br#"{"user_id": 3}"#).await.unwrap();

    let booked = api::set_maintenance(&coord, &lot_id, &space_id, br#"{"maintenance": true}"#)
        .await
        .unwrap_err();
    assert_eq!(booked.status, 400);
    assert_eq!(booked.kind, ErrorKind::Conflict);

    let missing_flag = api::set_maintenance(&coord, &lot_id, &space_id, b"{}").await.unwrap_err();
    assert_eq!(missing_flag.kind, ErrorKind::Validation);
}
