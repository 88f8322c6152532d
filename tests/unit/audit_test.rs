//! Tests for audit events

use parking_space_ledger::core::{
    build_audit_event, AuditAction, AuditSink, AuditSubject, InMemoryAuditSink,
};

#[test]
fn test_events_for_filters_by_action() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event(AuditAction::Park, AuditSubject::default(), None));
    sink.record(build_audit_event(
        AuditAction::Maintenance,
        AuditSubject {
            lot_id: Some(1),
            space_id: Some(2),
            ..AuditSubject::default()
        },
        Some("on=true".into()),
    ));
    sink.record(build_audit_event(AuditAction::Park, AuditSubject::default(), None));

    assert_eq!(sink.events().len(), 3);
    assert_eq!(sink.events_for(AuditAction::Park).len(), 2);
    let maintenance = sink.events_for(AuditAction::Maintenance);
    assert_eq!(maintenance[0].subject.space_id, Some(2));
    assert_eq!(maintenance[0].detail.as_deref(), Some("on=true"));
}

#[test]
fn test_action_names_are_stable() {
    assert_eq!(AuditAction::Park.as_str(), "park");
    assert_eq!(AuditAction::ClaimRolledBack.as_str(), "claim_rolled_back");
    assert_eq!(AuditAction::IntegrityViolation.as_str(), "integrity_violation");
}
