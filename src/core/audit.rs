//! Audit sink implementations.
//!
//! Lifecycle transitions and integrity failures are recorded as audit events
//! alongside the tracing output.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::model::{LotId, ReservationId, SpaceId, UserId};
use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// A space was claimed and a reservation opened.
    Park,
    /// A reservation was closed and its space released.
    Unpark,
    /// A space entered or left maintenance.
    Maintenance,
    /// A claim was undone because its reservation could not be opened.
    ClaimRolledBack,
    /// Stored state was left inconsistent; needs an operator.
    IntegrityViolation,
}

impl AuditAction {
    /// Stable action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Park => "park",
            Self::Unpark => "unpark",
            Self::Maintenance => "maintenance",
            Self::ClaimRolledBack => "claim_rolled_back",
            Self::IntegrityViolation => "integrity_violation",
        }
    }
}

/// Records the event refers to; unset fields do not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSubject {
    /// Lot involved.
    pub lot_id: Option<LotId>,
    /// Space involved.
    pub space_id: Option<SpaceId>,
    /// Reservation involved.
    pub reservation_id: Option<ReservationId>,
    /// User involved.
    pub user_id: Option<UserId>,
}

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier (UUID v4).
    pub event_id: String,
    /// Action taken.
    pub action: AuditAction,
    /// Records involved.
    pub subject: AuditSubject,
    /// Timestamp milliseconds.
    pub created_at_ms: u64,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
///
/// Clones share one bounded buffer, so a caller can keep a handle while the
/// coordinator owns another.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events with the given action.
    #[must_use]
    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event stamped with a fresh id and the current time.
#[must_use]
pub fn build_audit_event(
    action: AuditAction,
    subject: AuditSubject,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        action,
        subject,
        created_at_ms: now_ms(),
        detail,
    }
}
