//! Parking lifecycle: registry, allocator, ledger and coordinator.

pub mod allocator;
pub mod audit;
pub mod coordinator;
pub mod deadline;
pub mod error;
pub mod ledger;
pub mod model;
pub mod registration;
pub mod registry;
pub mod store;

pub use allocator::SlotAllocator;
pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, AuditSubject, InMemoryAuditSink,
};
pub use coordinator::{CoordinatorSettings, LifecycleCoordinator};
pub use deadline::StorePolicy;
pub use error::{AppResult, ErrorKind, ParkingError};
pub use ledger::{ClosedReservation, FeeSchedule, ReservationLedger};
pub use model::{
    LotId, ParkingLot, ParkingSpace, Reservation, ReservationId, SpaceId, SpaceSlot, SpaceStatus,
    UserId,
};
pub use registration::{LotPage, LotRegistration};
pub use registry::SpaceRegistry;
pub use store::{ParkingStore, StatusTransition};
