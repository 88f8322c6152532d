//! Error types for parking lifecycle operations.

use thiserror::Error;

use crate::core::model::{LotId, ReservationId, SpaceId};

/// Coarse classification of a [`ParkingError`], used for retry decisions and
/// for mapping onto a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// No such lot, space or reservation.
    NotFound,
    /// The request contradicts current state (already closed, space booked).
    Conflict,
    /// Nothing to hand out right now; the caller may try later.
    Unavailable,
    /// Storage timeout or connection failure; safe to retry the operation.
    Transient,
    /// Stored state is inconsistent and needs operator attention.
    Invariant,
}

/// Errors produced by the registry, ledger and coordinator.
#[derive(Debug, Error)]
pub enum ParkingError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Lot does not exist.
    #[error("unknown parking lot {0}")]
    UnknownLot(LotId),
    /// Space does not exist (or does not belong to the given lot).
    #[error("unknown parking space {0}")]
    UnknownSpace(SpaceId),
    /// Reservation does not exist.
    #[error("reservation {0} not found")]
    ReservationNotFound(ReservationId),
    /// Reservation already has an end time.
    #[error("reservation {0} already closed")]
    AlreadyClosed(ReservationId),
    /// Space is booked and cannot change status this way.
    #[error("parking space {0} is booked")]
    SpaceBooked(SpaceId),
    /// Lot has no available space.
    #[error("no parking space available in lot {0}")]
    NoSpaceAvailable(LotId),
    /// A storage call exceeded its deadline.
    #[error("storage operation `{0}` timed out")]
    Timeout(&'static str),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
    /// Integrity violation detected in stored state.
    #[error("integrity violation: {0}")]
    Invariant(String),
}

impl ParkingError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnknownLot(_) | Self::UnknownSpace(_) | Self::ReservationNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::AlreadyClosed(_) | Self::SpaceBooked(_) => ErrorKind::Conflict,
            Self::NoSpaceAvailable(_) => ErrorKind::Unavailable,
            Self::Timeout(_) | Self::Backend(_) => ErrorKind::Transient,
            Self::Invariant(_) => ErrorKind::Invariant,
        }
    }

    /// Whether the coordinator may retry the failed step on its own.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
