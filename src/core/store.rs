//! Storage abstraction shared by the registry, ledger and registration.
//!
//! Every method is one atomic unit against the backing store: either its whole
//! effect is visible to later calls or none of it is. Conditional writes
//! (`transition_status`, `close_reservation`) are the serialization points
//! for concurrent requests and must be implemented as a single
//! compare-and-swap, never as a read followed by an unconditional write.
//!
//! Callers bound every call with a deadline and drop the returned future when
//! it expires. A dropped call must have no effect: a backend either commits
//! inside the future it returns (the in-process stores, whose calls finish
//! without yielding) or runs the call in a transaction that is rolled back
//! when the future is dropped, e.g. a Postgres statement timeout no longer
//! than the caller's deadline. A claim that commits after the caller saw a
//! timeout leaves the space Booked without a reservation, and the caller
//! cannot undo it safely because another park may own the space by then.

use async_trait::async_trait;

use crate::core::model::{
    LotId, ParkingLot, ParkingSpace, Reservation, ReservationId, SpaceId, SpaceStatus, UserId,
};
use crate::core::ParkingError;

/// Outcome of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// The space was in one of the expected states and now holds the new one.
    Applied,
    /// The space was in the given state, which was not expected; nothing changed.
    Rejected(SpaceStatus),
}

impl StatusTransition {
    /// True when the write took effect.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Abstraction for parking storage backends.
#[async_trait]
pub trait ParkingStore: Send + Sync {
    /// Insert a lot and return its id.
    async fn insert_lot(&self, name: &str) -> Result<LotId, ParkingError>;

    /// Whether a lot exists.
    async fn lot_exists(&self, lot_id: LotId) -> Result<bool, ParkingError>;

    /// Lots ordered by id, skipping `offset` and returning at most `limit`.
    async fn lots_page(&self, offset: usize, limit: usize)
        -> Result<Vec<ParkingLot>, ParkingError>;

    /// Total number of lots.
    async fn lot_count(&self) -> Result<u64, ParkingError>;

    /// Insert an Available space under a lot. Fails with `UnknownLot`.
    async fn insert_space(&self, lot_id: LotId, created_at_ms: u64)
        -> Result<SpaceId, ParkingError>;

    /// Look up a space.
    async fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError>;

    /// Spaces of a lot ordered by creation time, then id.
    async fn spaces_in_lot(&self, lot_id: LotId) -> Result<Vec<ParkingSpace>, ParkingError>;

    /// First Available space of a lot in allocation order.
    async fn first_available_space(&self, lot_id: LotId)
        -> Result<Option<SpaceId>, ParkingError>;

    /// Atomically set `to` if the current status is one of `from`.
    /// Fails with `UnknownSpace` if the space does not exist.
    async fn transition_status(
        &self,
        space_id: SpaceId,
        from: &[SpaceStatus],
        to: SpaceStatus,
    ) -> Result<StatusTransition, ParkingError>;

    /// Unconditionally set a space's status.
    async fn set_status(&self, space_id: SpaceId, status: SpaceStatus)
        -> Result<(), ParkingError>;

    /// Insert an open reservation. Backends reject a second open reservation
    /// for the same space with `Invariant`.
    async fn insert_reservation(
        &self,
        space_id: SpaceId,
        user_id: UserId,
        start_ms: u64,
    ) -> Result<ReservationId, ParkingError>;

    /// Look up a reservation.
    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, ParkingError>;

    /// Set end time and fee if the reservation is still open.
    /// Returns `false` when it was already closed; fails with
    /// `ReservationNotFound` when it does not exist.
    async fn close_reservation(
        &self,
        id: ReservationId,
        end_ms: u64,
        fee: u64,
    ) -> Result<bool, ParkingError>;
}
