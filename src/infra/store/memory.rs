//! In-memory parking store.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::tables::Tables;
use crate::core::model::{
    LotId, ParkingLot, ParkingSpace, Reservation, ReservationId, SpaceId, SpaceStatus, UserId,
};
use crate::core::{ParkingError, ParkingStore, StatusTransition};

/// In-memory store for development and testing.
///
/// A single `parking_lot::Mutex` guards all tables and is held only for the
/// duration of one call, which makes each call atomic and every conditional
/// write linearizable.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParkingStore for InMemoryStore {
    async fn insert_lot(&self, name: &str) -> Result<LotId, ParkingError> {
        Ok(self.tables.lock().insert_lot(name))
    }

    async fn lot_exists(&self, lot_id: LotId) -> Result<bool, ParkingError> {
        Ok(self.tables.lock().lot_exists(lot_id))
    }

    async fn lots_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ParkingLot>, ParkingError> {
        Ok(self.tables.lock().lots_page(offset, limit))
    }

    async fn lot_count(&self) -> Result<u64, ParkingError> {
        Ok(self.tables.lock().lot_count())
    }

    async fn insert_space(
        &self,
        lot_id: LotId,
        created_at_ms: u64,
    ) -> Result<SpaceId, ParkingError> {
        self.tables.lock().insert_space(lot_id, created_at_ms)
    }

    async fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError> {
        self.tables.lock().space(space_id)
    }

    async fn spaces_in_lot(&self, lot_id: LotId) -> Result<Vec<ParkingSpace>, ParkingError> {
        self.tables.lock().spaces_in_lot(lot_id)
    }

    async fn first_available_space(
        &self,
        lot_id: LotId,
    ) -> Result<Option<SpaceId>, ParkingError> {
        Ok(self.tables.lock().first_available_space(lot_id))
    }

    async fn transition_status(
        &self,
        space_id: SpaceId,
        from: &[SpaceStatus],
        to: SpaceStatus,
    ) -> Result<StatusTransition, ParkingError> {
        self.tables.lock().transition_status(space_id, from, to)
    }

    async fn set_status(&self, space_id: SpaceId, status: SpaceStatus) -> Result<(), ParkingError> {
        self.tables.lock().set_status(space_id, status)
    }

    async fn insert_reservation(
        &self,
        space_id: SpaceId,
        user_id: UserId,
        start_ms: u64,
    ) -> Result<ReservationId, ParkingError> {
        self.tables
            .lock()
            .insert_reservation(space_id, user_id, start_ms)
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, ParkingError> {
        Ok(self.tables.lock().reservation(id))
    }

    async fn close_reservation(
        &self,
        id: ReservationId,
        end_ms: u64,
        fee: u64,
    ) -> Result<bool, ParkingError> {
        self.tables.lock().close_reservation(id, end_ms, fee)
    }
}
