//! Slot allocator: picks the next space to hand out.

use std::sync::Arc;

use crate::core::model::{LotId, SpaceId};
use crate::core::{ParkingError, ParkingStore, StorePolicy};

/// Selects the Available space with the earliest creation time, ties broken
/// by smallest id. Selection is a candidate only; it never mutates state and
/// must be confirmed with a claim.
pub struct SlotAllocator<S: ParkingStore + ?Sized> {
    store: Arc<S>,
    policy: StorePolicy,
}

impl<S: ParkingStore + ?Sized> SlotAllocator<S> {
    /// Create an allocator over a store.
    pub const fn new(store: Arc<S>, policy: StorePolicy) -> Self {
        Self { store, policy }
    }

    /// Next candidate space for a lot.
    ///
    /// # Errors
    ///
    /// `NoSpaceAvailable` when the lot has no Available space.
    pub async fn select_next(&self, lot_id: LotId) -> Result<SpaceId, ParkingError> {
        self.policy
            .bounded_read("first_available_space", || {
                self.store.first_available_space(lot_id)
            })
            .await?
            .ok_or(ParkingError::NoSpaceAvailable(lot_id))
    }
}
