//! Space registry: spaces of a lot and their status.

use std::sync::Arc;

use crate::core::model::{LotId, ParkingSpace, SpaceId, SpaceSlot, SpaceStatus};
use crate::core::{ParkingError, ParkingStore, StatusTransition, StorePolicy};
use crate::util::clock::Clock;

/// Registry of parking spaces.
///
/// Reads are public; status writes are reachable only through the
/// lifecycle coordinator.
pub struct SpaceRegistry<S: ParkingStore + ?Sized> {
    store: Arc<S>,
    policy: StorePolicy,
    clock: Arc<dyn Clock>,
}

impl<S: ParkingStore + ?Sized> SpaceRegistry<S> {
    /// Create a registry over a store.
    pub fn new(store: Arc<S>, policy: StorePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Register a new Available space under a lot.
    ///
    /// # Errors
    ///
    /// `UnknownLot` if the lot does not exist; storage errors otherwise.
    pub async fn register_space(&self, lot_id: LotId) -> Result<SpaceId, ParkingError> {
        let created_at_ms = self.clock.now_ms();
        let id = self
            .policy
            .bounded("insert_space", self.store.insert_space(lot_id, created_at_ms))
            .await?;
        tracing::info!(lot_id, space_id = id, "registered parking space");
        Ok(id)
    }

    /// Spaces of a lot in allocation order, numbered from 1.
    /// An unknown lot has no spaces.
    ///
    /// # Errors
    ///
    /// Storage errors, or `Invariant` for an undecodable status.
    pub async fn list_spaces(&self, lot_id: LotId) -> Result<Vec<SpaceSlot>, ParkingError> {
        let spaces = self
            .policy
            .bounded_read("spaces_in_lot", || self.store.spaces_in_lot(lot_id))
            .await?;
        Ok(spaces
            .into_iter()
            .enumerate()
            .map(|(idx, space)| SpaceSlot {
                id: space.id,
                status: space.status,
                slot_number: idx + 1,
            })
            .collect())
    }

    /// Look up a space.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError> {
        self.policy
            .bounded_read("space", || self.store.space(space_id))
            .await
    }

    /// Toggle maintenance. Refuses Booked spaces; idempotent otherwise.
    pub(crate) async fn set_maintenance(
        &self,
        space_id: SpaceId,
        on: bool,
    ) -> Result<(), ParkingError> {
        let target = if on {
            SpaceStatus::Maintenance
        } else {
            SpaceStatus::Available
        };
        let outcome = self
            .policy
            .bounded(
                "set_maintenance",
                self.store.transition_status(
                    space_id,
                    &[SpaceStatus::Available, SpaceStatus::Maintenance],
                    target,
                ),
            )
            .await?;
        match outcome {
            StatusTransition::Applied => Ok(()),
            StatusTransition::Rejected(SpaceStatus::Booked) => {
                Err(ParkingError::SpaceBooked(space_id))
            }
            StatusTransition::Rejected(other) => Err(ParkingError::Invariant(format!(
                "space {space_id} rejected maintenance toggle from {}",
                other.label()
            ))),
        }
    }

    /// Atomically move a space from Available to Booked.
    pub(crate) async fn claim_if_available(&self, space_id: SpaceId) -> Result<bool, ParkingError> {
        let outcome = self
            .policy
            .bounded(
                "claim_space",
                self.store.transition_status(
                    space_id,
                    &[SpaceStatus::Available],
                    SpaceStatus::Booked,
                ),
            )
            .await?;
        Ok(outcome.is_applied())
    }

    /// Undo a claim whose reservation could not be opened.
    pub(crate) async fn unclaim(&self, space_id: SpaceId) -> Result<bool, ParkingError> {
        let outcome = self
            .policy
            .bounded(
                "unclaim_space",
                self.store.transition_status(
                    space_id,
                    &[SpaceStatus::Booked],
                    SpaceStatus::Available,
                ),
            )
            .await?;
        Ok(outcome.is_applied())
    }

    /// Make a space Available after its reservation was closed.
    pub(crate) async fn release(&self, space_id: SpaceId) -> Result<(), ParkingError> {
        self.policy
            .bounded(
                "release_space",
                self.store.set_status(space_id, SpaceStatus::Available),
            )
            .await
    }
}
