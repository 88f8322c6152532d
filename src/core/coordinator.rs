//! Lifecycle coordinator: park, unpark and maintenance.
//!
//! Space status moves `Available -> Booked` on park, `Booked -> Available` on
//! unpark, and `Available <-> Maintenance` on a maintenance toggle. The
//! coordinator is the only writer of space status and reservation rows.
//!
//! Parking selects a candidate and then claims it with a compare-and-swap; a
//! lost claim means a concurrent request took the space, so selection is
//! repeated against what is left. Losing a space for the first time is free
//! since the pool only shrank; losing a space again means it was released and
//! retaken meanwhile, and `max_claim_attempts` such repeats end the park. Mutual
//! exclusion comes entirely from the store's conditional writes, never from a
//! lock held here.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::audit::{build_audit_event, AuditAction, AuditSink, AuditSubject};
use crate::core::model::{
    LotId, ParkingSpace, Reservation, ReservationId, SpaceId, SpaceSlot, SpaceStatus, UserId,
};
use crate::core::{
    FeeSchedule, LotPage, LotRegistration, ParkingError, ParkingStore, ReservationLedger,
    SlotAllocator, SpaceRegistry, StorePolicy,
};
use crate::util::clock::Clock;

/// Tunables handed to the coordinator at construction.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorSettings {
    /// Deadline and retry bounds for store calls.
    pub store: StorePolicy,
    /// Lost claims on an already contested space before a park gives up.
    pub max_claim_attempts: u32,
    /// Page size used when the caller does not pick one.
    pub default_page_size: usize,
    /// Fee schedule applied at unpark.
    pub fees: FeeSchedule,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            store: StorePolicy::default(),
            max_claim_attempts: 8,
            default_page_size: 10,
            fees: FeeSchedule::default(),
        }
    }
}

/// Orchestrates allocator, registry and ledger for each lifecycle operation.
pub struct LifecycleCoordinator<S: ParkingStore + ?Sized = dyn ParkingStore> {
    lots: LotRegistration<S>,
    registry: SpaceRegistry<S>,
    allocator: SlotAllocator<S>,
    ledger: ReservationLedger<S>,
    settings: CoordinatorSettings,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
}

impl<S: ParkingStore + ?Sized> LifecycleCoordinator<S> {
    /// Create a coordinator over a store.
    pub fn new(store: Arc<S>, settings: CoordinatorSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            lots: LotRegistration::new(Arc::clone(&store), settings.store),
            registry: SpaceRegistry::new(Arc::clone(&store), settings.store, Arc::clone(&clock)),
            allocator: SlotAllocator::new(Arc::clone(&store), settings.store),
            ledger: ReservationLedger::new(store, settings.store, clock, settings.fees),
            settings,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Settings in force.
    #[must_use]
    pub const fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Read access to the space registry.
    #[must_use]
    pub const fn registry(&self) -> &SpaceRegistry<S> {
        &self.registry
    }

    /// Read access to the slot allocator.
    #[must_use]
    pub const fn allocator(&self) -> &SlotAllocator<S> {
        &self.allocator
    }

    /// Read access to the reservation ledger.
    #[must_use]
    pub const fn ledger(&self) -> &ReservationLedger<S> {
        &self.ledger
    }

    /// Register a lot.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name; storage errors otherwise.
    pub async fn create_lot(&self, name: &str) -> Result<LotId, ParkingError> {
        self.lots.create_lot(name).await
    }

    /// Page of lots; `page_size` falls back to the configured default.
    ///
    /// # Errors
    ///
    /// `Validation` for page 0; storage errors otherwise.
    pub async fn list_lots(
        &self,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<LotPage, ParkingError> {
        let page_size = page_size.unwrap_or(self.settings.default_page_size);
        self.lots.list_lots(page, page_size).await
    }

    /// Whether a lot exists.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn lot_exists(&self, lot_id: LotId) -> Result<bool, ParkingError> {
        self.lots.lot_exists(lot_id).await
    }

    /// Register an Available space under a lot.
    ///
    /// # Errors
    ///
    /// `UnknownLot`; storage errors otherwise.
    pub async fn register_space(&self, lot_id: LotId) -> Result<SpaceId, ParkingError> {
        self.registry.register_space(lot_id).await
    }

    /// Spaces of a lot with their slot numbers.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn list_spaces(&self, lot_id: LotId) -> Result<Vec<SpaceSlot>, ParkingError> {
        self.registry.list_spaces(lot_id).await
    }

    /// Look up a space.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError> {
        self.registry.space(space_id).await
    }

    /// Look up a reservation.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, ParkingError> {
        self.ledger.reservation(id).await
    }

    /// Claim the next free space of a lot for a user and open a reservation.
    ///
    /// # Errors
    ///
    /// `UnknownLot`, `NoSpaceAvailable` (also once the claim budget is spent),
    /// storage errors, or `Invariant` if a failed open could not be rolled back.
    pub async fn park(&self, lot_id: LotId, user_id: UserId) -> Result<ReservationId, ParkingError> {
        if !self.lots.lot_exists(lot_id).await? {
            return Err(ParkingError::UnknownLot(lot_id));
        }

        let space_id = self.claim_next(lot_id).await?;

        match self.ledger.open(space_id, user_id).await {
            Ok(reservation_id) => {
                tracing::info!(lot_id, space_id, user_id, reservation_id, "parked");
                self.record(
                    AuditAction::Park,
                    AuditSubject {
                        lot_id: Some(lot_id),
                        space_id: Some(space_id),
                        reservation_id: Some(reservation_id),
                        user_id: Some(user_id),
                    },
                    None,
                );
                Ok(reservation_id)
            }
            Err(err) => {
                self.roll_back_claim(lot_id, space_id, &err).await?;
                Err(err)
            }
        }
    }

    /// Close a reservation and release its space. Returns the fee.
    ///
    /// # Errors
    ///
    /// `ReservationNotFound` or `AlreadyClosed` (terminal), storage errors, or
    /// `Invariant` when the reservation closed but the space stayed Booked.
    pub async fn unpark(&self, reservation_id: ReservationId) -> Result<u64, ParkingError> {
        let closed = self.ledger.close(reservation_id).await?;
        let subject = AuditSubject {
            space_id: Some(closed.space_id),
            reservation_id: Some(reservation_id),
            ..AuditSubject::default()
        };

        if let Err(err) = self.registry.release(closed.space_id).await {
            // the reservation cannot be closed again, so retrying unpark would
            // only report AlreadyClosed; the space needs manual release
            tracing::error!(
                reservation_id,
                space_id = closed.space_id,
                fee = closed.fee,
                error = %err,
                "reservation closed but space left booked"
            );
            self.record(
                AuditAction::IntegrityViolation,
                subject,
                Some(format!("release failed after close: {err}")),
            );
            return Err(ParkingError::Invariant(format!(
                "reservation {reservation_id} closed with fee {} but space {} could not be released: {err}",
                closed.fee, closed.space_id
            )));
        }

        tracing::info!(
            reservation_id,
            space_id = closed.space_id,
            elapsed_ms = closed.elapsed_ms,
            fee = closed.fee,
            "unparked"
        );
        self.record(AuditAction::Unpark, subject, Some(format!("fee={}", closed.fee)));
        Ok(closed.fee)
    }

    /// Put a space of a lot into maintenance, or take it out.
    ///
    /// # Errors
    ///
    /// `UnknownSpace` if the space does not exist in that lot, `SpaceBooked`
    /// if it is booked, storage errors otherwise.
    pub async fn set_maintenance(
        &self,
        lot_id: LotId,
        space_id: SpaceId,
        on: bool,
    ) -> Result<(), ParkingError> {
        let space = self
            .registry
            .space(space_id)
            .await?
            .filter(|space| space.lot_id == lot_id)
            .ok_or(ParkingError::UnknownSpace(space_id))?;
        if space.status == SpaceStatus::Booked {
            return Err(ParkingError::SpaceBooked(space_id));
        }

        self.registry.set_maintenance(space_id, on).await?;
        tracing::info!(lot_id, space_id, maintenance = on, "maintenance toggled");
        self.record(
            AuditAction::Maintenance,
            AuditSubject {
                lot_id: Some(lot_id),
                space_id: Some(space_id),
                ..AuditSubject::default()
            },
            Some(format!("on={on}")),
        );
        Ok(())
    }

    async fn claim_next(&self, lot_id: LotId) -> Result<SpaceId, ParkingError> {
        let budget = self.settings.max_claim_attempts.max(1);
        let mut lost = HashSet::new();
        let mut repeat_losses = 0;
        for attempt in 1u64.. {
            let candidate = self.allocator.select_next(lot_id).await?;
            if self.registry.claim_if_available(candidate).await? {
                tracing::debug!(lot_id, space_id = candidate, attempt, "claimed space");
                return Ok(candidate);
            }
            tracing::debug!(lot_id, space_id = candidate, attempt, "lost claim race");
            // a first loss on a space shrank the pool; only a space coming back counts
            if !lost.insert(candidate) {
                repeat_losses += 1;
                if repeat_losses >= budget {
                    tracing::warn!(lot_id, attempt, repeat_losses, "claim attempts exhausted");
                    break;
                }
            }
        }
        Err(ParkingError::NoSpaceAvailable(lot_id))
    }

    async fn roll_back_claim(
        &self,
        lot_id: LotId,
        space_id: SpaceId,
        cause: &ParkingError,
    ) -> Result<(), ParkingError> {
        let subject = AuditSubject {
            lot_id: Some(lot_id),
            space_id: Some(space_id),
            ..AuditSubject::default()
        };
        match self.registry.unclaim(space_id).await {
            Ok(true) => {
                tracing::warn!(lot_id, space_id, cause = %cause, "reservation open failed, claim rolled back");
                self.record(AuditAction::ClaimRolledBack, subject, Some(cause.to_string()));
                Ok(())
            }
            Ok(false) => {
                tracing::error!(lot_id, space_id, cause = %cause, "claimed space no longer booked at rollback");
                self.record(
                    AuditAction::IntegrityViolation,
                    subject,
                    Some(format!("rollback found space not booked after: {cause}")),
                );
                Err(ParkingError::Invariant(format!(
                    "space {space_id} changed status while its claim was being rolled back"
                )))
            }
            Err(err) => {
                tracing::error!(lot_id, space_id, cause = %cause, error = %err, "claim rollback failed, space left booked");
                self.record(
                    AuditAction::IntegrityViolation,
                    subject,
                    Some(format!("rollback failed: {err}; after: {cause}")),
                );
                Err(ParkingError::Invariant(format!(
                    "space {space_id} left booked without a reservation: {err}"
                )))
            }
        }
    }

    fn record(&self, action: AuditAction, subject: AuditSubject, detail: Option<String>) {
        if let Some(sink) = &self.audit {
            sink.lock().record(build_audit_event(action, subject, detail));
        }
    }
}
