//! Reservation ledger: occupancy intervals and their fees.

use std::sync::Arc;
use std::time::Duration;

use crate::core::model::{Reservation, ReservationId, SpaceId, UserId};
use crate::core::{ParkingError, ParkingStore, StorePolicy};
use crate::util::clock::Clock;

/// Flat rate charged per started billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Amount charged per started period.
    pub rate_per_period: u64,
    /// Billing period length.
    pub period: Duration,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rate_per_period: 10,
            period: Duration::from_secs(3600),
        }
    }
}

impl FeeSchedule {
    /// Fee for an occupancy of `elapsed_ms`: every started period is charged
    /// in full, and a zero-length occupancy costs nothing.
    #[must_use]
    pub fn fee_for(&self, elapsed_ms: u64) -> u64 {
        let period_ms = u64::try_from(self.period.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self.rate_per_period
            .saturating_mul(elapsed_ms.div_ceil(period_ms))
    }
}

/// Result of closing a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedReservation {
    /// Closed reservation.
    pub reservation_id: ReservationId,
    /// Space to release.
    pub space_id: SpaceId,
    /// Occupancy length.
    pub elapsed_ms: u64,
    /// Charged fee.
    pub fee: u64,
}

/// Ledger of reservations.
pub struct ReservationLedger<S: ParkingStore + ?Sized> {
    store: Arc<S>,
    policy: StorePolicy,
    clock: Arc<dyn Clock>,
    fees: FeeSchedule,
}

impl<S: ParkingStore + ?Sized> ReservationLedger<S> {
    /// Create a ledger over a store.
    pub fn new(
        store: Arc<S>,
        policy: StorePolicy,
        clock: Arc<dyn Clock>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            store,
            policy,
            clock,
            fees,
        }
    }

    /// Fee schedule in force.
    #[must_use]
    pub const fn fees(&self) -> FeeSchedule {
        self.fees
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
        self.policy
            .bounded_read("reservation", || self.store.reservation(id))
            .await
    }

    /// Open a reservation starting now. Exclusivity comes from the caller
    /// having already claimed the space.
    pub(crate) async fn open(
        &self,
        space_id: SpaceId,
        user_id: UserId,
    ) -> Result<ReservationId, ParkingError> {
        let start_ms = self.clock.now_ms();
        self.policy
            .bounded(
                "insert_reservation",
                self.store.insert_reservation(space_id, user_id, start_ms),
            )
            .await
    }

    /// Close an open reservation, charging for the elapsed time.
    pub(crate) async fn close(&self, id: ReservationId) -> Result<ClosedReservation, ParkingError> {
        let reservation = self
            .reservation(id)
            .await?
            .ok_or(ParkingError::ReservationNotFound(id))?;
        if !reservation.is_open() {
            return Err(ParkingError::AlreadyClosed(id));
        }

        let end_ms = self.clock.now_ms();
        let elapsed_ms = end_ms.saturating_sub(reservation.start_ms);
        let fee = self.fees.fee_for(elapsed_ms);

        let closed = self
            .policy
            .bounded(
                "close_reservation",
                self.store.close_reservation(id, end_ms, fee),
            )
            .await?;
        if !closed {
            // a concurrent close won between our read and write
            return Err(ParkingError::AlreadyClosed(id));
        }

        Ok(ClosedReservation {
            reservation_id: id,
            space_id: reservation.space_id,
            elapsed_ms,
            fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::InMemoryStore;
    use crate::util::clock::ManualClock;

    const MINUTE: u64 = 60_000;
    const HOUR: u64 = 60 * MINUTE;

    #[test]
    fn test_fee_anchor_values() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.fee_for(0), 0);
        assert_eq!(fees.fee_for(HOUR), 10);
        assert_eq!(fees.fee_for(HOUR + 1_000), 20);
        assert_eq!(fees.fee_for(HOUR + MINUTE), 20);
        assert_eq!(fees.fee_for(2 * HOUR), 20);
        assert_eq!(fees.fee_for(1), 10);
    }

    #[test]
    fn test_fee_is_monotonic() {
        let fees = FeeSchedule::default();
        let mut last = 0;
        for elapsed in (0..5 * HOUR).step_by(7 * MINUTE as usize) {
            let fee = fees.fee_for(elapsed);
            assert!(fee >= last);
            last = fee;
        }
    }

    #[test]
    fn test_custom_schedule() {
        let fees = FeeSchedule {
            rate_per_period: 3,
            period: Duration::from_secs(15 * 60),
        };
        assert_eq!(fees.fee_for(HOUR), 12);
        assert_eq!(fees.fee_for(HOUR + 1), 15);
    }

    #[tokio::test]
    async fn test_open_then_close_charges_elapsed_time() {
        let store = Arc::new(InMemoryStore::new());
        let lot = store.insert_lot("a").await.unwrap();
        let space = store.insert_space(lot, 0).await.unwrap();
        let clock = Arc::new(ManualClock::new(10_000));
        let ledger = ReservationLedger::new(
            store,
            StorePolicy::default(),
            clock.clone(),
            FeeSchedule::default(),
        );

        let id = ledger.open(space, 42).await.unwrap();
        clock.advance_ms(HOUR + MINUTE);
        let closed = ledger.close(id).await.unwrap();
        assert_eq!(closed.fee, 20);
        assert_eq!(closed.space_id, space);
        assert_eq!(closed.elapsed_ms, HOUR + MINUTE);

        let stored = ledger.reservation(id).await.unwrap().unwrap();
        assert_eq!(stored.end_ms, Some(10_000 + HOUR + MINUTE));
        assert_eq!(stored.fee, Some(20));

        assert!(matches!(
            ledger.close(id).await,
            Err(ParkingError::AlreadyClosed(r)) if r == id
        ));
        assert!(matches!(
            ledger.close(id + 100).await,
            Err(ParkingError::ReservationNotFound(_))
        ));
    }
}
