//! Table state shared by the in-memory and file-backed stores.
//!
//! Callers hold a lock for the duration of one method, so each method is one
//! atomic unit. Status is kept as its persisted code and decoded on read.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::model::{
    allocation_order, LotId, ParkingLot, ParkingSpace, Reservation, ReservationId, SpaceId,
    SpaceStatus, UserId,
};
use crate::core::{ParkingError, StatusTransition};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpaceRow {
    lot_id: LotId,
    status: u8,
    created_at_ms: u64,
}

/// Lots, spaces and reservations keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    next_lot_id: u64,
    next_space_id: u64,
    next_reservation_id: u64,
    lots: BTreeMap<LotId, String>,
    spaces: BTreeMap<SpaceId, SpaceRow>,
    reservations: BTreeMap<ReservationId, Reservation>,
    /// Open reservation per space; rebuilt on load.
    #[serde(skip)]
    open_by_space: HashMap<SpaceId, ReservationId>,
}

impl Tables {
    /// Rebuild derived indexes and check stored state after a load.
    pub(crate) fn rebuild_index(&mut self) -> Result<(), ParkingError> {
        for (id, row) in &self.spaces {
            SpaceStatus::from_code(row.status)
                .map_err(|e| ParkingError::Invariant(format!("space {id}: {e}")))?;
        }
        self.open_by_space.clear();
        for reservation in self.reservations.values().filter(|r| r.is_open()) {
            if let Some(previous) = self
                .open_by_space
                .insert(reservation.space_id, reservation.id)
            {
                return Err(ParkingError::Invariant(format!(
                    "space {} has open reservations {previous} and {}",
                    reservation.space_id, reservation.id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn insert_lot(&mut self, name: &str) -> LotId {
        self.next_lot_id += 1;
        self.lots.insert(self.next_lot_id, name.to_owned());
        self.next_lot_id
    }

    pub(crate) fn lot_exists(&self, lot_id: LotId) -> bool {
        self.lots.contains_key(&lot_id)
    }

    pub(crate) fn lots_page(&self, offset: usize, limit: usize) -> Vec<ParkingLot> {
        self.lots
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(id, name)| ParkingLot {
                id: *id,
                name: name.clone(),
            })
            .collect()
    }

    pub(crate) fn lot_count(&self) -> u64 {
        self.lots.len() as u64
    }

    pub(crate) fn insert_space(
        &mut self,
        lot_id: LotId,
        created_at_ms: u64,
    ) -> Result<SpaceId, ParkingError> {
        if !self.lot_exists(lot_id) {
            return Err(ParkingError::UnknownLot(lot_id));
        }
        self.next_space_id += 1;
        self.spaces.insert(
            self.next_space_id,
            SpaceRow {
                lot_id,
                status: SpaceStatus::Available.code(),
                created_at_ms,
            },
        );
        Ok(self.next_space_id)
    }

    fn decode(id: SpaceId, row: &SpaceRow) -> Result<ParkingSpace, ParkingError> {
        Ok(ParkingSpace {
            id,
            lot_id: row.lot_id,
            status: SpaceStatus::from_code(row.status)?,
            created_at_ms: row.created_at_ms,
        })
    }

    pub(crate) fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError> {
        self.spaces
            .get(&space_id)
            .map(|row| Self::decode(space_id, row))
            .transpose()
    }

    pub(crate) fn spaces_in_lot(&self, lot_id: LotId) -> Result<Vec<ParkingSpace>, ParkingError> {
        let mut spaces = self
            .spaces
            .iter()
            .filter(|(_, row)| row.lot_id == lot_id)
            .map(|(id, row)| Self::decode(*id, row))
            .collect::<Result<Vec<_>, _>>()?;
        spaces.sort_by(allocation_order);
        Ok(spaces)
    }

    pub(crate) fn first_available_space(&self, lot_id: LotId) -> Option<SpaceId> {
        let available = SpaceStatus::Available.code();
        self.spaces
            .iter()
            .filter(|(_, row)| row.lot_id == lot_id && row.status == available)
            .min_by_key(|(id, row)| (row.created_at_ms, **id))
            .map(|(id, _)| *id)
    }

    pub(crate) fn transition_status(
        &mut self,
        space_id: SpaceId,
        from: &[SpaceStatus],
        to: SpaceStatus,
    ) -> Result<StatusTransition, ParkingError> {
        let row = self
            .spaces
            .get_mut(&space_id)
            .ok_or(ParkingError::UnknownSpace(space_id))?;
        let current = SpaceStatus::from_code(row.status)?;
        if !from.contains(&current) {
            return Ok(StatusTransition::Rejected(current));
        }
        row.status = to.code();
        Ok(StatusTransition::Applied)
    }

    pub(crate) fn set_status(
        &mut self,
        space_id: SpaceId,
        status: SpaceStatus,
    ) -> Result<(), ParkingError> {
        let row = self
            .spaces
            .get_mut(&space_id)
            .ok_or(ParkingError::UnknownSpace(space_id))?;
        row.status = status.code();
        Ok(())
    }

    pub(crate) fn insert_reservation(
        &mut self,
        space_id: SpaceId,
        user_id: UserId,
        start_ms: u64,
    ) -> Result<ReservationId, ParkingError> {
        if !self.spaces.contains_key(&space_id) {
            return Err(ParkingError::UnknownSpace(space_id));
        }
        if let Some(open) = self.open_by_space.get(&space_id) {
            return Err(ParkingError::Invariant(format!(
                "space {space_id} already has open reservation {open}"
            )));
        }
        self.next_reservation_id += 1;
        let id = self.next_reservation_id;
        self.reservations.insert(
            id,
            Reservation {
                id,
                space_id,
                user_id,
                start_ms,
                end_ms: None,
                fee: None,
            },
        );
        self.open_by_space.insert(space_id, id);
        Ok(id)
    }

    pub(crate) fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        self.reservations.get(&id).cloned()
    }

    pub(crate) fn close_reservation(
        &mut self,
        id: ReservationId,
        end_ms: u64,
        fee: u64,
    ) -> Result<bool, ParkingError> {
        let reservation = self
            .reservations
            .get_mut(&id)
            .ok_or(ParkingError::ReservationNotFound(id))?;
        if !reservation.is_open() {
            return Ok(false);
        }
        reservation.end_ms = Some(end_ms);
        reservation.fee = Some(fee);
        self.open_by_space.remove(&reservation.space_id);
        Ok(true)
    }
}
