//! Lots, spaces and reservations.

use serde::{Deserialize, Serialize};

use crate::core::ParkingError;

/// Parking lot identifier.
pub type LotId = u64;
/// Parking space identifier.
pub type SpaceId = u64;
/// Reservation identifier.
pub type ReservationId = u64;
/// User identifier, supplied by the caller.
pub type UserId = u64;

/// Status of a parking space.
///
/// Stored as a small code: `Maintenance = 0`, `Available = 1`, `Booked = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceStatus {
    /// Out of service; never handed out.
    #[serde(rename = "IN_MAINTENANCE")]
    Maintenance,
    /// Free to be claimed.
    Available,
    /// Held by an open reservation.
    Booked,
}

impl SpaceStatus {
    /// Persisted code for this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Maintenance => 0,
            Self::Available => 1,
            Self::Booked => 2,
        }
    }

    /// Decode a persisted status code.
    ///
    /// # Errors
    ///
    /// Returns [`ParkingError::Invariant`] for a code outside the three known values.
    pub fn from_code(code: u8) -> Result<Self, ParkingError> {
        match code {
            0 => Ok(Self::Maintenance),
            1 => Ok(Self::Available),
            2 => Ok(Self::Booked),
            other => Err(ParkingError::Invariant(format!(
                "unrecognized space status code {other}"
            ))),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "IN_MAINTENANCE",
            Self::Available => "AVAILABLE",
            Self::Booked => "BOOKED",
        }
    }
}

/// A named collection of parking spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingLot {
    /// Lot identifier.
    pub id: LotId,
    /// Display name, trimmed and non-empty.
    pub name: String,
}

/// An individually allocatable parking space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpace {
    /// Space identifier.
    pub id: SpaceId,
    /// Owning lot.
    pub lot_id: LotId,
    /// Current status.
    pub status: SpaceStatus,
    /// Creation time in milliseconds since epoch; primary allocation order.
    pub created_at_ms: u64,
}

/// A space as shown in a lot listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSlot {
    /// Space identifier.
    pub id: SpaceId,
    /// Current status.
    pub status: SpaceStatus,
    /// 1-based position within the lot listing. Not persisted.
    pub slot_number: usize,
}

/// One occupancy interval of a space by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Occupied space.
    pub space_id: SpaceId,
    /// Occupying user.
    pub user_id: UserId,
    /// Start time in milliseconds since epoch.
    pub start_ms: u64,
    /// End time; `None` while the reservation is open.
    pub end_ms: Option<u64>,
    /// Fee charged at close; present iff `end_ms` is.
    pub fee: Option<u64>,
}

impl Reservation {
    /// True while no end time has been recorded.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_ms.is_none()
    }
}

/// Ordering used both for listings and for allocation: creation time, then id.
pub(crate) fn allocation_order(a: &ParkingSpace, b: &ParkingSpace) -> std::cmp::Ordering {
    a.created_at_ms
        .cmp(&b.created_at_ms)
        .then_with(|| a.id.cmp(&b.id))
}
