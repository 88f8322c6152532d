//! API-facing request/response models and handlers.
//!
//! Handlers take raw path segments and JSON bodies, validate them, call the
//! coordinator, and return a status code with a serializable body. Routing and
//! the network server belong to the embedding application.

use serde::{Deserialize, Serialize};

use crate::core::{
    ErrorKind, LifecycleCoordinator, LotPage, ParkingError, ParkingStore, SpaceSlot, UserId,
};

/// Create-lot request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLotRequest {
    /// Lot name; trimmed before validation.
    pub name: String,
}

/// Park request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkRequest {
    /// Parking user.
    pub user_id: Option<UserId>,
}

/// Maintenance toggle body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    /// Desired maintenance state.
    #[serde(alias = "maintanance")]
    pub maintenance: Option<bool>,
}

/// Identifier of a created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// New identifier.
    pub id: u64,
}

/// Fee charged at unpark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeResponse {
    /// Charged fee.
    pub fee: u64,
}

/// Space listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacesResponse {
    /// Spaces in allocation order.
    pub data: Vec<SpaceSlot>,
}

/// Successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply<T> {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: T,
}

/// Failed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Status code.
    pub status: u16,
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

impl From<ParkingError> for ApiError {
    fn from(err: ParkingError) -> Self {
        let status = status_code(&err);
        if status >= 500 {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, "request rejected");
        }
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Status code for an error: client errors are 400, storage and integrity
/// failures are 500.
#[must_use]
pub const fn status_code(err: &ParkingError) -> u16 {
    match err.kind() {
        ErrorKind::Validation
        | ErrorKind::NotFound
        | ErrorKind::Conflict
        | ErrorKind::Unavailable => 400,
        ErrorKind::Transient | ErrorKind::Invariant => 500,
    }
}

const fn reply<T>(status: u16, body: T) -> ApiReply<T> {
    ApiReply { status, body }
}

fn parse_id(raw: &str, what: &str) -> Result<u64, ParkingError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ParkingError::Validation(format!("invalid {what}: {raw:?}"))),
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, ParkingError> {
    serde_json::from_slice(body).map_err(|e| ParkingError::Validation(format!("malformed body: {e}")))
}

/// `GET /api/parking-lots?page=N`. Page defaults to 1 and must be at least 1.
///
/// # Errors
///
/// 400 for a bad page, 500 for storage failures.
pub async fn list_lots<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    page: Option<&str>,
) -> Result<ApiReply<LotPage>, ApiError> {
    let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
        None => 1,
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| ParkingError::Validation(format!("invalid page: {raw:?}")))?,
    };
    Ok(reply(200, coord.list_lots(page, None).await?))
}

/// `POST /api/parking-lots` with `{"name": ...}`.
///
/// # Errors
///
/// 400 for a malformed body or blank name.
pub async fn create_lot<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    body: &[u8],
) -> Result<ApiReply<CreatedResponse>, ApiError> {
    let req: CreateLotRequest = parse_body(body)?;
    let id = coord.create_lot(&req.name).await?;
    Ok(reply(201, CreatedResponse { id }))
}

/// `GET /api/parking-lots/{lot}/parking-spaces`.
///
/// # Errors
///
/// 400 for a bad lot id.
pub async fn list_spaces<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    lot_id: &str,
) -> Result<ApiReply<SpacesResponse>, ApiError> {
    let lot_id = parse_id(lot_id, "parking lot id")?;
    let data = coord.list_spaces(lot_id).await?;
    Ok(reply(200, SpacesResponse { data }))
}

/// `POST /api/parking-lots/{lot}/parking-spaces`.
///
/// # Errors
///
/// 400 for a bad or unknown lot id.
pub async fn create_space<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    lot_id: &str,
) -> Result<ApiReply<CreatedResponse>, ApiError> {
    let lot_id = parse_id(lot_id, "parking lot id")?;
    let id = coord.register_space(lot_id).await?;
    Ok(reply(201, CreatedResponse { id }))
}

/// `POST /api/parking-lots/{lot}/park` with `{"user_id": ...}`.
///
/// # Errors
///
/// 400 for bad input, unknown lot or a full lot.
pub async fn park<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    lot_id: &str,
    body: &[u8],
) -> Result<ApiReply<CreatedResponse>, ApiError> {
    let lot_id = parse_id(lot_id, "parking lot id")?;
    let req: ParkRequest = parse_body(body)?;
    let user_id = req
        .user_id
        .ok_or_else(|| ParkingError::Validation("user_id is required".into()))?;
    let id = coord.park(lot_id, user_id).await?;
    Ok(reply(201, CreatedResponse { id }))
}

/// `POST /api/parking-reservations/{reservation}/unpark`.
///
/// # Errors
///
/// 400 for a bad, unknown or already closed reservation.
pub async fn unpark<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    reservation_id: &str,
) -> Result<ApiReply<FeeResponse>, ApiError> {
    let reservation_id = parse_id(reservation_id, "reservation id")?;
    let fee = coord.unpark(reservation_id).await?;
    Ok(reply(201, FeeResponse { fee }))
}

/// `POST /api/parking-lots/{lot}/parking-spaces/{space}/maintanance` with
/// `{"maintenance": bool}` (the `maintanance` key is accepted too).
///
/// # Errors
///
/// 400 for bad input, a space outside the lot, or a booked space.
pub async fn set_maintenance<S: ParkingStore + ?Sized>(
    coord: &LifecycleCoordinator<S>,
    lot_id: &str,
    space_id: &str,
    body: &[u8],
) -> Result<ApiReply<()>, ApiError> {
    let lot_id = parse_id(lot_id, "parking lot id")?;
    let space_id = parse_id(space_id, "parking space id")?;
    let req: MaintenanceRequest = parse_body(body)?;
    let on = req
        .maintenance
        .ok_or_else(|| ParkingError::Validation("maintenance flag is required".into()))?;
    coord.set_maintenance(lot_id, space_id, on).await?;
    Ok(reply(200, ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(status_code(&ParkingError::Validation("x".into())), 400);
        assert_eq!(status_code(&ParkingError::ReservationNotFound(1)), 400);
        assert_eq!(status_code(&ParkingError::AlreadyClosed(1)), 400);
        assert_eq!(status_code(&ParkingError::NoSpaceAvailable(1)), 400);
        assert_eq!(status_code(&ParkingError::Timeout("claim_space")), 500);
        assert_eq!(status_code(&ParkingError::Invariant("x".into())), 500);
    }

    #[test]
    fn test_parse_id_rejects_zero_and_garbage() {
        assert_eq!(parse_id(" 12 ", "lot").unwrap(), 12);
        assert!(parse_id("0", "lot").is_err());
        assert!(parse_id("-3", "lot").is_err());
        assert!(parse_id("abc", "lot").is_err());
    }

    #[test]
    fn test_maintenance_body_accepts_legacy_spelling() {
        let req: MaintenanceRequest = parse_body(br#"{"maintanance": true}"#).unwrap();
        assert_eq!(req.maintenance, Some(true));
    }
}
