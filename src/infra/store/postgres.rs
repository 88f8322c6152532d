//! Postgres schema and conditional-write statements for the parking tables.
//!
//! DB I/O is left to the integration layer; this module fixes the layout and
//! the statements a Postgres-backed `ParkingStore` must issue so that claims
//! and closes stay single conditional writes.

/// Postgres schema definitions.
pub struct PostgresSchema;

impl PostgresSchema {
    /// Claim: Available (1) to Booked (2). One row affected means the claim won.
    pub const CLAIM_SPACE: &'static str =
        "UPDATE parking_spaces SET status = 2 WHERE id = $1 AND status = 1";

    /// Maintenance toggle; refuses Booked spaces. `$2` is 0 or 1.
    pub const SET_MAINTENANCE: &'static str =
        "UPDATE parking_spaces SET status = $2 WHERE id = $1 AND status IN (0, 1)";

    /// Close only while open. Zero rows affected means already closed (or missing).
    pub const CLOSE_RESERVATION: &'static str = "UPDATE parking_space_reservations \
         SET end_time = $2, fee = $3 WHERE id = $1 AND end_time IS NULL";

    /// Next candidate in allocation order.
    pub const NEXT_AVAILABLE_SPACE: &'static str = "SELECT id FROM parking_spaces \
         WHERE parking_lot_id = $1 AND status = 1 ORDER BY created_at ASC, id ASC LIMIT 1";

    /// Returns SQL migration statements for lots, spaces and reservations.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r"
CREATE TABLE IF NOT EXISTS parking_lots (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(btrim(name)) > 0)
);
CREATE TABLE IF NOT EXISTS parking_spaces (
    id BIGSERIAL PRIMARY KEY,
    parking_lot_id BIGINT NOT NULL REFERENCES parking_lots (id),
    status SMALLINT NOT NULL DEFAULT 1 CHECK (status IN (0, 1, 2)),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_parking_spaces_allocation
    ON parking_spaces (parking_lot_id, status, created_at, id);
",
            r"
CREATE TABLE IF NOT EXISTS parking_space_reservations (
    id BIGSERIAL PRIMARY KEY,
    parking_space_id BIGINT NOT NULL REFERENCES parking_spaces (id),
    user_id BIGINT NOT NULL,
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ,
    fee BIGINT,
    CHECK ((end_time IS NULL) = (fee IS NULL))
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_parking_space_reservations_open
    ON parking_space_reservations (parking_space_id) WHERE end_time IS NULL;
",
        ]
    }
}
