//! # Parking Space Ledger
//!
//! Space lifecycle and reservation ledger for parking lots.
//!
//! Lots own spaces; each space is `Available`, `Booked` or in maintenance.
//! Parking claims the longest-registered available space of a lot and opens a
//! reservation for a user. Unparking closes the reservation, charges a fee for
//! every started billing period, and frees the space again.
//!
//! ## Guarantees
//!
//! - **Exclusive claims**: a space is booked by at most one open reservation,
//!   no matter how many park requests race for it. Claims are compare-and-swap
//!   writes in the store, so several processes can share one store.
//! - **Close once**: a reservation is closed and charged exactly once; a second
//!   unpark reports `AlreadyClosed`.
//! - **Bounded store calls**: every storage call runs under a deadline, and a
//!   claim whose reservation could not be opened is rolled back.
//!
//! ## Layout
//!
//! - [`core`]: domain model, store seam, registry, allocator, ledger and the
//!   [`core::LifecycleCoordinator`] that ties them together.
//! - [`infra`]: store adapters (in-memory, JSON file, Postgres schema).
//! - [`config`] and [`builders`]: typed configuration and wiring.
//! - [`runtime`]: transport-agnostic request handlers.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parking_space_ledger::core::{CoordinatorSettings, LifecycleCoordinator};
//! use parking_space_ledger::infra::InMemoryStore;
//! use parking_space_ledger::util::SystemClock;
//!
//! let coord = LifecycleCoordinator::new(
//!     Arc::new(InMemoryStore::new()),
//!     CoordinatorSettings::default(),
//!     Arc::new(SystemClock),
//! );
//! let lot = coord.create_lot("Central").await?;
//! coord.register_space(lot).await?;
//! let reservation = coord.park(lot, 42).await?;
//! let fee = coord.unpark(reservation).await?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Domain model, lifecycle services and the storage seam.
pub mod core;
/// Configuration models for stores, deadlines and fees.
pub mod config;
/// Builders to construct a coordinator from configuration.
pub mod builders;
/// Storage adapters.
pub mod infra;
/// Request handlers for an API layer.
pub mod runtime;
/// Shared utilities.
pub mod util;
