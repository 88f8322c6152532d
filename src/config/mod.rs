//! Configuration models for the parking coordinator and its store.

pub mod parking;

pub use parking::{FeeConfig, ParkingConfig, StoreBackendConfig};
