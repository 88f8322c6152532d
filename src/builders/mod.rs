//! Builders to construct the coordinator and its store from configuration.

pub mod coordinator_builder;

pub use coordinator_builder::{build_configured_coordinator, build_coordinator, open_store};
