//! Builders to construct a lifecycle coordinator from configuration.

use std::sync::Arc;

use crate::config::{ParkingConfig, StoreBackendConfig};
use crate::core::{LifecycleCoordinator, ParkingError, ParkingStore};
use crate::infra::store::{FileStore, InMemoryStore};
use crate::util::clock::{Clock, SystemClock};

/// Open the store selected by configuration.
///
/// # Errors
///
/// `Backend` or `Invariant` if a file store cannot be opened.
pub fn open_store(cfg: &ParkingConfig) -> Result<Arc<dyn ParkingStore>, ParkingError> {
    match &cfg.store {
        StoreBackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackendConfig::File { dir, stream } => {
            let store = FileStore::open(dir, stream.clone())?;
            tracing::info!(path = %store.file_path().display(), "opened file-backed parking store");
            Ok(Arc::new(store))
        }
    }
}

/// Build a coordinator from configuration using the provided store factory.
///
/// # Errors
///
/// `Validation` for an invalid configuration, or whatever the factory returns.
pub fn build_coordinator<S, F>(
    cfg: &ParkingConfig,
    store_factory: F,
    clock: Arc<dyn Clock>,
) -> Result<LifecycleCoordinator<S>, ParkingError>
where
    S: ParkingStore + ?Sized,
    F: FnOnce(&ParkingConfig) -> Result<Arc<S>, ParkingError>,
{
    cfg.validate()
        .map_err(|e| ParkingError::Validation(format!("config invalid: {e}")))?;
    let store = store_factory(cfg)?;
    Ok(LifecycleCoordinator::new(store, cfg.settings(), clock))
}

/// Build a coordinator over the configured store and the system clock.
///
/// # Errors
///
/// See [`build_coordinator`] and [`open_store`].
pub fn build_configured_coordinator(
    cfg: &ParkingConfig,
) -> Result<LifecycleCoordinator, ParkingError> {
    build_coordinator(cfg, open_store, Arc::new(SystemClock))
}
