//! File-backed parking store.
//!
//! Keeps the tables in memory and persists a JSON snapshot after every write.
//! A write is staged on a copy of the tables, the copy is written to a
//! temporary file and renamed over the snapshot, and only then swapped in, so
//! a failed write leaves both disk and memory at the previous state.

use std::fs::{create_dir_all, rename, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::tables::Tables;
use crate::core::model::{
    LotId, ParkingLot, ParkingSpace, Reservation, ReservationId, SpaceId, SpaceStatus, UserId,
};
use crate::core::{ParkingError, ParkingStore, StatusTransition};

fn backend(e: impl std::fmt::Display) -> ParkingError {
    ParkingError::Backend(e.to_string())
}

/// File-backed store using a JSON snapshot for durability.
pub struct FileStore {
    path: PathBuf,
    stream: String,
    tables: Mutex<Tables>,
}

impl FileStore {
    /// Open (or create) the store named `stream` under directory `path`.
    ///
    /// # Errors
    ///
    /// `Backend` on I/O or parse failure, `Invariant` if the snapshot holds
    /// inconsistent state.
    pub fn open(path: impl AsRef<Path>, stream: impl Into<String>) -> Result<Self, ParkingError> {
        let path = path.as_ref().to_path_buf();
        create_dir_all(&path).map_err(backend)?;
        let store = Self {
            path,
            stream: stream.into(),
            tables: Mutex::new(Tables::default()),
        };
        let loaded = store.load_from_disk()?;
        *store.tables.lock() = loaded;
        Ok(store)
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}.json", self.stream))
    }

    fn load_from_disk(&self) -> Result<Tables, ParkingError> {
        let file_path = self.file_path();
        if !file_path.exists() {
            return Ok(Tables::default());
        }
        let file = OpenOptions::new()
            .read(true)
            .open(&file_path)
            .map_err(backend)?;
        let mut tables: Tables =
            serde_json::from_reader(BufReader::new(file)).map_err(backend)?;
        tables.rebuild_index()?;
        tracing::debug!(path = %file_path.display(), "loaded parking snapshot");
        Ok(tables)
    }

    fn write_snapshot(&self, tables: &Tables) -> Result<(), ParkingError> {
        let file_path = self.file_path();
        let tmp_path = self.path.join(format!("{}.json.tmp", self.stream));
        let body = serde_json::to_vec(tables).map_err(backend)?;
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(backend)?;
        file.write_all(&body).map_err(backend)?;
        file.sync_all().map_err(backend)?;
        rename(&tmp_path, &file_path).map_err(backend)
    }

    fn commit<T>(
        &self,
        apply: impl FnOnce(&mut Tables) -> Result<T, ParkingError>,
    ) -> Result<T, ParkingError> {
        let mut guard = self.tables.lock();
        let mut staged = guard.clone();
        let out = apply(&mut staged)?;
        self.write_snapshot(&staged)?;
        *guard = staged;
        Ok(out)
    }
}

#[async_trait]
impl ParkingStore for FileStore {
    async fn insert_lot(&self, name: &str) -> Result<LotId, ParkingError> {
        self.commit(|t| Ok(t.insert_lot(name)))
    }

    async fn lot_exists(&self, lot_id: LotId) -> Result<bool, ParkingError> {
        Ok(self.tables.lock().lot_exists(lot_id))
    }

    async fn lots_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ParkingLot>, ParkingError> {
        Ok(self.tables.lock().lots_page(offset, limit))
    }

    async fn lot_count(&self) -> Result<u64, ParkingError> {
        Ok(self.tables.lock().lot_count())
    }

    async fn insert_space(
        &self,
        lot_id: LotId,
        created_at_ms: u64,
    ) -> Result<SpaceId, ParkingError> {
        self.commit(|t| t.insert_space(lot_id, created_at_ms))
    }

    async fn space(&self, space_id: SpaceId) -> Result<Option<ParkingSpace>, ParkingError> {
        self.tables.lock().space(space_id)
    }

    async fn spaces_in_lot(&self, lot_id: LotId) -> Result<Vec<ParkingSpace>, ParkingError> {
        self.tables.lock().spaces_in_lot(lot_id)
    }

    async fn first_available_space(
        &self,
        lot_id: LotId,
    ) -> Result<Option<SpaceId>, ParkingError> {
        Ok(self.tables.lock().first_available_space(lot_id))
    }

    async fn transition_status(
        &self,
        space_id: SpaceId,
        from: &[SpaceStatus],
        to: SpaceStatus,
    ) -> Result<StatusTransition, ParkingError> {
        self.commit(|t| t.transition_status(space_id, from, to))
    }

    async fn set_status(&self, space_id: SpaceId, status: SpaceStatus) -> Result<(), ParkingError> {
        self.commit(|t| t.set_status(space_id, status))
    }

    async fn insert_reservation(
        &self,
        space_id: SpaceId,
        user_id: UserId,
        start_ms: u64,
    ) -> Result<ReservationId, ParkingError> {
        self.commit(|t| t.insert_reservation(space_id, user_id, start_ms))
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, ParkingError> {
        Ok(self.tables.lock().reservation(id))
    }

    async fn close_reservation(
        &self,
        id: ReservationId,
        end_ms: u64,
        fee: u64,
    ) -> Result<bool, ParkingError> {
        self.commit(|t| t.close_reservation(id, end_ms, fee))
    }
}
