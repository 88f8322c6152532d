//! Lot registration and paginated listing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::model::{LotId, ParkingLot};
use crate::core::{ParkingError, ParkingStore, StorePolicy};

/// One page of lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotPage {
    /// Lots on this page.
    pub data: Vec<ParkingLot>,
    /// Number of lots across all pages.
    pub total_count: u64,
    /// 1-based page number.
    pub current_page: usize,
}

/// Creates and lists parking lots. Lots are never modified or deleted.
pub struct LotRegistration<S: ParkingStore + ?Sized> {
    store: Arc<S>,
    policy: StorePolicy,
}

impl<S: ParkingStore + ?Sized> LotRegistration<S> {
    /// Create a registration service over a store.
    pub const fn new(store: Arc<S>, policy: StorePolicy) -> Self {
        Self { store, policy }
    }

    /// Register a lot. The name is trimmed and must not be empty.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name; storage errors otherwise.
    pub async fn create_lot(&self, name: &str) -> Result<LotId, ParkingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParkingError::Validation("lot name must not be empty".into()));
        }
        let id = self
            .policy
            .bounded("insert_lot", self.store.insert_lot(name))
            .await?;
        tracing::info!(lot_id = id, name, "registered parking lot");
        Ok(id)
    }

    /// Whether a lot exists.
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub async fn lot_exists(&self, lot_id: LotId) -> Result<bool, ParkingError> {
        self.policy
            .bounded_read("lot_exists", || self.store.lot_exists(lot_id))
            .await
    }

    /// Page `page` (1-based) of lots, `page_size` per page.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero page or page size; storage errors otherwise.
    pub async fn list_lots(&self, page: usize, page_size: usize) -> Result<LotPage, ParkingError> {
        if page == 0 {
            return Err(ParkingError::Validation("page must be at least 1".into()));
        }
        if page_size == 0 {
            return Err(ParkingError::Validation("page size must be at least 1".into()));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ParkingError::Validation(format!("page {page} out of range")))?;

        let total_count = self
            .policy
            .bounded_read("lot_count", || self.store.lot_count())
            .await?;
        let data = self
            .policy
            .bounded_read("lots_page", || self.store.lots_page(offset, page_size))
            .await?;
        Ok(LotPage {
            data,
            total_count,
            current_page: page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::InMemoryStore;

    fn registration() -> LotRegistration<InMemoryStore> {
        LotRegistration::new(Arc::new(InMemoryStore::new()), StorePolicy::default())
    }

    #[tokio::test]
    async fn test_create_lot_trims_name() {
        let lots = registration();
        let id = lots.create_lot("  Downtown  ").await.unwrap();
        let page = lots.list_lots(1, 10).await.unwrap();
        assert_eq!(page.data, vec![ParkingLot { id, name: "Downtown".into() }]);
        assert!(lots.lot_exists(id).await.unwrap());
        assert!(!lots.lot_exists(id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let lots = registration();
        let err = lots.create_lot("   ").await.unwrap_err();
        assert!(matches!(err, ParkingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pagination() {
        let lots = registration();
        for n in 0..12 {
            lots.create_lot(&format!("lot-{n}")).await.unwrap();
        }
        let first = lots.list_lots(1, 10).await.unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.total_count, 12);

        let second = lots.list_lots(2, 10).await.unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.current_page, 2);
        assert_eq!(second.data[0].name, "lot-10");

        assert!(lots.list_lots(5, 10).await.unwrap().data.is_empty());
        assert!(matches!(
            lots.list_lots(0, 10).await,
            Err(ParkingError::Validation(_))
        ));
    }
}
