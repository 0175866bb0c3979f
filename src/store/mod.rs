//! Record storage behind a single trait so handlers stay independent of the
//! backing database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    Category, InventoryItem, InventoryItemView, StockLevelUpdate, StockLevelView, Supplier,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, ApiError>;

/// Document-style CRUD over the four record kinds.
///
/// Lists come back in insertion order. `update_*` returns `None` and
/// `delete_*` returns `false` when the record vanished in the meantime.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn create_category(&self, category: Category) -> StoreResult<Category>;
    async fn update_category(&self, category: Category) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>>;
    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>>;
    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier>;
    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Option<Supplier>>;
    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool>;

    /// Joined read: every item with its category and supplier embedded.
    async fn list_items(&self) -> StoreResult<Vec<InventoryItemView>>;
    /// Joined read of a single item.
    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItemView>>;
    /// The stored item without reference resolution, for read-modify-write.
    async fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>>;
    async fn create_item(&self, item: InventoryItem) -> StoreResult<InventoryItem>;
    async fn update_item(&self, item: InventoryItem) -> StoreResult<Option<InventoryItem>>;
    async fn delete_item(&self, id: Uuid) -> StoreResult<bool>;

    /// Replaces the item's foreign keys with the referenced records.
    ///
    /// `PgStore` resolves references with SQL joins and never calls this.
    async fn resolve_item(&self, item: InventoryItem) -> StoreResult<InventoryItemView> {
        let category = self.get_category(item.category_id).await?;
        let supplier = self.get_supplier(item.supplier_id).await?;
        Ok(InventoryItemView::resolve(item, category, supplier))
    }

    async fn list_stock_levels(&self) -> StoreResult<Vec<StockLevelView>>;
    async fn get_stock_level(&self, item_id: Uuid) -> StoreResult<Option<StockLevelView>>;
    /// Creates the item's stock-level record or overwrites its level.
    async fn upsert_stock_level(&self, update: StockLevelUpdate) -> StoreResult<StockLevelView>;
}

pub fn duplicate_item_id(item_id: &str) -> ApiError {
    ApiError::validation(format!("Duplicate itemId: {item_id} already exists"))
}
