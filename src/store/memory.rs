use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_item_id, InventoryStore, StoreResult};
use crate::error::ApiError;
use crate::models::{
    Category, InventoryItem, InventoryItemView, StockLevel, StockLevelUpdate, StockLevelView,
    Supplier,
};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    suppliers: Vec<Supplier>,
    items: Vec<InventoryItem>,
    stock_levels: Vec<StockLevel>,
}

impl Tables {
    fn stock_view(&self, level: &StockLevel) -> StockLevelView {
        let item = self.items.iter().find(|i| i.id == level.item_id).cloned();
        StockLevelView::resolve(level.clone(), item)
    }
}

/// Vector-backed store with the same uniqueness rules as the database.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Storage("connection refused".into()));
        }
        Ok(())
    }
}

fn replace<T: Clone>(rows: &mut [T], record: T, same: impl Fn(&T) -> bool) -> Option<T> {
    let slot = rows.iter_mut().find(|row| same(row))?;
    *slot = record.clone();
    Some(record)
}

fn remove<T>(rows: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !same(row));
    rows.len() != before
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.check()?;
        Ok(self.tables.read().await.categories.clone())
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        self.check()?;
        self.tables.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, category: Category) -> StoreResult<Option<Category>> {
        self.check()?;
        let id = category.id;
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.categories, category, |c| c.id == id))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.categories, |c| c.id == id))
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        self.check()?;
        Ok(self.tables.read().await.suppliers.clone())
    }

    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        self.check()?;
        self.tables.write().await.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Option<Supplier>> {
        self.check()?;
        let id = supplier.id;
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.suppliers, supplier, |s| s.id == id))
    }

    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.suppliers, |s| s.id == id))
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItemView>> {
        self.check()?;
        let items = self.tables.read().await.items.clone();
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.resolve_item(item).await?);
        }
        Ok(views)
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItemView>> {
        match self.find_item(id).await? {
            Some(item) => Ok(Some(self.resolve_item(item).await?)),
            None => Ok(None),
        }
    }

    async fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn create_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.items.iter().any(|i| i.item_id == item.item_id) {
            return Err(duplicate_item_id(&item.item_id));
        }
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, item: InventoryItem) -> StoreResult<Option<InventoryItem>> {
        self.check()?;
        let id = item.id;
        let mut tables = self.tables.write().await;
        Ok(replace(&mut tables.items, item, |i| i.id == id))
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.items, |i| i.id == id))
    }

    async fn list_stock_levels(&self) -> StoreResult<Vec<StockLevelView>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .stock_levels
            .iter()
            .map(|l| tables.stock_view(l))
            .collect())
    }

    async fn get_stock_level(&self, item_id: Uuid) -> StoreResult<Option<StockLevelView>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .stock_levels
            .iter()
            .find(|l| l.item_id == item_id)
            .map(|l| tables.stock_view(l)))
    }

    async fn upsert_stock_level(&self, update: StockLevelUpdate) -> StoreResult<StockLevelView> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let found = tables
            .stock_levels
            .iter()
            .position(|l| l.item_id == update.item_id);
        let level = match found {
            Some(index) => {
                let existing = &mut tables.stock_levels[index];
                existing.stock_level = update.stock_level;
                existing.clone()
            }
            None => {
                let created = StockLevel {
                    id: Uuid::new_v4(),
                    item_id: update.item_id,
                    stock_level: update.stock_level,
                };
                tables.stock_levels.push(created.clone());
                created
            }
        };
        Ok(tables.stock_view(&level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn keeps_insertion_order() {
        let store = MemoryStore::default();
        for name in ["b", "a", "c"] {
            store.create_category(category(name)).await.unwrap();
        }
        let names: Vec<_> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn upsert_never_duplicates_an_item() {
        let store = MemoryStore::default();
        let item_id = Uuid::new_v4();
        let first = store
            .upsert_stock_level(StockLevelUpdate { item_id, stock_level: 5 })
            .await
            .unwrap();
        let second = store
            .upsert_stock_level(StockLevelUpdate { item_id, stock_level: 7 })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.stock_level, 7);
        assert!(second.item.is_none());
        assert_eq!(store.list_stock_levels().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolve_item_embeds_existing_references_only() {
        let store = MemoryStore::default();
        let tools = store.create_category(category("Tools")).await.unwrap();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            item_id: "SKU-9".into(),
            name: "Hammer".into(),
            description: None,
            category_id: tools.id,
            quantity: 1,
            price: rust_decimal::Decimal::new(999, 2),
            supplier_id: Uuid::new_v4(),
            reorder_level: 0,
            last_updated: chrono::Utc::now(),
            status: "active".into(),
        };

        let view = store.resolve_item(item).await.unwrap();
        assert_eq!(view.category, Some(tools));
        assert_eq!(view.supplier, None);
    }

    #[tokio::test]
    async fn offline_store_reports_storage_errors() {
        let store = MemoryStore::default();
        store.set_offline(true);
        assert!(matches!(
            store.list_suppliers().await,
            Err(ApiError::Storage(_))
        ));
        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }
}
