use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{duplicate_item_id, InventoryStore, StoreResult};
use crate::error::ApiError;
use crate::models::{
    Category, InventoryItem, InventoryItemView, StockLevel, StockLevelUpdate, StockLevelView,
    Supplier,
};

const CATEGORY_COLUMNS: &str = "id, name, description";
const SUPPLIER_COLUMNS: &str = "id, name, contact_info, address";
const ITEM_COLUMNS: &str = "id, item_id, name, description, category_id, quantity, price, \
     supplier_id, reorder_level, last_updated, status";

const ITEM_JOIN_SELECT: &str = "SELECT i.id, i.item_id, i.name, i.description, i.category_id, \
     i.quantity, i.price, i.supplier_id, i.reorder_level, i.last_updated, i.status, \
     c.id AS c_id, c.name AS c_name, c.description AS c_description, \
     s.id AS s_id, s.name AS s_name, s.contact_info AS s_contact_info, s.address AS s_address \
     FROM inventory_items i \
     LEFT JOIN categories c ON c.id = i.category_id \
     LEFT JOIN suppliers s ON s.id = i.supplier_id";

const STOCK_JOIN_COLUMNS: &str = "l.id, l.item_id, l.stock_level, \
     i.id AS i_id, i.item_id AS i_item_id, i.name AS i_name, i.description AS i_description, \
     i.category_id AS i_category_id, i.quantity AS i_quantity, i.price AS i_price, \
     i.supplier_id AS i_supplier_id, i.reorder_level AS i_reorder_level, \
     i.last_updated AS i_last_updated, i.status AS i_status";

/// Inventory item row with its category and supplier columns alongside.
#[derive(sqlx::FromRow)]
struct ItemJoinRow {
    #[sqlx(flatten)]
    item: InventoryItem,
    c_id: Option<Uuid>,
    c_name: Option<String>,
    c_description: Option<String>,
    s_id: Option<Uuid>,
    s_name: Option<String>,
    s_contact_info: Option<String>,
    s_address: Option<String>,
}

impl ItemJoinRow {
    fn into_view(self) -> InventoryItemView {
        let category = match (self.c_id, self.c_name) {
            (Some(id), Some(name)) => Some(Category {
                id,
                name,
                description: self.c_description,
            }),
            _ => None,
        };
        let supplier = match (self.s_id, self.s_name) {
            (Some(id), Some(name)) => Some(Supplier {
                id,
                name,
                contact_info: self.s_contact_info,
                address: self.s_address,
            }),
            _ => None,
        };
        InventoryItemView::resolve(self.item, category, supplier)
    }
}

#[derive(sqlx::FromRow)]
struct StockJoinRow {
    #[sqlx(flatten)]
    level: StockLevel,
    i_id: Option<Uuid>,
    i_item_id: Option<String>,
    i_name: Option<String>,
    i_description: Option<String>,
    i_category_id: Option<Uuid>,
    i_quantity: Option<i32>,
    i_price: Option<Decimal>,
    i_supplier_id: Option<Uuid>,
    i_reorder_level: Option<i32>,
    i_last_updated: Option<DateTime<Utc>>,
    i_status: Option<String>,
}

impl StockJoinRow {
    fn joined_item(&mut self) -> Option<InventoryItem> {
        Some(InventoryItem {
            id: self.i_id?,
            item_id: self.i_item_id.take()?,
            name: self.i_name.take()?,
            description: self.i_description.take(),
            category_id: self.i_category_id?,
            quantity: self.i_quantity?,
            price: self.i_price?,
            supplier_id: self.i_supplier_id?,
            reorder_level: self.i_reorder_level?,
            last_updated: self.i_last_updated?,
            status: self.i_status.take()?,
        })
    }

    fn into_view(mut self) -> StockLevelView {
        let item = self.joined_item();
        StockLevelView::resolve(self.level, item)
    }
}

fn map_item_write(err: sqlx::Error, item_id: &str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_item_id(item_id),
        _ => err.into(),
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at, id");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        let sql = format!(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .fetch_one(&self.pool)
            .await?;
        debug!("Inserted category {}", created.id);
        Ok(created)
    }

    async fn update_category(&self, category: Category) -> StoreResult<Option<Category>> {
        let sql = format!(
            "UPDATE categories SET name = $1, description = $2 WHERE id = $3 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY created_at, id");
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        let sql = format!(
            "INSERT INTO suppliers (id, name, contact_info, address) VALUES ($1, $2, $3, $4) \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Supplier>(&sql)
            .bind(supplier.id)
            .bind(&supplier.name)
            .bind(&supplier.contact_info)
            .bind(&supplier.address)
            .fetch_one(&self.pool)
            .await?;
        debug!("Inserted supplier {}", created.id);
        Ok(created)
    }

    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Option<Supplier>> {
        let sql = format!(
            "UPDATE suppliers SET name = $1, contact_info = $2, address = $3 WHERE id = $4 \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .bind(&supplier.name)
            .bind(&supplier.contact_info)
            .bind(&supplier.address)
            .bind(supplier.id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_items(&self) -> StoreResult<Vec<InventoryItemView>> {
        let sql = format!("{ITEM_JOIN_SELECT} ORDER BY i.created_at, i.id");
        let rows = sqlx::query_as::<_, ItemJoinRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ItemJoinRow::into_view).collect())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItemView>> {
        let sql = format!("{ITEM_JOIN_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, ItemJoinRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ItemJoinRow::into_view))
    }

    async fn find_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1");
        Ok(sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        let sql = format!(
            "INSERT INTO inventory_items \
             (id, item_id, name, description, category_id, quantity, price, supplier_id, \
              reorder_level, last_updated, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ITEM_COLUMNS}"
        );
        let created = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(item.id)
            .bind(&item.item_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.category_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.supplier_id)
            .bind(item.reorder_level)
            .bind(item.last_updated)
            .bind(&item.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_item_write(e, &item.item_id))?;
        debug!("Inserted inventory item {} ({})", created.id, created.item_id);
        Ok(created)
    }

    async fn update_item(&self, item: InventoryItem) -> StoreResult<Option<InventoryItem>> {
        let sql = format!(
            "UPDATE inventory_items SET name = $1, description = $2, category_id = $3, \
             quantity = $4, price = $5, supplier_id = $6, reorder_level = $7, \
             last_updated = $8, status = $9 \
             WHERE id = $10 RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.category_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.supplier_id)
            .bind(item.reorder_level)
            .bind(item.last_updated)
            .bind(&item.status)
            .bind(item.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_item_write(e, &item.item_id))
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_stock_levels(&self) -> StoreResult<Vec<StockLevelView>> {
        let sql = format!(
            "SELECT {STOCK_JOIN_COLUMNS} FROM stock_levels l \
             LEFT JOIN inventory_items i ON i.id = l.item_id \
             ORDER BY l.created_at, l.id"
        );
        let rows = sqlx::query_as::<_, StockJoinRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(StockJoinRow::into_view).collect())
    }

    async fn get_stock_level(&self, item_id: Uuid) -> StoreResult<Option<StockLevelView>> {
        let sql = format!(
            "SELECT {STOCK_JOIN_COLUMNS} FROM stock_levels l \
             LEFT JOIN inventory_items i ON i.id = l.item_id \
             WHERE l.item_id = $1"
        );
        let row = sqlx::query_as::<_, StockJoinRow>(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StockJoinRow::into_view))
    }

    async fn upsert_stock_level(&self, update: StockLevelUpdate) -> StoreResult<StockLevelView> {
        let sql = format!(
            "WITH l AS ( \
                 INSERT INTO stock_levels (id, item_id, stock_level) VALUES ($1, $2, $3) \
                 ON CONFLICT (item_id) DO UPDATE SET stock_level = EXCLUDED.stock_level \
                 RETURNING id, item_id, stock_level \
             ) \
             SELECT {STOCK_JOIN_COLUMNS} FROM l \
             LEFT JOIN inventory_items i ON i.id = l.item_id"
        );
        let row = sqlx::query_as::<_, StockJoinRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(update.item_id)
            .bind(update.stock_level)
            .fetch_one(&self.pool)
            .await?;
        debug!(
            "Stock level for item {} set to {}",
            update.item_id, update.stock_level
        );
        Ok(row.into_view())
    }
}
