use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::patch::Patch;

pub const DEFAULT_STATUS: &str = "active";

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::required(field));
    }
    Ok(())
}

fn require_patch_text(field: &str, patch: &Patch<String>) -> Result<(), ApiError> {
    match patch.value() {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}

// ---- categories ----

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn into_record(self) -> Result<Category, ApiError> {
        require_text("name", &self.name)?;
        Ok(Category {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
}

impl CategoryPatch {
    pub fn apply(self, category: &mut Category) -> Result<(), ApiError> {
        require_patch_text("name", &self.name)?;
        self.name.apply_required(&mut category.name);
        self.description.apply_optional(&mut category.description);
        Ok(())
    }
}

// ---- suppliers ----

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_info: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub contact_info: Option<String>,
    pub address: Option<String>,
}

impl NewSupplier {
    pub fn into_record(self) -> Result<Supplier, ApiError> {
        require_text("name", &self.name)?;
        Ok(Supplier {
            id: Uuid::new_v4(),
            name: self.name,
            contact_info: self.contact_info,
            address: self.address,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierPatch {
    pub name: Patch<String>,
    pub contact_info: Patch<String>,
    pub address: Patch<String>,
}

impl SupplierPatch {
    pub fn apply(self, supplier: &mut Supplier) -> Result<(), ApiError> {
        require_patch_text("name", &self.name)?;
        self.name.apply_required(&mut supplier.name);
        self.contact_info.apply_optional(&mut supplier.contact_info);
        self.address.apply_optional(&mut supplier.address);
        Ok(())
    }
}

// ---- inventory items ----

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    /// Business key, unique across all items.
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub supplier_id: Uuid,
    pub reorder_level: i32,
    pub last_updated: DateTime<Utc>,
    pub status: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub supplier_id: Uuid,
    pub reorder_level: i32,
    pub status: Option<String>,
}

impl NewInventoryItem {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<InventoryItem, ApiError> {
        require_text("itemId", &self.item_id)?;
        require_text("name", &self.name)?;
        Ok(InventoryItem {
            id: Uuid::new_v4(),
            item_id: self.item_id,
            name: self.name,
            description: self.description,
            category_id: self.category_id,
            quantity: self.quantity,
            price: self.price,
            supplier_id: self.supplier_id,
            reorder_level: self.reorder_level,
            last_updated: now,
            status: self
                .status
                .filter(|status| !status.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

/// `itemId` is fixed at creation and cannot be patched.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub category_id: Patch<Uuid>,
    pub quantity: Patch<i32>,
    pub price: Patch<Decimal>,
    pub supplier_id: Patch<Uuid>,
    pub reorder_level: Patch<i32>,
    pub status: Patch<String>,
}

impl InventoryItemPatch {
    pub fn apply(self, item: &mut InventoryItem, now: DateTime<Utc>) -> Result<(), ApiError> {
        require_patch_text("name", &self.name)?;
        require_patch_text("status", &self.status)?;

        self.name.apply_required(&mut item.name);
        self.description.apply_optional(&mut item.description);
        self.category_id.apply_required(&mut item.category_id);
        self.quantity.apply_required(&mut item.quantity);
        self.price.apply_required(&mut item.price);
        self.supplier_id.apply_required(&mut item.supplier_id);
        self.reorder_level.apply_required(&mut item.reorder_level);
        self.status.apply_required(&mut item.status);
        item.last_updated = now;
        Ok(())
    }
}

/// An inventory item with its category and supplier embedded in place of the
/// raw ids. A dangling reference renders as `null`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    pub id: Uuid,
    pub item_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "categoryId")]
    pub category: Option<Category>,
    pub quantity: i32,
    pub price: Decimal,
    #[serde(rename = "supplierId")]
    pub supplier: Option<Supplier>,
    pub reorder_level: i32,
    pub last_updated: DateTime<Utc>,
    pub status: String,
}

impl InventoryItemView {
    pub fn resolve(
        item: InventoryItem,
        category: Option<Category>,
        supplier: Option<Supplier>,
    ) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            name: item.name,
            description: item.description,
            category,
            quantity: item.quantity,
            price: item.price,
            supplier,
            reorder_level: item.reorder_level,
            last_updated: item.last_updated,
            status: item.status,
        }
    }
}

// ---- stock levels ----

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub id: Uuid,
    /// `id` of the inventory item this level belongs to.
    pub item_id: Uuid,
    pub stock_level: i32,
}

/// One entry of a batch stock-level request.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelUpdate {
    pub item_id: Uuid,
    pub stock_level: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelView {
    pub id: Uuid,
    #[serde(rename = "itemId")]
    pub item: Option<InventoryItem>,
    pub stock_level: i32,
}

impl StockLevelView {
    pub fn resolve(level: StockLevel, item: Option<InventoryItem>) -> Self {
        Self {
            id: level.id,
            item,
            stock_level: level.stock_level,
        }
    }
}
