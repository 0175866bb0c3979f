use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::{parse_id, Message, Store};
use crate::error::ApiError;
use crate::models::{InventoryItem, InventoryItemPatch, NewInventoryItem};
use crate::store::InventoryStore;

const NOT_FOUND: &str = "Cannot find inventory item";

async fn load_item(store: &dyn InventoryStore, raw_id: &str) -> Result<InventoryItem, ApiError> {
    let id = parse_id(raw_id, NOT_FOUND)?;
    store
        .find_item(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

/// The database does not enforce these references.
async fn check_references(
    store: &dyn InventoryStore,
    category_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(id) = category_id {
        if store.get_category(id).await?.is_none() {
            return Err(ApiError::validation(format!("Category {id} does not exist")));
        }
    }
    if let Some(id) = supplier_id {
        if store.get_supplier(id).await?.is_none() {
            return Err(ApiError::validation(format!("Supplier {id} does not exist")));
        }
    }
    Ok(())
}

#[get("/inventory")]
pub async fn list_items(store: Store) -> Result<HttpResponse, ApiError> {
    info!("GET /inventory");
    let items = store.list_items().await?;
    Ok(HttpResponse::Ok().json(items))
}

#[get("/inventory/{id}")]
pub async fn get_item(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("GET /inventory/{}", id);
    let id = parse_id(&id, NOT_FOUND)?;
    let item = store
        .get_item(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(item))
}

#[post("/inventory")]
pub async fn create_item(
    store: Store,
    body: web::Json<NewInventoryItem>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /inventory: {:?}", body);
    let item = body.into_inner().into_record(Utc::now())?;
    check_references(store.get_ref(), Some(item.category_id), Some(item.supplier_id)).await?;
    let created = store.create_item(item).await?;
    info!("Inventory item created: {} ({})", created.id, created.item_id);
    Ok(HttpResponse::Created().json(created))
}

#[put("/inventory/{id}")]
pub async fn update_item(
    store: Store,
    id: web::Path<String>,
    patch: web::Json<InventoryItemPatch>,
) -> Result<HttpResponse, ApiError> {
    info!("PUT /inventory/{}: {:?}", id, patch);
    let mut item = load_item(store.get_ref(), &id).await?;
    let patch = patch.into_inner();
    check_references(
        store.get_ref(),
        patch.category_id.value().copied(),
        patch.supplier_id.value().copied(),
    )
    .await?;
    patch.apply(&mut item, Utc::now())?;
    let updated = store
        .update_item(item)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/inventory/{id}")]
pub async fn delete_item(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("DELETE /inventory/{}", id);
    let item = load_item(store.get_ref(), &id).await?;
    if !store.delete_item(item.id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    info!("Inventory item deleted: {} ({})", item.id, item.item_id);
    Ok(HttpResponse::Ok().json(Message {
        message: "Deleted Inventory Item",
    }))
}

/// Must be registered after the stock-level routes, which share the
/// `/inventory` prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_items)
        .service(get_item)
        .service(create_item)
        .service(update_item)
        .service(delete_item);
}
