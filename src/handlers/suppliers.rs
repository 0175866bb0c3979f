use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;

use super::{parse_id, Message, Store};
use crate::error::ApiError;
use crate::models::{NewSupplier, Supplier, SupplierPatch};
use crate::store::InventoryStore;

const NOT_FOUND: &str = "Cannot find supplier";

async fn load_supplier(store: &dyn InventoryStore, raw_id: &str) -> Result<Supplier, ApiError> {
    let id = parse_id(raw_id, NOT_FOUND)?;
    store
        .get_supplier(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

#[get("/suppliers")]
pub async fn list_suppliers(store: Store) -> Result<HttpResponse, ApiError> {
    info!("GET /suppliers");
    let suppliers = store.list_suppliers().await?;
    Ok(HttpResponse::Ok().json(suppliers))
}

#[get("/suppliers/{id}")]
pub async fn get_supplier(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("GET /suppliers/{}", id);
    let supplier = load_supplier(store.get_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(supplier))
}

#[post("/suppliers")]
pub async fn create_supplier(
    store: Store,
    body: web::Json<NewSupplier>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /suppliers: {:?}", body);
    let supplier = body.into_inner().into_record()?;
    let created = store.create_supplier(supplier).await?;
    info!("Supplier created: {}", created.id);
    Ok(HttpResponse::Created().json(created))
}

#[put("/suppliers/{id}")]
pub async fn update_supplier(
    store: Store,
    id: web::Path<String>,
    patch: web::Json<SupplierPatch>,
) -> Result<HttpResponse, ApiError> {
    info!("PUT /suppliers/{}: {:?}", id, patch);
    let mut supplier = load_supplier(store.get_ref(), &id).await?;
    patch.into_inner().apply(&mut supplier)?;
    let updated = store
        .update_supplier(supplier)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/suppliers/{id}")]
pub async fn delete_supplier(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("DELETE /suppliers/{}", id);
    let supplier = load_supplier(store.get_ref(), &id).await?;
    if !store.delete_supplier(supplier.id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    info!("Supplier deleted: {}", supplier.id);
    Ok(HttpResponse::Ok().json(Message {
        message: "Deleted Supplier",
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_suppliers)
        .service(get_supplier)
        .service(create_supplier)
        .service(update_supplier)
        .service(delete_supplier);
}
