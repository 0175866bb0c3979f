use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;

use super::{parse_id, Message, Store};
use crate::error::ApiError;
use crate::models::{Category, CategoryPatch, NewCategory};
use crate::store::InventoryStore;

const NOT_FOUND: &str = "Cannot find category";

async fn load_category(store: &dyn InventoryStore, raw_id: &str) -> Result<Category, ApiError> {
    let id = parse_id(raw_id, NOT_FOUND)?;
    store
        .get_category(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

#[get("/categories")]
pub async fn list_categories(store: Store) -> Result<HttpResponse, ApiError> {
    info!("GET /categories");
    let categories = store.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/categories/{id}")]
pub async fn get_category(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("GET /categories/{}", id);
    let category = load_category(store.get_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/categories")]
pub async fn create_category(
    store: Store,
    body: web::Json<NewCategory>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /categories: {:?}", body);
    let category = body.into_inner().into_record()?;
    let created = store.create_category(category).await?;
    info!("Category created: {}", created.id);
    Ok(HttpResponse::Created().json(created))
}

#[put("/categories/{id}")]
pub async fn update_category(
    store: Store,
    id: web::Path<String>,
    patch: web::Json<CategoryPatch>,
) -> Result<HttpResponse, ApiError> {
    info!("PUT /categories/{}: {:?}", id, patch);
    let mut category = load_category(store.get_ref(), &id).await?;
    patch.into_inner().apply(&mut category)?;
    let updated = store
        .update_category(category)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/categories/{id}")]
pub async fn delete_category(store: Store, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    info!("DELETE /categories/{}", id);
    let category = load_category(store.get_ref(), &id).await?;
    if !store.delete_category(category.id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    info!("Category deleted: {}", category.id);
    Ok(HttpResponse::Ok().json(Message {
        message: "Deleted Category",
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(get_category)
        .service(create_category)
        .service(update_category)
        .service(delete_category);
}
