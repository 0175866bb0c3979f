use actix_web::{get, post, web, HttpResponse};
use log::info;

use super::{parse_id, Store};
use crate::error::ApiError;
use crate::models::StockLevelUpdate;
use crate::stock::apply_stock_updates;

const NOT_FOUND: &str = "Item not found";

#[get("/inventory/stock-level")]
pub async fn list_stock_levels(store: Store) -> Result<HttpResponse, ApiError> {
    info!("GET /inventory/stock-level");
    let levels = store.list_stock_levels().await?;
    Ok(HttpResponse::Ok().json(levels))
}

#[get("/inventory/stock-level/{item_id}")]
pub async fn get_stock_level(
    store: Store,
    item_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    info!("GET /inventory/stock-level/{}", item_id);
    let item_id = parse_id(&item_id, NOT_FOUND)?;
    let level = store
        .get_stock_level(item_id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(level))
}

#[post("/inventory/stock-level")]
pub async fn update_stock_levels(
    store: Store,
    updates: web::Json<Vec<StockLevelUpdate>>,
) -> Result<HttpResponse, ApiError> {
    info!("POST /inventory/stock-level: {} entries", updates.len());
    let results = apply_stock_updates(store.get_ref(), &updates).await?;
    Ok(HttpResponse::Ok().json(results))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_stock_levels)
        .service(get_stock_level)
        .service(update_stock_levels);
}
