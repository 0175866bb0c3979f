//! HTTP endpoints, one module per resource.

use actix_web::web;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::InventoryStore;

pub mod categories;
pub mod files;
pub mod health;
pub mod inventory;
pub mod stock_levels;
pub mod suppliers;

pub type Store = web::Data<dyn InventoryStore>;

/// Confirmation body for deletes.
#[derive(Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// A path id that is not a UUID cannot name a record, so it gets the same
/// 404 as an unknown one.
pub fn parse_id(raw: &str, missing: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(missing))
}
