mod config;
mod error;
mod handlers;
mod models;
mod patch;
mod stock;
mod store;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web;
use config::AppConfig;
use log::info;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use sqlx::postgres::PgPoolOptions;
use store::{InventoryStore, PgStore};

/// Registers every route with its shared state. Stock-level routes go before
/// the inventory item routes so `/inventory/stock-level` is not taken for an
/// item id.
pub fn configure_app(
    store: web::Data<dyn InventoryStore>,
    config: web::Data<AppConfig>,
) -> impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(store)
            .app_data(config)
            .app_data(error::json_config())
            .service(
                web::scope("")
                    .wrap(Logger::default())
                    .wrap(
                        Cors::default()
                            .allow_any_origin()
                            .allow_any_method()
                            .allow_any_header(),
                    )
                    .configure(handlers::health::configure)
                    .configure(handlers::categories::configure)
                    .configure(handlers::suppliers::configure)
                    .configure(handlers::stock_levels::configure)
                    .configure(handlers::inventory::configure)
                    .configure(handlers::files::configure),
            );
    }
}

fn startup_error(err: impl std::error::Error + Send + Sync + 'static) -> shuttle_runtime::Error {
    shuttle_runtime::Error::Custom(anyhow::Error::new(err))
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] connection_string: String,
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    info!("Starting inventory service...");
    let app_config = AppConfig::from_secrets(&secrets).map_err(startup_error)?;

    let connection_string = if connection_string.contains('?') {
        format!("{}&sslmode=require", connection_string)
    } else {
        format!("{}?sslmode=require", connection_string)
    };

    let pool = PgPoolOptions::new()
        .max_connections(app_config.max_pool_connections)
        .connect(&connection_string)
        .await
        .map_err(startup_error)?;
    let store = PgStore::new(pool);
    store.migrate().await.map_err(startup_error)?;

    info!(
        "Storing uploads under {}",
        app_config.upload_dir.display()
    );
    let store: Arc<dyn InventoryStore> = Arc::new(store);
    let config = configure_app(web::Data::from(store), web::Data::new(app_config));

    Ok(config.into())
}
