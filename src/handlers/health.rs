use actix_web::{get, web, HttpResponse};
use log::error;
use serde::Serialize;

use super::Store;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Info {
    name: &'static str,
    version: &'static str,
}

#[get("/actuator/health")]
pub async fn health(store: Store) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(Health { status: "UP" }),
        Err(e) => {
            error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(Health { status: "DOWN" })
        }
    }
}

#[get("/actuator/info")]
pub async fn info() -> HttpResponse {
    HttpResponse::Ok().json(Info {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(info);
}
