/// HTTP request handlers
pub mod comments;
pub mod feed;
pub mod posts;
pub mod profiles;

pub use comments::*;
pub use feed::*;
pub use posts::*;
pub use profiles::*;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

/// `?page=N` query on every list surface
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn number(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Liveness/DB health check
pub async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "posts-service",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("database connection failed: {}", e),
        })),
    }
}
