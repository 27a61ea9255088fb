/// Read surfaces: global index, group page, following feed
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::cache::PageCache;
use crate::config::Config;
use crate::db::PgStore;
use crate::error::Result;
use crate::handlers::PageQuery;
use crate::middleware::MaybeViewer;
use crate::services::FeedService;

fn feed_service(pool: &web::Data<PgPool>, config: &Config) -> FeedService<PgStore> {
    FeedService::new(
        PgStore::new(pool.get_ref().clone()),
        config.pagination.page_size,
    )
}

/// Global index. The only surface behind the page cache: within the TTL a
/// stale snapshot is served regardless of intervening writes.
pub async fn index(
    pool: web::Data<PgPool>,
    cache: web::Data<PageCache>,
    config: web::Data<Config>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = query.number();
    let key = PageCache::index_key(page);

    if let Some(body) = cache.get(&key) {
        return Ok(HttpResponse::Ok()
            .content_type("application/json")
            .body(body));
    }

    let page_data = feed_service(&pool, &config).index(page).await?;
    let body = serde_json::to_string(&page_data)?;
    cache.put(&key, body.clone());

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

/// Personalized feed: posts by every author the viewer follows. Anonymous
/// viewers get an empty page.
pub async fn follow_index(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    viewer: MaybeViewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page_data = feed_service(&pool, &config)
        .following_feed(viewer.0, query.number())
        .await?;
    Ok(HttpResponse::Ok().json(page_data))
}

/// Posts attached to a group, resolved by slug
pub async fn group_posts(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let group_page = feed_service(&pool, &config)
        .group_page(&slug, query.number())
        .await?;
    Ok(HttpResponse::Ok().json(group_page))
}
