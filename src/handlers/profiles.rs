/// Profile and follow/unfollow handlers
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::config::Config;
use crate::db::{self, PgStore};
use crate::error::{AppError, Result};
use crate::handlers::PageQuery;
use crate::middleware::{MaybeViewer, Viewer};
use crate::services::{FeedService, FollowService};

/// Author context plus the author's posts
pub async fn profile(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    viewer: MaybeViewer,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = FeedService::new(
        PgStore::new(pool.get_ref().clone()),
        config.pagination.page_size,
    );
    let profile_page = feed.profile(&username, viewer.0, query.number()).await?;
    Ok(HttpResponse::Ok().json(profile_page))
}

async fn resolve_author(pool: &PgPool, username: &str) -> Result<uuid::Uuid> {
    db::find_user_by_username(pool, username)
        .await?
        .map(|user| user.id)
        .ok_or_else(|| AppError::NotFound(format!("profile {}", username)))
}

/// Follow the profile's author; idempotent, then back to the profile
pub async fn profile_follow(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author_id = resolve_author(pool.get_ref(), &username).await?;

    let created = FollowService::new(pool.get_ref().clone())
        .follow(viewer.0, author_id)
        .await?;
    if created {
        tracing::info!(follower = %viewer.0, author = %username.as_str(), "follow created");
    }

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/{}/", username)))
        .finish())
}

/// Remove the follow edge if present; absent edges are a no-op
pub async fn profile_unfollow(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author_id = resolve_author(pool.get_ref(), &username).await?;

    FollowService::new(pool.get_ref().clone())
        .unfollow(viewer.0, author_id)
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/{}/", username)))
        .finish())
}
