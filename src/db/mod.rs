/// Database access layer
///
/// Pool construction, embedded migrations, and the `ContentStore` seam the
/// feed engine reads through. Write paths live in the per-entity repos.
pub mod comment_repo;
pub mod post_repo;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{Group, PostRow, User};

/// Create the Postgres connection pool
pub async fn create_pool(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await
}

/// Apply embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Find a user by username
pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Find a group by slug
pub async fn find_group_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        SELECT id, title, slug, description, created_at
        FROM groups
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Read surface the feed engine derives every page from.
///
/// Every method is a pure function of current table state; nothing here is
/// precomputed or event-sourced, so group reassignment and follow-graph edits
/// are visible on the very next read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn count_posts(&self) -> Result<i64, sqlx::Error>;
    async fn recent_posts(&self, limit: i64, offset: i64) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn find_group(&self, slug: &str) -> Result<Option<Group>, sqlx::Error>;
    async fn count_group_posts(&self, group_id: i64) -> Result<i64, sqlx::Error>;
    async fn group_posts(
        &self,
        group_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn count_author_posts(&self, author_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn author_posts(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn count_following_posts(&self, viewer_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn following_posts(
        &self,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn follower_count(&self, author_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn following_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error>;
}

/// Postgres-backed [`ContentStore`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared projection for list surfaces: a post joined with its author and group.
const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, u.username AS author, p.text,
           p.group_id, g.slug AS group_slug, g.title AS group_title,
           (p.image IS NOT NULL) AS has_image, p.created_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

#[async_trait]
impl ContentStore for PgStore {
    async fn count_posts(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
    }

    async fn recent_posts(&self, limit: i64, offset: i64) -> Result<Vec<PostRow>, sqlx::Error> {
        let query = format!(
            "{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_group(&self, slug: &str) -> Result<Option<Group>, sqlx::Error> {
        find_group_by_slug(&self.pool, slug).await
    }

    async fn count_group_posts(&self, group_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn group_posts(
        &self,
        group_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        let query = format!(
            "{POST_SELECT} WHERE p.group_id = $1 ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(group_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        find_user_by_username(&self.pool, username).await
    }

    async fn count_author_posts(&self, author_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn author_posts(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        let query = format!(
            "{POST_SELECT} WHERE p.author_id = $1 ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn count_following_posts(&self, viewer_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE author_id IN (SELECT author_id FROM follows WHERE user_id = $1)
            "#,
        )
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn following_posts(
        &self,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        // Set union over the viewer's current follow edges, derived at read
        // time from the authoritative tables.
        let query = format!(
            r#"{POST_SELECT}
            WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = $1)
            ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"#
        );
        sqlx::query_as::<_, PostRow>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn follower_count(&self, author_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn following_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }
}
