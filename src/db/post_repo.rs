use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PostRow;

const RETURNING_JOINED: &str = r#"
    SELECT p.id, p.author_id, u.username AS author, p.text,
           p.group_id, g.slug AS group_slug, g.title AS group_title,
           (p.image IS NOT NULL) AS has_image, p.created_at
    FROM ins p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

/// Create a new post. Returns the created post joined with author and group.
pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    text: &str,
    group_id: Option<i64>,
    image: Option<&[u8]>,
) -> Result<PostRow, sqlx::Error> {
    let query = format!(
        r#"
        WITH ins AS (
            INSERT INTO posts (author_id, text, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, text, group_id, image, created_at
        )
        {RETURNING_JOINED}
        "#
    );

    sqlx::query_as::<_, PostRow>(&query)
        .bind(author_id)
        .bind(text)
        .bind(group_id)
        .bind(image)
        .fetch_one(pool)
        .await
}

/// Update a post's text, group and (optionally) image.
///
/// A missing image payload keeps the stored one; the group column is always
/// overwritten so reassignment takes effect on the next read, and clearing the
/// group detaches the post from it.
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&[u8]>,
) -> Result<Option<PostRow>, sqlx::Error> {
    let query = format!(
        r#"
        WITH ins AS (
            UPDATE posts
            SET text = $2, group_id = $3, image = COALESCE($4, image), updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, text, group_id, image, created_at
        )
        {RETURNING_JOINED}
        "#
    );

    sqlx::query_as::<_, PostRow>(&query)
        .bind(post_id)
        .bind(text)
        .bind(group_id)
        .bind(image)
        .fetch_optional(pool)
        .await
}

/// Find a post by id, joined with author and group
pub async fn find_post(pool: &PgPool, post_id: i64) -> Result<Option<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, p.author_id, u.username AS author, p.text,
               p.group_id, g.slug AS group_slug, g.title AS group_title,
               (p.image IS NOT NULL) AS has_image, p.created_at
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Check that a group id exists before attaching a post to it
pub async fn group_exists(pool: &PgPool, group_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1)")
        .bind(group_id)
        .fetch_one(pool)
        .await
}
