use sqlx::PgPool;
use uuid::Uuid;

use crate::models::CommentRow;

/// Create a new comment on a post
pub async fn create_comment(
    pool: &PgPool,
    post_id: i64,
    author_id: Uuid,
    text: &str,
) -> Result<CommentRow, sqlx::Error> {
    sqlx::query_as::<_, CommentRow>(
        r#"
        WITH ins AS (
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
        )
        SELECT c.id, c.post_id, u.username AS author, c.text, c.created_at
        FROM ins c
        JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(pool)
    .await
}

/// Comments for a post, oldest first
pub async fn comments_for_post(
    pool: &PgPool,
    post_id: i64,
) -> Result<Vec<CommentRow>, sqlx::Error> {
    sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, u.username AS author, c.text, c.created_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at, c.id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}
