/// Comment service - authenticated comment submission
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::CommentRow;
use crate::services::validation;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment to a post. Validation runs before any write; commenting
    /// on an unknown post is NotFound.
    pub async fn add_comment(
        &self,
        post_id: i64,
        author_id: Uuid,
        text: Option<&str>,
    ) -> Result<CommentRow> {
        let text = validation::validate_text(text)?;

        if post_repo::find_post(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment = comment_repo::create_comment(&self.pool, post_id, author_id, &text).await?;
        tracing::info!(post_id, comment_id = comment.id, "comment created");
        Ok(comment)
    }
}
