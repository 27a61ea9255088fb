/// Post service - creation and author-only editing
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::models::PostRow;
use crate::services::validation;

pub struct PostService {
    pool: PgPool,
}

/// Submitted post form fields, before validation
#[derive(Debug, Default)]
pub struct PostInput<'a> {
    pub text: Option<&'a str>,
    pub group_id: Option<i64>,
    pub image: Option<&'a [u8]>,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post. Validation runs before any write.
    pub async fn create_post(&self, author_id: Uuid, input: PostInput<'_>) -> Result<PostRow> {
        let text = validation::validate_text(input.text)?;
        if let Some(image) = input.image {
            validation::validate_image(image)?;
        }
        self.check_group(input.group_id).await?;

        let post =
            post_repo::create_post(&self.pool, author_id, &text, input.group_id, input.image)
                .await?;

        tracing::info!(post_id = post.id, author = %post.author, "post created");
        Ok(post)
    }

    /// Edit an existing post. Only the author may edit; group reassignment is
    /// a plain column update, visible to every read surface immediately.
    pub async fn edit_post(
        &self,
        post_id: i64,
        editor_id: Uuid,
        input: PostInput<'_>,
    ) -> Result<PostRow> {
        let existing = post_repo::find_post(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if existing.author_id != editor_id {
            return Err(AppError::Forbidden(
                "only the author can edit this post".to_string(),
            ));
        }

        let text = validation::validate_text(input.text)?;
        if let Some(image) = input.image {
            validation::validate_image(image)?;
        }
        self.check_group(input.group_id).await?;

        let updated =
            post_repo::update_post(&self.pool, post_id, &text, input.group_id, input.image)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        tracing::info!(post_id, "post updated");
        Ok(updated)
    }

    async fn check_group(&self, group_id: Option<i64>) -> Result<()> {
        if let Some(id) = group_id {
            if !post_repo::group_exists(&self.pool, id).await? {
                return Err(AppError::BadRequest(format!("unknown group {}", id)));
            }
        }
        Ok(())
    }
}
