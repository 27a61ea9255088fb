/// Follow service - idempotent follow-edge writes
///
/// Idempotency comes from the UNIQUE (user_id, author_id) constraint plus an
/// ignore-conflict insert, so concurrent duplicate follows collapse to one
/// edge without a check-then-act race.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

#[derive(Clone)]
pub struct FollowService {
    pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent create follow; returns true if a new edge was inserted.
    /// Following yourself is a no-op.
    pub async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        if user_id == author_id {
            return Ok(false);
        }

        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (id, user_id, author_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    /// Idempotent unfollow; returns true if an edge was removed. Removing an
    /// absent edge is a no-op, not an error.
    pub async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn self_follow_is_refused_without_touching_the_database() {
        // The pool never connects; a query attempt would error out.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://postgres@localhost/follows_unreachable")
            .unwrap();

        let user = Uuid::new_v4();
        let created = FollowService::new(pool).follow(user, user).await.unwrap();
        assert!(!created);
    }
}
