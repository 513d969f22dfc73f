use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored mirror of the signed token. At most one row per user; a fresh
/// sign-in replaces the old row, which is what invalidates earlier tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionToken {
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
}

impl SessionToken {
    pub async fn replace_for_user(db: &PgPool, user_id: Uuid, token: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session_tokens (user_id, token)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token, created_at = now()
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<SessionToken>> {
        let row = sqlx::query_as::<_, SessionToken>(
            r#"
            SELECT user_id, token, created_at
            FROM session_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn delete_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM session_tokens WHERE user_id = $1"#)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
