/// User database operations
///
/// Identity is keyed by the network username: sign-in upserts, everything
/// else looks rows up by username or id.
use crate::error::Result;
use crate::models::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert the user on first sign-in, refresh the avatar on every later one
pub async fn upsert_by_username(pool: &PgPool, username: &str, avatar_url: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, avatar_url)
        VALUES ($1, $2)
        ON CONFLICT (username) DO UPDATE
        SET avatar_url = EXCLUDED.avatar_url,
            updated_at = NOW()
        RETURNING id, username, avatar_url, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(avatar_url)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Find user by username
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, avatar_url, created_at, updated_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find user by ID
pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, avatar_url, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
