/// Content item database operations
///
/// All reads and writes are scoped to the owning user; a write that matches
/// no row reports `None` so handlers can answer 404 instead of touching
/// another user's content.
use crate::error::Result;
use crate::models::{ContentItem, ContentStatus};
use sqlx::PgPool;
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, user_id, text, product_name, status, external_post_id, \
                            likes, replies, reposts, created_at, updated_at";

/// Persist a batch of freshly generated posts with status `generated`
pub async fn insert_generated(
    pool: &PgPool,
    user_id: Uuid,
    texts: &[String],
    product_name: Option<&str>,
) -> Result<Vec<ContentItem>> {
    let mut tx = pool.begin().await?;
    let mut items = Vec::with_capacity(texts.len());

    for text in texts {
        let item = sqlx::query_as::<_, ContentItem>(&format!(
            r#"
            INSERT INTO content_items (user_id, text, product_name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(user_id)
        .bind(text)
        .bind(product_name)
        .fetch_one(&mut *tx)
        .await?;

        items.push(item);
    }

    tx.commit().await?;
    Ok(items)
}

/// All content items for a user, newest first
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ContentItem>> {
    let items = sqlx::query_as::<_, ContentItem>(&format!(
        r#"
        SELECT {}
        FROM content_items
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
        ITEM_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Fetch one item scoped to its owner
pub async fn find_for_user(
    pool: &PgPool,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ContentItem>> {
    let item = sqlx::query_as::<_, ContentItem>(&format!(
        "SELECT {} FROM content_items WHERE id = $1 AND user_id = $2",
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// Owner-scoped update of status, external id, and engagement counters.
///
/// Counter parameters left as `None` keep their stored values. The external
/// id is written as given; callers are responsible for handing in a value
/// consistent with the posted-items invariant.
pub async fn update_for_user(
    pool: &PgPool,
    item_id: Uuid,
    user_id: Uuid,
    status: ContentStatus,
    external_post_id: Option<&str>,
    likes: Option<i32>,
    replies: Option<i32>,
    reposts: Option<i32>,
) -> Result<Option<ContentItem>> {
    let item = sqlx::query_as::<_, ContentItem>(&format!(
        r#"
        UPDATE content_items
        SET status = $3,
            external_post_id = $4,
            likes = COALESCE($5, likes),
            replies = COALESCE($6, replies),
            reposts = COALESCE($7, reposts),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {}
        "#,
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(user_id)
    .bind(status)
    .bind(external_post_id)
    .bind(likes)
    .bind(replies)
    .bind(reposts)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// Transition an item to `posted`, attaching the network-assigned post id
pub async fn mark_posted(
    pool: &PgPool,
    item_id: Uuid,
    user_id: Uuid,
    external_post_id: &str,
) -> Result<Option<ContentItem>> {
    let item = sqlx::query_as::<_, ContentItem>(&format!(
        r#"
        UPDATE content_items
        SET status = 'posted',
            external_post_id = $3,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {}
        "#,
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(user_id)
    .bind(external_post_id)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}
