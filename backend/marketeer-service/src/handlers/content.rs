/// Content handlers - list and update stored posts
///
/// GET   /api/v1/content - All items for the session user, newest first
/// PATCH /api/v1/content - Owner-scoped status/analytics update
use crate::db;
use crate::error::{AppError, Result};
use crate::models::ContentStatus;
use crate::services::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub item_id: Option<String>,
    pub status: Option<String>,
    pub external_post_id: Option<String>,
    pub engagement: Option<EngagementUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct EngagementUpdate {
    pub likes: Option<i32>,
    pub replies: Option<i32>,
    pub reposts: Option<i32>,
}

pub(crate) fn parse_item_id(item_id: &Option<String>) -> Result<Uuid> {
    item_id
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| {
            AppError::BadRequest("Invalid item id (expecting UUID string)".to_string())
        })
}

pub(crate) fn parse_status(status: &Option<String>) -> Result<ContentStatus> {
    let raw = status
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?;

    ContentStatus::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown status '{}' (expected generated, scheduled, or posted)",
            raw
        ))
    })
}

/// List the session user's content items with their engagement counters
pub async fn list_content(session: Session, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let user = db::users::find_by_username(&pool, &session.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let items = db::content::list_for_user(&pool, user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "items": items })))
}

/// Update one item's lifecycle status, external id, and engagement counters
pub async fn update_content(
    session: Session,
    pool: web::Data<PgPool>,
    req: web::Json<UpdateContentRequest>,
) -> Result<HttpResponse> {
    let item_id = parse_item_id(&req.item_id)?;
    let status = parse_status(&req.status)?;

    let user = db::users::find_by_username(&pool, &session.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let existing = db::content::find_for_user(&pool, item_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Content item not found for this user".to_string()))?;

    // Keep the posted-items invariant: a posted row always carries the
    // network's post id, an unposted row never does.
    let external_post_id = match status {
        ContentStatus::Posted => {
            let id = req
                .external_post_id
                .clone()
                .or(existing.external_post_id.clone());
            Some(id.ok_or_else(|| {
                AppError::BadRequest(
                    "A posted item requires an external post id".to_string(),
                )
            })?)
        }
        _ => None,
    };

    let (likes, replies, reposts) = match &req.engagement {
        Some(counters) => (
            Some(counters.likes.unwrap_or(0)),
            Some(counters.replies.unwrap_or(0)),
            Some(counters.reposts.unwrap_or(0)),
        ),
        None => (None, None, None),
    };

    let item = db::content::update_for_user(
        &pool,
        item_id,
        user.id,
        status,
        external_post_id.as_deref(),
        likes,
        replies,
        reposts,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Content item not found for this user".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "item": item })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_must_be_uuid_shaped() {
        assert!(parse_item_id(&Some(Uuid::new_v4().to_string())).is_ok());
        assert!(parse_item_id(&Some("12345".to_string())).is_err());
        assert!(parse_item_id(&None).is_err());
    }

    #[test]
    fn test_status_must_be_known() {
        assert_eq!(
            parse_status(&Some("posted".to_string())).unwrap(),
            ContentStatus::Posted
        );
        assert!(parse_status(&Some("archived".to_string())).is_err());
        assert!(parse_status(&Some("  ".to_string())).is_err());
        assert!(parse_status(&None).is_err());
    }
}
