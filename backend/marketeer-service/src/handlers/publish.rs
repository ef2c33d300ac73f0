/// Publish handler - forward approved text to the network
///
/// POST /api/v1/publish - Post the item's text with the session bearer
/// token; on success the item transitions to `posted` with the returned
/// network post id attached.
use crate::clients::NetworkClient;
use crate::config::Config;
use crate::db;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::POST_TEXT_LIMIT;
use crate::services::session::{self, Session};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub item_id: Option<String>,
    /// Overrides the stored text when present
    pub text: Option<String>,
    pub media_ids: Option<Vec<String>>,
    pub poll: Option<Value>,
    pub reply: Option<Value>,
}

pub async fn publish(
    session: Session,
    config: web::Data<Config>,
    pool: web::Data<PgPool>,
    network: web::Data<NetworkClient>,
    req: web::Json<PublishRequest>,
) -> Result<HttpResponse> {
    let item_id = super::content::parse_item_id(&req.item_id)?;

    let item = db::content::find_for_user(&pool, item_id, session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Content item not found for this user".to_string()))?;

    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(&item.text)
        .to_string();

    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Post text is required".to_string()));
    }
    if text.chars().count() > POST_TEXT_LIMIT {
        return Err(AppError::BadRequest(format!(
            "Post text exceeds the {}-character limit",
            POST_TEXT_LIMIT
        )));
    }

    let mut payload = json!({ "text": text });
    if let Some(media_ids) = &req.media_ids {
        if !media_ids.is_empty() {
            payload["media"] = json!({ "media_ids": media_ids });
        }
    }
    if let Some(poll) = &req.poll {
        payload["poll"] = poll.clone();
    }
    if let Some(reply) = &req.reply {
        payload["reply"] = reply.clone();
    }

    let mut tokens = session.tokens.clone();
    let post = network.create_post(&mut tokens, &payload).await?;

    let external_post_id = post
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Internal("post id missing from the network response".to_string())
        })?;

    let item = db::content::mark_posted(&pool, item_id, session.user_id, &external_post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Content item not found for this user".to_string()))?;

    metrics::PUBLISHED_POSTS.inc();
    info!(username = %session.username, %external_post_id, "post published");

    let mut response = HttpResponse::Ok();
    if let Some(cookie) = session::reissued_cookie(&session, &tokens, &config.session)? {
        response.cookie(cookie);
    }

    Ok(response.json(json!({
        "item": item,
        "external_post_id": external_post_id,
        "post": post,
    })))
}
