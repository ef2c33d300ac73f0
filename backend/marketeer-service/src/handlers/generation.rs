/// Generation handler - produce and persist marketing posts
///
/// POST /api/v1/generate - One completion call, parsed into at most five
/// posts, persisted with status `generated`
use crate::clients::llm::CompletionProvider;
use crate::db;
use crate::error::{AppError, Result};
use crate::services::generation::{self, ProductBrief};
use crate::services::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "productName is required"))]
    pub product_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    pub tone_preference: Option<String>,
    pub custom_tone: Option<String>,
    pub handle: Option<String>,
}

/// Generate up to five posts from the product fields and persist them
pub async fn generate(
    session: Session,
    pool: web::Data<PgPool>,
    provider: web::Data<dyn CompletionProvider>,
    req: web::Json<GenerateRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = db::users::find_by_username(&pool, &session.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found. Please sign in again.".to_string()))?;

    let req = req.into_inner();
    let brief = ProductBrief {
        product_name: req.product_name,
        description: req.description,
        target_audience: req.target_audience,
        key_features: req.key_features,
        tone_preference: req.tone_preference,
        custom_tone: req.custom_tone,
        handle: req.handle,
    };

    let texts = generation::generate_posts(provider.get_ref(), &brief).await?;

    let items = if texts.is_empty() {
        Vec::new()
    } else {
        db::content::insert_generated(&pool, user.id, &texts, Some(&brief.product_name)).await?
    };

    info!(
        username = %user.username,
        count = texts.len(),
        "generated posts persisted"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "texts": texts,
        "items": items,
    })))
}
