/// Profile handlers - product setup storage
///
/// GET  /api/v1/profile - Fetch the session user's product profile
/// POST /api/v1/profile - Validate and upsert the profile
use crate::db;
use crate::db::profiles::ProfileUpsert;
use crate::error::{AppError, Result};
use crate::services::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "productName is required"))]
    pub product_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "targetAudience is required"))]
    pub target_audience: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "tonePreference is required"))]
    pub tone_preference: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    pub custom_tone: Option<String>,
    pub handle: Option<String>,
}

/// Fetch the session user's profile
pub async fn get_profile(session: Session, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let user = db::users::find_by_username(&pool, &session.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found. Please sign in again.".to_string()))?;

    let profile = db::profiles::find_by_user_id(&pool, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No profile found for this user".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "profile": profile })))
}

/// Validate and upsert the session user's profile. Nothing is persisted
/// when a required field is missing.
pub async fn save_profile(
    session: Session,
    pool: web::Data<PgPool>,
    req: web::Json<SaveProfileRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = db::users::find_by_username(&pool, &session.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found. Please sign in again.".to_string()))?;

    let profile = db::profiles::upsert(
        &pool,
        user.id,
        ProfileUpsert {
            product_name: &req.product_name,
            description: &req.description,
            target_audience: &req.target_audience,
            key_features: &req.key_features,
            tone_preference: &req.tone_preference,
            custom_tone: req.custom_tone.as_deref().filter(|t| !t.trim().is_empty()),
            handle: req.handle.as_deref().filter(|h| !h.trim().is_empty()),
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "profile": profile })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_fields_fail_validation() {
        let req = SaveProfileRequest {
            product_name: "Acme".to_string(),
            description: String::new(),
            target_audience: "devs".to_string(),
            tone_preference: String::new(),
            key_features: vec![],
            custom_tone: None,
            handle: None,
        };

        let err = AppError::from(req.validate().unwrap_err());
        let message = err.to_string();
        assert!(message.contains("description is required"));
        assert!(message.contains("tonePreference is required"));
    }

    #[test]
    fn test_complete_payload_passes_validation() {
        let req = SaveProfileRequest {
            product_name: "Acme".to_string(),
            description: "ships widgets faster".to_string(),
            target_audience: "devs".to_string(),
            tone_preference: "witty".to_string(),
            key_features: vec!["fast builds".to_string()],
            custom_tone: None,
            handle: Some("acmehq".to_string()),
        };

        assert!(req.validate().is_ok());
    }
}
