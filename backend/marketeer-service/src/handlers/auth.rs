/// Authentication handlers - OAuth sign-in and session lifecycle
///
/// GET  /api/v1/auth/login    - Build the provider authorization URL
/// POST /api/v1/auth/callback - Exchange the code, upsert the user, set the session cookie
/// POST /api/v1/auth/logout   - Clear the session cookie
use crate::clients::NetworkClient;
use crate::config::Config;
use crate::db;
use crate::error::{AppError, Result};
use crate::services::session;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

/// Avatar used when the provider returns none
const DEFAULT_AVATAR_URL: &str =
    "https://abs.twimg.com/sticky/default_profile_images/default_profile_normal.png";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authorization_url: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

/// Start the OAuth flow - returns the authorization URL
pub async fn login(network: web::Data<NetworkClient>) -> Result<HttpResponse> {
    let state = NetworkClient::generate_state();
    let authorization_url = network.authorization_url(&state);

    Ok(HttpResponse::Ok().json(LoginResponse {
        authorization_url,
        state,
    }))
}

/// Complete the OAuth flow - exchange the code, upsert the user by username,
/// and attach the token pair to a fresh session cookie
pub async fn callback(
    config: web::Data<Config>,
    pool: web::Data<PgPool>,
    network: web::Data<NetworkClient>,
    req: web::Json<CallbackRequest>,
) -> Result<HttpResponse> {
    tracing::debug!(state = ?req.state, "oauth callback received");

    if req.code.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing authorization code".to_string(),
        ));
    }

    let tokens = network
        .exchange_code(&req.code, req.redirect_uri.as_deref())
        .await?;
    let me = network.fetch_me(&tokens.access_token).await?;

    let avatar_url = me.avatar_url.as_deref().unwrap_or(DEFAULT_AVATAR_URL);
    let existing = db::users::find_by_username(&pool, &me.username).await?;
    let user = db::users::upsert_by_username(&pool, &me.username, avatar_url).await?;
    let is_new_user = existing.is_none();

    info!(username = %user.username, is_new_user, "sign-in completed");

    let token = session::issue_session_token(&user, &me.id, &tokens, &config.session)?;
    let cookie = session::session_cookie(&config.session, token);

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "user": user,
        "is_new_user": is_new_user,
    })))
}

/// End the session
pub async fn logout(config: web::Data<Config>) -> Result<HttpResponse> {
    let cookie = session::removal_cookie(&config.session);

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "success": true })))
}
