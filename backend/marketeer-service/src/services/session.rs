/// Signed session tokens
///
/// The session is a signed (HS256) token carried in a cookie, holding the
/// network identity and the provider token pair for the lifetime of the
/// session. Tokens are opaque to this service and never touch the database.
///
/// Keys are loaded once at startup via `initialize_session_keys`; all
/// encode/decode paths fail cleanly if initialization never happened.
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::models::User;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static SESSION_KEYS: OnceCell<SessionKeys> = OnceCell::new();

struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Install the session signing secret. Safe to call more than once; the
/// first call wins.
pub fn initialize_session_keys(secret: &str) {
    SESSION_KEYS.get_or_init(|| SessionKeys {
        encoding: EncodingKey::from_secret(secret.as_bytes()),
        decoding: DecodingKey::from_secret(secret.as_bytes()),
    });
}

fn keys() -> Result<&'static SessionKeys, AppError> {
    SESSION_KEYS
        .get()
        .ok_or_else(|| AppError::Internal("session keys not initialized".to_string()))
}

/// Access/refresh token pair issued by the network's OAuth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Claims carried inside the signed session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal user id
    pub sub: String,
    /// Network username (the unique identity key)
    pub username: String,
    /// Provider-assigned user id, needed for per-user network endpoints
    pub network_user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Decoded session attached to authenticated requests
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub network_user_id: String,
    pub tokens: TokenPair,
}

impl Session {
    pub fn from_claims(claims: &SessionClaims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid session".to_string()))?;

        Ok(Session {
            user_id,
            username: claims.username.clone(),
            network_user_id: claims.network_user_id.clone(),
            tokens: TokenPair {
                access_token: claims.access_token.clone(),
                refresh_token: claims.refresh_token.clone(),
            },
        })
    }
}

/// Sign a session token for a freshly authenticated user
pub fn issue_session_token(
    user: &User,
    network_user_id: &str,
    tokens: &TokenPair,
    config: &SessionConfig,
) -> Result<String, AppError> {
    sign_session_token(user.id, &user.username, network_user_id, tokens, config)
}

fn sign_session_token(
    user_id: Uuid,
    username: &str,
    network_user_id: &str,
    tokens: &TokenPair,
    config: &SessionConfig,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        network_user_id: network_user_id.to_string(),
        access_token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.ttl_days)).timestamp(),
    };

    encode(&Header::default(), &claims, &keys()?.encoding)
        .map_err(|e| AppError::Internal(format!("failed to sign session token: {}", e)))
}

/// Validate a session token and return its claims
pub fn decode_session_token(token: &str) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(token, &keys()?.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired session".to_string()))
}

/// Build the session cookie carrying a signed token
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(config.ttl_days))
        .finish()
}

/// Build an expired cookie that clears the session
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Re-sign the session when a provider call rotated the token pair, so the
/// client keeps the fresh tokens. Returns `None` when nothing changed.
pub fn reissued_cookie(
    session: &Session,
    tokens: &TokenPair,
    config: &SessionConfig,
) -> Result<Option<Cookie<'static>>, AppError> {
    if tokens == &session.tokens {
        return Ok(None);
    }

    let token = sign_session_token(
        session.user_id,
        &session.username,
        &session.network_user_id,
        tokens,
        config,
    )?;
    Ok(Some(session_cookie(config, token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secret: "test-session-secret".to_string(),
            cookie_name: "marketeer_session".to_string(),
            ttl_days: 30,
            cookie_secure: false,
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "builder".to_string(),
            avatar_url: "https://example.com/a.png".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        initialize_session_keys("test-session-secret");

        let user = test_user();
        let tokens = TokenPair {
            access_token: "access-123".to_string(),
            refresh_token: Some("refresh-456".to_string()),
        };

        let token = issue_session_token(&user, "99887766", &tokens, &test_config()).unwrap();
        let claims = decode_session_token(&token).unwrap();

        assert_eq!(claims.username, "builder");
        assert_eq!(claims.network_user_id, "99887766");
        assert_eq!(claims.access_token, "access-123");
        assert_eq!(claims.refresh_token.as_deref(), Some("refresh-456"));

        let session = Session::from_claims(&claims).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.tokens, tokens);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        initialize_session_keys("test-session-secret");
        assert!(decode_session_token("not-a-token").is_err());
    }

    #[test]
    fn test_reissue_only_on_rotation() {
        initialize_session_keys("test-session-secret");

        let user = test_user();
        let tokens = TokenPair {
            access_token: "access-123".to_string(),
            refresh_token: Some("refresh-456".to_string()),
        };
        let token = issue_session_token(&user, "99887766", &tokens, &test_config()).unwrap();
        let session = Session::from_claims(&decode_session_token(&token).unwrap()).unwrap();

        assert!(reissued_cookie(&session, &tokens, &test_config())
            .unwrap()
            .is_none());

        let rotated = TokenPair {
            access_token: "access-789".to_string(),
            refresh_token: Some("refresh-456".to_string()),
        };
        let cookie = reissued_cookie(&session, &rotated, &test_config())
            .unwrap()
            .expect("rotated tokens produce a fresh cookie");
        let claims = decode_session_token(cookie.value()).unwrap();
        assert_eq!(claims.access_token, "access-789");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&test_config(), "token".to_string());
        assert_eq!(cookie.name(), "marketeer_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
