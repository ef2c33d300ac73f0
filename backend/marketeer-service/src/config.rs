/// Configuration management for the marketeer service
///
/// Loads typed configuration from environment variables with development
/// defaults and production guard-rails.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// OAuth client configuration for the social network
    pub oauth: OAuthConfig,
    /// Completion provider configuration
    pub llm: LlmConfig,
    /// Social network REST API configuration
    pub network: NetworkConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Signed session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret for the session token signature
    pub secret: String,
    /// Cookie name
    pub cookie_name: String,
    /// Session lifetime in days
    pub ttl_days: i64,
    /// Whether to set the Secure cookie attribute
    pub cookie_secure: bool,
}

/// OAuth 2.0 client settings for the social network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Provider authorization page
    pub authorize_url: String,
    /// Provider token endpoint (code exchange and refresh)
    pub token_url: String,
    /// Callback URL registered with the provider
    pub redirect_uri: String,
    /// Space-separated scope list
    pub scopes: String,
}

/// Completion provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible completion API
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub timeout_secs: u64,
}

/// Social network REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Base URL of the network's v2 REST API
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("MARKETEER_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("MARKETEER_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8088),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/marketeer".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            session: {
                let secret = std::env::var("SESSION_SECRET").unwrap_or_default();
                if production && secret.len() < 32 {
                    return Err(
                        "SESSION_SECRET must be set to at least 32 characters in production"
                            .to_string(),
                    );
                }

                SessionConfig {
                    secret: if secret.is_empty() {
                        "development-session-secret".to_string()
                    } else {
                        secret
                    },
                    cookie_name: std::env::var("SESSION_COOKIE_NAME")
                        .unwrap_or_else(|_| "marketeer_session".to_string()),
                    ttl_days: std::env::var("SESSION_TTL_DAYS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(30),
                    cookie_secure: production,
                }
            },
            oauth: {
                let client_id = std::env::var("NETWORK_CLIENT_ID").unwrap_or_default();
                let client_secret = std::env::var("NETWORK_CLIENT_SECRET").unwrap_or_default();
                if production && (client_id.is_empty() || client_secret.is_empty()) {
                    return Err(
                        "NETWORK_CLIENT_ID and NETWORK_CLIENT_SECRET must be set in production"
                            .to_string(),
                    );
                }

                OAuthConfig {
                    client_id,
                    client_secret,
                    authorize_url: std::env::var("NETWORK_AUTHORIZE_URL")
                        .unwrap_or_else(|_| "https://twitter.com/i/oauth2/authorize".to_string()),
                    token_url: std::env::var("NETWORK_TOKEN_URL")
                        .unwrap_or_else(|_| "https://api.twitter.com/2/oauth2/token".to_string()),
                    redirect_uri: std::env::var("NETWORK_REDIRECT_URI")
                        .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
                    scopes: std::env::var("NETWORK_OAUTH_SCOPES").unwrap_or_else(|_| {
                        "tweet.read users.read tweet.write offline.access".to_string()
                    }),
                }
            },
            llm: LlmConfig {
                base_url: std::env::var("LLM_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.together.xyz/v1".to_string()),
                api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
                model: std::env::var("LLM_MODEL").unwrap_or_else(|_| {
                    "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string()
                }),
                temperature: parse_env_or_default("LLM_TEMPERATURE", 0.8)?,
                max_tokens: std::env::var("LLM_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
                top_p: parse_env_or_default("LLM_TOP_P", 0.9)?,
                timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
            network: NetworkConfig {
                api_base_url: std::env::var("NETWORK_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.twitter.com/2".to_string()),
                timeout_secs: std::env::var("NETWORK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            },
        })
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, String> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        // No env mutation here; relies on a clean environment for these keys.
        let config = Config::from_env().expect("default config should load");
        assert_eq!(config.app.port, 8088);
        assert_eq!(config.session.cookie_name, "marketeer_session");
        assert_eq!(config.session.ttl_days, 30);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.llm.max_tokens, 1000);
        assert!(config
            .oauth
            .scopes
            .split_whitespace()
            .any(|scope| scope == "offline.access"));
    }
}
