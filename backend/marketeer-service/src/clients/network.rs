/// Social network REST API client
///
/// Wraps the network's OAuth endpoints (code exchange, refresh) and the
/// bearer-authorized v2 REST endpoints used by this service: post creation,
/// recent-post listing, and post analytics.
///
/// All authorized calls go through `send_authorized`, which performs exactly
/// one refresh-and-retry when the provider answers 401 and a refresh token is
/// available. Refresh failure is fatal to the calling request.
use crate::config::{NetworkConfig, OAuthConfig};
use crate::error::AppError;
use crate::metrics;
use crate::services::session::TokenPair;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Authenticated user record returned by the network's `users/me` endpoint
#[derive(Debug, Clone)]
pub struct NetworkUser {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    data: MeData,
}

#[derive(Debug, Deserialize)]
struct MeData {
    id: String,
    username: String,
    profile_image_url: Option<String>,
}

pub struct NetworkClient {
    http: HttpClient,
    api_base_url: String,
    authorize_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: String,
}

impl NetworkClient {
    pub fn new(oauth: &OAuthConfig, network: &NetworkConfig) -> Result<Self, AppError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(network.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base_url: network.api_base_url.trim_end_matches('/').to_string(),
            authorize_url: oauth.authorize_url.clone(),
            token_url: oauth.token_url.clone(),
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            redirect_uri: oauth.redirect_uri.clone(),
            scopes: oauth.scopes.clone(),
        })
    }

    /// Random URL-safe state nonce for the authorization redirect
    pub fn generate_state() -> String {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Build the provider authorization URL for the sign-in redirect
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scopes),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for an access/refresh token pair
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        let redirect_uri = redirect_uri.unwrap_or(&self.redirect_uri);
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "authorization code exchange rejected");
            metrics::PROVIDER_CALLS
                .with_label_values(&["network", "auth_error"])
                .inc();
            return Err(AppError::ProviderAuth(format!(
                "Authorization code exchange failed ({})",
                status
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("malformed token response: {}", e)))?;

        Ok(TokenPair {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// One-shot refresh of an expired access token
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            metrics::TOKEN_REFRESHES
                .with_label_values(&["failure"])
                .inc();
            return Err(AppError::ProviderAuth("Token refresh failed".to_string()));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("malformed token response: {}", e)))?;

        metrics::TOKEN_REFRESHES
            .with_label_values(&["success"])
            .inc();

        Ok(TokenPair {
            access_token: tokens.access_token,
            // The provider may rotate the refresh token; keep the old one
            // when it does not.
            refresh_token: tokens
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
        })
    }

    /// Fetch the authenticated user's identity
    pub async fn fetch_me(&self, access_token: &str) -> Result<NetworkUser, AppError> {
        let response = self
            .http
            .get(format!("{}/users/me", self.api_base_url))
            .query(&[("user.fields", "profile_image_url")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("user lookup request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::ProviderAuth(
                "Invalid or expired access token".to_string(),
            ));
        }
        if !status.is_success() {
            let detail: Value = response.json().await.unwrap_or(Value::Null);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("malformed user response: {}", e)))?;

        Ok(NetworkUser {
            id: me.data.id,
            username: me.data.username,
            avatar_url: me.data.profile_image_url,
        })
    }

    /// Send a bearer-authorized request, refreshing the token pair and
    /// retrying exactly once when the provider answers 401.
    ///
    /// `tokens` is updated in place on refresh so callers can re-issue the
    /// session cookie with the rotated pair.
    async fn send_authorized<F>(
        &self,
        tokens: &mut TokenPair,
        build: F,
    ) -> Result<Response, AppError>
    where
        F: Fn(&HttpClient, &str) -> RequestBuilder,
    {
        let response = build(&self.http, &tokens.access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("network request failed: {}", e)))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let refresh_token = match &tokens.refresh_token {
            Some(token) => token.clone(),
            None => {
                return Err(AppError::ProviderAuth(
                    "Access token rejected and no refresh token available".to_string(),
                ))
            }
        };

        debug!("access token rejected; attempting one-shot refresh");
        *tokens = self.refresh_tokens(&refresh_token).await?;

        build(&self.http, &tokens.access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::Internal(format!("network request failed after token refresh: {}", e))
            })
    }

    /// Create a post on the network and return its `data` object
    pub async fn create_post(
        &self,
        tokens: &mut TokenPair,
        payload: &Value,
    ) -> Result<Value, AppError> {
        let url = format!("{}/tweets", self.api_base_url);
        let response = self
            .send_authorized(tokens, |http, access_token| {
                http.post(&url).bearer_auth(access_token).json(payload)
            })
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            warn!(%status, "post creation rejected by the network");
            metrics::PROVIDER_CALLS
                .with_label_values(&["network", "rejected"])
                .inc();
            return Err(AppError::ProviderRejected { detail: body });
        }

        metrics::PROVIDER_CALLS
            .with_label_values(&["network", "ok"])
            .inc();

        Ok(body.get("data").cloned().unwrap_or(body))
    }

    /// Fetch the user's recent posts with their public engagement metrics
    pub async fn recent_posts(
        &self,
        tokens: &mut TokenPair,
        network_user_id: &str,
        limit: u32,
    ) -> Result<Value, AppError> {
        let url = format!("{}/users/{}/tweets", self.api_base_url, network_user_id);
        let max_results = limit.to_string();
        let response = self
            .send_authorized(tokens, |http, access_token| {
                http.get(&url).bearer_auth(access_token).query(&[
                    ("max_results", max_results.as_str()),
                    ("tweet.fields", "public_metrics,created_at"),
                    ("expansions", "author_id"),
                ])
            })
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                detail: body,
            });
        }

        Ok(body)
    }

    /// Query the network's post analytics endpoint over a time window
    pub async fn fetch_analytics(
        &self,
        tokens: &mut TokenPair,
        ids: &[String],
        start_time: &str,
        end_time: &str,
        granularity: &str,
        fields: &[String],
    ) -> Result<Value, AppError> {
        let url = format!("{}/tweets/analytics", self.api_base_url);
        let ids_param = ids.join(",");
        let fields_param = fields.join(",");

        debug!(
            post_count = ids.len(),
            start_time, end_time, "fetching post analytics"
        );

        let response = self
            .send_authorized(tokens, |http, access_token| {
                http.get(&url).bearer_auth(access_token).query(&[
                    ("ids", ids_param.as_str()),
                    ("start_time", start_time),
                    ("end_time", end_time),
                    ("granularity", granularity),
                    ("analytics.fields", fields_param.as_str()),
                ])
            })
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            warn!(%status, "analytics request rejected by the network");
            metrics::PROVIDER_CALLS
                .with_label_values(&["network", "rejected"])
                .inc();

            if body.get("reason").and_then(Value::as_str) == Some("client-not-enrolled") {
                return Err(AppError::NotEnrolled { detail: body });
            }

            return match status {
                StatusCode::UNAUTHORIZED => Err(AppError::ProviderAuth(
                    "Invalid or expired access token".to_string(),
                )),
                StatusCode::TOO_MANY_REQUESTS => Err(AppError::RateLimited(
                    "Too many requests. Please try again later.".to_string(),
                )),
                other => Err(AppError::Upstream {
                    status: other.as_u16(),
                    detail: body,
                }),
            };
        }

        metrics::PROVIDER_CALLS
            .with_label_values(&["network", "ok"])
            .inc();

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NetworkConfig, OAuthConfig};

    fn test_client() -> NetworkClient {
        NetworkClient::new(
            &OAuthConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                authorize_url: "https://network.example/oauth2/authorize".to_string(),
                token_url: "https://api.network.example/2/oauth2/token".to_string(),
                redirect_uri: "http://localhost:3000/auth/callback".to_string(),
                scopes: "tweet.read users.read tweet.write offline.access".to_string(),
            },
            &NetworkConfig {
                api_base_url: "https://api.network.example/2".to_string(),
                timeout_secs: 5,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = test_client();
        let url = client.authorization_url("abc/123");

        assert!(url.starts_with("https://network.example/oauth2/authorize?response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
        assert!(url.contains("scope=tweet.read%20users.read%20tweet.write%20offline.access"));
        assert!(url.contains("state=abc%2F123"));
    }

    #[test]
    fn test_generated_states_are_unique() {
        let a = NetworkClient::generate_state();
        let b = NetworkClient::generate_state();
        assert_ne!(a, b);
        assert!(a.len() >= 24);
    }
}
