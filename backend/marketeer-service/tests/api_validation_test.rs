//! Endpoint validation integration tests
//!
//! Exercises the validation layers of the public endpoints through a real
//! actix App. Requests fail before any database or provider call, so the
//! tests run hermetically.
use actix_web::{test, web, App};
use chrono::Utc;
use marketeer_service::clients::NetworkClient;
use marketeer_service::config::{
    AppConfig, Config, CorsConfig, DatabaseConfig, LlmConfig, NetworkConfig, OAuthConfig,
    SessionConfig,
};
use marketeer_service::handlers;
use marketeer_service::middleware::SessionAuth;
use marketeer_service::models::User;
use marketeer_service::services::session::{
    initialize_session_keys, issue_session_token, TokenPair,
};
use serde_json::json;
use uuid::Uuid;

const COOKIE_NAME: &str = "marketeer_session";

fn session_config() -> SessionConfig {
    SessionConfig {
        secret: "integration-test-secret".to_string(),
        cookie_name: COOKIE_NAME.to_string(),
        ttl_days: 30,
        cookie_secure: false,
    }
}

fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        authorize_url: "https://network.example/oauth2/authorize".to_string(),
        token_url: "https://api.network.example/2/oauth2/token".to_string(),
        redirect_uri: "http://localhost:3000/auth/callback".to_string(),
        scopes: "tweet.read users.read tweet.write offline.access".to_string(),
    }
}

fn network_config() -> NetworkConfig {
    NetworkConfig {
        api_base_url: "https://api.network.example/2".to_string(),
        timeout_secs: 5,
    }
}

fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        cors: CorsConfig {
            allowed_origins: "http://localhost:3000".to_string(),
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/marketeer_test".to_string(),
            max_connections: 2,
        },
        session: session_config(),
        oauth: oauth_config(),
        llm: LlmConfig {
            base_url: "https://llm.example/v1".to_string(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            temperature: 0.8,
            max_tokens: 1000,
            top_p: 0.9,
            timeout_secs: 5,
        },
        network: network_config(),
    }
}

fn network_client() -> NetworkClient {
    NetworkClient::new(&oauth_config(), &network_config()).unwrap()
}

fn signed_token() -> String {
    initialize_session_keys("integration-test-secret");

    let user = User {
        id: Uuid::new_v4(),
        username: "builder".to_string(),
        avatar_url: "https://example.com/avatar.png".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let tokens = TokenPair {
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
    };

    issue_session_token(&user, "44556677", &tokens, &session_config()).unwrap()
}

#[actix_web::test]
async fn test_login_returns_authorization_url() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(network_client()))
            .route("/api/v1/auth/login", web::get().to(handlers::login)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/login")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let url = body["authorization_url"].as_str().unwrap();
    assert!(url.starts_with("https://network.example/oauth2/authorize?response_type=code"));
    assert!(body["state"].as_str().unwrap().len() >= 24);
}

#[actix_web::test]
async fn test_analytics_rejects_bad_timestamp_before_any_provider_call() {
    let token = signed_token();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(network_client()))
            .service(
                web::scope("/api/v1")
                    .wrap(SessionAuth::new(COOKIE_NAME))
                    .route("/analytics", web::post().to(handlers::fetch_analytics)),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/analytics")
        .cookie(actix_web::cookie::Cookie::new(COOKIE_NAME, token))
        .set_json(json!({
            "post_ids": ["111"],
            "start_time": "2026-08-01",
            "end_time": "2026-08-02T00:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_analytics_requires_post_ids() {
    let token = signed_token();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(network_client()))
            .service(
                web::scope("/api/v1")
                    .wrap(SessionAuth::new(COOKIE_NAME))
                    .route("/analytics", web::post().to(handlers::fetch_analytics)),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/analytics")
        .cookie(actix_web::cookie::Cookie::new(COOKIE_NAME, token))
        .set_json(json!({
            "start_time": "2026-08-01T00:00:00Z",
            "end_time": "2026-08-02T00:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_analytics_requires_a_session() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(network_client()))
            .service(
                web::scope("/api/v1")
                    .wrap(SessionAuth::new(COOKIE_NAME))
                    .route("/analytics", web::post().to(handlers::fetch_analytics)),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/analytics")
        .set_json(json!({
            "post_ids": ["111"],
            "start_time": "2026-08-01T00:00:00Z",
            "end_time": "2026-08-02T00:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}
