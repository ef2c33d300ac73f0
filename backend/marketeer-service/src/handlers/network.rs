/// Network timeline handler
///
/// GET /api/v1/network/posts - Fetch the session user's recent posts from
/// the network with their public engagement metrics.
use crate::clients::NetworkClient;
use crate::config::Config;
use crate::error::Result;
use crate::services::session::{self, Session};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct RecentPostsParams {
    pub limit: Option<u32>,
}

pub async fn recent_posts(
    session: Session,
    config: web::Data<Config>,
    network: web::Data<NetworkClient>,
    params: web::Query<RecentPostsParams>,
) -> Result<HttpResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let mut tokens = session.tokens.clone();
    let posts = network
        .recent_posts(&mut tokens, &session.network_user_id, limit)
        .await?;

    let mut response = HttpResponse::Ok();
    if let Some(cookie) = session::reissued_cookie(&session, &tokens, &config.session)? {
        response.cookie(cookie);
    }

    Ok(response.json(posts))
}
