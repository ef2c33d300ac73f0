/// Analytics handler - batched post analytics over a time window
///
/// POST /api/v1/analytics - Validate the id batch, window, granularity, and
/// metric subset, then forward to the network's analytics endpoint.
use crate::clients::NetworkClient;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::session::{self, Session};
use actix_web::{web, HttpResponse};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

/// Provider batch limit
const MAX_IDS_PER_REQUEST: usize = 100;

/// Metric names accepted by the provider's analytics endpoint
const AVAILABLE_ANALYTICS_FIELDS: [&str; 19] = [
    "app_install_attempts",
    "app_opens",
    "detail_expands",
    "email_tweet",
    "engagements",
    "follows",
    "hashtag_clicks",
    "impressions",
    "likes",
    "link_clicks",
    "media_engagements",
    "media_views",
    "permalink_clicks",
    "profile_visits",
    "quote_tweets",
    "replies",
    "retweets",
    "url_clicks",
    "user_profile_clicks",
];

/// Canned subset used when the caller omits `fields`
const DEFAULT_ANALYTICS_FIELDS: [&str; 8] = [
    "impressions",
    "likes",
    "replies",
    "retweets",
    "quote_tweets",
    "engagements",
    "media_views",
    "link_clicks",
];

const GRANULARITIES: [&str; 4] = ["hourly", "daily", "weekly", "total"];

static TIMESTAMP_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid timestamp regex")
});

/// One id or a batch of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsRequest {
    pub post_ids: Option<OneOrMany>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub granularity: Option<String>,
    pub fields: Option<Vec<String>>,
}

/// Validated analytics query forwarded to the provider
#[derive(Debug, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub ids: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub granularity: String,
    pub fields: Vec<String>,
}

pub(crate) fn validate_request(req: &AnalyticsRequest) -> Result<AnalyticsQuery> {
    let raw_ids = match &req.post_ids {
        Some(OneOrMany::One(id)) => vec![id.clone()],
        Some(OneOrMany::Many(ids)) if !ids.is_empty() => ids.clone(),
        _ => {
            return Err(AppError::BadRequest(
                "`post_ids` (string | string[]) is required".to_string(),
            ))
        }
    };

    let (start_time, end_time) = match (&req.start_time, &req.end_time) {
        (Some(start), Some(end)) => (start.clone(), end.clone()),
        _ => {
            return Err(AppError::BadRequest(
                "Both `start_time` and `end_time` are required (YYYY-MM-DDTHH:mm:ssZ format)"
                    .to_string(),
            ))
        }
    };

    if !TIMESTAMP_FORMAT.is_match(&start_time) || !TIMESTAMP_FORMAT.is_match(&end_time) {
        return Err(AppError::BadRequest(
            "Invalid timestamp format. Use YYYY-MM-DDTHH:mm:ssZ format".to_string(),
        ));
    }

    let ids: Vec<String> = raw_ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .take(MAX_IDS_PER_REQUEST)
        .collect();

    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "At least one valid post id is required".to_string(),
        ));
    }

    let granularity = req
        .granularity
        .clone()
        .unwrap_or_else(|| "total".to_string());
    if !GRANULARITIES.contains(&granularity.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Invalid granularity '{}' (expected {})",
            granularity,
            GRANULARITIES.join(", ")
        )));
    }

    let fields: Vec<String> = match &req.fields {
        Some(fields) if !fields.is_empty() => fields.clone(),
        _ => DEFAULT_ANALYTICS_FIELDS
            .iter()
            .map(|field| field.to_string())
            .collect(),
    };

    let invalid: Vec<&str> = fields
        .iter()
        .map(String::as_str)
        .filter(|field| !AVAILABLE_ANALYTICS_FIELDS.contains(field))
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Invalid analytics fields: {}. Available fields: {}",
            invalid.join(", "),
            AVAILABLE_ANALYTICS_FIELDS.join(", ")
        )));
    }

    Ok(AnalyticsQuery {
        ids,
        start_time,
        end_time,
        granularity,
        fields,
    })
}

/// Fetch analytics for a batch of network post ids
pub async fn fetch_analytics(
    session: Session,
    config: web::Data<Config>,
    network: web::Data<NetworkClient>,
    req: web::Json<AnalyticsRequest>,
) -> Result<HttpResponse> {
    let query = validate_request(&req)?;

    let mut tokens = session.tokens.clone();
    let analytics = network
        .fetch_analytics(
            &mut tokens,
            &query.ids,
            &query.start_time,
            &query.end_time,
            &query.granularity,
            &query.fields,
        )
        .await?;

    let mut response = HttpResponse::Ok();
    if let Some(cookie) = session::reissued_cookie(&session, &tokens, &config.session)? {
        response.cookie(cookie);
    }

    Ok(response.json(json!({
        "analytics": analytics,
        "metadata": {
            "post_count": query.ids.len(),
            "time_range": {
                "start_time": query.start_time,
                "end_time": query.end_time,
            },
            "granularity": query.granularity,
            "fields": query.fields,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> AnalyticsRequest {
        AnalyticsRequest {
            post_ids: Some(OneOrMany::Many(vec!["111".to_string(), "222".to_string()])),
            start_time: Some("2026-08-01T00:00:00Z".to_string()),
            end_time: Some("2026-08-02T00:00:00Z".to_string()),
            granularity: None,
            fields: None,
        }
    }

    #[test]
    fn test_valid_request_gets_defaults() {
        let query = validate_request(&base_request()).unwrap();
        assert_eq!(query.ids, vec!["111", "222"]);
        assert_eq!(query.granularity, "total");
        assert_eq!(query.fields.len(), DEFAULT_ANALYTICS_FIELDS.len());
        assert!(query.fields.iter().any(|field| field == "impressions"));
    }

    #[test]
    fn test_single_id_is_accepted() {
        let mut req = base_request();
        req.post_ids = Some(OneOrMany::One("999".to_string()));
        let query = validate_request(&req).unwrap();
        assert_eq!(query.ids, vec!["999"]);
    }

    #[test]
    fn test_missing_ids_rejected() {
        let mut req = base_request();
        req.post_ids = None;
        assert!(validate_request(&req).is_err());

        req.post_ids = Some(OneOrMany::Many(vec![]));
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_batch_truncated_to_one_hundred() {
        let mut req = base_request();
        req.post_ids = Some(OneOrMany::Many(
            (0..150).map(|n| n.to_string()).collect(),
        ));
        let query = validate_request(&req).unwrap();
        assert_eq!(query.ids.len(), 100);
    }

    #[test]
    fn test_bad_timestamp_format_rejected() {
        let mut req = base_request();
        req.start_time = Some("2026-08-01".to_string());
        assert!(validate_request(&req).is_err());

        let mut req = base_request();
        req.end_time = Some("2026-08-02T00:00:00+02:00".to_string());
        assert!(validate_request(&req).is_err());

        let mut req = base_request();
        req.start_time = None;
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_unknown_fields_rejected_with_allow_list() {
        let mut req = base_request();
        req.fields = Some(vec!["likes".to_string(), "vibes".to_string()]);
        let err = validate_request(&req).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("vibes"));
        assert!(message.contains("impressions"));
    }

    #[test]
    fn test_unknown_granularity_rejected() {
        let mut req = base_request();
        req.granularity = Some("monthly".to_string());
        assert!(validate_request(&req).is_err());
    }
}
