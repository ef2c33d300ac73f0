/// Observability and metrics collection
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Outbound provider calls segmented by provider and outcome.
pub static PROVIDER_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketeer_provider_calls_total",
        "Outbound provider calls segmented by provider and outcome",
        &["provider", "outcome"]
    )
    .expect("failed to register marketeer_provider_calls_total")
});

/// One-shot token refresh attempts by outcome (success/failure).
pub static TOKEN_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketeer_token_refreshes_total",
        "Provider token refresh attempts segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register marketeer_token_refreshes_total")
});

/// Posts produced by the generation service.
pub static GENERATED_POSTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "marketeer_generated_posts_total",
        "Posts produced by the generation service"
    )
    .expect("failed to register marketeer_generated_posts_total")
});

/// Posts successfully published to the network.
pub static PUBLISHED_POSTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "marketeer_published_posts_total",
        "Posts successfully published to the network"
    )
    .expect("failed to register marketeer_published_posts_total")
});

/// Serve the default registry in Prometheus text format
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
