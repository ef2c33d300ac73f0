/// Marketeer Service Library
///
/// Backend for the marketeer assistant: signs users in against the social
/// network via OAuth, stores product profiles, generates marketing posts
/// through a completion provider, and republishes them through the network's
/// API while tracking engagement analytics.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for users, profiles, and content items
/// - `services`: Business logic layer (sessions, prompt building and parsing)
/// - `clients`: Outbound provider clients (social network, completion API)
/// - `db`: Database access layer and repositories
/// - `middleware`: HTTP middleware for session authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
