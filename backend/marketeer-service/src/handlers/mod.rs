/// HTTP request handlers
pub mod analytics;
pub mod auth;
pub mod content;
pub mod generation;
pub mod network;
pub mod profile;
pub mod publish;

pub use analytics::fetch_analytics;
pub use auth::{callback, login, logout};
pub use content::{list_content, update_content};
pub use generation::generate;
pub use network::recent_posts;
pub use profile::{get_profile, save_profile};
pub use publish::publish;
