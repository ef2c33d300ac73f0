/// Outbound provider clients
///
/// Both clients are constructed once at startup from `Config` and injected
/// into handlers via `web::Data`; no module-level client instances exist.
pub mod llm;
pub mod network;

pub use llm::{CompletionProvider, LlmClient};
pub use network::{NetworkClient, NetworkUser};
