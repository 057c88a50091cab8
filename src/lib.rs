pub mod client;
pub mod config;
pub mod error;
pub mod rest;
pub mod store;

use std::sync::Arc;

use config::ServerConfig;
use store::TaskStore;

/// Shared application state passed to every HTTP handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub store: Arc<TaskStore>,
    pub started_at: std::time::Instant,
}
