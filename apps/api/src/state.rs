use std::sync::Arc;

use crate::config::Config;
use crate::email::Mailer;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat model behind a trait object so tests can stub the generations.
    pub llm: Arc<dyn ChatModel>,
    pub mailer: Mailer,
    pub config: Config,
}
