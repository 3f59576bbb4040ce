pub mod http;

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::config::WidgetConfig;
use crate::errors::BackendError;
use crate::models::escalation::{EmailPreview, EscalationRequest};

pub use self::http::HttpBackend;

pub const CHAT_ROUTE: &str = "api/chat";
pub const ESCALATE_ROUTE: &str = "api/escalate";
pub const HEALTH_ROUTE: &str = "health";
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// The RAG helpdesk service the widget talks to.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Asks a question and returns the generated answer.
    async fn chat(&self, query: &str) -> Result<String, BackendError>;

    /// Requests a helpdesk email draft for an unresolved question. Nothing is sent.
    async fn escalate(&self, request: &EscalationRequest) -> Result<EmailPreview, BackendError>;

    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

pub fn new_backend(config: &WidgetConfig) -> Result<Arc<dyn RagBackend>, BackendError> {
    let backend = HttpBackend::new(config.base_url.clone())?;
    Ok(Arc::new(backend))
}

/// Startup health check. Only logs; gives up after `limit` so a silent
/// backend cannot hold the session back.
pub async fn check_health(backend: &dyn RagBackend, limit: Duration) -> bool {
    match tokio::time::timeout(limit, backend.health()).await {
        Ok(Ok(())) => {
            info!("Backend is healthy");
            true
        }
        Ok(Err(e)) => {
            warn!(
                "Backend did not pass the health check: {}. Questions will fail until it is reachable.",
                e
            );
            false
        }
        Err(_) => {
            warn!(
                "Backend health check timed out after {} ms; continuing without it.",
                limit.as_millis()
            );
            false
        }
    }
}
