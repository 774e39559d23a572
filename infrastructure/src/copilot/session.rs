//! Copilot session management.
//!
//! [`CopilotSession`] implements [`LlmSession`] for one model. Each council
//! call creates its own session, so a session only ever carries one prompt.

use crate::copilot::error::Result;
use crate::copilot::protocol::{CreateSessionParams, JsonRpcRequest, SendParams};
use crate::copilot::router::{MessageRouter, SessionChannel};
use async_trait::async_trait;
use council_application::ports::llm_gateway::{GatewayError, LlmSession};
use council_domain::Model;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// An active conversation with one Copilot model.
pub struct CopilotSession {
    router: Arc<MessageRouter>,
    channel: Mutex<SessionChannel>,
    session_id: String,
    model: Model,
}

impl CopilotSession {
    /// Create a new session with the specified model
    pub async fn new(router: Arc<MessageRouter>, model: Model) -> Result<Self> {
        debug!("Creating session with model: {}", model);
        let channel = router
            .create_session(CreateSessionParams {
                model: model.to_string(),
                streaming: true,
            })
            .await?;
        let session_id = channel.session_id().to_string();

        Ok(Self {
            router,
            channel: Mutex::new(channel),
            session_id,
            model,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a prompt and wait for the complete reply.
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending to session {} ({} bytes)",
            self.session_id,
            prompt.len()
        );
        let params = SendParams {
            session_id: self.session_id.clone(),
            prompt: Some(prompt.to_string()),
        };
        let request = JsonRpcRequest::new("session.send", Some(serde_json::to_value(&params)?));

        let mut channel = self.channel.lock().await;
        self.router.request(&request).await?;
        channel.read_reply().await
    }
}

impl Drop for CopilotSession {
    /// Best-effort `session.destroy` so the CLI can free the session. The
    /// route itself is removed when the channel drops.
    fn drop(&mut self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let request = JsonRpcRequest::destroy_session(&self.session_id);
        let router = Arc::clone(&self.router);
        handle.spawn(async move {
            if let Err(e) = router.send_request(&request).await {
                debug!("session.destroy failed: {}", e);
            }
        });
    }
}

#[async_trait]
impl LlmSession for CopilotSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> std::result::Result<String, GatewayError> {
        self.ask(content)
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))
    }
}
