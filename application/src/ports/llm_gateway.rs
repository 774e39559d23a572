//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use council_domain::{CallFailure, CallResult, Model};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer and must accept
/// concurrent calls from many tasks without external locking.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new session with the specified model
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError>;

    /// Run one prompt against one model under its own deadline.
    ///
    /// Never fails: errors and timeouts come back as a failed [`CallResult`]
    /// with empty text. The deadline covers session creation and the reply.
    async fn invoke(&self, model: &Model, prompt: &str, deadline: Duration) -> CallResult {
        let started = Instant::now();
        let outcome = tokio::time::timeout(deadline, async {
            let session = self.create_session(model).await?;
            session.send(prompt).await
        })
        .await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Ok(content)) => CallResult::success(model.clone(), content, elapsed),
            Ok(Err(e)) => {
                CallResult::failed(model.clone(), CallFailure::Gateway(e.to_string()), elapsed)
            }
            Err(_) => CallResult::failed(model.clone(), CallFailure::Timeout(deadline), elapsed),
        }
    }
}

/// An active LLM session
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &Model;

    /// Send a message and get a response
    async fn send(&self, content: &str) -> Result<String, GatewayError>;
}
