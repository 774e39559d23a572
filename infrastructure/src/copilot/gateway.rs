//! Copilot LLM Gateway implementation

use crate::copilot::error::CopilotError;
use crate::copilot::router::MessageRouter;
use crate::copilot::session::CopilotSession;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use council_domain::Model;
use std::sync::Arc;
use tracing::info;

/// Default executable name of the GitHub Copilot CLI
pub const DEFAULT_COPILOT_COMMAND: &str = "copilot";

/// LLM Gateway implementation for GitHub Copilot CLI
///
/// One CLI process serves every session; the gateway can be shared across
/// tasks as `Arc<CopilotLlmGateway>`.
pub struct CopilotLlmGateway {
    router: Arc<MessageRouter>,
}

impl CopilotLlmGateway {
    /// Create a new gateway by spawning the Copilot CLI
    pub async fn new() -> Result<Self, GatewayError> {
        Self::with_command(DEFAULT_COPILOT_COMMAND).await
    }

    /// Create a gateway with a custom command
    pub async fn with_command(cmd: &str) -> Result<Self, GatewayError> {
        let router = MessageRouter::spawn(cmd)
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        info!("CopilotLlmGateway initialized");
        Ok(Self { router })
    }

    /// Create a gateway over an existing router
    pub fn with_router(router: Arc<MessageRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl LlmGateway for CopilotLlmGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        let session = CopilotSession::new(Arc::clone(&self.router), model.clone())
            .await
            .map_err(|e| match e {
                CopilotError::RouterStopped => GatewayError::TransportClosed,
                other => GatewayError::SessionError(format!(
                    "failed to create session for {}: {}",
                    model, other
                )),
            })?;

        Ok(Box::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copilot::router::tests::{FakeCli, fake_cli};
    use council_domain::CallFailure;
    use std::time::Duration;

    #[tokio::test]
    async fn invoke_through_fake_cli() {
        let port = fake_cli().await;
        let router = MessageRouter::connect(port, None).await.unwrap();
        let gateway = Arc::new(CopilotLlmGateway::with_router(router));

        let (a, b) = tokio::join!(
            gateway.invoke(&Model::Gpt41, "alpha question", Duration::from_secs(5)),
            gateway.invoke(&Model::Gpt52, "beta question", Duration::from_secs(5)),
        );

        assert_eq!(a.content(), "gpt-4.1: alpha question");
        assert_eq!(b.content(), "gpt-5.2: beta question");
        assert!(a.is_success() && b.is_success());
    }

    /// A creation abandoned at its deadline must not hand its late session
    /// to the next caller, and the abandoned session gets destroyed.
    #[tokio::test]
    async fn abandoned_creation_does_not_answer_for_the_next_model() {
        for id_in_response in [true, false] {
            let fake = FakeCli {
                delay_first_create: Duration::from_millis(300),
                id_in_response,
            }
            .start()
            .await;
            let router = MessageRouter::connect(fake.port, None).await.unwrap();
            let gateway = CopilotLlmGateway::with_router(router);

            let first = gateway
                .invoke(&Model::Gpt41, "q", Duration::from_millis(100))
                .await;
            assert!(first.failure().is_some_and(CallFailure::is_timeout));

            let second = gateway
                .invoke(&Model::Gpt52, "q", Duration::from_secs(5))
                .await;
            assert_eq!(second.content(), "gpt-5.2: q", "id_in_response={}", id_in_response);

            // Let the late start/response for s1 arrive, then create again
            tokio::time::sleep(Duration::from_millis(400)).await;
            let third = gateway
                .invoke(&Model::Gpt41, "again", Duration::from_secs(5))
                .await;
            assert_eq!(third.content(), "gpt-4.1: again", "id_in_response={}", id_in_response);

            let mut destroyed_s1 = false;
            for _ in 0..50 {
                if fake.destroyed.lock().unwrap().iter().any(|s| s == "s1") {
                    destroyed_s1 = true;
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(destroyed_s1, "id_in_response={}", id_in_response);
        }
    }

    #[tokio::test]
    async fn spawn_missing_binary_is_connection_error() {
        let result = CopilotLlmGateway::with_command("definitely-not-a-copilot-binary").await;
        assert!(matches!(result, Err(GatewayError::ConnectionError(_))));
    }
}
