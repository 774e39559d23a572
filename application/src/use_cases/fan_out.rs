//! Fan-out executor
//!
//! Runs one gateway call per request concurrently and joins them back into
//! request order.

use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use council_domain::{CallFailure, CallResult, Model, Stage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One prompt addressed to one model
#[derive(Debug, Clone)]
pub struct FanOutRequest {
    pub model: Model,
    pub prompt: String,
}

impl FanOutRequest {
    pub fn new(model: Model, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }
}

/// Concurrent executor for a batch of gateway calls
///
/// Every call gets its own deadline. A slow or failing call never holds up
/// or cancels the others; the batch finishes when the last call has either
/// returned or run out its own deadline.
pub struct FanOutExecutor<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    deadline: Duration,
    verbose: bool,
}

impl<G: LlmGateway + 'static> FanOutExecutor<G> {
    pub fn new(gateway: Arc<G>, deadline: Duration) -> Self {
        Self {
            gateway,
            deadline,
            verbose: false,
        }
    }

    /// Echo prompts and replies through [`ProgressNotifier::on_prompt`] and
    /// [`ProgressNotifier::on_response`]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Send the same prompt to every participant.
    pub async fn broadcast(
        &self,
        stage: Stage,
        participants: &[Model],
        prompt: &str,
        progress: &dyn ProgressNotifier,
    ) -> Vec<CallResult> {
        let requests = participants
            .iter()
            .map(|model| FanOutRequest::new(model.clone(), prompt))
            .collect();
        self.run(stage, requests, progress).await
    }

    /// Run every request and return exactly one result per request.
    ///
    /// Slot `i` of the output always belongs to request `i`, whatever order
    /// the calls complete in. `on_call_complete` fires in completion order.
    pub async fn run(
        &self,
        stage: Stage,
        requests: Vec<FanOutRequest>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<CallResult> {
        let started = Instant::now();
        let models: Vec<Model> = requests.iter().map(|r| r.model.clone()).collect();
        let mut slots: Vec<Option<CallResult>> = vec![None; requests.len()];
        let mut join_set = JoinSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            if self.verbose {
                progress.on_prompt(stage, &request.model, &request.prompt);
            }

            let gateway = Arc::clone(&self.gateway);
            let deadline = self.deadline;
            join_set.spawn(async move {
                let result = gateway
                    .invoke(&request.model, &request.prompt, deadline)
                    .await;
                (index, result)
            });
        }

        let mut lost = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    match result.failure() {
                        None => debug!(
                            "{}: {} responded in {:.2}s",
                            stage.as_str(),
                            result.model(),
                            result.elapsed().as_secs_f64()
                        ),
                        Some(failure) => warn!(
                            "{}: {} failed: {}",
                            stage.as_str(),
                            result.model(),
                            failure
                        ),
                    }
                    progress.on_call_complete(
                        stage,
                        result.model(),
                        result.elapsed(),
                        result.failure(),
                    );
                    if self.verbose && result.is_success() {
                        progress.on_response(stage, result.model(), result.content());
                    }
                    slots[index] = Some(result);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                    lost.push(e.to_string());
                }
            }
        }

        // A task that panicked or was cancelled left its slot empty.
        let reason = if lost.is_empty() {
            "task ended without a result".to_string()
        } else {
            lost.join("; ")
        };
        slots
            .into_iter()
            .zip(models)
            .map(|(slot, model)| {
                slot.unwrap_or_else(|| {
                    let failure = CallFailure::Aborted(reason.clone());
                    let elapsed = started.elapsed();
                    progress.on_call_complete(stage, &model, elapsed, Some(&failure));
                    CallResult::failed(model, failure, elapsed)
                })
            })
            .collect()
    }
}
