//! Council value objects - immutable records produced by each stage.
//!
//! - [`CallResult`] - one participant's answer (or failure) for one call
//! - [`RankAssertion`] - one de-anonymized ranking claim from a review
//! - [`ReviewOutcome`] - one reviewer's parsed rankings
//! - [`PipelineResult`] - everything a run produced, successful or not
//!
//! Failures at the call level are data ([`CallFailure`]), never errors
//! returned to the caller. Only [`PipelineFailure`] marks a run as failed,
//! and even then the partial data travels with it.

use crate::core::model::Model;
use crate::council::entities::PipelineState;
use crate::util::duration_ms;
use serde::{Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

/// Why a single gateway call produced no usable text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    #[error("timeout waiting for response after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Gateway(String),

    #[error("worker task aborted: {0}")]
    Aborted(String),
}

impl CallFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CallFailure::Timeout(_))
    }
}

impl Serialize for CallFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Outcome of one call to one participant
///
/// Created once per participant per stage and never mutated afterwards.
/// A failed result always has empty content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    model: Model,
    content: String,
    #[serde(rename = "elapsed_ms", with = "duration_ms")]
    elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<CallFailure>,
}

impl CallResult {
    /// A call that returned text (which may still be empty)
    pub fn success(model: Model, content: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            model,
            content: content.into(),
            elapsed,
            failure: None,
        }
    }

    /// A call that errored or ran past its deadline
    pub fn failed(model: Model, failure: CallFailure, elapsed: Duration) -> Self {
        Self {
            model,
            content: String::new(),
            elapsed,
            failure: Some(failure),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn failure(&self) -> Option<&CallFailure> {
        self.failure.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Succeeded with non-empty text, i.e. eligible for review and synthesis
    pub fn is_usable(&self) -> bool {
        self.failure.is_none() && !self.content.trim().is_empty()
    }
}

/// A reviewer's claim that a participant's answer holds a given rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankAssertion {
    /// Label the reviewer saw (e.g. `'A'` for "Response A")
    pub label: char,
    /// Index of the ranked answer in the Stage 1 results
    pub participant: usize,
    /// 1 = best
    pub rank: u32,
    pub justification: String,
}

/// One reviewer's contribution to Stage 2
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub reviewer: Model,
    pub rankings: Vec<RankAssertion>,
    /// Raw review text, kept for display
    pub content: String,
    #[serde(rename = "elapsed_ms", with = "duration_ms")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CallFailure>,
}

impl ReviewOutcome {
    /// Build an outcome from the reviewer's call and its resolved rankings
    pub fn from_call(call: CallResult, rankings: Vec<RankAssertion>) -> Self {
        let CallResult {
            model,
            content,
            elapsed,
            failure,
        } = call;
        Self {
            reviewer: model,
            rankings,
            content,
            elapsed,
            failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    #[serde(rename = "initial_ms", with = "duration_ms")]
    pub initial: Duration,
    #[serde(rename = "review_ms", with = "duration_ms")]
    pub review: Duration,
    #[serde(rename = "synthesis_ms", with = "duration_ms")]
    pub synthesis: Duration,
    #[serde(rename = "total_ms", with = "duration_ms")]
    pub total: Duration,
}

/// Terminal failure of a whole pipeline run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineFailure {
    #[error("all models failed to respond")]
    AllFailed,

    #[error("aggregation by {aggregator} failed: {failure}")]
    AggregationFailed {
        aggregator: Model,
        failure: CallFailure,
    },
}

impl Serialize for PipelineFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Complete result of one council run
///
/// Always returned, even when the run failed, so callers can show whatever
/// succeeded alongside [`failure`](Self::failure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub question: String,
    pub participants: Vec<Model>,
    pub aggregator: Model,
    pub state: PipelineState,
    /// Stage 1: exactly one entry per participant, in participant order
    pub responses: Vec<CallResult>,
    /// Stage 2: one entry per usable Stage 1 answer, empty when skipped
    pub reviews: Vec<ReviewOutcome>,
    /// Stage 3 text, present only when the state is `Done`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<String>,
    pub timings: StageTimings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<PipelineFailure>,
}

impl PipelineResult {
    /// Returns an iterator over the responses usable for review and synthesis.
    pub fn successful_responses(&self) -> impl Iterator<Item = &CallResult> {
        self.responses.iter().filter(|r| r.is_usable())
    }

    /// Returns an iterator over the responses that failed or came back empty.
    pub fn failed_responses(&self) -> impl Iterator<Item = &CallResult> {
        self.responses.iter().filter(|r| !r.is_usable())
    }

    pub fn successful_reviews(&self) -> impl Iterator<Item = &ReviewOutcome> {
        self.reviews.iter().filter(|r| r.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.state == PipelineState::Done
    }

    /// Model name behind a Stage 1 index, for rendering rank assertions
    pub fn participant_name(&self, index: usize) -> Option<&Model> {
        self.responses.get(index).map(|r| r.model())
    }
}
