//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are precondition failures raised before a pipeline starts. Anything
/// that goes wrong while the pipeline runs is recorded as data on the
/// [`PipelineResult`](crate::PipelineResult) instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("At least one participant model is required")]
    NoModels,

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Per-call timeout must be greater than zero")]
    ZeroTimeout,
}
