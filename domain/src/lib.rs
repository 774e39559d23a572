//! Domain layer for copilot-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Council
//!
//! A council run asks several models the same question and turns their
//! answers into one:
//!
//! 1. **Initial**: every participant answers the question
//! 2. **Review**: each participant ranks the others' anonymized answers
//! 3. **Synthesis**: the aggregator writes one decisive final answer
//!
//! Everything here is synchronous and pure; the application layer owns the
//! concurrency.

pub mod config;
pub mod core;
pub mod council;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, model::Model, question::Question};
pub use council::{
    anonymizer::{AnonymizedEntry, LABEL_ALPHABET, anonymize},
    entities::{PipelineState, Stage},
    ranking::{LabelRanking, extract_rankings, resolve_rankings},
    value_objects::{
        CallFailure, CallResult, PipelineFailure, PipelineResult, RankAssertion, ReviewOutcome,
        StageTimings,
    },
};
pub use prompt::PromptTemplate;
