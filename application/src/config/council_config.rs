//! Council run configuration.
//!
//! [`CouncilConfig`] is the only input the orchestrator takes besides the
//! question. It is assembled by the caller (CLI flags over file config) and
//! checked with [`CouncilConfig::validate`] before a run is constructed.

use council_domain::{DomainError, Model};
use std::time::Duration;

/// Per-call deadline used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Participants, aggregator and deadline for one council run
#[derive(Debug, Clone, PartialEq)]
pub struct CouncilConfig {
    /// Models that answer in Stage 1 and review in Stage 2, in display order
    pub participants: Vec<Model>,
    /// Model that writes the Stage 3 synthesis
    pub aggregator: Model,
    /// Deadline applied to each call individually
    pub timeout: Duration,
    /// Echo prompts and raw replies through the progress notifier
    pub verbose: bool,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            participants: Model::default_models(),
            aggregator: Model::default_aggregator(),
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
        }
    }
}

impl CouncilConfig {
    pub fn new(participants: Vec<Model>, aggregator: Model) -> Self {
        Self {
            participants,
            aggregator,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Reject configurations a run cannot start with.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.participants.is_empty() {
            return Err(DomainError::NoModels);
        }
        if let Some(model) = self
            .participants
            .iter()
            .chain(std::iter::once(&self.aggregator))
            .find(|m| m.as_str().trim().is_empty())
        {
            return Err(DomainError::InvalidModel(model.to_string()));
        }
        if self.timeout.is_zero() {
            return Err(DomainError::ZeroTimeout);
        }
        Ok(())
    }
}
