//! Council configuration from TOML (`[council]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw council configuration from TOML
///
/// # Example
///
/// ```toml
/// [council]
/// models = ["claude-sonnet-4.5", "gpt-5.2", "gemini-3-pro-preview"]
/// aggregator = "gpt-4.1"
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Participant model names, in display order
    pub models: Option<Vec<String>>,
    /// Model that writes the final synthesis
    pub aggregator: Option<String>,
    /// Per-call deadline in seconds
    pub timeout_secs: Option<u64>,
}

impl FileCouncilConfig {
    /// Parse participants, collecting issues for empty and duplicate names.
    pub fn parse_models(&self) -> (Option<Vec<Model>>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let Some(names) = self.models.as_ref() else {
            return (None, issues);
        };

        if names.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoParticipants,
                "council.models: at least one model is required",
            ));
        }

        let mut models: Vec<Model> = Vec::new();
        for name in names {
            if name.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "models".to_string(),
                    },
                    "council.models: model name cannot be empty in list",
                ));
                continue;
            }
            let model = Model::from(name.as_str());
            if models.contains(&model) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateParticipant {
                        model: model.to_string(),
                    },
                    format!("council.models: '{}' is listed more than once", model),
                ));
            }
            models.push(model);
        }

        (Some(models), issues)
    }

    /// Parse the aggregator, collecting an issue for an empty name.
    pub fn parse_aggregator(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        match self.aggregator.as_deref() {
            None => (None, Vec::new()),
            Some(name) if name.trim().is_empty() => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "aggregator".to_string(),
                    },
                    "council.aggregator: model name cannot be empty",
                )],
            ),
            Some(name) => (Some(Model::from(name)), Vec::new()),
        }
    }

    /// Parse the timeout, rejecting zero.
    pub fn parse_timeout(&self) -> (Option<Duration>, Vec<ConfigIssue>) {
        match self.timeout_secs {
            None => (None, Vec::new()),
            Some(0) => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout,
                    "council.timeout_secs cannot be 0",
                )],
            ),
            Some(secs) => (Some(Duration::from_secs(secs)), Vec::new()),
        }
    }
}
