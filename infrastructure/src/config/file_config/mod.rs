//! Raw TOML configuration data types
//!
//! These structs mirror the config file exactly. Model names stay strings
//! until parsed so every problem can be reported, not just the first.

mod council;
mod output;

pub use council::FileCouncilConfig;
pub use output::FileOutputConfig;

use council_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Participants, aggregator and timeout
    pub council: FileCouncilConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.council.parse_models().1);
        issues.extend(self.council.parse_aggregator().1);
        issues.extend(self.council.parse_timeout().1);
        issues
    }
}
