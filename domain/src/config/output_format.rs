//! Output format value object

use serde::{Deserialize, Serialize};

/// How a council result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage plus the execution summary (default)
    #[default]
    Full,
    /// Only the final synthesized answer
    Synthesis,
    /// The whole result as JSON
    Json,
}
