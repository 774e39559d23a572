//! Output formatter trait

use council_domain::PipelineResult;

/// Trait for formatting council results
pub trait OutputFormatter {
    /// Format the complete result
    fn format(&self, result: &PipelineResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &PipelineResult) -> String;

    /// Format the final answer only (concise output)
    fn format_synthesis_only(&self, result: &PipelineResult) -> String;
}
