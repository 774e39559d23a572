//! Label-masking of peer answers for the review stage.
//!
//! Each reviewer gets its own freshly built list of [`AnonymizedEntry`]s.
//! The list is the only link from a label back to a participant, so it must
//! stay scoped to that reviewer: labels are reused across reviewers and only
//! mean something together with the list they were issued from.

use crate::council::value_objects::CallResult;

/// Labels available for anonymized answers. Answers beyond this are dropped.
pub const LABEL_ALPHABET: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// One answer as a reviewer sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonymizedEntry {
    pub label: char,
    /// Index of the answer in the Stage 1 results
    pub source: usize,
}

impl AnonymizedEntry {
    /// Heading used for this entry in the review prompt, e.g. `Response A`
    pub fn heading(&self) -> String {
        response_heading(self.label)
    }
}

/// `Response <label>`; the review extractor scans for exactly this form
pub fn response_heading(label: char) -> String {
    format!("Response {}", label)
}

/// Label every usable answer except the reviewer's own.
///
/// Labels are assigned sequentially in Stage 1 order, so the mapping depends
/// only on which answers are usable, never on completion timing.
pub fn anonymize(results: &[CallResult], exclude_index: usize) -> Vec<AnonymizedEntry> {
    results
        .iter()
        .enumerate()
        .filter(|(index, result)| *index != exclude_index && result.is_usable())
        .zip(LABEL_ALPHABET)
        .map(|((source, _), label)| AnonymizedEntry { label, source })
        .collect()
}
