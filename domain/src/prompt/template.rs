//! Prompt templates for the council flow

use crate::council::anonymizer::AnonymizedEntry;
use crate::council::value_objects::{CallResult, ReviewOutcome};
use std::fmt::Write;

/// Templates for generating prompts at each stage
///
/// All functions are pure: the same inputs always produce byte-identical
/// prompts.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Stage 1 prompt: the question, verbatim
    pub fn initial_query(question: &str) -> String {
        question.to_string()
    }

    /// Stage 2 prompt for one reviewer.
    ///
    /// `entries` come from [`anonymize`](crate::council::anonymizer::anonymize)
    /// for this reviewer and index into `responses`. The closing
    /// `Ranking:` block is the format
    /// [`extract_rankings`](crate::council::ranking::extract_rankings)
    /// parses; change both together.
    pub fn review_prompt(
        question: &str,
        entries: &[AnonymizedEntry],
        responses: &[CallResult],
    ) -> String {
        let mut prompt = format!(
            r#"Original question: {}

The following responses were written by other experts. Their authors are hidden.
"#,
            question
        );

        for entry in entries {
            let content = responses
                .get(entry.source)
                .map(CallResult::content)
                .unwrap_or_default();
            let _ = write!(prompt, "\n--- {} ---\n{}\n", entry.heading(), content);
        }

        prompt.push_str(
            r#"
Evaluate each response on:
1. Accuracy: is it factually and technically correct?
2. Depth: does it cover the important aspects and trade-offs?
3. Usefulness: can the asker act on it?
4. Clarity: is it well organized and easy to follow?

Rank ALL of the responses from best to worst. End your review with a ranking
in exactly this format, one response per line:

Ranking:
1. Response X: one-sentence reasoning
2. Response Y: one-sentence reasoning"#,
        );

        prompt
    }

    /// Stage 3 prompt for the aggregator.
    ///
    /// Every Stage 1 answer is listed (failures as an error marker) and every
    /// review that produced at least one ranking is summarized by reviewer.
    pub fn aggregation_prompt(
        question: &str,
        responses: &[CallResult],
        reviews: &[ReviewOutcome],
    ) -> String {
        let mut prompt = format!(
            r#"Several AI models answered the same question: "{}"

"#,
            question
        );

        for response in responses {
            let _ = writeln!(prompt, "## Answer from {}", response.model());
            match response.failure() {
                Some(failure) => {
                    let _ = writeln!(prompt, "(error: {})\n", failure);
                }
                None => {
                    prompt.push_str(response.content());
                    prompt.push_str("\n\n");
                }
            }
        }

        let ranked: Vec<&ReviewOutcome> = reviews
            .iter()
            .filter(|r| r.is_success() && !r.rankings.is_empty())
            .collect();

        if !ranked.is_empty() {
            prompt.push_str("## Peer review rankings\n");
            for review in ranked {
                let _ = writeln!(prompt, "\n### Ranked by {}", review.reviewer);
                for assertion in &review.rankings {
                    let name = responses
                        .get(assertion.participant)
                        .map(|r| r.model().as_str())
                        .unwrap_or("unknown");
                    let _ = writeln!(
                        prompt,
                        "{}. {}: {}",
                        assertion.rank, name, assertion.justification
                    );
                }
            }
            prompt.push('\n');
        }

        prompt.push_str(
            r#"Using the answers and the peer rankings above, write the single best final answer:
1. Keep the points the answers agree on and that reviewers ranked highly
2. Where answers conflict, decide which is correct and say why, citing the evidence
3. Add any unique insight that holds up under the reviews
4. Drop anything the reviews showed to be wrong

Commit to one clear, decisive answer. Do not hedge between alternatives or
present a survey of opinions."#,
        );

        prompt
    }
}
