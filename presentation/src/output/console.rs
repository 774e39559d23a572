//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::core::string::truncate;
use council_domain::{CallResult, PipelineFailure, PipelineResult, ReviewOutcome};
use std::fmt::Write;
use std::time::Duration;

/// Inner width of the report boxes
const BOX_WIDTH: usize = 56;

/// Width of the value column in the error box
const ERROR_VALUE_WIDTH: usize = 42;

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result: answers, peer reviews, final answer and
    /// execution summary
    pub fn format(result: &PipelineResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::banner());
        let _ = writeln!(output, "{} {}", "Question:".cyan().bold(), result.question);
        let _ = writeln!(
            output,
            "{} {}",
            "Models:".cyan().bold(),
            Self::model_list(result)
        );

        output.push_str(&Self::boxed_title("INITIAL RESPONSES"));
        for response in &result.responses {
            output.push_str(&Self::model_answer(response));
        }

        if !result.reviews.is_empty() {
            output.push_str(&Self::peer_reviews(result));
        }

        match (&result.aggregated, &result.failure) {
            (Some(answer), _) => {
                output.push_str(&Self::boxed_title("FINAL ANSWER"));
                let _ = writeln!(output, "\n{}\n", answer);
            }
            (None, Some(failure)) => output.push_str(&Self::pipeline_failure(result, failure)),
            (None, None) => {}
        }

        output.push_str(&Self::summary(result));
        output
    }

    /// Format as JSON
    pub fn format_json(result: &PipelineResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only
    pub fn format_synthesis_only(result: &PipelineResult) -> String {
        match (&result.aggregated, &result.failure) {
            (Some(answer), _) => format!("{}\n", answer),
            (None, Some(failure)) => format!("{} {}\n", "✗ Error:".red().bold(), failure),
            (None, None) => String::new(),
        }
    }

    /// A hint for a failure message, if one applies
    pub fn suggestion(message: &str) -> Option<&'static str> {
        if message.contains("timeout") {
            Some("Try --timeout 120")
        } else if message.contains("failed to create session") {
            Some("Check Copilot CLI is installed")
        } else {
            None
        }
    }

    fn banner() -> String {
        let rule = "═".repeat(BOX_WIDTH);
        format!(
            "{}\n{}\n{}\n\n",
            format!("╔{}╗", rule).cyan().bold(),
            format!("║{:^width$}║", "Council - AI Model Council", width = BOX_WIDTH)
                .cyan()
                .bold(),
            format!("╚{}╝", rule).cyan().bold()
        )
    }

    fn boxed_title(title: &str) -> String {
        let rule = "═".repeat(BOX_WIDTH);
        format!(
            "\n╔{}╗\n{}\n╚{}╝\n",
            rule,
            format!("║ {:<width$} ║", title, width = BOX_WIDTH - 2)
                .cyan()
                .bold(),
            rule
        )
    }

    fn model_list(result: &PipelineResult) -> String {
        let names: Vec<&str> = result.participants.iter().map(|m| m.as_str()).collect();
        format!("{} (aggregator: {})", names.join(", "), result.aggregator)
    }

    fn model_answer(response: &CallResult) -> String {
        let heading = format!(
            "── {} ({:.2}s) ──",
            response.model(),
            response.elapsed().as_secs_f64()
        );
        match response.failure() {
            None if response.is_usable() => {
                format!("\n{}\n{}\n", heading.green().bold(), response.content())
            }
            None => format!(
                "\n{}\n{}\n",
                heading.yellow().bold(),
                "(empty response)".dimmed()
            ),
            Some(failure) => format!(
                "\n{}\n{}",
                heading.red().bold(),
                Self::error_box(
                    response.model().as_str(),
                    &failure.to_string(),
                    response.elapsed()
                )
            ),
        }
    }

    /// Fixed-width error report with an optional suggestion row
    pub fn error_box(model: &str, issue: &str, elapsed: Duration) -> String {
        let rule = "═".repeat(BOX_WIDTH);
        let row = |label: &str, value: &str| {
            format!(
                "║ {:<12}{:<width$} ║\n",
                label,
                truncate(value, ERROR_VALUE_WIDTH),
                width = ERROR_VALUE_WIDTH
            )
        };

        let mut out = format!("╔{}╗\n", rule);
        let _ = writeln!(
            out,
            "{}",
            format!("║ {:<width$} ║", "ERROR", width = BOX_WIDTH - 2).red()
        );
        let _ = writeln!(out, "╠{}╣", rule);
        out.push_str(&row("Model:", model));
        out.push_str(&row("Issue:", issue));
        out.push_str(&row(
            "Duration:",
            &format!("{:.2}s", elapsed.as_secs_f64()),
        ));
        if let Some(suggestion) = Self::suggestion(issue) {
            out.push_str(&row("Suggestion:", suggestion));
        }
        let _ = writeln!(out, "╚{}╝", rule);
        out
    }

    fn peer_reviews(result: &PipelineResult) -> String {
        let mut out = Self::boxed_title("PEER REVIEW RESULTS");
        for review in &result.reviews {
            out.push_str(&Self::review(result, review));
        }
        out
    }

    fn review(result: &PipelineResult, review: &ReviewOutcome) -> String {
        let mut out = format!(
            "\n{}\n",
            format!("{}'s evaluation:", review.reviewer).green().bold()
        );
        if let Some(failure) = &review.failure {
            let _ = writeln!(out, "  {}", format!("Error: {}", failure).red());
        } else if review.rankings.is_empty() {
            let _ = writeln!(out, "  {}", "(No structured rankings extracted)".dimmed());
        } else {
            for assertion in &review.rankings {
                let name = result
                    .participant_name(assertion.participant)
                    .map(|m| m.as_str())
                    .unwrap_or("unknown");
                let _ = writeln!(
                    out,
                    "  Rank {}: {} - {}",
                    assertion.rank, name, assertion.justification
                );
            }
        }
        out
    }

    fn pipeline_failure(result: &PipelineResult, failure: &PipelineFailure) -> String {
        match failure {
            PipelineFailure::AllFailed => {
                format!("\n{} {}\n", "✗ Error:".red().bold(), failure)
            }
            PipelineFailure::AggregationFailed {
                aggregator,
                failure: cause,
            } => format!(
                "\n{} {}\n{}",
                "✗ Error:".red().bold(),
                failure,
                Self::error_box(aggregator.as_str(), &cause.to_string(), result.timings.synthesis)
            ),
        }
    }

    /// Execution summary: per-stage success counts and timings
    pub fn summary(result: &PipelineResult) -> String {
        let rule = "═".repeat(BOX_WIDTH);
        let blank = format!("║{:width$}║\n", "", width = BOX_WIDTH);
        let title = |t: &str| {
            format!("{}\n", format!("║ {:<width$} ║", t, width = BOX_WIDTH - 2).cyan().bold())
        };
        let row = |label: &str, value: String| {
            format!("║   {:<19}{:<width$} ║\n", label, value, width = BOX_WIDTH - 23)
        };
        let secs = |d: Duration| format!("{:.2}s", d.as_secs_f64());

        let mut out = format!("\n╔{}╗\n", rule);
        out.push_str(&title("EXECUTION SUMMARY"));
        let _ = writeln!(out, "╠{}╣", rule);

        let total = result.responses.len();
        let succeeded: Vec<&CallResult> =
            result.responses.iter().filter(|r| r.is_success()).collect();
        out.push_str(&blank);
        out.push_str(&title("Stage 1: Initial Responses"));
        let queried = row(
            "Models queried:",
            format!("{}/{} successful", succeeded.len(), total),
        );
        if succeeded.len() == total {
            out.push_str(&queried.green().to_string());
        } else {
            out.push_str(&queried.yellow().to_string());
        }
        let fastest = succeeded.iter().min_by_key(|r| r.elapsed());
        let slowest = succeeded.iter().max_by_key(|r| r.elapsed());
        if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
            out.push_str(&row(
                "Fastest:",
                format!("{} ({})", fastest.model(), secs(fastest.elapsed())),
            ));
            out.push_str(&row(
                "Slowest:",
                format!("{} ({})", slowest.model(), secs(slowest.elapsed())),
            ));
        }
        out.push_str(&row("Phase time:", secs(result.timings.initial)));

        if !result.reviews.is_empty() {
            out.push_str(&blank);
            out.push_str(&title("Stage 2: Peer Review"));
            out.push_str(&row(
                "Reviews completed:",
                format!(
                    "{}/{} successful",
                    result.successful_reviews().count(),
                    result.reviews.len()
                ),
            ));
            out.push_str(&row("Phase time:", secs(result.timings.review)));
        }

        if !result.timings.synthesis.is_zero() {
            out.push_str(&blank);
            out.push_str(&title("Stage 3: Final Synthesis"));
            out.push_str(&row("Phase time:", secs(result.timings.synthesis)));
        }

        out.push_str(&blank);
        let _ = writeln!(out, "╠{}╣", rule);
        let _ = writeln!(
            out,
            "║ {:<22}{:<width$} ║",
            "Total execution time:",
            secs(result.timings.total),
            width = BOX_WIDTH - 24
        );
        let _ = writeln!(out, "╚{}╝", rule);
        out
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &PipelineResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &PipelineResult) -> String {
        Self::format_json(result)
    }

    fn format_synthesis_only(&self, result: &PipelineResult) -> String {
        Self::format_synthesis_only(result)
    }
}
