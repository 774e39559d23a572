//! Progress reporting for council runs
//!
//! Progress goes to stderr so `-o json` output on stdout stays clean.

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{CallFailure, Model, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

/// Whether animated spinners make sense on this terminal.
///
/// Off when stderr is not a terminal, `TERM=dumb`, or `CI=true`.
pub fn spinners_supported() -> bool {
    std::io::stderr().is_terminal()
        && !std::env::var("TERM").is_ok_and(|t| t == "dumb")
        && !std::env::var("CI").is_ok_and(|ci| ci == "true")
}

/// One finished call: `[✓] model   ⏱ 1.23s` or `[✗] model   ⏱ 1.23s  error`
pub fn call_line(model: &Model, elapsed: Duration, failure: Option<&CallFailure>) -> String {
    let base = format!("{:<25} ⏱ {:.2}s", model.as_str(), elapsed.as_secs_f64());
    match failure {
        None => format!("  {} {}", "[✓]".green(), base),
        Some(failure) => format!("  {} {}  {}", "[✗]".red(), base, failure.to_string().red()),
    }
}

fn stage_banner(stage: Stage) -> String {
    let title = match stage {
        Stage::Initial => "Querying models in parallel...",
        Stage::Review => "Conducting peer review...",
        Stage::Synthesis => "Synthesizing responses...",
    };
    format!("\n{} {}", "==>".cyan().bold(), title.cyan().bold())
}

fn stage_done(stage: Stage, elapsed: Duration) -> String {
    format!(
        "  {} {} complete ({:.2}s)\n",
        "[✓]".green(),
        stage.display_name(),
        elapsed.as_secs_f64()
    )
}

fn echo_block(heading: &str, model: &Model, text: &str, dim: bool) -> String {
    let rule = "─".repeat(56);
    let body = if dim {
        text.dimmed().to_string()
    } else {
        text.to_string()
    };
    format!(
        "\n{}\n{} {}\n{}\n{}\n",
        rule,
        heading.green().bold(),
        model.as_str().green().bold(),
        rule,
        body
    )
}

/// Reports progress with one spinner per in-flight call
pub struct ProgressReporter {
    multi: MultiProgress,
    spinners: Mutex<Vec<(Model, ProgressBar)>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinners: Mutex::new(Vec::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, models: &[Model]) {
        let _ = self.multi.println(stage_banner(stage));
        let Ok(mut spinners) = self.spinners.lock() else {
            return;
        };
        for model in models {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.set_message(model.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            spinners.push((model.clone(), pb));
        }
    }

    fn on_call_complete(
        &self,
        _stage: Stage,
        model: &Model,
        elapsed: Duration,
        failure: Option<&CallFailure>,
    ) {
        let Ok(mut spinners) = self.spinners.lock() else {
            return;
        };
        if let Some(pos) = spinners.iter().position(|(m, _)| m == model) {
            let (_, pb) = spinners.remove(pos);
            pb.finish_and_clear();
            self.multi.remove(&pb);
        }
        let _ = self.multi.println(call_line(model, elapsed, failure));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed: Duration) {
        if let Ok(mut spinners) = self.spinners.lock() {
            for (_, pb) in spinners.drain(..) {
                pb.finish_and_clear();
            }
        }
        let _ = self.multi.println(stage_done(stage, elapsed));
    }

    fn on_prompt(&self, _stage: Stage, model: &Model, prompt: &str) {
        let _ = self
            .multi
            .println(echo_block("PROMPT TO:", model, prompt, true));
    }

    fn on_response(&self, _stage: Stage, model: &Model, content: &str) {
        let _ = self
            .multi
            .println(echo_block("RESPONSE FROM:", model, content, false));
    }
}

/// Plain line-based progress for terminals without spinner support
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, models: &[Model]) {
        eprintln!("{}", stage_banner(stage));
        for model in models {
            eprintln!("  [⋯] {}", model);
        }
    }

    fn on_call_complete(
        &self,
        _stage: Stage,
        model: &Model,
        elapsed: Duration,
        failure: Option<&CallFailure>,
    ) {
        eprintln!("{}", call_line(model, elapsed, failure));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed: Duration) {
        eprintln!("{}", stage_done(stage, elapsed));
    }

    fn on_prompt(&self, _stage: Stage, model: &Model, prompt: &str) {
        eprintln!("{}", echo_block("PROMPT TO:", model, prompt, true));
    }

    fn on_response(&self, _stage: Stage, model: &Model, content: &str) {
        eprintln!("{}", echo_block("RESPONSE FROM:", model, content, false));
    }
}
