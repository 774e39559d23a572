//! Progress notification port
//!
//! Defines the interface for reporting progress during a council run.

use council_domain::{CallFailure, Model, Stage};
use std::time::Duration;

/// Callback for progress updates during a council run
///
/// Implementations live in the presentation layer. Callbacks are invoked
/// from the orchestrating task and must return quickly; anything slow
/// belongs on another thread. Progress is observation only and never
/// affects the run.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts, with one task per model listed
    fn on_stage_start(&self, stage: Stage, models: &[Model]);

    /// Called once per completed call, in completion order
    fn on_call_complete(
        &self,
        stage: Stage,
        model: &Model,
        elapsed: Duration,
        failure: Option<&CallFailure>,
    );

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: Stage, elapsed: Duration);

    /// Called before a prompt is sent (verbose runs only)
    fn on_prompt(&self, _stage: Stage, _model: &Model, _prompt: &str) {}

    /// Called with a model's raw reply (verbose runs only)
    fn on_response(&self, _stage: Stage, _model: &Model, _content: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _models: &[Model]) {}
    fn on_call_complete(
        &self,
        _stage: Stage,
        _model: &Model,
        _elapsed: Duration,
        _failure: Option<&CallFailure>,
    ) {
    }
    fn on_stage_complete(&self, _stage: Stage, _elapsed: Duration) {}
}
