//! Run Council use case
//!
//! Orchestrates the three-stage council flow: every participant answers,
//! participants rank each other's anonymized answers, and the aggregator
//! writes one final answer.

use crate::config::CouncilConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::fan_out::{FanOutExecutor, FanOutRequest};
use council_domain::{
    AnonymizedEntry, CallFailure, CallResult, PipelineFailure, PipelineResult, PipelineState,
    PromptTemplate, Question, ReviewOutcome, Stage, StageTimings, anonymize, extract_rankings,
    resolve_rankings,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Use case for running one council question
///
/// An instance answers exactly one question: [`execute`](Self::execute)
/// consumes it. Concurrent questions each get their own instance and share
/// only the gateway.
pub struct RunCouncilUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    config: CouncilConfig,
    logger: Arc<dyn ConversationLogger>,
    state: PipelineState,
}

impl<G: LlmGateway + 'static> RunCouncilUseCase<G> {
    /// `config` is expected to have passed [`CouncilConfig::validate`].
    pub fn new(gateway: Arc<G>, config: CouncilConfig) -> Self {
        Self {
            gateway,
            config,
            logger: Arc::new(NoConversationLogger),
            state: PipelineState::Idle,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(self, question: Question) -> PipelineResult {
        self.execute_with_progress(question, &NoProgress).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Never returns an error: a run that ends in `AllFailed` or
    /// `Stage3Failed` reports it through [`PipelineResult::failure`] and still
    /// carries every answer and review gathered on the way.
    pub async fn execute_with_progress(
        mut self,
        question: Question,
        progress: &dyn ProgressNotifier,
    ) -> PipelineResult {
        let started = Instant::now();
        let executor = FanOutExecutor::new(Arc::clone(&self.gateway), self.config.timeout)
            .verbose(self.config.verbose);
        let mut timings = StageTimings::default();

        info!(
            "Starting council with {} models, aggregator {}",
            self.config.participants.len(),
            self.config.aggregator
        );
        self.logger.log(ConversationEvent::new(
            "council_start",
            json!({
                "question": question.content(),
                "participants": &self.config.participants,
                "aggregator": &self.config.aggregator,
                "timeout_ms": self.config.timeout.as_millis() as u64,
            }),
        ));

        // Stage 1: Initial answers
        self.transition(PipelineState::Stage1Running);
        let (responses, elapsed) = self
            .stage_initial(&executor, question.content(), progress)
            .await;
        timings.initial = elapsed;

        let usable = responses.iter().filter(|r| r.is_usable()).count();
        self.transition(PipelineState::after_initial(usable));
        if self.state == PipelineState::AllFailed {
            warn!("All {} models failed to respond", responses.len());
            timings.total = started.elapsed();
            return self.finish(
                question,
                responses,
                Vec::new(),
                None,
                timings,
                Some(PipelineFailure::AllFailed),
            );
        }

        // Stage 2: Peer review
        let (reviews, elapsed) = if usable >= 2 {
            self.stage_review(&executor, question.content(), &responses, progress)
                .await
        } else {
            debug!("Skipping peer review: only {} usable answer", usable);
            (Vec::new(), Duration::ZERO)
        };
        timings.review = elapsed;

        // Stage 3: Synthesis
        self.transition(PipelineState::Stage3Running);
        let (synthesis, elapsed) = self
            .stage_synthesis(&executor, question.content(), &responses, &reviews, progress)
            .await;
        timings.synthesis = elapsed;
        timings.total = started.elapsed();

        let (aggregated, failure) = if synthesis.is_usable() {
            self.transition(PipelineState::Done);
            (Some(synthesis.content().to_string()), None)
        } else {
            self.transition(PipelineState::Stage3Failed);
            let failure = synthesis
                .failure()
                .cloned()
                .unwrap_or_else(|| CallFailure::Gateway("empty response".to_string()));
            warn!("Aggregation by {} failed: {}", self.config.aggregator, failure);
            (
                None,
                Some(PipelineFailure::AggregationFailed {
                    aggregator: self.config.aggregator.clone(),
                    failure,
                }),
            )
        };

        self.finish(question, responses, reviews, aggregated, timings, failure)
    }

    /// Stage 1: every participant answers the question
    async fn stage_initial(
        &self,
        executor: &FanOutExecutor<G>,
        question: &str,
        progress: &dyn ProgressNotifier,
    ) -> (Vec<CallResult>, Duration) {
        info!("{}", Stage::Initial);
        let started = Instant::now();
        progress.on_stage_start(Stage::Initial, &self.config.participants);

        let prompt = PromptTemplate::initial_query(question);
        for model in &self.config.participants {
            self.log_prompt(Stage::Initial, model.as_str(), &prompt);
        }
        let responses = executor
            .broadcast(Stage::Initial, &self.config.participants, &prompt, progress)
            .await;
        self.log_calls(Stage::Initial, &responses);

        let elapsed = started.elapsed();
        progress.on_stage_complete(Stage::Initial, elapsed);
        (responses, elapsed)
    }

    /// Stage 2: each participant with a usable answer ranks the others
    async fn stage_review(
        &self,
        executor: &FanOutExecutor<G>,
        question: &str,
        responses: &[CallResult],
        progress: &dyn ProgressNotifier,
    ) -> (Vec<ReviewOutcome>, Duration) {
        info!("{}", Stage::Review);
        let started = Instant::now();

        // Each reviewer gets its own label mapping; it is kept alongside the
        // request so the reply is resolved through the same mapping.
        let mut mappings: Vec<Vec<AnonymizedEntry>> = Vec::new();
        let mut requests = Vec::new();
        for (index, response) in responses.iter().enumerate() {
            if !response.is_usable() {
                continue;
            }
            let entries = anonymize(responses, index);
            let prompt = PromptTemplate::review_prompt(question, &entries, responses);
            self.log_prompt(Stage::Review, response.model().as_str(), &prompt);
            requests.push(FanOutRequest::new(response.model().clone(), prompt));
            mappings.push(entries);
        }

        let reviewers: Vec<_> = requests.iter().map(|r| r.model.clone()).collect();
        progress.on_stage_start(Stage::Review, &reviewers);
        let calls = executor.run(Stage::Review, requests, progress).await;
        self.log_calls(Stage::Review, &calls);

        // The review prompt ends with the `Ranking:` block that
        // `extract_rankings` parses. Changing one means changing the other.
        let reviews: Vec<ReviewOutcome> = calls
            .into_iter()
            .zip(mappings)
            .map(|(call, entries)| {
                let rankings = if call.is_usable() {
                    resolve_rankings(&extract_rankings(call.content(), entries.len()), &entries)
                } else {
                    Vec::new()
                };
                if call.is_usable() && rankings.is_empty() {
                    debug!("No rankings extracted from {}'s review", call.model());
                }
                let outcome = ReviewOutcome::from_call(call, rankings);
                self.logger.log(ConversationEvent::new(
                    "rankings",
                    json!({
                        "reviewer": &outcome.reviewer,
                        "rankings": &outcome.rankings,
                    }),
                ));
                outcome
            })
            .collect();

        let elapsed = started.elapsed();
        progress.on_stage_complete(Stage::Review, elapsed);
        (reviews, elapsed)
    }

    /// Stage 3: the aggregator writes the final answer
    async fn stage_synthesis(
        &self,
        executor: &FanOutExecutor<G>,
        question: &str,
        responses: &[CallResult],
        reviews: &[ReviewOutcome],
        progress: &dyn ProgressNotifier,
    ) -> (CallResult, Duration) {
        info!("{}", Stage::Synthesis);
        let started = Instant::now();
        let aggregator = self.config.aggregator.clone();
        progress.on_stage_start(Stage::Synthesis, std::slice::from_ref(&aggregator));

        let prompt = PromptTemplate::aggregation_prompt(question, responses, reviews);
        self.log_prompt(Stage::Synthesis, aggregator.as_str(), &prompt);
        let calls = executor
            .run(
                Stage::Synthesis,
                vec![FanOutRequest::new(aggregator.clone(), prompt)],
                progress,
            )
            .await;
        self.log_calls(Stage::Synthesis, &calls);

        let synthesis = calls.into_iter().next().unwrap_or_else(|| {
            CallResult::failed(
                aggregator,
                CallFailure::Aborted("no result".to_string()),
                started.elapsed(),
            )
        });

        let elapsed = started.elapsed();
        progress.on_stage_complete(Stage::Synthesis, elapsed);
        (synthesis, elapsed)
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn finish(
        self,
        question: Question,
        responses: Vec<CallResult>,
        reviews: Vec<ReviewOutcome>,
        aggregated: Option<String>,
        timings: StageTimings,
        failure: Option<PipelineFailure>,
    ) -> PipelineResult {
        info!(
            "Council finished in {:.2}s with state {}",
            timings.total.as_secs_f64(),
            self.state
        );
        self.logger.log(ConversationEvent::new(
            "council_complete",
            json!({
                "state": self.state,
                "failure": &failure,
                "timings": timings,
            }),
        ));

        PipelineResult {
            question: question.into_content(),
            participants: self.config.participants,
            aggregator: self.config.aggregator,
            state: self.state,
            responses,
            reviews,
            aggregated,
            timings,
            failure,
        }
    }

    fn log_prompt(&self, stage: Stage, model: &str, prompt: &str) {
        self.logger.log(ConversationEvent::new(
            "prompt",
            json!({
                "stage": stage,
                "model": model,
                "prompt": prompt,
            }),
        ));
    }

    fn log_calls(&self, stage: Stage, calls: &[CallResult]) {
        for call in calls {
            self.logger.log(ConversationEvent::new(
                "call_complete",
                json!({
                    "stage": stage,
                    "result": call,
                }),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, LlmSession};
    use async_trait::async_trait;
    use council_domain::Model;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Text(&'static str),
        Slow(u64, &'static str),
        Fail(&'static str),
    }

    fn stage_of(prompt: &str) -> Stage {
        if prompt.starts_with("Original question:") {
            Stage::Review
        } else if prompt.starts_with("Several AI models") {
            Stage::Synthesis
        } else {
            Stage::Initial
        }
    }

    struct MockSession {
        model: Model,
        scripts: Arc<HashMap<(String, Stage), Reply>>,
        prompts: Arc<Mutex<Vec<(String, Stage, String)>>>,
    }

    #[async_trait]
    impl LlmSession for MockSession {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn send(&self, content: &str) -> Result<String, GatewayError> {
            let stage = stage_of(content);
            self.prompts
                .lock()
                .unwrap()
                .push((self.model.to_string(), stage, content.to_string()));
            match self.scripts.get(&(self.model.to_string(), stage)).cloned() {
                Some(Reply::Text(text)) => Ok(text.to_string()),
                Some(Reply::Slow(ms, text)) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(text.to_string())
                }
                Some(Reply::Fail(msg)) => Err(GatewayError::RequestFailed(msg.to_string())),
                None => Err(GatewayError::Other("no script".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct MockGateway {
        scripts: Arc<HashMap<(String, Stage), Reply>>,
        prompts: Arc<Mutex<Vec<(String, Stage, String)>>>,
    }

    impl MockGateway {
        fn new(scripts: Vec<(&str, Stage, Reply)>) -> Self {
            Self {
                scripts: Arc::new(
                    scripts
                        .into_iter()
                        .map(|(m, s, r)| ((m.to_string(), s), r))
                        .collect(),
                ),
                prompts: Arc::default(),
            }
        }

        fn calls_in(&self, stage: Stage) -> usize {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, s, _)| *s == stage)
                .count()
        }

        fn prompt_for(&self, model: &str, stage: Stage) -> Option<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .find(|(m, s, _)| m == model && *s == stage)
                .map(|(_, _, p)| p.clone())
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn create_session(
            &self,
            model: &Model,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            Ok(Box::new(MockSession {
                model: model.clone(),
                scripts: Arc::clone(&self.scripts),
                prompts: Arc::clone(&self.prompts),
            }))
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn config(participants: &[&str]) -> CouncilConfig {
        CouncilConfig::new(
            participants.iter().map(|p| Model::from(*p)).collect(),
            Model::from("judge"),
        )
        .with_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_end_to_end_with_one_review_timeout() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Text("answer zero")),
            ("p1", Stage::Initial, Reply::Text("answer one")),
            ("p2", Stage::Initial, Reply::Text("answer two")),
            (
                "p0",
                Stage::Review,
                Reply::Text("Ranking:\n1. Response B: sharper\n2. Response A: fine"),
            ),
            ("p1", Stage::Review, Reply::Slow(5_000, "too late")),
            (
                "p2",
                Stage::Review,
                Reply::Text("Ranking:\n1. Response A: best\n2. Response B: ok"),
            ),
            ("judge", Stage::Synthesis, Reply::Text("final answer")),
        ]));

        let result = RunCouncilUseCase::new(Arc::clone(&gateway), config(&["p0", "p1", "p2"]))
            .execute(Question::new("What is Rust?").unwrap())
            .await;

        assert_eq!(result.state, PipelineState::Done);
        assert!(result.is_success());
        assert_eq!(result.responses.len(), 3);
        assert_eq!(result.reviews.len(), 3);
        assert_eq!(result.aggregated.as_deref(), Some("final answer"));

        assert!(result.reviews[1].failure.as_ref().is_some_and(CallFailure::is_timeout));
        assert!(result.reviews[1].rankings.is_empty());

        // p0 saw p1 as A and p2 as B
        let p0 = &result.reviews[0].rankings;
        assert_eq!((p0[0].participant, p0[0].rank), (2, 1));
        assert_eq!((p0[1].participant, p0[1].rank), (1, 2));

        // p2 saw p0 as A and p1 as B
        let p2 = &result.reviews[2].rankings;
        assert_eq!((p2[0].participant, p2[0].rank), (0, 1));

        let synthesis = gateway.prompt_for("judge", Stage::Synthesis).unwrap();
        assert!(synthesis.contains("### Ranked by p0\n1. p2: sharper"));
        assert!(!synthesis.contains("### Ranked by p1"));
    }

    #[tokio::test]
    async fn test_review_prompt_hides_own_answer() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Text("zero's answer")),
            ("p1", Stage::Initial, Reply::Text("one's answer")),
            ("p0", Stage::Review, Reply::Text("fine")),
            ("p1", Stage::Review, Reply::Text("fine")),
            ("judge", Stage::Synthesis, Reply::Text("final")),
        ]));

        RunCouncilUseCase::new(Arc::clone(&gateway), config(&["p0", "p1"]))
            .execute(Question::new("Q").unwrap())
            .await;

        let prompt = gateway.prompt_for("p0", Stage::Review).unwrap();
        assert!(prompt.contains("one's answer"));
        assert!(!prompt.contains("zero's answer"));
        assert!(!prompt.contains("p1"));
    }

    #[tokio::test]
    async fn test_all_failed_skips_later_stages() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Fail("down")),
            ("p1", Stage::Initial, Reply::Text("   ")),
        ]));

        let result = RunCouncilUseCase::new(Arc::clone(&gateway), config(&["p0", "p1"]))
            .execute(Question::new("Q").unwrap())
            .await;

        assert_eq!(result.state, PipelineState::AllFailed);
        assert_eq!(result.failure, Some(PipelineFailure::AllFailed));
        assert_eq!(result.responses.len(), 2);
        assert!(result.reviews.is_empty());
        assert!(result.aggregated.is_none());
        assert_eq!(gateway.calls_in(Stage::Review), 0);
        assert_eq!(gateway.calls_in(Stage::Synthesis), 0);
    }

    #[tokio::test]
    async fn test_single_success_skips_review_but_synthesizes() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Fail("down")),
            ("p1", Stage::Initial, Reply::Text("lonely answer")),
            ("judge", Stage::Synthesis, Reply::Text("final")),
        ]));

        let result = RunCouncilUseCase::new(Arc::clone(&gateway), config(&["p0", "p1"]))
            .execute(Question::new("Q").unwrap())
            .await;

        assert_eq!(result.state, PipelineState::Done);
        assert!(result.reviews.is_empty());
        assert_eq!(result.timings.review, Duration::ZERO);
        assert_eq!(gateway.calls_in(Stage::Review), 0);
        assert_eq!(result.aggregated.as_deref(), Some("final"));
    }

    #[tokio::test]
    async fn test_aggregation_failure_keeps_earlier_stages() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Text("a")),
            ("p1", Stage::Initial, Reply::Text("b")),
            ("p0", Stage::Review, Reply::Text("Ranking:\n1. Response A: ok")),
            ("p1", Stage::Review, Reply::Text("Ranking:\n1. Response A: ok")),
            ("judge", Stage::Synthesis, Reply::Fail("session error")),
        ]));
        let logger = Arc::new(RecordingLogger::default());

        let result = RunCouncilUseCase::new(Arc::clone(&gateway), config(&["p0", "p1"]))
            .with_logger(logger.clone())
            .execute(Question::new("Q").unwrap())
            .await;

        assert_eq!(result.state, PipelineState::Stage3Failed);
        assert!(matches!(
            result.failure,
            Some(PipelineFailure::AggregationFailed { .. })
        ));
        assert!(result.aggregated.is_none());
        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.reviews.len(), 2);
        assert_eq!(result.reviews[0].rankings[0].participant, 1);

        let events = logger.events.lock().unwrap();
        assert_eq!(events.first(), Some(&"council_start"));
        assert_eq!(events.last(), Some(&"council_complete"));
        assert_eq!(events.iter().filter(|e| **e == "rankings").count(), 2);
    }

    #[tokio::test]
    async fn test_empty_aggregation_is_a_failure() {
        let gateway = Arc::new(MockGateway::new(vec![
            ("p0", Stage::Initial, Reply::Text("a")),
            ("judge", Stage::Synthesis, Reply::Text("")),
        ]));

        let result = RunCouncilUseCase::new(gateway, config(&["p0"]))
            .execute(Question::new("Q").unwrap())
            .await;

        assert_eq!(result.state, PipelineState::Stage3Failed);
        assert!(!result.is_success());
    }
}
