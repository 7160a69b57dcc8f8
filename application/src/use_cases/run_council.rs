//! Run Council use case
//!
//! Orchestrates one full council turn: fan the question out to every member
//! (Stage 1), collect anonymous peer rankings (Stage 2), aggregate them, and
//! have the chairman synthesize the final answer (Stage 3). Also exposes the
//! streaming variant that reports stage completion incrementally.

use crate::config::ExecutionParams;
use crate::ports::conversation_store::{ConversationStore, NoopStore};
use crate::ports::model_gateway::ModelGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::fanout::settle_all;
use crate::use_cases::generate_title::GenerateTitleUseCase;
use council_domain::{
    anonymize, parse_ranking, prompt_with_system, AggregateRanking, CouncilConfig, CouncilTurn,
    Failure, Message, ModelResponse, PartialTurn, PromptTemplate, Question, RankingSubmission,
    ScoringRule, Stage, Stage1Result, Stage2Result, SynthesisResult, TurnEvent, TurnState,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can end a council turn
///
/// Fatal variants keep whatever stage data was already computed so callers
/// can render "partial council, synthesis failed."
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("council has no members")]
    NoMembers,

    #[error("no responses: every council member failed")]
    NoResponses { stage1: Stage1Result },

    #[error("synthesis failed: {failure}")]
    SynthesisFailed {
        failure: Failure,
        partial: Box<PartialTurn>,
    },

    #[error("turn cancelled")]
    Cancelled { partial: Box<PartialTurn> },

    #[error("orchestration error: {0}")]
    Orchestration(String),
}

impl RunCouncilError {
    /// Split into the user-facing message and the salvaged stage data.
    pub fn into_partial(self) -> (String, PartialTurn) {
        let message = self.to_string();
        let partial = match self {
            RunCouncilError::NoResponses { stage1 } => PartialTurn {
                stage1,
                stage2: None,
                aggregate: None,
            },
            RunCouncilError::SynthesisFailed { partial, .. }
            | RunCouncilError::Cancelled { partial } => *partial,
            RunCouncilError::NoMembers | RunCouncilError::Orchestration(_) => {
                PartialTurn::default()
            }
        };
        (message, partial)
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    /// The user message opening this turn
    pub question: Question,
    /// Prior conversation turns, flattened to role-tagged messages
    pub context: Vec<Message>,
    /// Council membership and chairman
    pub config: CouncilConfig,
    /// Rank-to-score weighting for aggregation
    pub scoring: ScoringRule,
    /// Invocation timeouts
    pub params: ExecutionParams,
    /// Whether to derive a conversation title beside the pipeline
    pub generate_title: bool,
}

impl RunCouncilInput {
    pub fn new(question: impl Into<Question>, config: CouncilConfig) -> Self {
        Self {
            question: question.into(),
            context: Vec::new(),
            config,
            scoring: ScoringRule::default(),
            params: ExecutionParams::default(),
            generate_title: false,
        }
    }

    pub fn with_context(mut self, context: Vec<Message>) -> Self {
        self.context = context;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringRule) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_title_generation(mut self) -> Self {
        self.generate_title = true;
        self
    }
}

/// Collaborators and controls for a streaming turn.
pub struct TurnContext {
    /// Per-model progress callbacks
    pub progress: Arc<dyn ProgressNotifier>,
    /// Conversation collaborator for turn/title persistence
    pub store: Arc<dyn ConversationStore>,
    /// Conversation to record into; `None` skips persistence
    pub conversation_id: Option<String>,
    /// Checked between stages: a cancelled token stops the turn before the
    /// next fan-out starts, never in the middle of one.
    pub cancel: CancellationToken,
}

impl TurnContext {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoProgress),
            store: Arc::new(NoopStore),
            conversation_id: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_store(
        mut self,
        store: Arc<dyn ConversationStore>,
        conversation_id: impl Into<String>,
    ) -> Self {
        self.store = store;
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for TurnContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Use case for running one council turn
pub struct RunCouncilUseCase<G: ModelGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: ModelGateway + 'static> Clone for RunCouncilUseCase<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: ModelGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilTurn, RunCouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case synchronously, returning the full turn bundle
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CouncilTurn, RunCouncilError> {
        input
            .config
            .validate()
            .map_err(|_| RunCouncilError::NoMembers)?;

        info!(
            "Starting council turn with {} members",
            input.config.size()
        );

        let stage1 = self.stage1_collect(&input, progress).await;
        if stage1.success_count() == 0 {
            return Err(RunCouncilError::NoResponses { stage1 });
        }

        let (stage2, aggregate) = self.stage2_rank(&input, &stage1, progress).await;

        let stage3 = self
            .stage3_synthesize(&input, &stage1, &aggregate, progress)
            .await
            .map_err(|failure| RunCouncilError::SynthesisFailed {
                failure,
                partial: Box::new(PartialTurn {
                    stage1: stage1.clone(),
                    stage2: Some(stage2.clone()),
                    aggregate: Some(aggregate.clone()),
                }),
            })?;

        Ok(CouncilTurn::new(
            input.question.content(),
            stage1,
            stage2,
            aggregate,
            stage3,
        ))
    }

    /// Execute the use case as an ordered event stream.
    ///
    /// Events arrive strictly in stage order; the stream ends with either
    /// `Complete` carrying the full turn or `Error` carrying the salvaged
    /// stage data. Title generation, when requested, runs beside the
    /// pipeline and surfaces as an out-of-band `TitleReady` event.
    pub fn stream(&self, input: RunCouncilInput, ctx: TurnContext) -> mpsc::Receiver<TurnEvent> {
        let (tx, rx) = mpsc::channel(16);
        let this = self.clone();
        tokio::spawn(this.drive_stream(input, ctx, tx));
        rx
    }

    async fn drive_stream(
        self,
        input: RunCouncilInput,
        ctx: TurnContext,
        tx: mpsc::Sender<TurnEvent>,
    ) {
        let title_task = input.generate_title.then(|| self.spawn_title(&input));
        let mut state = TurnState::new();

        match self.run_stages(&input, &ctx, &tx, &mut state).await {
            Ok(turn) => {
                if let Some(task) = title_task {
                    match task.await {
                        Ok(title) => {
                            if let Some(id) = &ctx.conversation_id {
                                if let Err(e) = ctx.store.update_title(id, &title).await {
                                    warn!("Failed to store conversation title: {}", e);
                                }
                            }
                            let _ = tx.send(TurnEvent::TitleReady { title }).await;
                        }
                        Err(e) => warn!("Title task failed to join: {}", e),
                    }
                }

                if let Some(id) = &ctx.conversation_id {
                    if let Err(e) = ctx.store.append_turn(id, &turn).await {
                        warn!("Failed to persist council turn: {}", e);
                    }
                }

                if let Err(e) = state.complete() {
                    warn!("Turn state out of sync at completion: {}", e);
                }
                let _ = tx.send(TurnEvent::Complete { turn }).await;
            }
            Err(error) => {
                if let Some(task) = title_task {
                    task.abort();
                }
                state.fail();
                warn!("Council turn failed: {}", error);
                let (message, partial) = error.into_partial();
                let _ = tx.send(TurnEvent::Error { message, partial }).await;
            }
        }
    }

    /// The ordered stage sequence behind the event stream.
    ///
    /// Cancellation (including a dropped receiver) is honored at the
    /// checkpoints between stages: an in-flight fan-out always settles in
    /// full so no stage result set ends up with missing entries.
    async fn run_stages(
        &self,
        input: &RunCouncilInput,
        ctx: &TurnContext,
        tx: &mpsc::Sender<TurnEvent>,
        state: &mut TurnState,
    ) -> Result<CouncilTurn, RunCouncilError> {
        input
            .config
            .validate()
            .map_err(|_| RunCouncilError::NoMembers)?;

        // Stage 1
        state
            .begin(Stage::ResponseCollection)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        if tx.send(TurnEvent::Stage1Start).await.is_err() {
            return Err(cancelled(Stage1Result::default(), None, None));
        }

        let stage1 = self.stage1_collect(input, ctx.progress.as_ref()).await;
        state
            .finish(Stage::ResponseCollection)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        if tx
            .send(TurnEvent::Stage1Complete {
                stage1: stage1.clone(),
            })
            .await
            .is_err()
        {
            return Err(cancelled(stage1, None, None));
        }

        if stage1.success_count() == 0 {
            return Err(RunCouncilError::NoResponses { stage1 });
        }
        if ctx.cancel.is_cancelled() {
            return Err(cancelled(stage1, None, None));
        }

        // Stage 2
        state
            .begin(Stage::PeerRanking)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        if tx.send(TurnEvent::Stage2Start).await.is_err() {
            return Err(cancelled(stage1, None, None));
        }

        let (stage2, aggregate) = self.stage2_rank(input, &stage1, ctx.progress.as_ref()).await;
        state
            .finish(Stage::PeerRanking)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        if tx
            .send(TurnEvent::Stage2Complete {
                stage2: stage2.clone(),
                aggregate: aggregate.clone(),
            })
            .await
            .is_err()
        {
            return Err(cancelled(stage1, Some(stage2), Some(aggregate)));
        }

        if ctx.cancel.is_cancelled() {
            return Err(cancelled(stage1, Some(stage2), Some(aggregate)));
        }

        // Stage 3
        state
            .begin(Stage::Synthesis)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        if tx.send(TurnEvent::Stage3Start).await.is_err() {
            return Err(cancelled(stage1, Some(stage2), Some(aggregate)));
        }

        let stage3 = self
            .stage3_synthesize(input, &stage1, &aggregate, ctx.progress.as_ref())
            .await
            .map_err(|failure| RunCouncilError::SynthesisFailed {
                failure,
                partial: Box::new(PartialTurn {
                    stage1: stage1.clone(),
                    stage2: Some(stage2.clone()),
                    aggregate: Some(aggregate.clone()),
                }),
            })?;
        state
            .finish(Stage::Synthesis)
            .map_err(|e| RunCouncilError::Orchestration(e.to_string()))?;
        let _ = tx
            .send(TurnEvent::Stage3Complete {
                stage3: stage3.clone(),
            })
            .await;

        Ok(CouncilTurn::new(
            input.question.content(),
            stage1,
            stage2,
            aggregate,
            stage3,
        ))
    }

    fn spawn_title(&self, input: &RunCouncilInput) -> JoinHandle<String> {
        let use_case = GenerateTitleUseCase::new(Arc::clone(&self.gateway));
        let message = input.question.content().to_string();
        let model = input.config.title_model.clone();
        let timeout = input.params.title_timeout();
        tokio::spawn(async move { use_case.execute(&message, &model, timeout).await })
    }

    /// Stage 1: every member answers the question, concurrently.
    ///
    /// Waits for all invocations to settle (every answer is needed for
    /// Stage 2) and records failures per model instead of aborting. Result
    /// order is council configuration order regardless of completion timing.
    async fn stage1_collect(
        &self,
        input: &RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Stage1Result {
        info!("Stage 1: querying {} council members", input.config.size());
        progress.on_stage_start(&Stage::ResponseCollection, input.config.size());

        let mut prompt = input.context.clone();
        prompt.push(Message::user(input.question.content()));

        let futures: Vec<_> = input
            .config
            .members
            .iter()
            .map(|model| {
                let gateway = Arc::clone(&self.gateway);
                let model = model.clone();
                let messages = prompt.clone();
                let timeout = input.params.invoke_timeout();
                async move { Self::query_member(gateway, model, messages, timeout).await }
            })
            .collect();

        let members = input.config.members.clone();
        let responses = settle_all(
            futures,
            |index| {
                ModelResponse::failure(
                    members[index].clone(),
                    Failure::malformed("invocation task aborted"),
                )
            },
            |_, response: &ModelResponse| {
                match &response.error {
                    None => debug!("Model {} answered", response.model),
                    Some(failure) => warn!("Model {} failed: {}", response.model, failure),
                }
                progress.on_model_settled(
                    &Stage::ResponseCollection,
                    &response.model,
                    response.is_success(),
                );
            },
        )
        .await;

        progress.on_stage_complete(&Stage::ResponseCollection);
        Stage1Result::new(responses)
    }

    async fn query_member(
        gateway: Arc<G>,
        model: council_domain::Model,
        messages: Vec<Message>,
        timeout: std::time::Duration,
    ) -> ModelResponse {
        match gateway.invoke(&model, &messages, timeout).await {
            Ok(text) if text.trim().is_empty() => {
                ModelResponse::failure(model, Failure::malformed("empty completion"))
            }
            Ok(text) => ModelResponse::success(model, text),
            Err(e) => ModelResponse::failure(model, e.into_failure()),
        }
    }

    /// Stage 2: every member judges the anonymized answers, concurrently.
    ///
    /// Members that failed Stage 1 still judge; ranking is a separate
    /// capability call. Every judge sees the answers in the same label
    /// order.
    async fn stage2_rank(
        &self,
        input: &RunCouncilInput,
        stage1: &Stage1Result,
        progress: &dyn ProgressNotifier,
    ) -> (Stage2Result, AggregateRanking) {
        let (answers, label_map) = anonymize(&stage1.responses);
        info!(
            "Stage 2: collecting rankings over {} labeled answers",
            answers.len()
        );
        progress.on_stage_start(&Stage::PeerRanking, input.config.size());

        let messages = prompt_with_system(
            PromptTemplate::ranking_system(),
            &[],
            &PromptTemplate::ranking_prompt(input.question.content(), &answers),
        );

        let futures: Vec<_> = input
            .config
            .members
            .iter()
            .map(|judge| {
                let gateway = Arc::clone(&self.gateway);
                let judge = judge.clone();
                let messages = messages.clone();
                let map = label_map.clone();
                let timeout = input.params.invoke_timeout();
                async move { Self::collect_ranking(gateway, judge, messages, map, timeout).await }
            })
            .collect();

        let members = input.config.members.clone();
        let submissions = settle_all(
            futures,
            |index| {
                RankingSubmission::failed(
                    members[index].clone(),
                    Failure::malformed("invocation task aborted"),
                )
            },
            |_, submission: &RankingSubmission| {
                match &submission.error {
                    None => debug!(
                        "Judge {} ranked {} labels",
                        submission.judge,
                        submission.ordered_labels.len()
                    ),
                    Some(failure) => {
                        warn!("Judge {} failed: {}", submission.judge, failure)
                    }
                }
                progress.on_model_settled(
                    &Stage::PeerRanking,
                    &submission.judge,
                    submission.is_ranked(),
                );
            },
        )
        .await;

        let aggregate =
            AggregateRanking::from_submissions(&submissions, &label_map, &input.scoring);

        progress.on_stage_complete(&Stage::PeerRanking);
        (Stage2Result::new(submissions, label_map), aggregate)
    }

    async fn collect_ranking(
        gateway: Arc<G>,
        judge: council_domain::Model,
        messages: Vec<Message>,
        map: council_domain::LabelMap,
        timeout: std::time::Duration,
    ) -> RankingSubmission {
        match gateway.invoke(&judge, &messages, timeout).await {
            Ok(reply) => match parse_ranking(&reply, &map) {
                Ok(labels) => RankingSubmission::ranked(judge, labels, reply),
                Err(e) => RankingSubmission::failed(judge, Failure::malformed(e.to_string()))
                    .with_raw_text(reply),
            },
            Err(e) => RankingSubmission::failed(judge, e.into_failure()),
        }
    }

    /// Stage 3: the chairman synthesizes the final answer. A chairman
    /// failure is fatal for the turn.
    async fn stage3_synthesize(
        &self,
        input: &RunCouncilInput,
        stage1: &Stage1Result,
        aggregate: &AggregateRanking,
        progress: &dyn ProgressNotifier,
    ) -> Result<SynthesisResult, Failure> {
        let chairman = input.config.chairman.clone();
        info!("Stage 3: chairman {} synthesizing", chairman);
        progress.on_stage_start(&Stage::Synthesis, 1);

        let messages = prompt_with_system(
            PromptTemplate::synthesis_system(),
            &[],
            &PromptTemplate::synthesis_prompt(input.question.content(), stage1, aggregate),
        );

        let outcome = match self
            .gateway
            .invoke(&chairman, &messages, input.params.invoke_timeout())
            .await
        {
            Ok(text) if text.trim().is_empty() => Err(Failure::malformed("empty completion")),
            Ok(text) => Ok(SynthesisResult::new(chairman.clone(), text)),
            Err(e) => Err(e.into_failure()),
        };

        if let Err(failure) = &outcome {
            warn!("Chairman {} failed: {}", chairman, failure);
        }
        progress.on_model_settled(&Stage::Synthesis, &chairman, outcome.is_ok());
        progress.on_stage_complete(&Stage::Synthesis);
        outcome
    }
}

fn cancelled(
    stage1: Stage1Result,
    stage2: Option<Stage2Result>,
    aggregate: Option<AggregateRanking>,
) -> RunCouncilError {
    RunCouncilError::Cancelled {
        partial: Box::new(PartialTurn {
            stage1,
            stage2,
            aggregate,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::conversation_store::StoreError;
    use crate::ports::model_gateway::GatewayError;
    use async_trait::async_trait;
    use council_domain::{Conversation, ConversationSummary, Model, Role};
    use std::sync::Mutex;
    use std::time::Duration;

    type Script = Box<dyn Fn(&Model, &[Message]) -> Result<String, GatewayError> + Send + Sync>;

    /// Gateway mock that dispatches on the call shape and records every call.
    struct ScriptedGateway {
        calls: Mutex<Vec<(String, &'static str)>>,
        script: Script,
    }

    impl ScriptedGateway {
        fn new(
            script: impl Fn(&Model, &[Message]) -> Result<String, GatewayError>
                + Send
                + Sync
                + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                script: Box::new(script),
            })
        }

        fn calls(&self) -> Vec<(String, &'static str)> {
            self.calls.lock().unwrap().clone()
        }

        fn count_kind(&self, kind: &str) -> usize {
            self.calls().iter().filter(|(_, k)| *k == kind).count()
        }
    }

    /// Classify a call by its prompt shape.
    fn call_kind(messages: &[Message]) -> &'static str {
        match messages.first() {
            Some(m) if m.role == Role::System && m.content.contains("impartial judge") => "rank",
            Some(m) if m.role == Role::System && m.content.contains("chairman") => "synth",
            _ if messages
                .iter()
                .any(|m| m.content.contains("very short title")) =>
            {
                "title"
            }
            _ => "answer",
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn invoke(
            &self,
            model: &Model,
            messages: &[Message],
            _timeout: Duration,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), call_kind(messages)));
            (self.script)(model, messages)
        }
    }

    fn council() -> CouncilConfig {
        CouncilConfig::new(vec![
            Model::Custom("alpha".into()),
            Model::Custom("beta".into()),
            Model::Custom("gamma".into()),
        ])
        .with_chairman(Model::Custom("chair".into()))
        .with_title_model(Model::Custom("mini".into()))
    }

    /// All members answer, every judge prefers Response A, chairman works.
    fn happy_script() -> impl Fn(&Model, &[Message]) -> Result<String, GatewayError> {
        |model, messages| match call_kind(messages) {
            "answer" => Ok(format!("answer from {}", model)),
            "rank" => Ok("Solid set.\nFINAL RANKING:\n1. Response A\n2. Response B\n3. Response C"
                .to_string()),
            "synth" => Ok("the final word".to_string()),
            "title" => Ok("A Fine Title".to_string()),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_full_turn_happy_path() {
        let gateway = ScriptedGateway::new(happy_script());
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let turn = use_case
            .execute(RunCouncilInput::new("What is Rust?", council()))
            .await
            .unwrap();

        // Stage 1 in council order, all successes.
        assert_eq!(turn.stage1.len(), 3);
        let order: Vec<_> = turn
            .stage1
            .responses
            .iter()
            .map(|r| r.model.to_string())
            .collect();
        assert_eq!(order, vec!["alpha", "beta", "gamma"]);
        assert_eq!(turn.stage1.success_count(), 3);

        // Stage 2: one submission per judge, all parsed.
        assert_eq!(turn.stage2.submissions.len(), 3);
        assert_eq!(turn.stage2.ranked_count(), 3);
        assert_eq!(turn.stage2.label_map.len(), 3);

        // All judges put Response A (alpha) first.
        let winner = turn.aggregate.winner().unwrap();
        assert_eq!(winner.model.to_string(), "alpha");
        assert_eq!(winner.score, 9.0);
        assert_eq!(winner.first_place_votes, 3);

        assert_eq!(turn.stage3.text, "the final word");
        assert_eq!(turn.stage3.chairman.to_string(), "chair");
        assert_eq!(turn.question, "What is Rust?");
    }

    #[tokio::test]
    async fn test_stage1_length_equals_council_size_with_failures() {
        let gateway = ScriptedGateway::new(|model, messages| match call_kind(messages) {
            "answer" if model.as_str() == "beta" => Err(GatewayError::Timeout),
            other => happy_script()(model, &fake_messages(other)),
        });
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let turn = use_case
            .execute(RunCouncilInput::new("q", council()))
            .await
            .unwrap();

        assert_eq!(turn.stage1.len(), 3);
        assert_eq!(turn.stage1.success_count(), 2);
        assert!(turn.stage1.responses[1].error.is_some());

        // Only the two successes got labels, but all three members judged.
        assert_eq!(turn.stage2.label_map.len(), 2);
        assert_eq!(gateway.count_kind("rank"), 3);
    }

    /// Rebuild a prompt of the given kind so a script can delegate to
    /// another script keyed on call shape.
    fn fake_messages(kind: &str) -> Vec<Message> {
        match kind {
            "rank" => vec![Message::system(PromptTemplate::ranking_system())],
            "synth" => vec![Message::system(PromptTemplate::synthesis_system())],
            "title" => vec![Message::user("very short title")],
            _ => vec![Message::user("q")],
        }
    }

    #[tokio::test]
    async fn test_total_stage1_failure_skips_later_stages() {
        let gateway =
            ScriptedGateway::new(|_, _| Err(GatewayError::Unreachable("proxy down".into())));
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let result = use_case.execute(RunCouncilInput::new("q", council())).await;

        match result {
            Err(RunCouncilError::NoResponses { stage1 }) => {
                assert_eq!(stage1.len(), 3);
                assert_eq!(stage1.success_count(), 0);
            }
            other => panic!("expected NoResponses, got {:?}", other.map(|_| ())),
        }

        // Exactly the three Stage-1 calls; Stage 2 and 3 never invoked.
        assert_eq!(gateway.calls().len(), 3);
        assert_eq!(gateway.count_kind("rank"), 0);
        assert_eq!(gateway.count_kind("synth"), 0);
    }

    #[tokio::test]
    async fn test_chairman_failure_preserves_stage_data() {
        let gateway = ScriptedGateway::new(|model, messages| match call_kind(messages) {
            "synth" => Err(GatewayError::Upstream {
                status: 500,
                body: "boom".into(),
            }),
            other => happy_script()(model, &fake_messages(other)),
        });
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let result = use_case.execute(RunCouncilInput::new("q", council())).await;

        match result {
            Err(RunCouncilError::SynthesisFailed { failure, partial }) => {
                assert_eq!(failure.status, Some(500));
                assert_eq!(partial.stage1.len(), 3);
                let stage2 = partial.stage2.as_ref().unwrap();
                assert_eq!(stage2.submissions.len(), 3);
                let aggregate = partial.aggregate.as_ref().unwrap();
                assert_eq!(aggregate.winner().unwrap().model.to_string(), "alpha");
            }
            other => panic!("expected SynthesisFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unparseable_ranking_is_recorded_not_fatal() {
        let gateway = ScriptedGateway::new(|model, messages| match call_kind(messages) {
            "rank" if model.as_str() == "gamma" => Ok("I refuse to rank.".to_string()),
            other => happy_script()(model, &fake_messages(other)),
        });
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let turn = use_case
            .execute(RunCouncilInput::new("q", council()))
            .await
            .unwrap();

        assert_eq!(turn.stage2.submissions.len(), 3);
        assert_eq!(turn.stage2.ranked_count(), 2);
        let refused = &turn.stage2.submissions[2];
        assert!(!refused.is_ranked());
        assert_eq!(refused.raw_text, "I refuse to rank.");
        // Two judges still scored: alpha gets 3 + 3.
        assert_eq!(turn.aggregate.winner().unwrap().score, 6.0);
    }

    #[tokio::test]
    async fn test_empty_council_is_rejected() {
        let gateway = ScriptedGateway::new(happy_script());
        let use_case = RunCouncilUseCase::new(gateway);

        let config = CouncilConfig::new(vec![]);
        let result = use_case.execute(RunCouncilInput::new("q", config)).await;
        assert!(matches!(result, Err(RunCouncilError::NoMembers)));
    }

    // ==================== Streaming ====================

    async fn collect_events(mut rx: mpsc::Receiver<TurnEvent>) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn test_stream_emits_events_in_stage_order() {
        let gateway = ScriptedGateway::new(happy_script());
        let use_case = RunCouncilUseCase::new(gateway);

        let input = RunCouncilInput::new("q", council()).with_title_generation();
        let events = collect_events(use_case.stream(input, TurnContext::new())).await;

        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "stage1_start",
                "stage1_complete",
                "stage2_start",
                "stage2_complete",
                "stage3_start",
                "stage3_complete",
                "title_ready",
                "complete",
            ]
        );

        match events.last().unwrap() {
            TurnEvent::Complete { turn } => assert_eq!(turn.stage3.text, "the final word"),
            other => panic!("expected Complete, got {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_stream_error_carries_partial_turn() {
        let gateway =
            ScriptedGateway::new(|_, _| Err(GatewayError::Unreachable("proxy down".into())));
        let use_case = RunCouncilUseCase::new(gateway);

        let events =
            collect_events(use_case.stream(RunCouncilInput::new("q", council()), TurnContext::new()))
                .await;

        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["stage1_start", "stage1_complete", "error"]);

        match events.last().unwrap() {
            TurnEvent::Error { message, partial } => {
                assert!(message.contains("no responses"));
                assert_eq!(partial.stage1.len(), 3);
                assert!(partial.stage2.is_none());
            }
            other => panic!("expected Error, got {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_cancellation_checkpoint_sits_between_stages() {
        let gateway = ScriptedGateway::new(happy_script());
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = TurnContext::new().with_cancellation(cancel);

        let events =
            collect_events(use_case.stream(RunCouncilInput::new("q", council()), ctx)).await;

        // Stage 1 still settles in full; Stage 2 never starts.
        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["stage1_start", "stage1_complete", "error"]);
        assert_eq!(gateway.count_kind("answer"), 3);
        assert_eq!(gateway.count_kind("rank"), 0);

        match events.last().unwrap() {
            TurnEvent::Error { message, partial } => {
                assert!(message.contains("cancelled"));
                assert_eq!(partial.stage1.len(), 3);
            }
            other => panic!("expected Error, got {:?}", other.kind()),
        }
    }

    // ==================== Persistence wiring ====================

    #[derive(Default)]
    struct RecordingStore {
        turns: Mutex<Vec<(String, CouncilTurn)>>,
        titles: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ConversationStore for RecordingStore {
        async fn create(&self) -> Result<Conversation, StoreError> {
            Ok(Conversation::new("c1", "2026-08-07T00:00:00Z"))
        }

        async fn get(&self, id: &str) -> Result<Conversation, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
            Ok(Vec::new())
        }

        async fn append_user_message(&self, _id: &str, _content: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn append_turn(&self, id: &str, turn: &CouncilTurn) -> Result<(), StoreError> {
            self.turns
                .lock()
                .unwrap()
                .push((id.to_string(), turn.clone()));
            Ok(())
        }

        async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
            self.titles
                .lock()
                .unwrap()
                .push((id.to_string(), title.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stream_records_turn_and_title() {
        let gateway = ScriptedGateway::new(happy_script());
        let use_case = RunCouncilUseCase::new(gateway);
        let store = Arc::new(RecordingStore::default());

        let input = RunCouncilInput::new("q", council()).with_title_generation();
        let ctx = TurnContext::new().with_store(Arc::clone(&store) as _, "c1");
        let events = collect_events(use_case.stream(input, ctx)).await;

        assert_eq!(events.last().unwrap().kind(), "complete");

        let turns = store.turns.lock().unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].0, "c1");

        let titles = store.titles.lock().unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0], ("c1".to_string(), "A Fine Title".to_string()));
    }
}
