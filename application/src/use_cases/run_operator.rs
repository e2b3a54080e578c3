//! Run Operator use case.
//!
//! Drives the investigate loop: the model proposes one tool call per turn,
//! the guard vets it, the executor runs it, and the observation is fed back
//! until the model answers or a limit is hit.

use crate::operator::{
    Executor, GuardOutcome, Planner, PlannerError, SafetyGuard, ToolCallError, ToolRegistry,
};
use crate::ports::confirmation::{AutoApproveConfirmation, ConfirmationPort};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoOperatorProgress, OperatorProgressNotifier};
use gaia_domain::operator::observation;
use gaia_domain::util::truncate_str;
use gaia_domain::{
    ConversationState, DecisionAction, DecisionError, GuardOptions, OperatorPolicy,
    format_observation,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Ways an operator run ends without an answer.
///
/// [`MaxStepsReached`](OperatorError::MaxStepsReached),
/// [`RepeatedParseFailures`](OperatorError::RepeatedParseFailures) and
/// [`Gateway`](OperatorError::Gateway) carry the best partial answer;
/// callers should still show it.
#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("goal cannot be empty")]
    EmptyGoal,

    #[error("model is not available: {0}")]
    ModelUnavailable(#[source] GatewayError),

    #[error("max steps reached")]
    MaxStepsReached { partial: String },

    #[error("repeated parse failures: {source}")]
    RepeatedParseFailures {
        partial: String,
        source: DecisionError,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Gateway error: {source}")]
    Gateway {
        partial: String,
        source: GatewayError,
    },
}

impl OperatorError {
    pub fn partial_answer(&self) -> Option<&str> {
        match self {
            OperatorError::MaxStepsReached { partial }
            | OperatorError::RepeatedParseFailures { partial, .. }
            | OperatorError::Gateway { partial, .. } => Some(partial),
            _ => None,
        }
    }

    pub fn is_max_steps(&self) -> bool {
        matches!(self, OperatorError::MaxStepsReached { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OperatorError::Cancelled)
    }
}

impl From<ToolCallError> for OperatorError {
    fn from(e: ToolCallError) -> Self {
        match e {
            ToolCallError::Cancelled => OperatorError::Cancelled,
        }
    }
}

/// Per-run limits and safety settings.
#[derive(Debug, Clone, Default)]
pub struct RunOperatorInput {
    pub policy: OperatorPolicy,
    pub guard: GuardOptions,
}

impl RunOperatorInput {
    pub fn new(policy: OperatorPolicy, guard: GuardOptions) -> Self {
        Self { policy, guard }
    }
}

pub struct RunOperatorUseCase {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<ToolRegistry>,
    model: String,
    confirmation: Arc<dyn ConfirmationPort>,
    cancellation_token: Option<CancellationToken>,
}

impl RunOperatorUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        registry: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            registry,
            model: model.into(),
            confirmation: Arc::new(AutoApproveConfirmation),
            cancellation_token: None,
        }
    }

    /// Port asked before medium-risk tool calls.
    pub fn with_confirmation(mut self, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the operator loop without progress callbacks
    pub async fn execute(
        &self,
        goal: &str,
        input: RunOperatorInput,
    ) -> Result<String, OperatorError> {
        self.execute_with_progress(goal, input, &NoOperatorProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        goal: &str,
        input: RunOperatorInput,
        progress: &dyn OperatorProgressNotifier,
    ) -> Result<String, OperatorError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(OperatorError::EmptyGoal);
        }
        self.ensure_model().await?;
        let mut state = ConversationState::new(goal);
        self.run(&mut state, &input, progress).await
    }

    async fn ensure_model(&self) -> Result<(), OperatorError> {
        let token = self.cancellation_token.clone().unwrap_or_default();
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(OperatorError::Cancelled),
            result = self.gateway.ensure_model(&self.model) => result,
        };
        match result {
            Ok(()) => Ok(()),
            Err(GatewayError::Cancelled) => Err(OperatorError::Cancelled),
            Err(e) => Err(OperatorError::ModelUnavailable(e)),
        }
    }

    /// The loop itself, over a caller-owned state.
    pub async fn run(
        &self,
        state: &mut ConversationState,
        input: &RunOperatorInput,
        progress: &dyn OperatorProgressNotifier,
    ) -> Result<String, OperatorError> {
        if state.goal().trim().is_empty() {
            return Err(OperatorError::EmptyGoal);
        }

        let policy = input.policy.normalized();
        let token = self.cancellation_token.clone().unwrap_or_default();
        let planner = Planner::new(self.gateway.clone(), &self.model);
        let guard =
            SafetyGuard::new(input.guard.clone()).with_confirmation(self.confirmation.clone());
        let executor = Executor::new(policy.output_max_bytes);
        let tools = self.registry.definitions();

        info!(
            "Starting operator: {} (max {} steps)",
            truncate_str(state.goal(), 100),
            policy.max_steps
        );

        let mut parse_failures = 0;
        for step in 1..=policy.max_steps {
            if token.is_cancelled() {
                return Err(OperatorError::Cancelled);
            }
            progress.on_step_start(step, policy.max_steps);

            let parsed = match planner.decide(state, &tools, &token).await {
                Ok(parsed) => parsed,
                Err(PlannerError::Invalid(e)) => {
                    parse_failures += 1;
                    warn!(attempt = parse_failures, error = %e, "Invalid planner reply");
                    progress.on_parse_error(&e);
                    self.observe(state, observation::invalid_response(&e), progress);
                    if parse_failures >= policy.max_parse_failures {
                        return Err(OperatorError::RepeatedParseFailures {
                            partial: state.last_answer_or_partial().to_string(),
                            source: e,
                        });
                    }
                    continue;
                }
                Err(PlannerError::Cancelled) => return Err(OperatorError::Cancelled),
                Err(PlannerError::Gateway(e)) => {
                    warn!(error = %e, "Planner request failed");
                    return Err(OperatorError::Gateway {
                        partial: state.last_answer_or_partial().to_string(),
                        source: e,
                    });
                }
            };
            parse_failures = 0;

            state.append_decision(parsed.raw);
            progress.on_decision(&parsed.decision);

            let (name, args) = match parsed.decision.action {
                DecisionAction::Answer { content } => {
                    info!("Operator answered after {} step(s)", step);
                    return Ok(content.trim().to_string());
                }
                DecisionAction::Tool { name, args } => (name, args),
            };

            let Some(tool) = self.registry.get(&name) else {
                self.observe(state, observation::unknown_tool(&name), progress);
                continue;
            };

            match guard.check(&tool.definition, &args, &token).await {
                GuardOutcome::Allowed => {}
                GuardOutcome::Blocked(reason) => {
                    self.observe(state, observation::blocked(&reason), progress);
                    continue;
                }
                GuardOutcome::Cancelled => return Err(OperatorError::Cancelled),
            }

            if guard.options().dry_run {
                self.observe(state, observation::dry_run(&name, &args), progress);
                continue;
            }

            debug!(tool = %name, "Executing tool");
            let output = executor.run(&tool, &args, &token).await?;
            let text = format_observation(&output.stdout, &output.stderr, output.error.as_deref());
            self.observe(state, text, progress);
        }

        warn!("Operator stopped after {} steps without an answer", policy.max_steps);
        Err(OperatorError::MaxStepsReached {
            partial: state.last_answer_or_partial().to_string(),
        })
    }

    fn observe(
        &self,
        state: &mut ConversationState,
        text: String,
        progress: &dyn OperatorProgressNotifier,
    ) {
        progress.on_observation(&text);
        state.append_observation(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::command_runner::{CommandError, CommandOutput, CommandRunner};
    use crate::ports::confirmation::{AutoRejectConfirmation, ConfirmationError};
    use async_trait::async_trait;
    use gaia_domain::{CompletionRequest, Role};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies; repeats the last one when exhausted.
    struct Scripted {
        replies: Mutex<VecDeque<String>>,
        last: Mutex<String>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                last: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for Scripted {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, GatewayError> {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.replies.lock().unwrap().pop_front() {
                *last = next;
            }
            Ok(last.clone())
        }
    }

    struct StubRunner {
        stdout: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl StubRunner {
        fn new(stdout: &'static str) -> Arc<Self> {
            Arc::new(Self {
                stdout,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for StubRunner {
        async fn run(
            &self,
            command: &str,
            _cancel: &CancellationToken,
        ) -> Result<CommandOutput, CommandError> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(CommandOutput::new(self.stdout, ""))
        }
    }

    /// Fails every call after the first `ok_calls` replies.
    struct Flaky {
        inner: Arc<Scripted>,
        ok_calls: usize,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl LlmGateway for Flaky {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if n > self.ok_calls {
                return Err(GatewayError::ConnectionError("connection reset".to_string()));
            }
            self.inner.complete(request).await
        }
    }

    /// Answers the first `ok_calls` requests, then hangs.
    struct Hanging {
        inner: Arc<Scripted>,
        ok_calls: usize,
        calls: Mutex<usize>,
        ensure_hangs: bool,
    }

    impl Hanging {
        fn new(replies: &[&str], ok_calls: usize) -> Arc<Self> {
            Arc::new(Self {
                inner: Scripted::new(replies),
                ok_calls,
                calls: Mutex::new(0),
                ensure_hangs: false,
            })
        }
    }

    #[async_trait]
    impl LlmGateway for Hanging {
        fn provider_name(&self) -> &str {
            "hanging"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if n > self.ok_calls {
                std::future::pending::<()>().await;
            }
            self.inner.complete(request).await
        }

        async fn ensure_model(&self, _model: &str) -> Result<(), GatewayError> {
            if self.ensure_hangs {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    /// Runner whose process is killed by Ctrl-C.
    struct Interrupted;

    #[async_trait]
    impl CommandRunner for Interrupted {
        async fn run(
            &self,
            _command: &str,
            _cancel: &CancellationToken,
        ) -> Result<CommandOutput, CommandError> {
            Err(CommandError::Cancelled)
        }
    }

    /// A prompt nobody answers.
    struct Unanswered;

    #[async_trait]
    impl ConfirmationPort for Unanswered {
        async fn confirm(&self, _message: &str) -> Result<bool, ConfirmationError> {
            std::future::pending().await
        }
    }

    fn cancel_soon(token: &CancellationToken) {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            token.cancel();
        });
    }

    async fn within_two_seconds<T>(fut: impl std::future::Future<Output = T>) -> T {
        tokio::time::timeout(std::time::Duration::from_secs(2), fut)
            .await
            .unwrap()
    }

    struct PanicConfirmation;

    #[async_trait]
    impl ConfirmationPort for PanicConfirmation {
        async fn confirm(&self, message: &str) -> Result<bool, ConfirmationError> {
            panic!("confirmation should not be requested: {}", message);
        }
    }

    const DF: &str = r#"{"action":"tool","name":"run_cmd","args":{"cmd":"df -h"}}"#;
    const ANSWER: &str = r#"{"action":"answer","content":"  /var/log is full  "}"#;

    fn use_case(gateway: Arc<Scripted>, runner: Arc<StubRunner>) -> RunOperatorUseCase {
        let registry = Arc::new(ToolRegistry::with_defaults(runner));
        RunOperatorUseCase::new(gateway, registry, "mistral")
    }

    fn input(max_steps: usize, guard: GuardOptions) -> RunOperatorInput {
        RunOperatorInput::new(OperatorPolicy::default().with_max_steps(max_steps), guard)
    }

    #[tokio::test]
    async fn test_single_step_then_max_steps() {
        let runner = StubRunner::new("ok");
        let uc = use_case(Scripted::new(&[DF]), runner.clone());
        let mut state = ConversationState::new("why is disk full?");

        let err = uc
            .run(&mut state, &input(1, GuardOptions::new()), &NoOperatorProgress)
            .await
            .unwrap_err();

        assert!(err.is_max_steps());
        assert_eq!(err.partial_answer(), Some(DF));
        assert_eq!(state.steps().len(), 2);
        assert_eq!(state.steps()[0].role, Role::Assistant);
        assert_eq!(state.steps()[1].role, Role::User);
        assert!(state.steps()[1].content.contains("ok"));
        assert_eq!(*runner.calls.lock().unwrap(), ["df -h"]);
    }

    #[tokio::test]
    async fn test_tool_then_answer() {
        let uc = use_case(Scripted::new(&[DF, ANSWER]), StubRunner::new("90% used"));
        let answer = uc
            .execute("why is disk full?", input(5, GuardOptions::new()))
            .await
            .unwrap();
        assert_eq!(answer, "/var/log is full");
    }

    #[tokio::test]
    async fn test_empty_goal_rejected() {
        let uc = use_case(Scripted::new(&[ANSWER]), StubRunner::new(""));
        let err = uc.execute("   ", RunOperatorInput::default()).await.unwrap_err();
        assert!(matches!(err, OperatorError::EmptyGoal));
    }

    #[tokio::test]
    async fn test_parse_failures_escalate() {
        let uc = use_case(Scripted::new(&["not json at all"]), StubRunner::new(""));
        let mut state = ConversationState::new("goal");
        let err = uc
            .run(&mut state, &input(10, GuardOptions::new()), &NoOperatorProgress)
            .await
            .unwrap_err();

        match &err {
            OperatorError::RepeatedParseFailures { partial, source } => {
                assert_eq!(partial, "goal");
                assert!(matches!(source, DecisionError::InvalidJson(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // One corrective observation per failure, no decision steps
        assert_eq!(state.steps().len(), 2);
        assert!(state.steps().iter().all(|s| s.role == Role::User));
        assert!(state.steps()[0]
            .content
            .starts_with("error: Invalid response: "));
        assert!(state.steps()[0]
            .content
            .ends_with("Respond with valid JSON only."));
    }

    #[tokio::test]
    async fn test_valid_decision_resets_parse_failures() {
        let uc = use_case(
            Scripted::new(&["garbage", DF, "garbage", ANSWER]),
            StubRunner::new("ok"),
        );
        let answer = uc
            .execute("goal", input(10, GuardOptions::new()))
            .await
            .unwrap();
        assert_eq!(answer, "/var/log is full");
    }

    #[tokio::test]
    async fn test_unknown_tool_observed() {
        let uc = use_case(
            Scripted::new(&[
                r#"{"action":"tool","name":"read_file","args":{"path":"/etc/hosts"}}"#,
                ANSWER,
            ]),
            StubRunner::new(""),
        );
        let mut state = ConversationState::new("goal");
        let answer = uc
            .run(&mut state, &input(5, GuardOptions::new()), &NoOperatorProgress)
            .await
            .unwrap();
        assert_eq!(answer, "/var/log is full");
        assert_eq!(state.steps()[1].content, "error: Unknown tool: read_file");
    }

    #[tokio::test]
    async fn test_denylisted_command_blocked() {
        let runner = StubRunner::new("");
        let uc = use_case(
            Scripted::new(&[
                r#"{"action":"tool","name":"run_cmd","args":{"cmd":"sudo rm -rf /"}}"#,
            ]),
            runner.clone(),
        );
        let mut state = ConversationState::new("goal");
        let err = uc
            .run(
                &mut state,
                &input(1, GuardOptions::new().with_denylist(["rm -rf"])),
                &NoOperatorProgress,
            )
            .await
            .unwrap_err();
        assert!(err.is_max_steps());
        assert_eq!(
            state.steps()[1].content,
            "blocked: command blocked by denylist: rm -rf"
        );
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_declined_confirmation_blocks() {
        let runner = StubRunner::new("");
        let uc = use_case(Scripted::new(&[DF]), runner.clone())
            .with_confirmation(Arc::new(AutoRejectConfirmation));
        let mut state = ConversationState::new("goal");
        uc.run(
            &mut state,
            &input(1, GuardOptions::new().with_confirm_medium_risk(true)),
            &NoOperatorProgress,
        )
        .await
        .unwrap_err();
        assert_eq!(state.steps()[1].content, "blocked: user declined");
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_never_executes_or_confirms() {
        let runner = StubRunner::new("");
        let uc = use_case(Scripted::new(&[DF]), runner.clone())
            .with_confirmation(Arc::new(PanicConfirmation));
        let mut state = ConversationState::new("goal");
        uc.run(
            &mut state,
            &input(
                1,
                GuardOptions::new()
                    .with_confirm_medium_risk(true)
                    .with_dry_run(true),
            ),
            &NoOperatorProgress,
        )
        .await
        .unwrap_err();
        assert_eq!(state.steps()[1].content, "dry_run: Would run: run_cmd df -h");
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_yes_skips_confirmation() {
        let runner = StubRunner::new("ok");
        let uc = use_case(Scripted::new(&[DF]), runner.clone())
            .with_confirmation(Arc::new(PanicConfirmation));
        let mut state = ConversationState::new("goal");
        uc.run(
            &mut state,
            &input(
                1,
                GuardOptions::new()
                    .with_confirm_medium_risk(true)
                    .with_yes(true),
            ),
            &NoOperatorProgress,
        )
        .await
        .unwrap_err();
        assert_eq!(*runner.calls.lock().unwrap(), ["df -h"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_step() {
        let token = CancellationToken::new();
        token.cancel();
        let uc = use_case(Scripted::new(&[ANSWER]), StubRunner::new(""))
            .with_cancellation(token);
        let err = uc
            .execute("goal", RunOperatorInput::default())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_progress_sees_every_observation() {
        struct Collect(Mutex<Vec<String>>);
        impl OperatorProgressNotifier for Collect {
            fn on_observation(&self, observation: &str) {
                self.0.lock().unwrap().push(observation.to_string());
            }
        }

        let uc = use_case(Scripted::new(&[DF, "oops", ANSWER]), StubRunner::new("ok"));
        let progress = Collect(Mutex::new(Vec::new()));
        uc.execute_with_progress("goal", input(5, GuardOptions::new()), &progress)
            .await
            .unwrap();
        let seen = progress.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("ok"));
        assert!(seen[1].starts_with("error: Invalid response"));
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_partial() {
        let gateway = Arc::new(Flaky {
            inner: Scripted::new(&[DF]),
            ok_calls: 1,
            calls: Mutex::new(0),
        });
        let registry = Arc::new(ToolRegistry::with_defaults(StubRunner::new("ok")));
        let uc = RunOperatorUseCase::new(gateway, registry, "mistral");
        let mut state = ConversationState::new("why is disk full?");

        let err = uc
            .run(&mut state, &input(5, GuardOptions::new()), &NoOperatorProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, OperatorError::Gateway { .. }));
        assert_eq!(err.partial_answer(), Some(DF));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(state.steps().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_while_confirming() {
        let runner = StubRunner::new("ok");
        let token = CancellationToken::new();
        let uc = use_case(Scripted::new(&[DF]), runner.clone())
            .with_confirmation(Arc::new(Unanswered))
            .with_cancellation(token.clone());

        cancel_soon(&token);
        let err = within_two_seconds(uc.execute(
            "goal",
            input(5, GuardOptions::new().with_confirm_medium_risk(true)),
        ))
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_execution() {
        let registry = Arc::new(ToolRegistry::with_defaults(Arc::new(Interrupted)));
        let uc = RunOperatorUseCase::new(Scripted::new(&[DF]), registry, "mistral");
        let mut state = ConversationState::new("goal");

        let err = uc
            .run(&mut state, &input(5, GuardOptions::new()), &NoOperatorProgress)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        // The decision was recorded, no observation followed
        assert_eq!(state.steps().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_second_decision() {
        let token = CancellationToken::new();
        let registry = Arc::new(ToolRegistry::with_defaults(StubRunner::new("ok")));
        let uc = RunOperatorUseCase::new(Hanging::new(&[DF], 1), registry, "mistral")
            .with_cancellation(token.clone());
        let mut state = ConversationState::new("goal");

        cancel_soon(&token);
        let err = within_two_seconds(uc.run(
            &mut state,
            &input(5, GuardOptions::new()),
            &NoOperatorProgress,
        ))
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(state.steps().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_during_model_check() {
        let token = CancellationToken::new();
        let gateway = Arc::new(Hanging {
            inner: Scripted::new(&[ANSWER]),
            ok_calls: usize::MAX,
            calls: Mutex::new(0),
            ensure_hangs: true,
        });
        let registry = Arc::new(ToolRegistry::with_defaults(StubRunner::new("")));
        let uc = RunOperatorUseCase::new(gateway.clone(), registry, "mistral")
            .with_cancellation(token.clone());

        cancel_soon(&token);
        let err = within_two_seconds(uc.execute("goal", RunOperatorInput::default()))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*gateway.calls.lock().unwrap(), 0);
    }
}
