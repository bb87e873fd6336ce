//! Interaction flow controller.
//!
//! Stages: `Welcome -> NameInput -> Questioning(0..N) -> ConfidenceCheck ->
//! Interpreting -> Result`, with `Restart` back to `Welcome` from anywhere.
//!
//! The controller is a pure state machine. It never sleeps and never performs
//! I/O; instead each transition returns [`Command`]s (timers to schedule, an
//! insight request to run) and the host feeds the outcomes back as [`Event`]s.
//! Every timer and insight request is tagged with the session generation that
//! issued it. `Restart` bumps the generation, so anything still in flight from
//! the previous session is ignored when it lands.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bank::{BankError, Question, QuestionBank};
use crate::insight::{DEFAULT_INSTITUTION, InsightRequest, InsightResult};
use crate::responses::{Confidence, ResponseSet};
use crate::scoring::{ScoringPolicy, evaluate};

/// Delays that sequence the visual transitions and the analysis period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTimings {
    pub begin_settle: Duration,
    pub name_settle: Duration,
    pub question_settle: Duration,
    pub final_question_settle: Duration,
    pub status_interval: Duration,
    /// Measured from entering `Interpreting`.
    pub min_interpreting_dwell: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            begin_settle: Duration::from_millis(500),
            name_settle: Duration::from_millis(500),
            question_settle: Duration::from_millis(350),
            final_question_settle: Duration::from_millis(500),
            status_interval: Duration::from_millis(900),
            min_interpreting_dwell: Duration::from_millis(3600),
        }
    }
}

pub fn default_status_messages(institution: &str) -> Vec<String> {
    vec![
        "Reading cognitive patterns...".to_string(),
        "Identifying learning preferences...".to_string(),
        "Simulating engineering scenarios...".to_string(),
        format!("Aligning insights with {institution} branches..."),
    ]
}

/// Fixed inputs shared by every session.
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub bank: QuestionBank,
    pub policy: ScoringPolicy,
    pub timings: FlowTimings,
    pub institution: String,
    pub status_messages: Vec<String>,
}

impl FlowContext {
    pub fn new(bank: QuestionBank) -> Result<Self, BankError> {
        bank.validate()?;
        Ok(Self {
            bank,
            policy: ScoringPolicy::default(),
            timings: FlowTimings::default(),
            institution: DEFAULT_INSTITUTION.to_string(),
            status_messages: default_status_messages(DEFAULT_INSTITUTION),
        })
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timings(mut self, timings: FlowTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Also rewrites the default status messages that mention the institution.
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self.status_messages = default_status_messages(&self.institution);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Welcome,
    NameInput,
    Questioning {
        index: usize,
    },
    ConfidenceCheck,
    Interpreting,
    Result,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::NameInput => "name-input",
            Stage::Questioning { .. } => "questioning",
            Stage::ConfidenceCheck => "confidence-check",
            Stage::Interpreting => "interpreting",
            Stage::Result => "result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Begin,
    SubmitName(String),
    /// Option index within the current question.
    Answer(usize),
    Confirm(Confidence),
    Restart,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Begin => "begin",
            Action::SubmitName(_) => "submit-name",
            Action::Answer(_) => "answer",
            Action::Confirm(_) => "confirm",
            Action::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Finish a visual transition into the given stage.
    Settle(Stage),
    RotateStatus,
    DwellElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub generation: u64,
    pub delay: Duration,
    pub kind: TimerKind,
}

/// Side effects the host must carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Schedule(Timer),
    RequestInsight(Box<InsightRequest>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Action(Action),
    TimerFired(Timer),
    InsightReady {
        generation: u64,
        result: Box<InsightResult>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("a transition is still settling")]
    Busy,

    #[error("{action} is not available in the {stage} stage")]
    InvalidAction {
        action: &'static str,
        stage: &'static str,
    },

    #[error("name must not be blank")]
    EmptyName,

    #[error("option {index} does not exist (question has {count})")]
    NoSuchOption { index: usize, count: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Interpreting {
    status_step: usize,
    dwell_elapsed: bool,
    staged: Option<InsightResult>,
}

/// One quiz run. Cloned and replaced by every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    generation: u64,
    stage: Stage,
    settling: Option<Stage>,
    responses: ResponseSet,
    interpreting: Interpreting,
    result: Option<InsightResult>,
}

/// Outcome of one transition: the next session and the effects it asks for.
#[derive(Debug, Clone)]
pub struct Step {
    pub session: Session,
    pub commands: Vec<Command>,
}

impl Session {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// True while a visual transition is in progress.
    pub fn is_settling(&self) -> bool {
        self.settling.is_some()
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn name(&self) -> &str {
        self.responses.name()
    }

    pub fn first_name(&self) -> &str {
        self.name().split_whitespace().next().unwrap_or("")
    }

    /// Only ever `Some` in the `Result` stage.
    pub fn result(&self) -> Option<&InsightResult> {
        self.result.as_ref()
    }

    /// The question on screen with its 0-based index and the bank size.
    pub fn current_question<'a>(
        &self,
        ctx: &'a FlowContext,
    ) -> Option<(usize, usize, &'a Question)> {
        match self.stage {
            Stage::Questioning { index } => ctx.bank.get(index).map(|q| (index, ctx.bank.len(), q)),
            _ => None,
        }
    }

    /// Rotating status line while interpreting; holds on the last message.
    pub fn status_message<'a>(&self, ctx: &'a FlowContext) -> Option<&'a str> {
        if self.stage != Stage::Interpreting {
            return None;
        }
        ctx.status_messages
            .get(self.interpreting.status_step)
            .or_else(|| ctx.status_messages.last())
            .map(String::as_str)
    }

    pub fn apply(&self, event: Event, ctx: &FlowContext) -> Result<Step, FlowError> {
        let mut next = self.clone();
        let mut commands = Vec::new();

        match event {
            Event::Action(action) => next.on_action(action, ctx, &mut commands)?,
            Event::TimerFired(timer) => {
                if timer.generation != self.generation {
                    tracing::debug!(
                        timer_generation = timer.generation,
                        generation = self.generation,
                        "ignoring stale timer"
                    );
                } else {
                    next.on_timer(timer.kind, ctx, &mut commands);
                }
            }
            Event::InsightReady { generation, result } => {
                if generation != self.generation {
                    tracing::debug!(
                        result_generation = generation,
                        generation = self.generation,
                        "ignoring stale insight"
                    );
                } else {
                    next.on_insight(*result);
                }
            }
        }

        Ok(Step {
            session: next,
            commands,
        })
    }

    fn timer(&self, delay: std::time::Duration, kind: TimerKind) -> Command {
        Command::Schedule(Timer {
            generation: self.generation,
            delay,
            kind,
        })
    }

    fn settle_into(
        &mut self,
        target: Stage,
        delay: std::time::Duration,
        commands: &mut Vec<Command>,
    ) {
        self.settling = Some(target);
        commands.push(self.timer(delay, TimerKind::Settle(target)));
    }

    fn on_action(
        &mut self,
        action: Action,
        ctx: &FlowContext,
        commands: &mut Vec<Command>,
    ) -> Result<(), FlowError> {
        if action == Action::Restart {
            let generation = self.generation + 1;
            tracing::info!(generation, from = self.stage.name(), "session restarted");
            *self = Session {
                generation,
                ..Session::default()
            };
            return Ok(());
        }

        if self.settling.is_some() {
            return Err(FlowError::Busy);
        }

        let invalid = FlowError::InvalidAction {
            action: action.name(),
            stage: self.stage.name(),
        };

        match (self.stage, action) {
            (Stage::Welcome, Action::Begin) => {
                self.settle_into(Stage::NameInput, ctx.timings.begin_settle, commands);
            }

            (Stage::NameInput, Action::SubmitName(raw)) => {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(FlowError::EmptyName);
                }
                self.responses.set_name(name);
                self.settle_into(
                    Stage::Questioning { index: 0 },
                    ctx.timings.name_settle,
                    commands,
                );
            }

            (Stage::Questioning { index }, Action::Answer(choice)) => {
                let question = ctx.bank.get(index).ok_or(invalid)?;
                let option = question.options.get(choice).ok_or(FlowError::NoSuchOption {
                    index: choice,
                    count: question.options.len(),
                })?;
                self.responses.record(question.id.clone(), option.label.clone());

                if index + 1 < ctx.bank.len() {
                    self.settle_into(
                        Stage::Questioning { index: index + 1 },
                        ctx.timings.question_settle,
                        commands,
                    );
                } else {
                    self.settle_into(
                        Stage::ConfidenceCheck,
                        ctx.timings.final_question_settle,
                        commands,
                    );
                }
            }

            (Stage::ConfidenceCheck, Action::Confirm(confidence)) => {
                self.responses.set_confidence(confidence);
                let ranked = evaluate(&ctx.bank, &self.responses, &ctx.policy);
                let top = ranked.top();
                tracing::info!(
                    generation = self.generation,
                    top = %top.code,
                    score = top.score,
                    confidence = %confidence,
                    "responses scored"
                );

                self.stage = Stage::Interpreting;
                self.interpreting = Interpreting::default();

                commands.push(Command::RequestInsight(Box::new(InsightRequest {
                    generation: self.generation,
                    name: self.responses.name().to_string(),
                    top: top.code,
                    ranked,
                    responses: self.responses.clone(),
                    institution: ctx.institution.clone(),
                })));
                if ctx.status_messages.len() > 1 {
                    commands.push(self.timer(ctx.timings.status_interval, TimerKind::RotateStatus));
                }
                commands.push(
                    self.timer(ctx.timings.min_interpreting_dwell, TimerKind::DwellElapsed),
                );
            }

            _ => return Err(invalid),
        }

        Ok(())
    }

    fn on_timer(&mut self, kind: TimerKind, ctx: &FlowContext, commands: &mut Vec<Command>) {
        match kind {
            TimerKind::Settle(target) => {
                if self.settling == Some(target) {
                    self.stage = target;
                    self.settling = None;
                }
            }
            TimerKind::RotateStatus => {
                if self.stage != Stage::Interpreting {
                    return;
                }
                if self.interpreting.status_step + 1 < ctx.status_messages.len() {
                    self.interpreting.status_step += 1;
                }
                if self.interpreting.status_step + 1 < ctx.status_messages.len() {
                    commands.push(self.timer(ctx.timings.status_interval, TimerKind::RotateStatus));
                }
            }
            TimerKind::DwellElapsed => {
                if self.stage == Stage::Interpreting {
                    self.interpreting.dwell_elapsed = true;
                    self.try_finish();
                }
            }
        }
    }

    fn on_insight(&mut self, result: InsightResult) {
        if self.stage != Stage::Interpreting || self.interpreting.staged.is_some() {
            tracing::debug!(
                stage = self.stage.name(),
                "insight arrived outside interpreting; dropped"
            );
            return;
        }
        self.interpreting.staged = Some(result);
        self.try_finish();
    }

    /// `Result` needs both a result and the minimum dwell.
    fn try_finish(&mut self) {
        if !self.interpreting.dwell_elapsed {
            return;
        }
        if let Some(result) = self.interpreting.staged.take() {
            tracing::info!(
                generation = self.generation,
                top = %result.top,
                source = ?result.source,
                "insight ready"
            );
            self.result = Some(result);
            self.stage = Stage::Result;
        }
    }
}

/// Owns the context and the current session; the host talks to it through events.
#[derive(Debug, Clone)]
pub struct FlowController {
    ctx: FlowContext,
    session: Session,
}

impl FlowController {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            session: Session::default(),
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle(&mut self, event: Event) -> Result<Vec<Command>, FlowError> {
        let step = self.session.apply(event, &self.ctx)?;
        self.session = step.session;
        Ok(step.commands)
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Command>, FlowError> {
        self.handle(Event::Action(action))
    }
}
