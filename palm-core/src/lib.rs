//! palm-core: Core types and the deterministic parts of Palm Insight
//! (question bank, scoring engine, insight result shape, flow state machine)

pub mod bank;
pub mod branch;
pub mod flow;
pub mod insight;
pub mod responses;
pub mod scoring;
pub mod share;

pub use bank::{BankError, Phase, Question, QuestionBank, QuestionOption};
pub use branch::{BranchCode, MatchLevel, UnknownBranch};
pub use flow::{
    Action, Command, Event, FlowContext, FlowController, FlowError, FlowTimings, Session, Stage,
    Step, Timer, TimerKind,
};
pub use insight::{
    ACADEMIC_FRAMEWORK, BranchMatch, DEFAULT_INSTITUTION, InsightContent, InsightRequest,
    InsightResult, InsightSource, PalmInsights, comparisons,
};
pub use responses::{Answer, Confidence, ResponseSet};
pub use scoring::{
    RankedResult, RankedScore, ScoreTable, ScoringPolicy, evaluate, rank, score_responses,
};
pub use share::ShareMessage;
