// src/quiz/mod.rs

//! Timed quiz engine.
//!
//! A `QuizSession` is a plain value: every operation takes the current time explicitly and
//! mutates the session in place through `QuizSession::apply`. `LiveSession` adds the
//! runtime around it (mutex, ticker, hooks).

pub mod builder;
pub mod clock;
pub mod error;
pub mod grader;
pub mod integrity;
pub mod live;
pub mod model;
pub mod reducer;
pub mod registry;
pub mod tracker;
pub mod view;

pub use builder::{RandomSource, SessionBuilder, create_session};
pub use clock::{Clock, ManualClock, SystemClock, TimeStatus};
pub use error::QuizError;
pub use integrity::{GestureKind, IntegrityPolicy, IntegritySignal};
pub use live::{LiveSession, NoHooks, SessionHooks};
pub use model::{
    Assignment, AssignmentConfig, AssignmentKind, Completion, PromptKind, QuestionDefinition,
    QuizOption, QuizResult, QuizSession, SessionQuestion, SessionStatus, TerminationReason,
    Verdict,
};
pub use reducer::{SessionEvent, Transition};
pub use registry::SessionRegistry;
pub use view::{PublicQuestion, SessionView};
