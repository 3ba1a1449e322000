//! AI assistant for the calculator.
//!
//! Two operations are offered: explaining a finished calculation and
//! turning a misheard voice phrase into an expression. Both go through a
//! single [`Generator`] capability; the production one is backed by the
//! `llm` crate.

mod assistant;
mod client;
mod prompt;
mod render;
mod task;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub use assistant::{
    AiRequest, AiResponse, Assistant, CorrectRequest, CorrectResponse, ExplainRequest,
    ExplainResponse, parse_correction,
};
pub use client::{Generator, LlmGenerator};
pub use prompt::{Prompt, PromptBuilder};
pub use render::render_markdown;
pub use task::{AiCompletion, AiTasks};

/// The assistant affordances. Each one allows a single request in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AiKind {
    Explain,
    Correct,
}

impl fmt::Display for AiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explain => write!(f, "explanation"),
            Self::Correct => write!(f, "correction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    #[error("AI assistant is not configured: {0}")]
    Config(String),

    /// Transport or model failure.
    #[error("AI service failed: {0}")]
    Upstream(String),

    #[error("AI {0} timed out after {1:?}")]
    Timeout(AiKind, Duration),

    #[error("an AI {0} is already in progress")]
    Busy(AiKind),

    #[error("AI response could not be used: {0}")]
    MalformedResponse(String),
}
