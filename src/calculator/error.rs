use thiserror::Error;

/// Why an expression produced no value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Nothing to evaluate.
    #[error("empty expression")]
    Empty,

    /// A character outside the calculator vocabulary.
    #[error("character not allowed in expression: {found:?}")]
    Rejected { found: char },

    /// A letter sequence that is not a known function.
    #[error("unknown function: {word}")]
    UnknownWord { word: String },

    /// Malformed expression (unbalanced parentheses, dangling operators...).
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Evaluated, but the value is NaN or infinite.
    #[error("result is not a finite number: {0}")]
    NonFinite(f64),
}

impl CalcError {
    /// Whether this failure means "no result" rather than "Error".
    ///
    /// Empty and rejected input never reach the parser and leave the
    /// caller's state untouched; everything else is shown as `Error`.
    pub fn is_no_result(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Rejected { .. } | Self::UnknownWord { .. }
        )
    }
}

pub(crate) fn syntax(message: impl Into<String>) -> CalcError {
    CalcError::Syntax(message.into())
}
