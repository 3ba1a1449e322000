//! Calculator module for evaluating arithmetic expressions.
//!
//! This module provides functionality to:
//! - Reject input outside the calculator vocabulary before parsing
//! - Tokenize and evaluate expressions with standard precedence
//! - Format results for display
//! - Copy results to the clipboard

mod clipboard;
mod detection;
mod error;
mod evaluation;
mod rpn;
mod tokens;

pub use clipboard::{ClipboardError, copy_result};
pub use detection::check_allowed;
pub use error::CalcError;
pub use evaluation::{
    AngleUnit, ERROR_TEXT, Evaluation, Evaluator, evaluate_expression, format_result,
};
pub use tokens::Function;
