//! Calculator session state machine.
//!
//! Owns the display, the pending expression and the history for one
//! interactive session. Every mutation goes through [`Session::press`] or one
//! of the assistant hooks, all called from the single event-loop task.

use tracing::debug;

use super::history::{History, HistoryItem};
use super::keypad::Key;
use crate::calculator::Evaluator;

/// What a key press did, for the caller to surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    /// Display or expression changed (or nothing to do).
    Updated,
    /// `=` produced a result (a value or `Error`), now on the display.
    Evaluated(String),
    /// `=` found nothing to evaluate. State is unchanged.
    InvalidExpression,
}

#[derive(Clone, Debug)]
pub struct Session {
    evaluator: Evaluator,
    display: String,
    expression: String,
    is_result: bool,
    history: History,
}

impl Session {
    pub fn new(evaluator: Evaluator, history: History) -> Self {
        Self {
            evaluator,
            display: "0".to_string(),
            expression: String::new(),
            is_result: false,
            history,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_result(&self) -> bool {
        self.is_result
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn press(&mut self, key: Key) -> PressOutcome {
        if self.is_result && key.starts_input() {
            let text = if key == Key::Decimal {
                "0.".to_string()
            } else {
                key.text()
            };
            self.display = text.clone();
            self.expression = text;
            self.is_result = false;
            return PressOutcome::Updated;
        }

        self.is_result = false;

        match key {
            Key::Number(_) | Key::Function(_) | Key::Paren(_) => {
                let text = key.text();
                if self.display == "0" {
                    self.display = text.clone();
                } else {
                    self.display.push_str(&text);
                }
                self.expression.push_str(&text);
            }

            Key::Operator(op) => {
                self.expression.push(op);
                self.display = op.to_string();
            }

            Key::Decimal => {
                if !self.display.contains('.') {
                    self.display.push('.');
                    self.expression.push('.');
                }
            }

            Key::Clear => {
                self.display = "0".to_string();
                self.expression.clear();
            }

            Key::Backspace => {
                if self.expression.pop().is_some() {
                    let last_operand = self
                        .expression
                        .rsplit(['+', '-', '*', '/'])
                        .next()
                        .unwrap_or_default();
                    self.display = if last_operand.is_empty() {
                        "0".to_string()
                    } else {
                        last_operand.to_string()
                    };
                }
            }

            Key::Equals => return self.equals(),
        }

        PressOutcome::Updated
    }

    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) -> Vec<PressOutcome> {
        keys.into_iter().map(|key| self.press(key)).collect()
    }

    fn equals(&mut self) -> PressOutcome {
        if self.expression.is_empty() {
            return PressOutcome::Updated;
        }

        let evaluation = self.evaluator.evaluate(&self.expression);
        let Some(result) = evaluation.text().map(str::to_string) else {
            debug!(expression = %self.expression, "Nothing to evaluate");
            return PressOutcome::InvalidExpression;
        };

        if !evaluation.is_value() {
            debug!(expression = %self.expression, "Expression evaluated to Error");
        }

        let expression = std::mem::replace(&mut self.expression, result.clone());
        self.history.push(HistoryItem::new(expression, result.clone()));
        self.display = result.clone();
        self.is_result = true;

        PressOutcome::Evaluated(result)
    }

    /// Load a past expression back into the display. Returns false if there
    /// is no entry at `index`.
    pub fn recall(&mut self, index: usize) -> bool {
        let Some(item) = self.history.get(index) else {
            return false;
        };
        self.expression = item.expression.clone();
        self.display = item.expression.clone();
        self.is_result = false;
        true
    }

    /// The `expression = result` text to explain, if the display shows a
    /// fresh result.
    pub fn explain_request(&self) -> Option<String> {
        if !self.is_result {
            return None;
        }
        self.history.latest().map(HistoryItem::calculation)
    }

    /// Replace the pending expression with an assistant's correction.
    pub fn apply_correction(&mut self, calculation: &str) {
        self.expression = calculation.to_string();
        self.display = calculation.to_string();
        self.is_result = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Evaluator::default(), History::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::keypad::parse_keys;

    fn typed(session: &mut Session, line: &str) -> Vec<PressOutcome> {
        session.press_all(parse_keys(line).unwrap())
    }

    #[test]
    fn test_number_replaces_initial_zero() {
        let mut session = Session::default();
        typed(&mut session, "7");
        assert_eq!(session.display(), "7");
        assert_eq!(session.expression(), "7");
    }

    #[test]
    fn test_operator_shows_operator() {
        let mut session = Session::default();
        typed(&mut session, "12+3");
        assert_eq!(session.expression(), "12+3");
        assert_eq!(session.display(), "3");
    }

    #[test]
    fn test_equals_pushes_history() {
        let mut session = Session::default();
        let outcomes = typed(&mut session, "2+2=");

        assert_eq!(outcomes.last(), Some(&PressOutcome::Evaluated("4".into())));
        assert_eq!(session.display(), "4");
        assert_eq!(session.expression(), "4");
        assert!(session.is_result());
        assert_eq!(session.history().latest(), Some(&HistoryItem::new("2+2", "4")));
    }

    #[test]
    fn test_digit_after_result_starts_fresh() {
        let mut session = Session::default();
        typed(&mut session, "2+2=5");
        assert_eq!(session.expression(), "5");
        assert!(!session.is_result());

        typed(&mut session, "=.");
        assert_eq!(session.expression(), "0.");
    }

    #[test]
    fn test_operator_after_result_appends() {
        let mut session = Session::default();
        typed(&mut session, "2+2=*3=");
        assert_eq!(session.display(), "12");
        assert_eq!(session.history().latest().unwrap().expression, "4*3");
    }

    #[test]
    fn test_error_result_is_displayed() {
        let mut session = Session::default();
        let outcomes = typed(&mut session, "5/0=");
        assert_eq!(outcomes.last(), Some(&PressOutcome::Evaluated("Error".into())));
        assert_eq!(session.display(), "Error");
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_invalid_expression_leaves_state() {
        let mut session = Session::default();
        session.apply_correction("2;3");
        let outcome = session.press(Key::Equals);

        assert_eq!(outcome, PressOutcome::InvalidExpression);
        assert_eq!(session.display(), "2;3");
        assert_eq!(session.expression(), "2;3");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_equals_on_empty_does_nothing() {
        let mut session = Session::default();
        assert_eq!(session.press(Key::Equals), PressOutcome::Updated);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_decimal_once_per_operand() {
        let mut session = Session::default();
        typed(&mut session, "1..5+2.");
        assert_eq!(session.expression(), "1.5+2.");
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut session = Session::default();
        typed(&mut session, "12+34<");
        assert_eq!(session.expression(), "12+3");
        assert_eq!(session.display(), "3");

        typed(&mut session, "<");
        assert_eq!(session.expression(), "12+");
        assert_eq!(session.display(), "0");

        typed(&mut session, "<");
        assert_eq!(session.expression(), "12");
        assert_eq!(session.display(), "12");

        typed(&mut session, "C");
        assert_eq!(session.display(), "0");
        assert_eq!(session.expression(), "");
    }

    #[test]
    fn test_clear_after_result() {
        let mut session = Session::default();
        typed(&mut session, "1+1=C");
        assert_eq!(session.display(), "0");
        assert!(!session.is_result());
    }

    #[test]
    fn test_functions_on_keypad() {
        let mut session = Session::default();
        typed(&mut session, "sin(30)=");
        assert_eq!(session.display(), "0.5");
    }

    #[test]
    fn test_recall_and_explain() {
        let mut session = Session::default();
        assert_eq!(session.explain_request(), None);

        typed(&mut session, "2^3=");
        assert_eq!(session.explain_request().as_deref(), Some("2^3 = 8"));

        assert!(session.recall(0));
        assert_eq!(session.expression(), "2^3");
        assert_eq!(session.explain_request(), None);
        assert!(!session.recall(5));
    }

    #[test]
    fn test_apply_correction() {
        let mut session = Session::default();
        session.apply_correction("25/5+2");
        assert_eq!(session.expression(), "25/5+2");
        assert!(!session.is_result());
        typed(&mut session, "=");
        assert_eq!(session.display(), "7");
    }
}
