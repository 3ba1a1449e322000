//! Prompt templates for the calculator assistant.

use super::AiKind;

/// A rendered prompt ready for a [`Generator`](super::Generator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: AiKind,
    pub text: String,
}

/// Builder for assistant prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Maximum length of user-supplied text (characters).
    max_input_length: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            max_input_length: 500,
        }
    }

    pub fn with_max_input_length(mut self, length: usize) -> Self {
        self.max_input_length = length;
        self
    }

    /// Prompt asking for a step-by-step explanation of `calculation`
    /// (an `expression = result` string).
    pub fn explain(&self, calculation: &str) -> Prompt {
        let text = format!(
            r#"You are an expert mathematical explainer. Your task is to break down complex calculations into simple, understandable steps.

The calculator evaluates sin, cos and tan in degrees, log is base 10, and ^ is exponentiation.

Calculation: {}

Explain the calculation step by step."#,
            self.truncate(calculation)
        );
        Prompt {
            kind: AiKind::Explain,
            text,
        }
    }

    /// Prompt asking to turn a misheard phrase and its correction into an
    /// expression the calculator accepts.
    pub fn correct(&self, original_input: &str, corrected_input: &str) -> Prompt {
        let text = format!(
            r#"You are an AI assistant that corrects misheard calculations.

The user originally said: {}

But they meant to say: {}

Return the corrected calculation, so it can be performed by the calculator.
Use only digits, the operators + - * / ^, parentheses and the functions sin( cos( tan( log( sqrt(.
Respond with JSON only, in the form {{"calculation": "<expression>"}}.

Corrected calculation:"#,
            self.truncate(original_input),
            self.truncate(corrected_input)
        );
        Prompt {
            kind: AiKind::Correct,
            text,
        }
    }

    fn truncate(&self, content: &str) -> String {
        match content.char_indices().nth(self.max_input_length) {
            None => content.to_string(),
            Some((cut, _)) => format!("{}...", &content[..cut]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_prompt() {
        let prompt = PromptBuilder::new().explain("2^3 = 8");
        assert_eq!(prompt.kind, AiKind::Explain);
        assert!(prompt.text.contains("Calculation: 2^3 = 8"));
    }

    #[test]
    fn test_correct_prompt() {
        let prompt = PromptBuilder::new().correct("twenty five divided by five plus two", "25 / 5 + 2");
        assert_eq!(prompt.kind, AiKind::Correct);
        assert!(prompt.text.contains("originally said: twenty five divided by five plus two"));
        assert!(prompt.text.contains("meant to say: 25 / 5 + 2"));
        assert!(prompt.text.contains(r#"{"calculation": "<expression>"}"#));
    }

    #[test]
    fn test_long_input_truncated() {
        let prompt = PromptBuilder::new()
            .with_max_input_length(4)
            .explain("123456789");
        assert!(prompt.text.contains("Calculation: 1234..."));
    }
}
