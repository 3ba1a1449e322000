//! Request/response mapping for the assistant operations.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::client::Generator;
use super::prompt::PromptBuilder;
use super::{AiError, AiKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    /// `expression = result`.
    pub calculation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectRequest {
    /// What the voice input was heard as.
    pub original_input: String,
    /// What the user says they meant.
    pub corrected_input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectResponse {
    pub calculation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiRequest {
    Explain(ExplainRequest),
    Correct(CorrectRequest),
}

impl AiRequest {
    pub fn kind(&self) -> AiKind {
        match self {
            Self::Explain(_) => AiKind::Explain,
            Self::Correct(_) => AiKind::Correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResponse {
    Explanation(ExplainResponse),
    Correction(CorrectResponse),
}

/// Runs assistant requests against a [`Generator`].
pub struct Assistant<G> {
    generator: G,
    prompts: PromptBuilder,
}

impl<G: Generator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub async fn handle(&self, request: AiRequest) -> Result<AiResponse, AiError> {
        match request {
            AiRequest::Explain(req) => self.explain(&req).await.map(AiResponse::Explanation),
            AiRequest::Correct(req) => self.correct(&req).await.map(AiResponse::Correction),
        }
    }

    pub async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse, AiError> {
        info!(calculation = %request.calculation, "Requesting explanation");
        let prompt = self.prompts.explain(&request.calculation);
        let explanation = self.generator.generate(&prompt).await?.trim().to_string();
        Ok(ExplainResponse { explanation })
    }

    pub async fn correct(&self, request: &CorrectRequest) -> Result<CorrectResponse, AiError> {
        info!(
            original = %request.original_input,
            corrected = %request.corrected_input,
            "Requesting correction"
        );
        let prompt = self
            .prompts
            .correct(&request.original_input, &request.corrected_input);
        let text = self.generator.generate(&prompt).await?;
        let calculation = parse_correction(&text)?;
        debug!(%calculation, "Parsed correction");
        Ok(CorrectResponse { calculation })
    }
}

/// Extract the corrected calculation from a model reply.
///
/// Accepts `{"calculation": "..."}`, the same wrapped in a code fence, or a
/// bare expression on the first non-empty line.
pub fn parse_correction(text: &str) -> Result<String, AiError> {
    let body = strip_code_fence(text.trim());

    let calculation = match serde_json::from_str::<CorrectResponse>(body) {
        Ok(response) => response.calculation,
        Err(_) if body.starts_with('{') => {
            return Err(AiError::MalformedResponse(format!(
                "expected {{\"calculation\": ...}}, got {body}"
            )));
        }
        Err(_) => body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string(),
    };

    let calculation = calculation.trim().trim_matches('`').trim().to_string();
    if calculation.is_empty() {
        return Err(AiError::MalformedResponse(
            "empty calculation".to_string(),
        ));
    }
    Ok(calculation)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
