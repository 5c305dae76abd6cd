//! Question Generation
//!
//! The engine renders every follow-up from templates; natural-language
//! phrasing of the opening question (and, optionally, rewording of the
//! follow-ups) is delegated to a [`QuestionSource`]. The [`Interviewer`]
//! wraps a source so that a failed, slow, or empty generation never stalls
//! the session: it always falls back to the template text.

use crate::case::CaseDocument;
use crate::engine::{NextQuestion, QuestionKind};
use crate::llm_client::ChatClient;
use crate::templates::{fill, opening_fallback};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tone constraints sent with every generation request.
pub const TONE_CONSTRAINTS: &[&str] = &[
    "Ask for concrete examples and practical approaches",
    "Avoid theoretical concepts",
    "Maintain confidentiality (no internal metrics or sensitive data)",
    "Generate only the question",
];

const SYSTEM_PROMPT: &str = "You are conducting a professional role-play assessment. \
    Focus on practical scenarios and maintain confidentiality. \
    Questions should encourage specific examples while avoiding sensitive details.";

/// Structured input for one generated question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub scenario: String,
    pub role_context: String,
    pub focus: String,
    pub constraints: Vec<String>,
    /// Template wording to be reworded, when rephrasing a follow-up.
    pub draft: Option<String>,
}

impl QuestionRequest {
    pub fn new(case: &CaseDocument, focus: &str) -> Self {
        Self {
            scenario: case.description.clone(),
            role_context: format!("{}: {}", case.role.title, case.role.responsibility),
            focus: focus.to_string(),
            constraints: TONE_CONSTRAINTS.iter().map(|c| c.to_string()).collect(),
            draft: None,
        }
    }

    pub fn with_draft(mut self, draft: impl Into<String>) -> Self {
        self.draft = Some(draft.into());
        self
    }
}

/// Defines the contract for any service that can phrase an assessment question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Produces a single natural-language question.
    async fn generate(&self, request: &QuestionRequest) -> Result<String>;
}

/// A `QuestionSource` backed by an LLM and the prompt templates.
///
/// Requires the `initial_question` template; `rephrase_question` is needed
/// only when follow-up rewording is enabled.
pub struct LlmQuestionSource {
    client: Arc<dyn ChatClient>,
    prompts: HashMap<String, String>,
}

impl LlmQuestionSource {
    pub fn new(client: Arc<dyn ChatClient>, prompts: HashMap<String, String>) -> Self {
        Self { client, prompts }
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    async fn generate(&self, request: &QuestionRequest) -> Result<String> {
        let key = if request.draft.is_some() {
            "rephrase_question"
        } else {
            "initial_question"
        };
        let template = self
            .prompts
            .get(key)
            .with_context(|| format!("Missing prompt template: '{key}'"))?;

        let constraints = request
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = fill(
            template,
            &[
                ("scenario", request.scenario.as_str()),
                ("role", request.role_context.as_str()),
                ("focus", request.focus.as_str()),
                ("constraints", constraints.as_str()),
                ("draft", request.draft.as_deref().unwrap_or_default()),
            ],
        );

        self.client.complete(SYSTEM_PROMPT, &prompt).await
    }
}

/// A deterministic `QuestionSource` for offline runs and testing.
///
/// Returns the draft unchanged, or the template opening question.
pub struct TemplateQuestionSource;

#[async_trait]
impl QuestionSource for TemplateQuestionSource {
    async fn generate(&self, request: &QuestionRequest) -> Result<String> {
        Ok(request
            .draft
            .clone()
            .unwrap_or_else(|| opening_fallback(&request.focus)))
    }
}

/// Wraps a [`QuestionSource`] with a timeout and template fallbacks.
pub struct Interviewer {
    source: Arc<dyn QuestionSource>,
    case: CaseDocument,
    timeout: Duration,
    rephrase_followups: bool,
}

impl Interviewer {
    pub fn new(source: Arc<dyn QuestionSource>, case: CaseDocument, timeout: Duration) -> Self {
        Self {
            source,
            case,
            timeout,
            rephrase_followups: false,
        }
    }

    pub fn with_rephrasing(mut self, enabled: bool) -> Self {
        self.rephrase_followups = enabled;
        self
    }

    pub fn case(&self) -> &CaseDocument {
        &self.case
    }

    /// The opening case-understanding question for `focus`.
    pub async fn opening_question(&self, focus: &str) -> String {
        let request = QuestionRequest::new(&self.case, focus);
        self.generate_or(&request, opening_fallback(focus)).await
    }

    /// Final wording for a question chosen by the engine. Probes always keep
    /// their template text; topical questions are reworded only when enabled.
    pub async fn phrase(&self, question: &NextQuestion) -> String {
        match &question.kind {
            QuestionKind::Topical { topic, .. } if self.rephrase_followups => {
                let request =
                    QuestionRequest::new(&self.case, topic).with_draft(question.text.clone());
                self.generate_or(&request, question.text.clone()).await
            }
            _ => question.text.clone(),
        }
    }

    async fn generate_or(&self, request: &QuestionRequest, fallback: String) -> String {
        match tokio::time::timeout(self.timeout, self.source.generate(request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(focus = %request.focus, "Question generated");
                text.trim().to_string()
            }
            Ok(Ok(_)) => {
                warn!(focus = %request.focus, "Question source returned empty text, using template");
                fallback
            }
            Ok(Err(e)) => {
                warn!(focus = %request.focus, error = ?e, "Question source failed, using template");
                fallback
            }
            Err(_) => {
                warn!(focus = %request.focus, timeout = ?self.timeout, "Question source timed out, using template");
                fallback
            }
        }
    }
}
