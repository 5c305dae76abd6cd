//! Narrative Feedback
//!
//! Final narrative feedback is written by a [`FeedbackService`] from the
//! scores and per-response quality signals. The [`FeedbackWriter`] guarantees
//! a payload is always returned: collaborator failures, timeouts, and
//! malformed replies all yield [`Feedback::fallback`].

use crate::analysis::{QualityAnalysis, analyze};
use crate::criteria::GroupId;
use crate::engine::{ResponseRecord, ResponseTag};
use crate::llm_client::ChatClient;
use crate::scoring::AssessmentResult;
use crate::templates::fill;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are providing final assessment feedback. \
    Focus on observed behaviors and practical recommendations. \
    Maintain confidentiality and professionalism.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub key_behaviors: Vec<String>,
    #[serde(default)]
    pub development_priorities: Vec<String>,
    #[serde(default)]
    pub action_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAssessment {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub development_areas: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Structured narrative feedback for the whole assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, alias = "metrics")]
    pub groups: BTreeMap<String, GroupFeedback>,
    pub overall_assessment: OverallAssessment,
    /// Set when the payload is a fallback rather than a generated evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Feedback {
    /// Minimal payload returned when feedback could not be generated.
    pub fn fallback(reason: impl std::fmt::Display) -> Self {
        Self {
            groups: BTreeMap::new(),
            overall_assessment: OverallAssessment {
                score: None,
                strengths: vec![],
                development_areas: vec!["Unable to generate feedback".to_string()],
                recommendations: vec!["System error - please review manually".to_string()],
            },
            note: Some(format!("unable to evaluate: {reason}")),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.note.is_some()
    }

    /// Parses a model reply, tolerating prose or code fences around the JSON object.
    pub fn parse(reply: &str) -> Result<Self> {
        let start = reply.find('{').context("No JSON object in feedback reply")?;
        let end = reply.rfind('}').context("Unterminated JSON object in feedback reply")?;
        if end < start {
            return Err(anyhow!("Malformed JSON object in feedback reply"));
        }
        serde_json::from_str(&reply[start..=end]).context("Feedback reply did not match schema")
    }
}

/// Quality signals for one scored response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSignals {
    pub group: GroupId,
    pub analysis: QualityAnalysis,
}

/// Everything the feedback collaborator gets to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRequest {
    pub result: AssessmentResult,
    pub signals: Vec<ResponseSignals>,
}

impl FeedbackRequest {
    pub fn new(result: AssessmentResult, records: &[ResponseRecord]) -> Self {
        let signals = records
            .iter()
            .filter_map(|record| match record.tag {
                ResponseTag::Group(group) => Some(ResponseSignals {
                    group,
                    analysis: analyze(&record.text),
                }),
                ResponseTag::Initial => None,
            })
            .collect();
        Self { result, signals }
    }
}

/// Defines the contract for any service that writes narrative feedback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn generate(&self, request: &FeedbackRequest) -> Result<Feedback>;
}

/// A `FeedbackService` backed by an LLM and the `final_feedback` prompt template.
pub struct LlmFeedbackService {
    client: Arc<dyn ChatClient>,
    prompts: HashMap<String, String>,
}

impl LlmFeedbackService {
    pub fn new(client: Arc<dyn ChatClient>, prompts: HashMap<String, String>) -> Self {
        Self { client, prompts }
    }
}

#[async_trait]
impl FeedbackService for LlmFeedbackService {
    async fn generate(&self, request: &FeedbackRequest) -> Result<Feedback> {
        let template = self
            .prompts
            .get("final_feedback")
            .context("Missing prompt template: 'final_feedback'")?;
        let data = serde_json::to_string_pretty(request)?;
        let prompt = fill(template, &[("performance_data", data.as_str())]);
        let reply = self.client.complete(SYSTEM_PROMPT, &prompt).await?;
        Feedback::parse(&reply)
    }
}

/// Feedback used when no generator is configured.
pub struct OfflineFeedbackService;

#[async_trait]
impl FeedbackService for OfflineFeedbackService {
    async fn generate(&self, _request: &FeedbackRequest) -> Result<Feedback> {
        Err(anyhow!("no feedback generator configured"))
    }
}

/// Wraps a [`FeedbackService`] so a payload is always produced.
pub struct FeedbackWriter {
    service: Arc<dyn FeedbackService>,
    timeout: Duration,
}

impl FeedbackWriter {
    pub fn new(service: Arc<dyn FeedbackService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn write(&self, request: &FeedbackRequest) -> Feedback {
        match tokio::time::timeout(self.timeout, self.service.generate(request)).await {
            Ok(Ok(feedback)) => {
                info!(groups = feedback.groups.len(), "Feedback generated");
                feedback
            }
            Ok(Err(e)) => {
                warn!(error = ?e, "Feedback generation failed, using fallback");
                Feedback::fallback(e)
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Feedback generation timed out, using fallback");
                Feedback::fallback("feedback generation timed out")
            }
        }
    }
}
