//! Conversation Transcript
//!
//! Append-only record of everything said during a session, including
//! rejected responses and validator guidance. Written once, as pretty JSON,
//! when the session ends.

use crate::feedback::Feedback;
use crate::lexicon::LEXICON_VERSION;
use crate::scoring::AssessmentResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Transcript file format version.
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assessor,
    Candidate,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Assessor => write!(f, "assessor"),
            Role::Candidate => write!(f, "candidate"),
            Role::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_interactions: usize,
    pub conversation: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub version: String,
    pub lexicon_version: u32,
    pub session_id: Uuid,
    pub mode: String,
    pub generated_at: DateTime<Utc>,
}

/// The document written to disk at the end of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDocument<'a> {
    pub summary: TranscriptSummary,
    pub evaluation: &'a AssessmentResult,
    pub feedback: &'a Feedback,
    pub metadata: SessionMetadata,
}

/// Passive, append-only conversation log.
#[derive(Debug, Clone)]
pub struct ConversationTracker {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    entries: Vec<TranscriptEntry>,
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn summary(&self) -> TranscriptSummary {
        TranscriptSummary {
            start_time: self.started_at,
            end_time: Utc::now(),
            total_interactions: self.entries.len(),
            conversation: self.entries.clone(),
        }
    }

    /// Writes the session to `dir` as `assessment_session_<mode>_<timestamp>.json`
    /// and returns the file path.
    pub fn save(
        &self,
        dir: &Path,
        mode: &str,
        evaluation: &AssessmentResult,
        feedback: &Feedback,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create sessions directory {}", dir.display()))?;
        let file_name = format!(
            "assessment_session_{}_{}.json",
            mode.to_lowercase(),
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(file_name);

        let document = SessionDocument {
            summary: self.summary(),
            evaluation,
            feedback,
            metadata: SessionMetadata {
                version: FORMAT_VERSION.to_string(),
                lexicon_version: LEXICON_VERSION,
                session_id: self.session_id,
                mode: mode.to_lowercase(),
                generated_at: Utc::now(),
            },
        };
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Could not write session file {}", path.display()))?;
        Ok(path)
    }
}
