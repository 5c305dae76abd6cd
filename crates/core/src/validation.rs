//! Response Validation
//!
//! Accepts or rejects a candidate response and, on rejection, produces the
//! guidance shown back to the candidate. The accept/reject decision is fully
//! determined by the text; only the wording of the "more detail" suggestion
//! depends on the selector.

use crate::analysis::{VAGUE_WORD_LIMIT, analyze};
use crate::lexicon::INAPPROPRIATE_PHRASES;
use crate::selector::{Selector, choose};
use crate::templates::DETAIL_SUGGESTIONS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum word count for an acceptable response.
pub const MIN_WORDS: usize = 50;

pub const EMPTY_GUIDANCE: &str = "Please provide a response to continue with the assessment.";
pub const UNPROFESSIONAL_GUIDANCE: &str = "Please provide a professional and thoughtful response.";
pub const VAGUE_GUIDANCE: &str = "Try to be more specific and confident. Instead of using words \
     like 'maybe' or 'probably', share concrete approaches and examples.";

/// Why a response was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Empty,
    Unprofessional,
    TooShort,
    TooVague,
}

/// Outcome of validating one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected {
        reason: RejectionReason,
        guidance: String,
    },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn guidance(&self) -> Option<&str> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected { guidance, .. } => Some(guidance),
        }
    }
}

/// Checks responses in a fixed order: empty, unprofessional, too short, too vague.
#[derive(Clone)]
pub struct ResponseValidator {
    selector: Arc<dyn Selector>,
}

impl ResponseValidator {
    pub fn new(selector: Arc<dyn Selector>) -> Self {
        Self { selector }
    }

    pub fn validate(&self, text: &str) -> Verdict {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return reject(RejectionReason::Empty, EMPTY_GUIDANCE.to_string());
        }

        let lowered = trimmed.to_lowercase();
        if INAPPROPRIATE_PHRASES.iter().any(|p| lowered.contains(p)) {
            return reject(
                RejectionReason::Unprofessional,
                UNPROFESSIONAL_GUIDANCE.to_string(),
            );
        }

        let analysis = analyze(trimmed);
        if analysis.word_count < MIN_WORDS {
            let suggestion = choose(self.selector.as_ref(), &DETAIL_SUGGESTIONS)
                .copied()
                .unwrap_or(DETAIL_SUGGESTIONS[0]);
            return reject(
                RejectionReason::TooShort,
                format!("Your response needs more detail. Consider:\n- {suggestion}"),
            );
        }

        if analysis.vague_words > VAGUE_WORD_LIMIT {
            return reject(RejectionReason::TooVague, VAGUE_GUIDANCE.to_string());
        }

        Verdict::Accepted
    }
}

fn reject(reason: RejectionReason, guidance: String) -> Verdict {
    Verdict::Rejected { reason, guidance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{FirstSelector, RandomSelector};

    fn validator() -> ResponseValidator {
        ResponseValidator::new(Arc::new(RandomSelector))
    }

    fn words(n: usize, word: &str) -> String {
        vec![word; n].join(" ")
    }

    fn reason(verdict: &Verdict) -> Option<RejectionReason> {
        match verdict {
            Verdict::Accepted => None,
            Verdict::Rejected { reason, .. } => Some(*reason),
        }
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        for text in ["", "   ", "\n\t"] {
            let verdict = validator().validate(text);
            assert_eq!(reason(&verdict), Some(RejectionReason::Empty));
            assert!(verdict.guidance().unwrap().contains("provide a response"));
        }
    }

    #[test]
    fn test_inappropriate_phrase_rejected_case_insensitive() {
        let text = format!("{} WhatEver", words(60, "branch"));
        let verdict = validator().validate(&text);
        assert_eq!(reason(&verdict), Some(RejectionReason::Unprofessional));
        assert_eq!(verdict.guidance(), Some(UNPROFESSIONAL_GUIDANCE));
    }

    #[test]
    fn test_short_hedged_response_rejected_for_length() {
        let text = "I think we probably need to look at the branch numbers";
        assert_eq!(text.split_whitespace().count(), 11);
        let verdict = validator().validate(text);
        assert_eq!(reason(&verdict), Some(RejectionReason::TooShort));
        let guidance = verdict.guidance().unwrap();
        assert!(guidance.starts_with("Your response needs more detail"));
        assert!(DETAIL_SUGGESTIONS.iter().any(|s| guidance.contains(s)));
    }

    #[test]
    fn test_suggestion_wording_comes_from_selector() {
        let validator = ResponseValidator::new(Arc::new(FirstSelector));
        let verdict = validator.validate("too short");
        assert!(verdict.guidance().unwrap().ends_with(DETAIL_SUGGESTIONS[0]));
    }

    #[test]
    fn test_decision_is_deterministic_despite_random_wording() {
        let text = "short answer";
        let first = reason(&validator().validate(text));
        for _ in 0..50 {
            assert_eq!(reason(&validator().validate(text)), first);
        }
    }

    #[test]
    fn test_vague_long_response_rejected() {
        let text = format!("{} maybe probably might", words(50, "branch"));
        let verdict = validator().validate(&text);
        assert_eq!(reason(&verdict), Some(RejectionReason::TooVague));
        assert_eq!(verdict.guidance(), Some(VAGUE_GUIDANCE));
    }

    #[test]
    fn test_punctuated_hedges_are_not_vague_words() {
        let text = format!("{} maybe, probably, might.", words(50, "branch"));
        assert!(validator().validate(&text).is_accepted());
    }

    #[test]
    fn test_long_specific_response_accepted() {
        let text = format!("{} maybe probably", words(50, "branch"));
        let verdict = validator().validate(&text);
        assert!(verdict.is_accepted());
        assert_eq!(verdict.guidance(), None);
    }
}
