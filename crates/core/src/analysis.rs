//! Response Quality Analysis
//!
//! Shallow lexical signals extracted from a single candidate response. These
//! are keyword heuristics only; they say nothing about whether the answer is
//! actually correct.

use crate::lexicon::{
    CHALLENGE_MARKERS, EXAMPLE_MARKERS, HEDGE_WORDS, IMPLEMENTATION_MARKERS, METRIC_MARKERS,
    contains_any,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signal a response can be missing, and therefore a direction to probe in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeArea {
    Examples,
    Metrics,
    Implementation,
    Challenges,
}

impl ProbeArea {
    /// All areas in the fixed probing order.
    pub const ALL: [ProbeArea; 4] = [
        ProbeArea::Examples,
        ProbeArea::Metrics,
        ProbeArea::Implementation,
        ProbeArea::Challenges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeArea::Examples => "examples",
            ProbeArea::Metrics => "metrics",
            ProbeArea::Implementation => "implementation",
            ProbeArea::Challenges => "challenges",
        }
    }
}

impl fmt::Display for ProbeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vague-word count above which a response needs probing or is rejected.
pub const VAGUE_WORD_LIMIT: usize = 2;

/// Quality signals for one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAnalysis {
    pub word_count: usize,
    pub has_examples: bool,
    pub has_metrics: bool,
    pub has_implementation: bool,
    pub has_challenges: bool,
    pub vague_words: usize,
    pub needs_probing: bool,
    /// Areas whose presence flag is false, in [`ProbeArea::ALL`] order.
    pub probe_areas: Vec<ProbeArea>,
}

impl QualityAnalysis {
    fn has(&self, area: ProbeArea) -> bool {
        match area {
            ProbeArea::Examples => self.has_examples,
            ProbeArea::Metrics => self.has_metrics,
            ProbeArea::Implementation => self.has_implementation,
            ProbeArea::Challenges => self.has_challenges,
        }
    }
}

/// Analyzes a response. Pure function of the lower-cased text.
pub fn analyze(text: &str) -> QualityAnalysis {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let vague_words = words
        .iter()
        .filter(|word| HEDGE_WORDS.contains(*word))
        .count();

    let mut analysis = QualityAnalysis {
        word_count: words.len(),
        has_examples: contains_any(&lowered, EXAMPLE_MARKERS),
        has_metrics: contains_any(&lowered, METRIC_MARKERS),
        has_implementation: contains_any(&lowered, IMPLEMENTATION_MARKERS),
        has_challenges: contains_any(&lowered, CHALLENGE_MARKERS),
        vague_words,
        needs_probing: false,
        probe_areas: Vec::new(),
    };

    analysis.probe_areas = ProbeArea::ALL
        .into_iter()
        .filter(|area| !analysis.has(*area))
        .collect();
    analysis.needs_probing =
        !analysis.probe_areas.is_empty() || analysis.vague_words > VAGUE_WORD_LIMIT;
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_needs_probing_everywhere() {
        let analysis = analyze("");
        assert_eq!(analysis.word_count, 0);
        assert!(!analysis.has_examples);
        assert!(!analysis.has_metrics);
        assert!(!analysis.has_implementation);
        assert!(!analysis.has_challenges);
        assert!(analysis.needs_probing);
        assert_eq!(analysis.probe_areas, ProbeArea::ALL.to_vec());
    }

    #[test]
    fn test_word_count_matches_whitespace_tokens() {
        for text in ["one", "  two  words ", "a\tb\nc d", "punctuation, counts. as; tokens!"] {
            assert_eq!(analyze(text).word_count, text.split_whitespace().count());
        }
    }

    #[test]
    fn test_presence_flags_are_case_insensitive_substrings() {
        let analysis = analyze("For INSTANCE we tracked KPIs and Deployed fixes for each Problem");
        assert!(analysis.has_examples);
        assert!(analysis.has_metrics);
        assert!(analysis.has_implementation);
        assert!(analysis.has_challenges);
        assert!(analysis.probe_areas.is_empty());
        assert!(!analysis.needs_probing);
    }

    #[test]
    fn test_probe_areas_follow_fixed_order() {
        let analysis = analyze("we hit a problem and had to roll out a patch");
        assert_eq!(analysis.probe_areas, vec![ProbeArea::Examples, ProbeArea::Metrics]);
    }

    #[test]
    fn test_vague_words_count_occurrences() {
        let analysis = analyze("Maybe maybe we probably might");
        assert_eq!(analysis.vague_words, 4);
    }

    #[test]
    fn test_vague_words_match_whole_tokens_only() {
        let analysis = analyze("maybe, probably. might! (could) perhaps maybe");
        assert_eq!(analysis.vague_words, 1);
    }

    #[test]
    fn test_vagueness_alone_triggers_probing() {
        let text = "for example the metric showed how we implement fixes to each issue, \
                    maybe it could work and it would help";
        let analysis = analyze(text);
        assert!(analysis.probe_areas.is_empty());
        assert_eq!(analysis.vague_words, 3);
        assert!(analysis.needs_probing);
    }

    #[test]
    fn test_two_vague_words_do_not_trigger_probing() {
        let text = "an example: our target was met once we deploy the fix to the issue, maybe probably";
        let analysis = analyze(text);
        assert_eq!(analysis.vague_words, 2);
        assert!(!analysis.needs_probing);
    }
}
