//! Static Vocabularies
//!
//! Every keyword table consulted by the analyzer, validator, theme extractor
//! and scoring rules lives here, so the word lists can be reviewed and
//! extended without touching control flow. Bump [`LEXICON_VERSION`] whenever
//! a list changes; it is stamped into saved transcripts.

/// Version of the keyword tables below.
pub const LEXICON_VERSION: u32 = 1;

/// Markers signalling that a response cites a concrete example.
pub const EXAMPLE_MARKERS: &[&str] = &["example", "instance", "case", "situation"];

/// Markers signalling that a response talks about measurement.
pub const METRIC_MARKERS: &[&str] = &["measure", "metric", "kpi", "indicator", "target"];

/// Markers signalling that a response describes execution.
pub const IMPLEMENTATION_MARKERS: &[&str] = &["implement", "execute", "deploy", "roll out"];

/// Markers signalling that a response acknowledges obstacles.
pub const CHALLENGE_MARKERS: &[&str] = &["challenge", "difficulty", "problem", "issue"];

/// Hedge words. Matched against whole tokens, not substrings.
pub const HEDGE_WORDS: &[&str] = &["maybe", "probably", "might", "could", "would"];

/// Dismissive phrases that get a response rejected outright.
pub const INAPPROPRIATE_PHRASES: &[&str] = &["ur mom", "bleh", "idk", "whatever"];

/// Words never offered as follow-up topics.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "about",
    "which", "their", "there", "these", "those", "would", "could", "should", "where", "while",
];

/// Keyword roots per topical theme, in theme declaration order.
pub const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("customer_service", &["customer", "service", "satisfaction", "experience", "feedback"]),
    ("operations", &["process", "operation", "workflow", "efficiency", "system"]),
    ("team_management", &["team", "staff", "employee", "manager", "training"]),
    ("performance", &["performance", "metric", "kpi", "measure", "target"]),
    ("communication", &["communicate", "message", "inform", "share", "discuss"]),
    ("implementation", &["implement", "execute", "deploy", "roll out", "launch"]),
    ("challenges", &["challenge", "issue", "problem", "difficulty", "concern"]),
];

// --- Scoring rule vocabularies ---

pub const SEQUENCE_MARKERS: &[&str] = &["first", "second", "then", "finally"];
pub const CLARITY_HEDGES: &[&str] = &["maybe", "probably", "might", "could be"];
pub const REASONING_MARKERS: &[&str] = &["because", "therefore", "thus", "hence"];
pub const ENUMERATION_MARKERS: &[&str] = &["for example", "such as", "including"];
pub const EXAMPLE_PHRASES: &[&str] = &["for example", "such as", "like", "instance"];
pub const INTERACTION_MARKERS: &[&str] = &["agree", "disagree", "suggest", "propose"];
pub const DEPTH_MARKERS: &[&str] = &["because", "therefore", "however", "although"];
pub const DOMAIN_TERMS: &[&str] = &["customer", "branch", "team", "service", "staff", "process"];
pub const TRANSITION_MARKERS: &[&str] = &[
    "additionally",
    "furthermore",
    "moreover",
    "also",
    "next",
    "building on",
];
pub const OWNERSHIP_PHRASES: &[&str] = &[
    "i would",
    "i will",
    "i'd",
    "i propose",
    "i suggest",
    "my plan",
    "i recommend",
];
pub const ACTION_VERBS: &[&str] = &["start", "launch", "introduce", "lead", "drive", "initiate"];
pub const CONTRIBUTION_MARKERS: &[&str] = &[
    "idea",
    "recommend",
    "suggest",
    "propose",
    "solution",
    "improve",
];
pub const CADENCE_MARKERS: &[&str] = &[
    "consistent",
    "regular",
    "weekly",
    "monthly",
    "daily",
    "ongoing",
    "follow up",
    "follow-up",
];
pub const COVERAGE_MARKERS: &[&str] = &["every", "each", "all branches"];

/// Returns true if `text` contains any of `markers` as a substring.
pub fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// Strips leading and trailing punctuation from a whitespace token.
pub fn bare_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_is_substring_based() {
        assert!(contains_any("we rolled it out after the kpis", METRIC_MARKERS));
        assert!(!contains_any("nothing relevant here", METRIC_MARKERS));
    }

    #[test]
    fn test_bare_token_strips_edges_only() {
        assert_eq!(bare_token("\"maybe,\""), "maybe");
        assert_eq!(bare_token("follow-up."), "follow-up");
        assert_eq!(bare_token("..."), "");
    }

    #[test]
    fn test_theme_table_has_five_keywords_each() {
        for (theme, keywords) in THEME_KEYWORDS {
            assert!(
                (5..=6).contains(&keywords.len()),
                "theme {theme} has {} keywords",
                keywords.len()
            );
        }
    }
}
