//! Theme Extraction
//!
//! Scores a response against the coarse topical themes in
//! [`THEME_KEYWORDS`](crate::lexicon::THEME_KEYWORDS) and collects salient
//! words that can seed the next question.

use crate::lexicon::{STOP_WORDS, THEME_KEYWORDS, bare_token};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Normalized score a theme must exceed to count as dominant.
pub const DOMINANT_THRESHOLD: f64 = 0.3;

/// Candidate topics must be longer than this many characters.
const MIN_TOPIC_LEN: usize = 4;

/// A coarse topical bucket, named after its row in the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    CustomerService,
    Operations,
    TeamManagement,
    Performance,
    Communication,
    Implementation,
    Challenges,
}

impl Theme {
    pub const ALL: [Theme; 7] = [
        Theme::CustomerService,
        Theme::Operations,
        Theme::TeamManagement,
        Theme::Performance,
        Theme::Communication,
        Theme::Implementation,
        Theme::Challenges,
    ];

    /// Keyword roots for this theme.
    pub fn keywords(&self) -> &'static [&'static str] {
        let name = self.as_str();
        THEME_KEYWORDS
            .iter()
            .find(|(row, _)| *row == name)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::CustomerService => "customer_service",
            Theme::Operations => "operations",
            Theme::TeamManagement => "team_management",
            Theme::Performance => "performance",
            Theme::Communication => "communication",
            Theme::Implementation => "implementation",
            Theme::Challenges => "challenges",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relevance of every theme to one response, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeProfile {
    scores: BTreeMap<Theme, f64>,
}

impl ThemeProfile {
    pub fn score(&self, theme: Theme) -> f64 {
        self.scores.get(&theme).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> impl Iterator<Item = (Theme, f64)> + '_ {
        self.scores.iter().map(|(t, s)| (*t, *s))
    }

    /// Themes scoring above [`DOMINANT_THRESHOLD`], in theme order.
    pub fn dominant(&self) -> Vec<Theme> {
        self.scores()
            .filter(|(_, score)| *score > DOMINANT_THRESHOLD)
            .map(|(theme, _)| theme)
            .collect()
    }
}

/// Output of [`extract`]: the theme profile plus follow-up topic candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub profile: ThemeProfile,
    /// Distinct salient words in first-seen order.
    pub topics: Vec<String>,
}

/// Scores `text` against every theme and collects candidate topics.
pub fn extract(text: &str) -> Extraction {
    let lowered = text.to_lowercase();
    let mut raw: BTreeMap<Theme, f64> = Theme::ALL.iter().map(|t| (*t, 0.0)).collect();
    let mut topics = Vec::new();
    let mut seen = HashSet::new();

    for token in lowered.split_whitespace() {
        for theme in Theme::ALL {
            if theme.keywords().iter().any(|keyword| token.contains(keyword)) {
                *raw.entry(theme).or_default() += 1.0;
            }
        }

        let word = bare_token(token);
        if word.chars().count() > MIN_TOPIC_LEN
            && !STOP_WORDS.contains(&word)
            && seen.insert(word.to_string())
        {
            topics.push(word.to_string());
        }
    }

    let max = raw.values().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for score in raw.values_mut() {
            *score /= max;
        }
    }

    Extraction {
        profile: ThemeProfile { scores: raw },
        topics,
    }
}
