//! Question and Guidance Templates
//!
//! Fixed phrasing pools. The engine picks from these through a
//! [`Selector`](crate::selector::Selector); `{topic}` is substituted at render
//! time.

use crate::analysis::ProbeArea;
use crate::criteria::GroupId;
use crate::selector::{Selector, choose};
use crate::themes::Theme;

/// Phrasings for each probe area.
pub fn probe_pool(area: ProbeArea) -> &'static [&'static str] {
    match area {
        ProbeArea::Examples => &[
            "Could you share a specific instance where you've implemented this approach?",
            "What's a concrete example of how you would handle this situation?",
            "Can you walk us through a real case where you've dealt with this?",
        ],
        ProbeArea::Metrics => &[
            "What specific metrics would you use to measure success?",
            "How would you track the effectiveness of this approach?",
            "What KPIs would help you monitor progress?",
        ],
        ProbeArea::Implementation => &[
            "What are the key steps in implementing this approach?",
            "How would you ensure consistent implementation across all branches?",
            "What resources would you need to execute this plan?",
        ],
        ProbeArea::Challenges => &[
            "What potential obstacles do you anticipate?",
            "How would you address resistance from branch managers?",
            "What risks should be considered in this approach?",
        ],
    }
}

/// Suggestions appended to the "needs more detail" guidance.
pub const DETAIL_SUGGESTIONS: [&str; 4] = [
    "Share a specific example from your experience managing branches",
    "Describe how you would measure success in this situation",
    "Explain your implementation approach step by step",
    "Discuss potential challenges and your mitigation strategies",
];

const GENERIC_TEMPLATES: &[&str] = &[
    "How do you ensure effective communication about {topic}?",
    "What specific approaches have you used to discuss {topic}?",
    "How do you maintain consistency in {topic} communication?",
    "What challenges have you faced with {topic} and how did you address them?",
];

/// Topical templates for a (theme, group) pair, falling back to a generic pool.
pub fn topical_pool(theme: Option<Theme>, group: GroupId) -> &'static [&'static str] {
    match (theme, group) {
        (Some(Theme::CustomerService), GroupId::ClearCommunication) => &[
            "How do you ensure clear communication about {topic} to improve customer service?",
            "What strategies do you use to communicate service changes related to {topic}?",
            "How do you handle customer feedback about {topic} across branches?",
        ],
        (Some(Theme::CustomerService), GroupId::EngagingDiscussions) => &[
            "How do you facilitate discussions about {topic} with customer-facing staff?",
            "What methods work best when discussing customer feedback about {topic}?",
            "How do you ensure all branches share their experiences with {topic}?",
        ],
        (Some(Theme::Operations), GroupId::ClearCommunication) => &[
            "How do you communicate operational changes regarding {topic}?",
            "What methods do you use to ensure clear understanding of {topic} procedures?",
            "How do you handle communication about {topic} across different branches?",
        ],
        (Some(Theme::TeamManagement), GroupId::ClearCommunication) => &[
            "How do you communicate expectations about {topic} to your team?",
            "What strategies do you use to ensure clear understanding of {topic} goals?",
            "How do you handle feedback about {topic} management approaches?",
        ],
        _ => GENERIC_TEMPLATES,
    }
}

/// Picks and renders a probe question.
pub fn render_probe(selector: &dyn Selector, area: ProbeArea) -> String {
    choose(selector, probe_pool(area))
        .copied()
        .unwrap_or(GENERIC_TEMPLATES[0])
        .to_string()
}

/// Picks and renders a topical question.
pub fn render_topical(
    selector: &dyn Selector,
    theme: Option<Theme>,
    group: GroupId,
    topic: &str,
) -> String {
    choose(selector, topical_pool(theme, group))
        .copied()
        .unwrap_or(GENERIC_TEMPLATES[0])
        .replace("{topic}", topic)
}

/// Deterministic opening question used when the question source is unavailable.
pub fn opening_fallback(focus: &str) -> String {
    format!(
        "Let's start with {focus}. Based on the case, what concrete steps would you take \
         first, and can you give an example from your own experience?"
    )
}

/// Fills `{key}` placeholders in a prompt template.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
