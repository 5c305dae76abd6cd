//! Adaptive Assessment Engine
//!
//! The state machine that decides, one response at a time, whether to probe
//! the candidate further, move to a new topic, move to the next criterion
//! group, or stop. All session data lives in an explicit [`SessionState`]
//! value that is passed into [`AssessmentEngine::step`] and handed back with
//! the next [`Turn`]; the engine itself holds only immutable configuration.

use crate::analysis::{ProbeArea, analyze};
use crate::criteria::{CriterionGroup, GroupId};
use crate::selector::{Selector, choose};
use crate::templates::{render_probe, render_topical};
use crate::themes::{Extraction, Theme, extract};
use crate::validation::{RejectionReason, ResponseValidator, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

// --- Session State ---

/// Which question a response answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTag {
    /// The opening case-understanding question. Never scored.
    Initial,
    Group(GroupId),
}

/// An accepted candidate response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub tag: ResponseTag,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingInitialResponse,
    SelectingGroup,
    Probing(GroupId),
    Advancing(GroupId),
    Terminal,
}

/// Per-run counters and history. Owned by exactly one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub active_group: Option<GroupId>,
    /// Topical questions posed in the active group.
    pub questions_asked: u32,
    /// Probes issued since the last topical question.
    pub consecutive_probes: u32,
    /// Rejected responses since the last accepted one.
    pub invalid_attempts: u32,
    /// Responses, accepted or not, received in the active group.
    pub turns_in_group: u32,
    pub asked_topics: BTreeSet<String>,
    pub focus_topic: String,
    /// Accepted responses, in order. Rejected responses never appear here.
    pub records: Vec<ResponseRecord>,
}

impl SessionState {
    pub fn new(focus_topic: impl Into<String>) -> Self {
        Self {
            phase: Phase::AwaitingInitialResponse,
            active_group: None,
            questions_asked: 0,
            consecutive_probes: 0,
            invalid_attempts: 0,
            turns_in_group: 0,
            asked_topics: BTreeSet::new(),
            focus_topic: focus_topic.into(),
            records: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }
}

// --- Limits ---

/// Counters that bound a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLimits {
    pub questions_per_group: u32,
    pub max_consecutive_probes: u32,
    pub max_invalid_attempts: u32,
}

impl EngineLimits {
    /// One topical question per group.
    pub fn quick() -> Self {
        Self {
            questions_per_group: 1,
            ..Self::full()
        }
    }

    /// Five topical questions per group.
    pub fn full() -> Self {
        Self {
            questions_per_group: 5,
            max_consecutive_probes: 2,
            max_invalid_attempts: 3,
        }
    }

    /// Hard ceiling on responses within one group. Reaching it forces the
    /// group to close even if probing or rejections would otherwise continue.
    pub fn turn_cap(&self) -> u32 {
        self.questions_per_group * (self.max_consecutive_probes + 1) * self.max_invalid_attempts
    }
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self::full()
    }
}

// --- Turn Output ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    Probe { area: ProbeArea },
    Topical { topic: String, theme: Option<Theme> },
}

/// Descriptor of the next question, with template wording already rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextQuestion {
    /// `None` only while the opening question is still unanswered.
    pub group: Option<GroupId>,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub text: String,
}

impl NextQuestion {
    pub fn is_probe(&self) -> bool {
        matches!(self.kind, QuestionKind::Probe { .. })
    }
}

/// What the caller should do after a response has been processed.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    Ask {
        question: NextQuestion,
        /// Validator guidance when the response was rejected.
        guidance: Option<String>,
        /// The engine gave up on the previous question after repeated rejections.
        skipped: bool,
        /// The active criterion group changed with this question, including the
        /// move from the opening question into the first group.
        group_changed: bool,
    },
    Finished,
}

// --- Engine ---

/// Immutable engine configuration plus the transition function.
pub struct AssessmentEngine {
    groups: Vec<GroupId>,
    limits: EngineLimits,
    validator: ResponseValidator,
    selector: Arc<dyn Selector>,
}

impl AssessmentEngine {
    pub fn new(groups: &[CriterionGroup], limits: EngineLimits, selector: Arc<dyn Selector>) -> Self {
        Self {
            groups: groups.iter().map(|g| g.id).collect(),
            limits,
            validator: ResponseValidator::new(selector.clone()),
            selector,
        }
    }

    pub fn limits(&self) -> EngineLimits {
        self.limits
    }

    pub fn validator(&self) -> &ResponseValidator {
        &self.validator
    }

    /// Starts a session, picking the focus topic from `focus_areas`.
    pub fn begin(&self, focus_areas: &[String]) -> SessionState {
        let focus = choose(self.selector.as_ref(), focus_areas)
            .cloned()
            .unwrap_or_else(|| "the case".to_string());
        info!(focus = %focus, "Assessment session started");
        SessionState::new(focus)
    }

    /// Processes one candidate response and decides the next turn.
    pub fn step(&self, state: SessionState, response: &str) -> (SessionState, Turn) {
        if state.is_terminal() {
            return (state, Turn::Finished);
        }
        match self.validator.validate(response) {
            Verdict::Accepted => self.on_accepted(state, response),
            Verdict::Rejected { reason, guidance } => self.on_rejected(state, reason, guidance),
        }
    }

    fn on_accepted(&self, mut state: SessionState, response: &str) -> (SessionState, Turn) {
        state.invalid_attempts = 0;

        let tag = match state.active_group {
            Some(group) if state.phase != Phase::AwaitingInitialResponse => {
                ResponseTag::Group(group)
            }
            _ => ResponseTag::Initial,
        };
        state.records.push(ResponseRecord {
            tag,
            text: response.to_string(),
            timestamp: Utc::now(),
        });

        let entered = state.phase == Phase::AwaitingInitialResponse;
        if entered {
            self.enter_first_group(&mut state);
        } else {
            state.turns_in_group += 1;
        }

        let Some(group) = state.active_group else {
            state.phase = Phase::Terminal;
            return (state, Turn::Finished);
        };

        let analysis = analyze(response);
        let within_cap = state.turns_in_group < self.limits.turn_cap();
        if analysis.needs_probing
            && state.consecutive_probes < self.limits.max_consecutive_probes
            && within_cap
        {
            state.consecutive_probes += 1;
            let area = choose(self.selector.as_ref(), &analysis.probe_areas)
                .copied()
                .unwrap_or(ProbeArea::Examples);
            state.phase = Phase::Probing(group);
            debug!(
                group = %group,
                area = %area,
                consecutive_probes = state.consecutive_probes,
                "Probing response"
            );
            let question = self.probe(Some(group), area);
            return (state, ask(question, None, false, entered));
        }

        let extraction = extract(response);
        let turn = self.advance(&mut state, Some(&extraction), None, false, entered);
        (state, turn)
    }

    fn on_rejected(
        &self,
        mut state: SessionState,
        reason: RejectionReason,
        guidance: String,
    ) -> (SessionState, Turn) {
        state.invalid_attempts += 1;
        if state.phase != Phase::AwaitingInitialResponse {
            state.turns_in_group += 1;
        }
        debug!(?reason, attempts = state.invalid_attempts, "Response rejected");

        let exhausted = state.invalid_attempts >= self.limits.max_invalid_attempts
            || state.turns_in_group >= self.limits.turn_cap();
        if !exhausted {
            let question = self.probe(state.active_group, ProbeArea::Examples);
            return (state, ask(question, Some(guidance), false, false));
        }

        warn!(
            attempts = state.invalid_attempts,
            "Too many invalid responses, moving to the next question"
        );
        state.invalid_attempts = 0;
        let entered = state.phase == Phase::AwaitingInitialResponse;
        if entered {
            self.enter_first_group(&mut state);
        }
        let turn = self.advance(&mut state, None, Some(guidance), true, entered);
        (state, turn)
    }

    fn enter_first_group(&self, state: &mut SessionState) {
        state.active_group = self.groups.first().copied();
        state.phase = Phase::SelectingGroup;
        reset_group_counters(state);
        debug!(group = ?state.active_group, "Entered first criterion group");
    }

    /// Poses a new topical question, moving to the next group (or finishing)
    /// when the active group has used up its questions. `entered_group` is set
    /// when this step already moved from the opening question into a group.
    fn advance(
        &self,
        state: &mut SessionState,
        extraction: Option<&Extraction>,
        guidance: Option<String>,
        skipped: bool,
        entered_group: bool,
    ) -> Turn {
        state.consecutive_probes = 0;

        let mut group_changed = entered_group;
        let group_done = state.questions_asked >= self.limits.questions_per_group
            || state.turns_in_group >= self.limits.turn_cap();
        if group_done {
            match self.next_group(state.active_group) {
                Some(next) => {
                    info!(from = ?state.active_group, to = %next, "Moving to next criterion group");
                    state.active_group = Some(next);
                    state.phase = Phase::SelectingGroup;
                    reset_group_counters(state);
                    group_changed = true;
                }
                None => {
                    info!("All criterion groups covered, assessment complete");
                    state.phase = Phase::Terminal;
                    return Turn::Finished;
                }
            }
        }

        let Some(group) = state.active_group else {
            state.phase = Phase::Terminal;
            return Turn::Finished;
        };

        let theme = extraction.and_then(|e| {
            let dominant = e.profile.dominant();
            let pool: &[Theme] = if dominant.is_empty() { &Theme::ALL } else { &dominant };
            choose(self.selector.as_ref(), pool).copied()
        });

        let fresh: Vec<&String> = extraction
            .map(|e| {
                e.topics
                    .iter()
                    .filter(|t| !state.asked_topics.contains(*t))
                    .collect()
            })
            .unwrap_or_default();
        let topic = choose(self.selector.as_ref(), &fresh)
            .map(|t| (*t).clone())
            .unwrap_or_else(|| state.focus_topic.clone());

        state.questions_asked += 1;
        state.asked_topics.insert(topic.clone());
        state.phase = Phase::Advancing(group);
        debug!(
            group = %group,
            topic = %topic,
            theme = ?theme,
            questions_asked = state.questions_asked,
            "Advancing to new topic"
        );

        let text = render_topical(self.selector.as_ref(), theme, group, &topic);
        let question = NextQuestion {
            group: Some(group),
            kind: QuestionKind::Topical { topic, theme },
            text,
        };
        ask(question, guidance, skipped, group_changed)
    }

    fn next_group(&self, current: Option<GroupId>) -> Option<GroupId> {
        match current {
            None => self.groups.first().copied(),
            Some(id) => {
                let index = self.groups.iter().position(|g| *g == id)?;
                self.groups.get(index + 1).copied()
            }
        }
    }

    fn probe(&self, group: Option<GroupId>, area: ProbeArea) -> NextQuestion {
        NextQuestion {
            group,
            kind: QuestionKind::Probe { area },
            text: render_probe(self.selector.as_ref(), area),
        }
    }
}

fn reset_group_counters(state: &mut SessionState) {
    state.questions_asked = 0;
    state.consecutive_probes = 0;
    state.turns_in_group = 0;
    state.asked_topics.clear();
}

fn ask(
    question: NextQuestion,
    guidance: Option<String>,
    skipped: bool,
    group_changed: bool,
) -> Turn {
    Turn::Ask {
        question,
        guidance,
        skipped,
        group_changed,
    }
}
