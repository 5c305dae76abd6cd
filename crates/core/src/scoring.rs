//! Weighted Criteria Scoring
//!
//! Every accepted response is scored against the sub-criteria of the group
//! it was given under. Each sub-criterion has its own lexical rule producing a
//! raw score in `[0, 1]`, which is floored at [`SCORE_FLOOR`] before weighting
//! so that a single weak answer never zeroes a criterion.

use crate::analysis::analyze;
use crate::criteria::{CriterionGroup, GroupId, SubCriterion};
use crate::engine::{ResponseRecord, ResponseTag};
use crate::lexicon::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Points available per scored response.
pub const RESPONSE_CEILING: f64 = 10.0;
/// Points available for the whole assessment.
pub const OVERALL_CEILING: f64 = 30.0;
/// Minimum credit per sub-criterion.
pub const SCORE_FLOOR: f64 = 0.3;

/// Raw, unclamped score of `text` for one sub-criterion.
pub fn raw_score(criterion: SubCriterion, text: &str) -> f64 {
    let t = text.to_lowercase();
    let words = t.split_whitespace().count();
    let periods = t.matches('.').count();
    let commas = t.matches(',').count();
    let add = |cond: bool, points: f64| if cond { points } else { 0.0 };

    match criterion {
        SubCriterion::Clarity => {
            add(words >= 50, 0.5)
                + add(contains_any(&t, SEQUENCE_MARKERS), 0.3)
                + add(!contains_any(&t, CLARITY_HEDGES), 0.2)
        }
        SubCriterion::Structure => {
            add(contains_any(&t, SEQUENCE_MARKERS), 0.4)
                + add(periods >= 3, 0.3)
                + add(contains_any(&t, REASONING_MARKERS), 0.3)
        }
        SubCriterion::Completeness => {
            add(words >= 75, 0.4)
                + add(commas >= 2, 0.3)
                + add(contains_any(&t, ENUMERATION_MARKERS), 0.3)
        }
        SubCriterion::Examples => {
            add(contains_any(&t, EXAMPLE_PHRASES), 0.6) + add(t.matches("example").count() > 1, 0.4)
        }
        SubCriterion::Interaction => {
            add(contains_any(&t, INTERACTION_MARKERS), 0.5) + add(t.contains('?'), 0.5)
        }
        SubCriterion::Depth => {
            add(words >= 100, 0.4)
                + add(contains_any(&t, DEPTH_MARKERS), 0.3)
                + add(commas >= 3, 0.3)
        }
        SubCriterion::Relevance => {
            let distinct = DOMAIN_TERMS.iter().filter(|term| t.contains(*term)).count();
            add(distinct >= 1, 0.4) + add(distinct >= 3, 0.3) + add(words >= 50, 0.3)
        }
        SubCriterion::Flow => {
            add(contains_any(&t, TRANSITION_MARKERS), 0.5)
                + add(periods >= 3, 0.3)
                + add(t.contains("because") || t.contains("so that"), 0.2)
        }
        SubCriterion::Initiative => {
            add(contains_any(&t, OWNERSHIP_PHRASES), 0.5) + add(contains_any(&t, ACTION_VERBS), 0.5)
        }
        SubCriterion::Responsiveness => {
            let has_figures = t
                .split_whitespace()
                .any(|token| token.chars().any(|c| c.is_ascii_digit()));
            add(words >= 50, 0.4) + add(analyze(&t).vague_words == 0, 0.3) + add(has_figures, 0.3)
        }
        SubCriterion::Contribution => {
            add(contains_any(&t, CONTRIBUTION_MARKERS), 0.5)
                + add(commas >= 2, 0.2)
                + add(words >= 75, 0.3)
        }
        SubCriterion::Consistency => {
            add(contains_any(&t, CADENCE_MARKERS), 0.6) + add(contains_any(&t, COVERAGE_MARKERS), 0.4)
        }
    }
}

/// Clamps a raw score into `[SCORE_FLOOR, 1.0]`.
pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(SCORE_FLOOR, 1.0)
}

/// Weighted points earned by one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub group: GroupId,
    pub scores: BTreeMap<SubCriterion, f64>,
    pub total: f64,
    pub max_possible: f64,
    pub percentage: f64,
}

/// Aggregate for a group that received at least one scored response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub average_score: f64,
    pub max_possible: f64,
    pub percentage: f64,
    pub individual_scores: Vec<ScoreBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    Scored(GroupScore),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub id: GroupId,
    pub name: String,
    #[serde(flatten)]
    pub outcome: GroupOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Exceptional,
    Advanced,
    Proficient,
    Developing,
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => PerformanceLevel::Exceptional,
            p if p >= 80.0 => PerformanceLevel::Advanced,
            p if p >= 70.0 => PerformanceLevel::Proficient,
            p if p >= 60.0 => PerformanceLevel::Developing,
            _ => PerformanceLevel::NeedsImprovement,
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceLevel::Exceptional => "Exceptional",
            PerformanceLevel::Advanced => "Advanced",
            PerformanceLevel::Proficient => "Proficient",
            PerformanceLevel::Developing => "Developing",
            PerformanceLevel::NeedsImprovement => "Needs Improvement",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub level: PerformanceLevel,
}

/// Final scores. `overall` is `None` when no group received a scored response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub groups: Vec<GroupResult>,
    pub overall: Option<OverallScore>,
}

impl AssessmentResult {
    pub fn has_data(&self) -> bool {
        self.overall.is_some()
    }
}

/// Scores responses against the configured criterion groups.
#[derive(Debug, Clone)]
pub struct ScoringModel {
    groups: Vec<CriterionGroup>,
}

impl ScoringModel {
    pub fn new(groups: Vec<CriterionGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[CriterionGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&CriterionGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Scores one response against one group.
    pub fn score(&self, group: &CriterionGroup, text: &str) -> ScoreBreakdown {
        let scores: BTreeMap<SubCriterion, f64> = group
            .weights()
            .map(|(criterion, weight)| {
                let points = clamp_score(raw_score(criterion, text)) * weight * RESPONSE_CEILING;
                (criterion, points)
            })
            .collect();
        let total: f64 = scores.values().sum();
        ScoreBreakdown {
            group: group.id,
            scores,
            total,
            max_possible: RESPONSE_CEILING,
            percentage: total / RESPONSE_CEILING * 100.0,
        }
    }

    /// Aggregates scoring-eligible records into per-group and overall results.
    ///
    /// Records tagged [`ResponseTag::Initial`] or with a group not in this
    /// model are ignored. Groups without responses report
    /// [`GroupOutcome::NoData`].
    pub fn aggregate(&self, records: &[ResponseRecord]) -> AssessmentResult {
        let mut total = 0.0;
        let mut max_possible = 0.0;

        let groups = self
            .groups
            .iter()
            .map(|group| {
                let individual_scores: Vec<ScoreBreakdown> = records
                    .iter()
                    .filter(|r| r.tag == ResponseTag::Group(group.id))
                    .map(|r| self.score(group, &r.text))
                    .collect();

                let outcome = if individual_scores.is_empty() {
                    debug!(group = %group.id, "No scored responses for group");
                    GroupOutcome::NoData
                } else {
                    let n = individual_scores.len() as f64;
                    let average_score = individual_scores.iter().map(|s| s.total).sum::<f64>() / n;
                    let group_max =
                        individual_scores.iter().map(|s| s.max_possible).sum::<f64>() / n;
                    total += average_score;
                    max_possible += group_max;
                    GroupOutcome::Scored(GroupScore {
                        average_score,
                        max_possible: group_max,
                        percentage: average_score / group_max * 100.0,
                        individual_scores,
                    })
                };

                GroupResult {
                    id: group.id,
                    name: group.name.clone(),
                    outcome,
                }
            })
            .collect();

        let overall = (max_possible > 0.0).then(|| {
            let score = total / max_possible * OVERALL_CEILING;
            let percentage = score / OVERALL_CEILING * 100.0;
            OverallScore {
                score,
                max_score: OVERALL_CEILING,
                percentage,
                level: PerformanceLevel::from_percentage(percentage),
            }
        });

        AssessmentResult { groups, overall }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::Utc;

    const STRONG: &str = "First, I would meet every branch manager weekly, because consistent \
        follow-up matters. For example, such as at our Andheri branch, we set a target of 90% \
        customer satisfaction, including staff training. Then we launched a pilot. Finally, \
        another example: we reviewed the process monthly. I agree this works, don't you? \
        Therefore the team improved, however there were problems, although we solved them. \
        Additionally I propose a service review, a staff huddle, a customer survey, and a \
        process audit to improve every branch and drive results across the region with 12 \
        checkpoints each quarter so that nothing slips. Moreover the idea is to lead by \
        example and initiate change early while keeping staff engaged and customers informed \
        throughout the whole programme and beyond the first year of operation in all branches.";

    fn record(group: GroupId, text: &str) -> ResponseRecord {
        ResponseRecord {
            tag: ResponseTag::Group(group),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn model() -> ScoringModel {
        ScoringModel::new(CriterionGroup::defaults())
    }

    #[test]
    fn test_clamp_bounds() {
        for raw in [-1.0, 0.0, 0.29, 0.3, 0.5, 1.0, 1.7] {
            let clamped = clamp_score(raw);
            assert!((SCORE_FLOOR..=1.0).contains(&clamped), "{raw} -> {clamped}");
        }
        assert_eq!(clamp_score(0.0), SCORE_FLOOR);
        assert_eq!(clamp_score(2.0), 1.0);
    }

    #[test]
    fn test_raw_scores_stay_within_unit_interval() {
        use SubCriterion::*;
        for criterion in [
            Clarity, Structure, Completeness, Examples, Interaction, Depth, Relevance, Flow,
            Initiative, Responsiveness, Contribution, Consistency,
        ] {
            for text in ["", STRONG, "maybe"] {
                let raw = raw_score(criterion, text);
                assert!((0.0..=1.0 + 1e-12).contains(&raw), "{criterion}: {raw}");
            }
        }
    }

    #[test]
    fn test_clarity_rewards_length_sequence_and_confidence() {
        let confident = format!("first {}", vec!["point"; 60].join(" "));
        assert_abs_diff_eq!(raw_score(SubCriterion::Clarity, &confident), 1.0, epsilon = 1e-12);
        let hedged = format!("{} maybe", confident);
        assert_abs_diff_eq!(raw_score(SubCriterion::Clarity, &hedged), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_examples_rewards_repeated_examples() {
        assert_abs_diff_eq!(
            raw_score(SubCriterion::Examples, "for example this, and another example"),
            1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(raw_score(SubCriterion::Examples, "such as this"), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_response_total_bounded_for_every_group() {
        let model = model();
        for group in model.groups() {
            for text in ["", "short", STRONG] {
                let breakdown = model.score(group, text);
                assert!(breakdown.total <= RESPONSE_CEILING + 1e-9);
                assert!(breakdown.total >= SCORE_FLOOR * RESPONSE_CEILING - 1e-9);
                assert_abs_diff_eq!(
                    breakdown.percentage,
                    breakdown.total / RESPONSE_CEILING * 100.0,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_empty_response_earns_exactly_the_floor() {
        let model = model();
        let group = model.group(GroupId::EngagingDiscussions).unwrap();
        let breakdown = model.score(group, "");
        assert_abs_diff_eq!(breakdown.total, 3.0, epsilon = 1e-9);
        assert_eq!(breakdown.scores.len(), 4);
    }

    #[test]
    fn test_aggregate_with_no_records_reports_no_data() {
        let result = model().aggregate(&[]);
        assert!(!result.has_data());
        assert!(result.overall.is_none());
        assert!(result.groups.iter().all(|g| g.outcome == GroupOutcome::NoData));
    }

    #[test]
    fn test_initial_records_are_not_scored() {
        let records = vec![ResponseRecord {
            tag: ResponseTag::Initial,
            text: STRONG.to_string(),
            timestamp: Utc::now(),
        }];
        assert!(model().aggregate(&records).overall.is_none());
    }

    #[test]
    fn test_group_average_and_overall_rescaling() {
        let model = model();
        let records = vec![
            record(GroupId::ClearCommunication, ""),
            record(GroupId::ClearCommunication, STRONG),
        ];
        let result = model.aggregate(&records);

        let group = model.group(GroupId::ClearCommunication).unwrap();
        let expected_avg = (model.score(group, "").total + model.score(group, STRONG).total) / 2.0;

        let GroupOutcome::Scored(score) = &result.groups[0].outcome else {
            panic!("expected scored outcome");
        };
        assert_eq!(score.individual_scores.len(), 2);
        assert_abs_diff_eq!(score.average_score, expected_avg, epsilon = 1e-9);
        assert_eq!(result.groups[1].outcome, GroupOutcome::NoData);
        assert_eq!(result.groups[2].outcome, GroupOutcome::NoData);

        // Only one group scored, so the overall is that group's ratio on the 30-point scale.
        let overall = result.overall.unwrap();
        assert_abs_diff_eq!(overall.score, expected_avg / 10.0 * 30.0, epsilon = 1e-9);
        assert_eq!(overall.max_score, OVERALL_CEILING);
        assert_eq!(overall.level, PerformanceLevel::from_percentage(overall.percentage));
    }

    #[test]
    fn test_breakdown_serialization_round_trip() {
        let model = model();
        let group = model.group(GroupId::ActiveEngagement).unwrap();
        let breakdown = model.score(group, STRONG);

        let json = serde_json::to_string(&breakdown).unwrap();
        let parsed: ScoreBreakdown = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(parsed.total, breakdown.total, epsilon = 1e-9);
        assert_abs_diff_eq!(parsed.max_possible, breakdown.max_possible, epsilon = 1e-9);
        assert_abs_diff_eq!(parsed.percentage, breakdown.percentage, epsilon = 1e-9);
        assert_eq!(parsed.group, breakdown.group);
    }

    #[test]
    fn test_no_data_outcome_serializes_with_status_tag() {
        let result = model().aggregate(&[]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["groups"][0]["status"], "no_data");
        assert_eq!(json["groups"][0]["id"], "ClearCommunication");
        assert!(json["overall"].is_null());
    }

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_percentage(95.0), PerformanceLevel::Exceptional);
        assert_eq!(PerformanceLevel::from_percentage(80.0), PerformanceLevel::Advanced);
        assert_eq!(PerformanceLevel::from_percentage(70.5), PerformanceLevel::Proficient);
        assert_eq!(PerformanceLevel::from_percentage(60.0), PerformanceLevel::Developing);
        assert_eq!(PerformanceLevel::from_percentage(12.0), PerformanceLevel::NeedsImprovement);
        assert_eq!(PerformanceLevel::NeedsImprovement.to_string(), "Needs Improvement");
    }
}
