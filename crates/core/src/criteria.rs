//! Criterion Groups and Weight Tables
//!
//! A criterion group is one top-level evaluation dimension, decomposed into
//! weighted sub-criteria. Groups are built once at startup from the metrics
//! document and never change afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tolerance used when checking that a weight table sums to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Identifier of a top-level criterion group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupId {
    ClearCommunication,
    EngagingDiscussions,
    ActiveEngagement,
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupId::ClearCommunication => "ClearCommunication",
            GroupId::EngagingDiscussions => "EngagingDiscussions",
            GroupId::ActiveEngagement => "ActiveEngagement",
        };
        f.write_str(name)
    }
}

/// A weighted sub-criterion. Declaration order is the display order inside a
/// group, which is why weight tables are keyed by this enum in a `BTreeMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubCriterion {
    Clarity,
    Structure,
    Completeness,
    Examples,
    Interaction,
    Depth,
    Relevance,
    Flow,
    Initiative,
    Responsiveness,
    Contribution,
    Consistency,
}

impl SubCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubCriterion::Clarity => "clarity",
            SubCriterion::Structure => "structure",
            SubCriterion::Completeness => "completeness",
            SubCriterion::Examples => "examples",
            SubCriterion::Interaction => "interaction",
            SubCriterion::Depth => "depth",
            SubCriterion::Relevance => "relevance",
            SubCriterion::Flow => "flow",
            SubCriterion::Initiative => "initiative",
            SubCriterion::Responsiveness => "responsiveness",
            SubCriterion::Contribution => "contribution",
            SubCriterion::Consistency => "consistency",
        }
    }
}

impl fmt::Display for SubCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a weight table was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("group {0} has no sub-criteria")]
    Empty(GroupId),
    #[error("group {group}: weight for '{criterion}' is {weight}, outside [0, 1]")]
    OutOfRange {
        group: GroupId,
        criterion: SubCriterion,
        weight: f64,
    },
    #[error("group {group}: weights sum to {sum}, expected 1.0")]
    BadSum { group: GroupId, sum: f64 },
}

/// One evaluation dimension with its validated weight table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionGroup {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    weights: BTreeMap<SubCriterion, f64>,
}

impl CriterionGroup {
    /// Builds a group, refusing weight tables that are empty, contain weights
    /// outside `[0, 1]`, or do not sum to one.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        description: impl Into<String>,
        weights: BTreeMap<SubCriterion, f64>,
    ) -> Result<Self, WeightError> {
        if weights.is_empty() {
            return Err(WeightError::Empty(id));
        }
        if let Some((criterion, weight)) = weights
            .iter()
            .find(|(_, w)| !(0.0..=1.0).contains(*w))
        {
            return Err(WeightError::OutOfRange {
                group: id,
                criterion: *criterion,
                weight: *weight,
            });
        }
        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum { group: id, sum });
        }
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            weights,
        })
    }

    /// Sub-criteria and their weights, in display order.
    pub fn weights(&self) -> impl Iterator<Item = (SubCriterion, f64)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }

    /// The stock weight table for a group.
    pub fn default_weights(id: GroupId) -> BTreeMap<SubCriterion, f64> {
        use SubCriterion::*;
        let table: &[(SubCriterion, f64)] = match id {
            GroupId::ClearCommunication => {
                &[(Clarity, 0.3), (Structure, 0.2), (Completeness, 0.3), (Examples, 0.2)]
            }
            GroupId::EngagingDiscussions => {
                &[(Interaction, 0.3), (Depth, 0.3), (Relevance, 0.2), (Flow, 0.2)]
            }
            GroupId::ActiveEngagement => &[
                (Initiative, 0.3),
                (Responsiveness, 0.3),
                (Contribution, 0.2),
                (Consistency, 0.2),
            ],
        };
        table.iter().copied().collect()
    }

    /// The stock three-group configuration.
    pub fn defaults() -> Vec<CriterionGroup> {
        [
            (
                GroupId::ClearCommunication,
                "Clear Communication",
                "Ability to convey ideas clearly, with structure and supporting examples",
            ),
            (
                GroupId::EngagingDiscussions,
                "Engaging Discussions",
                "Ability to hold interactive, in-depth discussions that stay on topic",
            ),
            (
                GroupId::ActiveEngagement,
                "Active Engagement",
                "Initiative, responsiveness and consistent contribution to the conversation",
            ),
        ]
        .into_iter()
        .map(|(id, name, description)| Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            weights: Self::default_weights(id),
        })
        .collect()
    }
}
