//! Case and Metrics Documents
//!
//! The two static JSON documents supplied at startup: the role-play scenario,
//! and the criterion groups with their weight tables. Any problem loading
//! either document is fatal.

use crate::criteria::{CriterionGroup, GroupId, SubCriterion, WeightError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Failures while loading the startup documents.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error("Required file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("Error reading '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Invalid JSON format in '{}': {}", .0.display(), .1)]
    InvalidJson(PathBuf, #[source] serde_json::Error),
    #[error("Metrics document defines no criterion groups")]
    NoGroups,
    #[error("Criterion group {0} is defined more than once")]
    DuplicateGroup(GroupId),
    #[error(transparent)]
    Weights(#[from] WeightError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleContext {
    pub title: String,
    pub responsibility: String,
}

/// The role-play scenario shown to the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDocument {
    pub title: String,
    pub description: String,
    pub role: RoleContext,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default = "default_focus_areas")]
    pub focus_areas: Vec<String>,
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
}

fn default_focus_areas() -> Vec<String> {
    [
        "branch operations optimization",
        "customer service improvement",
        "team performance management",
        "service quality standards",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_time_limit() -> u32 {
    25
}

#[derive(Debug, Clone, Deserialize)]
struct GroupSpec {
    id: GroupId,
    name: String,
    description: String,
    /// Omitted tables fall back to the stock weights for `id`.
    #[serde(default)]
    weights: Option<BTreeMap<SubCriterion, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct MetricsDocument {
    groups: Vec<GroupSpec>,
}

impl CaseDocument {
    pub fn load(path: &Path) -> Result<Self, CaseError> {
        read_json(path)
    }
}

/// Loads and validates the criterion groups, preserving document order.
pub fn load_groups(path: &Path) -> Result<Vec<CriterionGroup>, CaseError> {
    let doc: MetricsDocument = read_json(path)?;
    groups_from_specs(doc.groups)
}

/// Parses criterion groups from an in-memory metrics document.
pub fn parse_groups(json: &str) -> Result<Vec<CriterionGroup>, CaseError> {
    let doc: MetricsDocument = serde_json::from_str(json)
        .map_err(|e| CaseError::InvalidJson(PathBuf::from("<inline>"), e))?;
    groups_from_specs(doc.groups)
}

fn groups_from_specs(specs: Vec<GroupSpec>) -> Result<Vec<CriterionGroup>, CaseError> {
    if specs.is_empty() {
        return Err(CaseError::NoGroups);
    }
    let mut groups: Vec<CriterionGroup> = Vec::with_capacity(specs.len());
    for spec in specs {
        if groups.iter().any(|g| g.id == spec.id) {
            return Err(CaseError::DuplicateGroup(spec.id));
        }
        let weights = spec
            .weights
            .unwrap_or_else(|| CriterionGroup::default_weights(spec.id));
        groups.push(CriterionGroup::new(spec.id, spec.name, spec.description, weights)?);
    }
    Ok(groups)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CaseError> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CaseError::NotFound(path.to_path_buf()),
        _ => CaseError::Io(path.to_path_buf(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| CaseError::InvalidJson(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const METRICS: &str = r#"{
        "groups": [
            {
                "id": "ClearCommunication",
                "name": "Clear Communication",
                "description": "Conveys ideas clearly",
                "weights": {"clarity": 0.5, "examples": 0.5}
            },
            {
                "id": "ActiveEngagement",
                "name": "Active Engagement",
                "description": "Takes initiative"
            }
        ]
    }"#;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_groups_preserves_order_and_defaults_weights() {
        let groups = parse_groups(METRICS).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, GroupId::ClearCommunication);
        assert_eq!(groups[0].weights().count(), 2);
        assert_eq!(groups[1].id, GroupId::ActiveEngagement);
        let defaults: Vec<_> = CriterionGroup::default_weights(GroupId::ActiveEngagement)
            .into_iter()
            .collect();
        assert_eq!(groups[1].weights().collect::<Vec<_>>(), defaults);
    }

    #[test]
    fn test_bad_weights_are_fatal() {
        let json = r#"{"groups": [{"id": "ClearCommunication", "name": "n", "description": "d",
            "weights": {"clarity": 0.9, "examples": 0.9}}]}"#;
        let err = parse_groups(json).unwrap_err();
        assert!(matches!(err, CaseError::Weights(WeightError::BadSum { .. })));
    }

    #[test]
    fn test_empty_and_duplicate_groups_rejected() {
        assert!(matches!(
            parse_groups(r#"{"groups": []}"#).unwrap_err(),
            CaseError::NoGroups
        ));
        let dup = r#"{"groups": [
            {"id": "ActiveEngagement", "name": "a", "description": "a"},
            {"id": "ActiveEngagement", "name": "b", "description": "b"}]}"#;
        assert!(matches!(
            parse_groups(dup).unwrap_err(),
            CaseError::DuplicateGroup(GroupId::ActiveEngagement)
        ));
    }

    #[test]
    fn test_unknown_group_id_is_invalid_json() {
        let json = r#"{"groups": [{"id": "Charisma", "name": "n", "description": "d"}]}"#;
        assert!(matches!(parse_groups(json).unwrap_err(), CaseError::InvalidJson(..)));
    }

    #[test]
    fn test_load_groups_from_file() {
        let file = temp_file(METRICS);
        let groups = load_groups(file.path()).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let err = CaseDocument::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CaseError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_case_document_defaults() {
        let file = temp_file(
            r#"{"title": "Prime Finance", "description": "A regional bank",
                "role": {"title": "General Manager", "responsibility": "45 branches"}}"#,
        );
        let case = CaseDocument::load(file.path()).unwrap();
        assert_eq!(case.focus_areas.len(), 4);
        assert_eq!(case.time_limit_minutes, 25);
        assert!(case.instructions.is_empty());
    }

    #[test]
    fn test_malformed_case_document() {
        let file = temp_file("{ not json");
        let err = CaseDocument::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON format"));
    }
}
