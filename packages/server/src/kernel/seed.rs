//! Seed dataset: the one-directional source rows every backend starts from.
//!
//! Rows carry only the authoritative side of each relation (`Office::related_issues`,
//! `BallotMeasure::related_issues`, candidate tags). Issue rows never list offices or
//! measures; `CivicCatalog::build` derives those.

use serde::{Deserialize, Serialize};

use crate::common::SeedError;

/// Bundled seed dataset, restored on every reset.
const EMBEDDED_SEED: &str = include_str!("../../data/civic_seed.json");

/// Participants placeholder per seeded issue.
pub const PARTICIPANTS_PER_SEED_ISSUE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssueRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OfficeRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub related_issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BallotMeasureRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub related_issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub office_id: Option<String>,
    #[serde(default)]
    pub related_issues: Vec<String>,
}

/// The full civic dataset in its stored shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivicSeed {
    #[serde(default)]
    pub issues: Vec<IssueRow>,
    #[serde(default)]
    pub offices: Vec<OfficeRow>,
    #[serde(default)]
    pub ballot_measures: Vec<BallotMeasureRow>,
    #[serde(default)]
    pub candidates: Vec<CandidateRow>,
}

impl CivicSeed {
    /// The dataset bundled with the binary.
    pub fn embedded() -> Result<Self, SeedError> {
        Self::from_json(EMBEDDED_SEED)
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Starting value of the participants counter: one hundred per seeded issue.
    pub fn participants_placeholder(&self) -> i64 {
        self.issues.len() as i64 * PARTICIPANTS_PER_SEED_ISSUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_seed_parses() {
        let seed = CivicSeed::embedded().unwrap();
        assert_eq!(seed.issues.len(), 8);
        assert_eq!(seed.offices.len(), 1);
        assert_eq!(seed.ballot_measures.len(), 5);
        assert_eq!(seed.candidates.len(), 15);
    }

    #[test]
    fn test_participants_placeholder_scales_with_issues() {
        let seed = CivicSeed::embedded().unwrap();
        assert_eq!(seed.participants_placeholder(), 800);
        assert_eq!(CivicSeed::default().participants_placeholder(), 0);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let seed = CivicSeed::from_json(
            r#"{"offices":[{"id":"mayor","name":"Mayor"}],"candidates":[{"id":"c1","name":"A"}]}"#,
        )
        .unwrap();
        assert!(seed.offices[0].related_issues.is_empty());
        assert_eq!(seed.candidates[0].office_id, None);
        assert!(seed.issues.is_empty());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = CivicSeed::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }
}
