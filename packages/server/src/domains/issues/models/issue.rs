use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{BallotMeasureId, IssueId, OfficeId};

/// A civic topic users can select, with its engagement count.
///
/// `related_offices` and `related_measures` are never authored directly; they are
/// the inverse of `Office::related_issues` and `BallotMeasure::related_issues`,
/// computed when the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub name: String,
    pub icon: String, // lucide icon tag, e.g. 'Home', 'Shield'
    pub description: String,
    pub count: i64,
    pub related_offices: BTreeSet<OfficeId>,
    pub related_measures: BTreeSet<BallotMeasureId>,
}

impl Issue {
    /// Sort issues by count (highest first, ties by id) and keep at most `limit`.
    pub fn rank_by_count(mut issues: Vec<Issue>, limit: usize) -> Vec<Issue> {
        issues.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
        issues.truncate(limit);
        issues
    }
}

/// Legacy frequency view: issue id -> count, plus total participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFrequencies {
    pub frequencies: BTreeMap<IssueId, i64>,
    pub total_users: i64,
}

impl IssueFrequencies {
    pub fn from_issues(issues: &[Issue], total_users: i64) -> Self {
        Self {
            frequencies: issues.iter().map(|i| (i.id.clone(), i.count)).collect(),
            total_users,
        }
    }
}

/// Point-in-time export of engagement counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyExport {
    pub issue_frequencies: BTreeMap<IssueId, i64>,
    pub total_users: i64,
    pub export_timestamp: DateTime<Utc>,
}

impl From<IssueFrequencies> for FrequencyExport {
    fn from(frequencies: IssueFrequencies) -> Self {
        Self {
            issue_frequencies: frequencies.frequencies,
            total_users: frequencies.total_users,
            export_timestamp: Utc::now(),
        }
    }
}
