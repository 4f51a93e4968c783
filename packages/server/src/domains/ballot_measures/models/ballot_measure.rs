use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::{BallotMeasureId, IssueId};

/// A proposition voters decide on.
///
/// `related_issues` is the authoritative side of the Issue <-> BallotMeasure relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotMeasure {
    pub id: BallotMeasureId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub impact: String,
    pub related_issues: BTreeSet<IssueId>,
}
