use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::{CandidateId, IssueId, OfficeId};

/// A person running for a single office.
///
/// Issue relevance comes from two independent signals: the direct platform tags in
/// `related_issues`, and the issues of the office named by `office_id`. The tags are
/// seeded as-is and never reconciled with the office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub photo: String,
    pub positions: Vec<String>,
    pub office_id: Option<OfficeId>,
    pub related_issues: BTreeSet<IssueId>,
}
