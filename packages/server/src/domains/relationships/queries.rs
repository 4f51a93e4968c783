use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::{CandidateId, IssueId, OfficeId};
use crate::domains::ballot_measures::BallotMeasure;
use crate::domains::candidates::Candidate;
use crate::domains::issues::Issue;
use crate::domains::offices::Office;
use crate::kernel::catalog::CivicCatalog;

/// Offices related to any of the given issues.
pub fn offices_for_issues(catalog: &CivicCatalog, issue_ids: &[IssueId]) -> Vec<Office> {
    let office_ids: BTreeSet<&OfficeId> = issue_ids
        .iter()
        .filter_map(|id| catalog.issue(id.as_str()))
        .flat_map(|issue| issue.related_offices.iter())
        .collect();

    office_ids
        .into_iter()
        .filter_map(|id| catalog.office(id.as_str()).cloned())
        .collect()
}

/// Ballot measures related to any of the given issues.
pub fn measures_for_issues(catalog: &CivicCatalog, issue_ids: &[IssueId]) -> Vec<BallotMeasure> {
    let measure_ids: BTreeSet<_> = issue_ids
        .iter()
        .filter_map(|id| catalog.issue(id.as_str()))
        .flat_map(|issue| issue.related_measures.iter())
        .collect();

    measure_ids
        .into_iter()
        .filter_map(|id| catalog.ballot_measure(id.as_str()).cloned())
        .collect()
}

/// Candidates relevant to any of the given issues.
///
/// Union of two signals:
/// - candidates directly tagged with one of the issues,
/// - candidates running for an office that covers one of the issues.
pub fn candidates_for_issues(catalog: &CivicCatalog, issue_ids: &[IssueId]) -> Vec<Candidate> {
    let mut matched: BTreeSet<&CandidateId> = BTreeSet::new();

    for issue_id in issue_ids {
        if let Some(tagged) = catalog.candidate_ids_tagged_with(issue_id.as_str()) {
            matched.extend(tagged);
        }

        // Second hop: issue -> office -> candidates running for it
        if let Some(issue) = catalog.issue(issue_id.as_str()) {
            for office_id in &issue.related_offices {
                if let Some(running) = catalog.candidate_ids_for_office(office_id.as_str()) {
                    matched.extend(running);
                }
            }
        }
    }

    collect_candidates(catalog, matched)
}

/// Candidates running for any of the given offices.
pub fn candidates_for_offices(catalog: &CivicCatalog, office_ids: &[OfficeId]) -> Vec<Candidate> {
    let matched: BTreeSet<&CandidateId> = office_ids
        .iter()
        .filter_map(|id| catalog.candidate_ids_for_office(id.as_str()))
        .flatten()
        .collect();

    collect_candidates(catalog, matched)
}

fn collect_candidates(catalog: &CivicCatalog, ids: BTreeSet<&CandidateId>) -> Vec<Candidate> {
    ids.into_iter()
        .filter_map(|id| catalog.candidate(id.as_str()).cloned())
        .collect()
}

// =============================================================================
// Candidate filter precedence
// =============================================================================

/// Which candidate query a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateFilter {
    All,
    Issues(Vec<IssueId>),
    Offices(Vec<OfficeId>),
}

impl CandidateFilter {
    /// An office filter wins over an issue filter; the issue filter is then ignored.
    pub fn from_parts(issues: Option<Vec<IssueId>>, offices: Option<Vec<OfficeId>>) -> Self {
        match (issues, offices) {
            (_, Some(offices)) => CandidateFilter::Offices(offices),
            (Some(issues), None) => CandidateFilter::Issues(issues),
            (None, None) => CandidateFilter::All,
        }
    }

    pub fn apply(&self, catalog: &CivicCatalog) -> Vec<Candidate> {
        match self {
            CandidateFilter::All => catalog.candidates(),
            CandidateFilter::Issues(issue_ids) => candidates_for_issues(catalog, issue_ids),
            CandidateFilter::Offices(office_ids) => candidates_for_offices(catalog, office_ids),
        }
    }
}

// =============================================================================
// Combined fetch
// =============================================================================

/// Issues (always unfiltered) plus offices, measures and candidates filtered by
/// the same optional issue set, all read from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CivicData {
    pub issues: Vec<Issue>,
    pub offices: Vec<Office>,
    pub ballot_measures: Vec<BallotMeasure>,
    pub candidates: Vec<Candidate>,
    pub total_users: i64,
}

impl CivicData {
    pub fn compose(
        catalog: &CivicCatalog,
        total_users: i64,
        issue_ids: Option<&[IssueId]>,
    ) -> Self {
        let (offices, ballot_measures, candidates) = match issue_ids {
            Some(ids) => (
                offices_for_issues(catalog, ids),
                measures_for_issues(catalog, ids),
                candidates_for_issues(catalog, ids),
            ),
            None => (
                catalog.offices(),
                catalog.ballot_measures(),
                catalog.candidates(),
            ),
        };

        Self {
            issues: catalog.issues(),
            offices,
            ballot_measures,
            candidates,
            total_users,
        }
    }
}
