// Trait definitions for the storage seam
//
// Backends only provide snapshots and the two writes. Every read and relationship
// query is a provided method evaluated on a snapshot, so all backends share the
// same filtering logic.
//
// Naming convention: Base* for trait names (e.g., BaseCivicStore)

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{IssueId, OfficeId, StoreError};
use crate::domains::ballot_measures::BallotMeasure;
use crate::domains::candidates::Candidate;
use crate::domains::engagement::{
    CompletionEvent, EmailSignup, NewCompletionEvent, NewEmailSignup, ReadinessStats,
};
use crate::domains::issues::{FrequencyExport, Issue, IssueFrequencies};
use crate::domains::offices::Office;
use crate::domains::relationships::{self, CandidateFilter, CivicData};
use crate::kernel::catalog::CivicCatalog;

// =============================================================================
// Snapshot + increment types
// =============================================================================

/// A consistent, immutable view of the dataset at one point in time.
#[derive(Debug, Clone)]
pub struct CivicSnapshot {
    pub catalog: Arc<CivicCatalog>,
    pub total_participants: i64,
}

/// Validated input to `increment_issue_counts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementRequest {
    /// Requested ids, deduplicated. Each resolving issue moves by exactly one.
    pub issue_ids: BTreeSet<IssueId>,
    /// Blank user ids are treated as absent.
    pub user_id: Option<String>,
}

impl IncrementRequest {
    pub fn new(issue_ids: &[IssueId], user_id: Option<&str>) -> Result<Self, StoreError> {
        if issue_ids.is_empty() {
            return Err(StoreError::validation("issueIds must be a non-empty list"));
        }
        Ok(Self {
            issue_ids: issue_ids.iter().cloned().collect(),
            user_id: user_id
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        })
    }
}

/// Result of an increment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// Counts moved for these issues; participants counter moved by one.
    Applied { incremented: Vec<IssueId> },
    /// The user id was already counted; nothing changed.
    DuplicateParticipant,
    /// None of the ids named an existing issue; nothing changed.
    NoIssuesResolved,
}

impl IncrementOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IncrementOutcome::Applied { .. })
    }
}

// =============================================================================
// Civic Store Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseCivicStore: Send + Sync {
    /// Read a consistent snapshot of all entities and the participants counter.
    async fn snapshot(&self) -> Result<CivicSnapshot, StoreError>;

    /// Single-participation increment. Validation happens before any state is touched.
    async fn increment_issue_counts(
        &self,
        issue_ids: &[IssueId],
        user_id: Option<&str>,
    ) -> Result<IncrementOutcome, StoreError>;

    /// Restore the seed dataset, clear participant tracking and the counter.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Backend liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Provided reads
    // -------------------------------------------------------------------------

    async fn list_issues(&self) -> Result<Vec<Issue>, StoreError> {
        Ok(self.snapshot().await?.catalog.issues())
    }

    async fn get_issue(&self, id: &str) -> Result<Option<Issue>, StoreError> {
        Ok(self.snapshot().await?.catalog.issue(id).cloned())
    }

    async fn list_offices(&self) -> Result<Vec<Office>, StoreError> {
        Ok(self.snapshot().await?.catalog.offices())
    }

    async fn get_office(&self, id: &str) -> Result<Option<Office>, StoreError> {
        Ok(self.snapshot().await?.catalog.office(id).cloned())
    }

    async fn list_ballot_measures(&self) -> Result<Vec<BallotMeasure>, StoreError> {
        Ok(self.snapshot().await?.catalog.ballot_measures())
    }

    async fn get_ballot_measure(&self, id: &str) -> Result<Option<BallotMeasure>, StoreError> {
        Ok(self.snapshot().await?.catalog.ballot_measure(id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.snapshot().await?.catalog.candidates())
    }

    async fn get_candidate(&self, id: &str) -> Result<Option<Candidate>, StoreError> {
        Ok(self.snapshot().await?.catalog.candidate(id).cloned())
    }

    async fn total_participants(&self) -> Result<i64, StoreError> {
        Ok(self.snapshot().await?.total_participants)
    }

    async fn issue_frequencies(&self) -> Result<IssueFrequencies, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(IssueFrequencies::from_issues(
            &snapshot.catalog.issues(),
            snapshot.total_participants,
        ))
    }

    async fn top_issues(&self, limit: usize) -> Result<Vec<Issue>, StoreError> {
        Ok(Issue::rank_by_count(self.list_issues().await?, limit))
    }

    async fn export(&self) -> Result<FrequencyExport, StoreError> {
        Ok(self.issue_frequencies().await?.into())
    }

    // -------------------------------------------------------------------------
    // Provided relationship queries
    // -------------------------------------------------------------------------

    async fn offices_for_issues(&self, issue_ids: &[IssueId]) -> Result<Vec<Office>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(relationships::offices_for_issues(&snapshot.catalog, issue_ids))
    }

    async fn measures_for_issues(
        &self,
        issue_ids: &[IssueId],
    ) -> Result<Vec<BallotMeasure>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(relationships::measures_for_issues(&snapshot.catalog, issue_ids))
    }

    async fn candidates_for_issues(
        &self,
        issue_ids: &[IssueId],
    ) -> Result<Vec<Candidate>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(relationships::candidates_for_issues(&snapshot.catalog, issue_ids))
    }

    async fn candidates_for_offices(
        &self,
        office_ids: &[OfficeId],
    ) -> Result<Vec<Candidate>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(relationships::candidates_for_offices(&snapshot.catalog, office_ids))
    }

    async fn filter_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<Candidate>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(filter.apply(&snapshot.catalog))
    }

    async fn civic_data(&self, issue_ids: Option<&[IssueId]>) -> Result<CivicData, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(CivicData::compose(
            &snapshot.catalog,
            snapshot.total_participants,
            issue_ids,
        ))
    }
}

// =============================================================================
// Engagement Log Trait (Infrastructure - append-only)
// =============================================================================

#[async_trait]
pub trait BaseEngagementLog: Send + Sync {
    async fn record_completion(
        &self,
        input: NewCompletionEvent,
    ) -> Result<CompletionEvent, StoreError>;

    /// Validates the address before storing.
    async fn record_email_signup(&self, input: NewEmailSignup) -> Result<EmailSignup, StoreError>;

    /// Newest first
    async fn list_completions(&self, limit: Option<usize>)
        -> Result<Vec<CompletionEvent>, StoreError>;

    /// Newest first, optionally restricted to one source screen
    async fn list_email_signups(
        &self,
        limit: Option<usize>,
        source: Option<&str>,
    ) -> Result<Vec<EmailSignup>, StoreError>;

    async fn readiness_stats(&self) -> Result<ReadinessStats, StoreError>;
}
