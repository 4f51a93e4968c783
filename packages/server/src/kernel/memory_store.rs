//! In-process civic store and engagement log.
//!
//! The whole dataset sits behind one `RwLock`. Readers clone an `Arc` to the
//! current catalog, so a snapshot stays valid after the guard is released.
//! Writers copy-on-write through `Arc::make_mut`, which means a reader holding an
//! older snapshot never sees a half-applied increment.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::common::{IssueId, StoreError};
use crate::domains::engagement::{
    CompletionEvent, EmailSignup, NewCompletionEvent, NewEmailSignup, ReadinessStats,
};
use crate::kernel::catalog::CivicCatalog;
use crate::kernel::seed::CivicSeed;
use crate::kernel::traits::{
    BaseCivicStore, BaseEngagementLog, CivicSnapshot, IncrementOutcome, IncrementRequest,
};

/// Mutable state guarded as one unit
struct CivicState {
    catalog: Arc<CivicCatalog>,
    total_participants: i64,
    seen_participants: HashSet<String>,
}

impl CivicState {
    fn from_seed(seed: &CivicSeed) -> Result<Self, StoreError> {
        Ok(Self {
            catalog: Arc::new(CivicCatalog::build(seed.clone())?),
            total_participants: seed.participants_placeholder(),
            seen_participants: HashSet::new(),
        })
    }
}

/// In-memory civic store
pub struct MemoryCivicStore {
    seed: CivicSeed,
    state: RwLock<CivicState>,
}

impl MemoryCivicStore {
    /// Build a store from the given seed. The seed is kept for resets.
    pub fn new(seed: CivicSeed) -> Result<Self, StoreError> {
        let state = CivicState::from_seed(&seed)?;
        tracing::info!(
            issues = state.catalog.issue_count(),
            total_participants = state.total_participants,
            "In-memory civic store initialized"
        );
        Ok(Self {
            seed,
            state: RwLock::new(state),
        })
    }

    /// Store loaded with the bundled seed dataset
    pub fn with_embedded_seed() -> Result<Self, StoreError> {
        Self::new(CivicSeed::embedded()?)
    }
}

#[async_trait]
impl BaseCivicStore for MemoryCivicStore {
    async fn snapshot(&self) -> Result<CivicSnapshot, StoreError> {
        let state = self.state.read().await;
        Ok(CivicSnapshot {
            catalog: state.catalog.clone(),
            total_participants: state.total_participants,
        })
    }

    async fn increment_issue_counts(
        &self,
        issue_ids: &[IssueId],
        user_id: Option<&str>,
    ) -> Result<IncrementOutcome, StoreError> {
        let request = IncrementRequest::new(issue_ids, user_id)?;
        let mut state = self.state.write().await;

        if let Some(user_id) = &request.user_id {
            if state.seen_participants.contains(user_id) {
                tracing::info!(user_id = %user_id, "Duplicate participant rejected");
                return Ok(IncrementOutcome::DuplicateParticipant);
            }
        }

        let resolved = state.catalog.resolve_issue_ids(&request.issue_ids);
        if resolved.is_empty() {
            tracing::debug!(requested = ?request.issue_ids, "No requested issue exists");
            return Ok(IncrementOutcome::NoIssuesResolved);
        }

        let catalog = Arc::make_mut(&mut state.catalog);
        for issue_id in &resolved {
            catalog.bump_issue_count(issue_id.as_str());
        }
        if let Some(user_id) = request.user_id {
            state.seen_participants.insert(user_id);
        }
        state.total_participants += 1;

        tracing::info!(
            incremented = ?resolved,
            total_participants = state.total_participants,
            "Incremented issue counts"
        );

        Ok(IncrementOutcome::Applied {
            incremented: resolved.into_iter().collect(),
        })
    }

    async fn reset(&self) -> Result<(), StoreError> {
        // Build outside the lock, swap in one assignment
        let fresh = CivicState::from_seed(&self.seed)?;
        *self.state.write().await = fresh;
        tracing::info!("Civic data reset to seed values");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Engagement log
// =============================================================================

/// In-memory append-only engagement log
#[derive(Default)]
pub struct MemoryEngagementLog {
    completions: RwLock<Vec<CompletionEvent>>,
    email_signups: RwLock<Vec<EmailSignup>>,
}

impl MemoryEngagementLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseEngagementLog for MemoryEngagementLog {
    async fn record_completion(
        &self,
        input: NewCompletionEvent,
    ) -> Result<CompletionEvent, StoreError> {
        let event = input.into_event(Utc::now());
        self.completions.write().await.push(event.clone());
        tracing::info!(completion_id = %event.id, "Stored user completion");
        Ok(event)
    }

    async fn record_email_signup(&self, input: NewEmailSignup) -> Result<EmailSignup, StoreError> {
        input.validate()?;
        let signup = input.into_signup(Utc::now());
        self.email_signups.write().await.push(signup.clone());
        tracing::info!(signup_id = %signup.id, source = ?signup.source, "Stored email signup");
        Ok(signup)
    }

    async fn list_completions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<CompletionEvent>, StoreError> {
        let completions = self.completions.read().await;
        Ok(completions
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn list_email_signups(
        &self,
        limit: Option<usize>,
        source: Option<&str>,
    ) -> Result<Vec<EmailSignup>, StoreError> {
        let signups = self.email_signups.read().await;
        Ok(signups
            .iter()
            .rev()
            .filter(|s| source.is_none() || s.source.as_deref() == source)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn readiness_stats(&self) -> Result<ReadinessStats, StoreError> {
        let completions = self.completions.read().await;
        Ok(ReadinessStats::tally(
            completions
                .iter()
                .filter_map(|c| c.readiness_response.as_deref()),
        ))
    }
}
