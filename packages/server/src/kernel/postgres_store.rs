//! Postgres-backed civic store and engagement log.
//!
//! Reads load all four entity tables inside one read-only `REPEATABLE READ`
//! transaction and run them through `CivicCatalog::build`, the same derivation
//! the in-memory store uses. Each write is a single transaction.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::common::{IssueId, StoreError};
use crate::domains::engagement::{
    CompletionEvent, EmailSignup, NewCompletionEvent, NewEmailSignup, ReadinessResponse,
    ReadinessStats,
};
use crate::kernel::catalog::CivicCatalog;
use crate::kernel::seed::{BallotMeasureRow, CandidateRow, CivicSeed, IssueRow, OfficeRow};
use crate::kernel::traits::{
    BaseCivicStore, BaseEngagementLog, CivicSnapshot, IncrementOutcome, IncrementRequest,
};

/// Postgres civic store
pub struct PostgresCivicStore {
    pool: PgPool,
    seed: CivicSeed,
}

impl PostgresCivicStore {
    /// `seed` is what `reset` restores; it is not written until asked.
    pub fn new(pool: PgPool, seed: CivicSeed) -> Self {
        Self { pool, seed }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseCivicStore for PostgresCivicStore {
    async fn snapshot(&self) -> Result<CivicSnapshot, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let issues = sqlx::query_as::<_, IssueRow>(
            "SELECT id, name, icon, description, count FROM issues ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let offices = sqlx::query_as::<_, OfficeRow>(
            r#"
            SELECT id, name, description, explanation, level, related_issues
            FROM offices
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let ballot_measures = sqlx::query_as::<_, BallotMeasureRow>(
            r#"
            SELECT id, title, description, category, impact, related_issues
            FROM ballot_measures
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let candidates = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT id, name, party, photo, positions, office_id, related_issues
            FROM candidates
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let total_participants: Option<i64> = sqlx::query_scalar(
            "SELECT total_participants FROM participation_totals WHERE id = 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        let catalog = CivicCatalog::build(CivicSeed {
            issues,
            offices,
            ballot_measures,
            candidates,
        })?;

        Ok(CivicSnapshot {
            catalog: Arc::new(catalog),
            total_participants: total_participants.unwrap_or(0),
        })
    }

    async fn increment_issue_counts(
        &self,
        issue_ids: &[IssueId],
        user_id: Option<&str>,
    ) -> Result<IncrementOutcome, StoreError> {
        let request = IncrementRequest::new(issue_ids, user_id)?;
        let requested: Vec<IssueId> = request.issue_ids.iter().cloned().collect();

        let mut tx = self.pool.begin().await?;

        if let Some(user_id) = &request.user_id {
            let claimed = sqlx::query(
                "INSERT INTO participant_sessions (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if claimed == 0 {
                tx.rollback().await?;
                tracing::info!(user_id = %user_id, "Duplicate participant rejected");
                return Ok(IncrementOutcome::DuplicateParticipant);
            }
        }

        // Row locks are taken in id order so overlapping calls cannot deadlock
        let mut incremented: Vec<IssueId> = sqlx::query_scalar(
            r#"
            UPDATE issues SET count = count + 1
            WHERE id IN (
                SELECT id FROM issues WHERE id = ANY($1) ORDER BY id FOR UPDATE
            )
            RETURNING id
            "#,
        )
        .bind(&requested)
        .fetch_all(&mut *tx)
        .await?;

        if incremented.is_empty() {
            // Also releases the participant claim above
            tx.rollback().await?;
            tracing::debug!(requested = ?requested, "No requested issue exists");
            return Ok(IncrementOutcome::NoIssuesResolved);
        }

        sqlx::query(
            r#"
            INSERT INTO participation_totals (id, total_participants) VALUES (1, 1)
            ON CONFLICT (id) DO UPDATE
                SET total_participants = participation_totals.total_participants + 1
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        incremented.sort();
        tracing::info!(incremented = ?incremented, "Incremented issue counts");
        Ok(IncrementOutcome::Applied { incremented })
    }

    async fn reset(&self) -> Result<(), StoreError> {
        load_seed(&self.pool, &self.seed).await?;
        tracing::info!("Civic data reset to seed values");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// Seeding
// =============================================================================

/// Rows written by a seed load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub issues: usize,
    pub offices: usize,
    pub ballot_measures: usize,
    pub candidates: usize,
    pub total_participants: i64,
}

/// Replace all civic entities with `seed`, clear participant tracking and reset
/// the participants counter. Engagement records are kept.
///
/// The seed goes through `CivicCatalog::build` first, so duplicate ids are
/// rejected and dangling references never reach the database.
pub async fn load_seed(pool: &PgPool, seed: &CivicSeed) -> Result<SeedSummary, StoreError> {
    let rows = CivicCatalog::build(seed.clone())?.to_seed();
    let total_participants = seed.participants_placeholder();

    let mut tx = pool.begin().await?;

    sqlx::query("TRUNCATE candidates, ballot_measures, offices, issues, participant_sessions")
        .execute(&mut *tx)
        .await?;

    for issue in &rows.issues {
        sqlx::query(
            "INSERT INTO issues (id, name, icon, description, count) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&issue.id)
        .bind(&issue.name)
        .bind(&issue.icon)
        .bind(&issue.description)
        .bind(issue.count)
        .execute(&mut *tx)
        .await?;
    }

    for office in &rows.offices {
        sqlx::query(
            r#"
            INSERT INTO offices (id, name, description, explanation, level, related_issues)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&office.id)
        .bind(&office.name)
        .bind(&office.description)
        .bind(&office.explanation)
        .bind(&office.level)
        .bind(&office.related_issues)
        .execute(&mut *tx)
        .await?;
    }

    for measure in &rows.ballot_measures {
        sqlx::query(
            r#"
            INSERT INTO ballot_measures (id, title, description, category, impact, related_issues)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&measure.id)
        .bind(&measure.title)
        .bind(&measure.description)
        .bind(&measure.category)
        .bind(&measure.impact)
        .bind(&measure.related_issues)
        .execute(&mut *tx)
        .await?;
    }

    for candidate in &rows.candidates {
        sqlx::query(
            r#"
            INSERT INTO candidates (id, name, party, photo, positions, office_id, related_issues)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&candidate.id)
        .bind(&candidate.name)
        .bind(&candidate.party)
        .bind(&candidate.photo)
        .bind(&candidate.positions)
        .bind(&candidate.office_id)
        .bind(&candidate.related_issues)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO participation_totals (id, total_participants) VALUES (1, $1)
        ON CONFLICT (id) DO UPDATE SET total_participants = EXCLUDED.total_participants
        "#,
    )
    .bind(total_participants)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let summary = SeedSummary {
        issues: rows.issues.len(),
        offices: rows.offices.len(),
        ballot_measures: rows.ballot_measures.len(),
        candidates: rows.candidates.len(),
        total_participants,
    };
    tracing::info!(?summary, "Seed data loaded");
    Ok(summary)
}

/// Load `seed` only when the issues table is empty. Returns whether it loaded.
pub async fn seed_if_empty(pool: &PgPool, seed: &CivicSeed) -> Result<bool, StoreError> {
    let populated: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM issues)")
        .fetch_one(pool)
        .await?;

    if populated {
        return Ok(false);
    }
    load_seed(pool, seed).await?;
    Ok(true)
}

/// Row counts per table, for post-seed verification
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TableCounts {
    pub issues: i64,
    pub offices: i64,
    pub ballot_measures: i64,
    pub candidates: i64,
    pub participant_sessions: i64,
    pub user_completions: i64,
    pub email_signups: i64,
    pub total_participants: i64,
}

pub async fn table_counts(pool: &PgPool) -> Result<TableCounts, StoreError> {
    let counts = sqlx::query_as::<_, TableCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM issues) AS issues,
            (SELECT COUNT(*) FROM offices) AS offices,
            (SELECT COUNT(*) FROM ballot_measures) AS ballot_measures,
            (SELECT COUNT(*) FROM candidates) AS candidates,
            (SELECT COUNT(*) FROM participant_sessions) AS participant_sessions,
            (SELECT COUNT(*) FROM user_completions) AS user_completions,
            (SELECT COUNT(*) FROM email_signups) AS email_signups,
            COALESCE((SELECT total_participants FROM participation_totals WHERE id = 1), 0)
                AS total_participants
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

// =============================================================================
// Engagement log
// =============================================================================

/// Postgres append-only engagement log
pub struct PostgresEngagementLog {
    pool: PgPool,
}

impl PostgresEngagementLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseEngagementLog for PostgresEngagementLog {
    async fn record_completion(
        &self,
        input: NewCompletionEvent,
    ) -> Result<CompletionEvent, StoreError> {
        let event = input.into_event(Utc::now());

        let stored = sqlx::query_as::<_, CompletionEvent>(
            r#"
            INSERT INTO user_completions (
                id, session_id, user_profile, starred_candidates, starred_measures,
                readiness_response, completed_at, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.session_id)
        .bind(&event.user_profile)
        .bind(&event.starred_candidates)
        .bind(&event.starred_measures)
        .bind(&event.readiness_response)
        .bind(event.completed_at)
        .bind(event.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(completion_id = %stored.id, "Stored user completion");
        Ok(stored)
    }

    async fn record_email_signup(&self, input: NewEmailSignup) -> Result<EmailSignup, StoreError> {
        input.validate()?;
        let signup = input.into_signup(Utc::now());

        let stored = sqlx::query_as::<_, EmailSignup>(
            r#"
            INSERT INTO email_signups (
                id, email, source, wants_updates, user_profile, ballot_data, session_id, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(signup.id)
        .bind(&signup.email)
        .bind(&signup.source)
        .bind(signup.wants_updates)
        .bind(&signup.user_profile)
        .bind(&signup.ballot_data)
        .bind(&signup.session_id)
        .bind(signup.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(signup_id = %stored.id, source = ?stored.source, "Stored email signup");
        Ok(stored)
    }

    async fn list_completions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<CompletionEvent>, StoreError> {
        let completions = sqlx::query_as::<_, CompletionEvent>(
            "SELECT * FROM user_completions ORDER BY recorded_at DESC, id DESC LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(completions)
    }

    async fn list_email_signups(
        &self,
        limit: Option<usize>,
        source: Option<&str>,
    ) -> Result<Vec<EmailSignup>, StoreError> {
        let signups = sqlx::query_as::<_, EmailSignup>(
            r#"
            SELECT *
            FROM email_signups
            WHERE ($1::TEXT IS NULL OR source = $1)
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(source)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(signups)
    }

    async fn readiness_stats(&self) -> Result<ReadinessStats, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT readiness_response, COUNT(*)
            FROM user_completions
            WHERE readiness_response IS NOT NULL
            GROUP BY readiness_response
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = ReadinessStats::default();
        for (raw, n) in rows {
            if let Ok(response) = raw.parse::<ReadinessResponse>() {
                stats.add(response, n);
            }
        }
        Ok(stats)
    }
}

/// Row limit as a Postgres BIGINT. Limits past `i64::MAX` mean "everything".
fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}
