//! Server dependencies (using traits for testability)
//!
//! Handlers only see the trait objects, so the same router runs against the
//! in-memory store in tests and Postgres in production.

use sqlx::PgPool;
use std::sync::Arc;

use crate::common::StoreError;
use crate::kernel::{
    BaseCivicStore, BaseEngagementLog, CivicSeed, MemoryCivicStore, MemoryEngagementLog,
    PostgresCivicStore, PostgresEngagementLog,
};

// =============================================================================
// ServerDeps
// =============================================================================

/// Storage handles shared by every request
#[derive(Clone)]
pub struct ServerDeps {
    pub civic: Arc<dyn BaseCivicStore>,
    pub engagement: Arc<dyn BaseEngagementLog>,
}

impl ServerDeps {
    pub fn new(civic: Arc<dyn BaseCivicStore>, engagement: Arc<dyn BaseEngagementLog>) -> Self {
        Self { civic, engagement }
    }

    /// In-process stores loaded from `seed`
    pub fn in_memory(seed: CivicSeed) -> Result<Self, StoreError> {
        Ok(Self::new(
            Arc::new(MemoryCivicStore::new(seed)?),
            Arc::new(MemoryEngagementLog::new()),
        ))
    }

    /// Postgres-backed stores sharing one pool. `seed` is what resets restore.
    pub fn postgres(pool: PgPool, seed: CivicSeed) -> Self {
        Self::new(
            Arc::new(PostgresCivicStore::new(pool.clone(), seed)),
            Arc::new(PostgresEngagementLog::new(pool)),
        )
    }
}
