//! Kernel module - storage backends, seed loading and server dependencies.

pub mod catalog;
pub mod deps;
pub mod memory_store;
pub mod postgres_store;
pub mod seed;
pub mod traits;

pub use catalog::CivicCatalog;
pub use deps::ServerDeps;
pub use memory_store::{MemoryCivicStore, MemoryEngagementLog};
pub use postgres_store::{
    load_seed, seed_if_empty, table_counts, PostgresCivicStore, PostgresEngagementLog,
    SeedSummary, TableCounts,
};
pub use seed::CivicSeed;
pub use traits::*;
