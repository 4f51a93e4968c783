use thiserror::Error;

/// Errors surfaced by civic store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures of the backing store itself, as opposed to bad input
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

/// Errors raised while loading the seed dataset
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to parse seed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate {entity} id in seed data: {id}")]
    DuplicateId { entity: &'static str, id: String },

    #[error("Blank {entity} id in seed data")]
    BlankId { entity: &'static str },

    #[error("Issue '{id}' has negative count {count}")]
    NegativeCount { id: String, count: i64 },
}
