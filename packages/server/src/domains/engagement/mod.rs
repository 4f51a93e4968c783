pub mod models;

// Re-export commonly used types
pub use models::{
    CompletionEvent, EmailSignup, NewCompletionEvent, NewEmailSignup, ReadinessResponse,
    ReadinessStats,
};
