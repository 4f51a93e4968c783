// Flint Spark Civic - API Core
//
// Backend for the civic engagement app: issue selection with social-proof
// counts, the offices, ballot measures and candidates related to those issues,
// and an append-only log of completion events and email signups.
//
// Storage sits behind the traits in kernel/traits.rs with an in-memory and a
// Postgres implementation.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
