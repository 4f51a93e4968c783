//! Issue-driven relationship filtering.
//!
//! Pure functions over a `CivicCatalog` snapshot. Unknown and duplicate ids in a
//! filter are tolerated everywhere; an explicit empty filter matches nothing.

pub mod queries;

pub use queries::*;
