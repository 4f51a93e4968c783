//! Typed ID definitions for all civic entities.
//!
//! ```rust
//! use civic_core::common::{IssueId, OfficeId};
//!
//! let issue = IssueId::new("housing");
//! let office = OfficeId::new("city-council");
//! // let wrong: OfficeId = issue; // compile error
//! # let _ = (issue, office);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Issue entities (civic topics).
pub struct IssueMarker;

/// Marker type for Office entities (elected positions).
pub struct OfficeMarker;

/// Marker type for BallotMeasure entities (propositions).
pub struct BallotMeasureMarker;

/// Marker type for Candidate entities.
pub struct CandidateMarker;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Issue entities.
pub type IssueId = Id<IssueMarker>;

/// Typed ID for Office entities.
pub type OfficeId = Id<OfficeMarker>;

/// Typed ID for BallotMeasure entities.
pub type BallotMeasureId = Id<BallotMeasureMarker>;

/// Typed ID for Candidate entities.
pub type CandidateId = Id<CandidateMarker>;
