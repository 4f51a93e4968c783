use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{BallotMeasureId, CandidateId};

/// A finished walkthrough: profile, starred choices and the readiness answer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompletionEvent {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub user_profile: serde_json::Value,
    pub starred_candidates: Vec<CandidateId>,
    pub starred_measures: Vec<BallotMeasureId>,
    pub readiness_response: Option<String>, // 'yes', 'no', 'still-thinking'
    pub completed_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording a completion event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCompletionEvent {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default, alias = "userProfile")]
    pub user_profile: Option<serde_json::Value>,
    #[serde(default, alias = "starredCandidates")]
    pub starred_candidates: Vec<CandidateId>,
    #[serde(default, alias = "starredMeasures")]
    pub starred_measures: Vec<BallotMeasureId>,
    #[serde(default, alias = "readinessResponse")]
    pub readiness_response: Option<String>,
    #[serde(default, alias = "completedAt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewCompletionEvent {
    /// Stamp the input with a server id and timestamps.
    pub fn into_event(self, now: DateTime<Utc>) -> CompletionEvent {
        CompletionEvent {
            id: Uuid::now_v7(),
            session_id: self.session_id,
            user_profile: self
                .user_profile
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            starred_candidates: self.starred_candidates,
            starred_measures: self.starred_measures,
            readiness_response: self.readiness_response,
            completed_at: self.completed_at.unwrap_or(now),
            recorded_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_get_defaults() {
        let input: NewCompletionEvent = serde_json::from_str("{}").unwrap();
        let now = Utc::now();
        let event = input.into_event(now);

        assert!(event.user_profile.is_object());
        assert!(event.starred_candidates.is_empty());
        assert_eq!(event.completed_at, now);
        assert_eq!(event.recorded_at, now);
    }

    #[test]
    fn test_camel_case_aliases_are_accepted() {
        let input: NewCompletionEvent = serde_json::from_str(
            r#"{"sessionId":"s-1","starredCandidates":["candidate-3"],"readinessResponse":"yes"}"#,
        )
        .unwrap();

        assert_eq!(input.session_id.as_deref(), Some("s-1"));
        assert_eq!(input.starred_candidates[0].as_str(), "candidate-3");
        assert_eq!(input.readiness_response.as_deref(), Some("yes"));
    }
}
