use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::StoreError;

/// An email address left on one of the closing screens.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailSignup {
    pub id: Uuid,
    pub email: String,
    pub source: Option<String>, // 'thankyou', 'cast'
    pub wants_updates: bool,
    pub user_profile: Option<serde_json::Value>,
    pub ballot_data: Option<serde_json::Value>,
    pub session_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording an email signup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmailSignup {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "wantsUpdates")]
    pub wants_updates: bool,
    #[serde(default, alias = "userProfile")]
    pub user_profile: Option<serde_json::Value>,
    #[serde(default, alias = "ballotData")]
    pub ballot_data: Option<serde_json::Value>,
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

impl NewEmailSignup {
    /// Reject signups without a plausible address before anything is stored.
    pub fn validate(&self) -> Result<(), StoreError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(StoreError::validation("email is required"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(StoreError::validation(format!(
                "'{}' is not a valid email address",
                email
            ))),
        }
    }

    pub fn into_signup(self, now: DateTime<Utc>) -> EmailSignup {
        EmailSignup {
            id: Uuid::now_v7(),
            email: self.email.trim().to_string(),
            source: self.source,
            wants_updates: self.wants_updates,
            user_profile: self.user_profile,
            ballot_data: self.ballot_data,
            session_id: self.session_id,
            recorded_at: now,
        }
    }
}
