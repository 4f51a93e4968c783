use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::{IssueId, OfficeId};

/// Jurisdiction level of an office.
///
/// Known levels get their own variant; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OfficeLevel {
    Local,
    County,
    State,
    Federal,
    Other(String),
}

impl std::fmt::Display for OfficeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfficeLevel::Local => write!(f, "local"),
            OfficeLevel::County => write!(f, "county"),
            OfficeLevel::State => write!(f, "state"),
            OfficeLevel::Federal => write!(f, "federal"),
            OfficeLevel::Other(level) => write!(f, "{}", level),
        }
    }
}

impl From<String> for OfficeLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "local" => OfficeLevel::Local,
            "county" => OfficeLevel::County,
            "state" => OfficeLevel::State,
            "federal" => OfficeLevel::Federal,
            _ => OfficeLevel::Other(s),
        }
    }
}

impl From<OfficeLevel> for String {
    fn from(level: OfficeLevel) -> Self {
        level.to_string()
    }
}

/// An elected position and the issues it has authority over.
///
/// `related_issues` is the authoritative side of the Issue <-> Office relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub id: OfficeId,
    pub name: String,
    pub description: String,
    pub explanation: String,
    pub level: OfficeLevel,
    pub related_issues: BTreeSet<IssueId>,
}
