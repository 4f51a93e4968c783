//! Query-string filters shared by the listing routes.
//!
//! `?issues=a,b` is split on commas, each element trimmed and empty elements
//! dropped. A present-but-empty parameter is an explicit empty filter (matches
//! nothing); an absent parameter means no filtering.

use serde::Deserialize;

use crate::common::{Id, IssueId, OfficeId};

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub issues: Option<String>,
    pub offices: Option<String>,
}

impl FilterParams {
    pub fn issue_ids(&self) -> Option<Vec<IssueId>> {
        parse_id_list(self.issues.as_deref())
    }

    pub fn office_ids(&self) -> Option<Vec<OfficeId>> {
        parse_id_list(self.offices.as_deref())
    }
}

pub fn parse_id_list<T>(raw: Option<&str>) -> Option<Vec<Id<T>>> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(Id::new)
            .collect()
    })
}
