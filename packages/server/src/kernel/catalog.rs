//! Indexed, in-memory view of the civic dataset.
//!
//! `CivicCatalog::build` is the only place relations are resolved:
//! - references to unknown ids are dropped with a warning,
//! - `Issue::related_offices` / `Issue::related_measures` are inverted from the
//!   office and measure side,
//! - candidates are indexed by office and by direct issue tag.
//!
//! Every backend produces a `CivicSeed` and goes through here, so the derivation
//! rules cannot drift between storage implementations.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::common::{BallotMeasureId, CandidateId, Id, IssueId, OfficeId, SeedError};
use crate::domains::ballot_measures::BallotMeasure;
use crate::domains::candidates::Candidate;
use crate::domains::issues::Issue;
use crate::domains::offices::{Office, OfficeLevel};
use crate::kernel::seed::{BallotMeasureRow, CandidateRow, CivicSeed, IssueRow, OfficeRow};

#[derive(Debug, Clone, Default)]
pub struct CivicCatalog {
    issues: HashMap<IssueId, Issue>,
    offices: HashMap<OfficeId, Office>,
    ballot_measures: HashMap<BallotMeasureId, BallotMeasure>,
    candidates: HashMap<CandidateId, Candidate>,
    candidates_by_office: HashMap<OfficeId, BTreeSet<CandidateId>>,
    candidates_by_issue: HashMap<IssueId, BTreeSet<CandidateId>>,
}

impl CivicCatalog {
    /// Build the catalog and its relationship indices from seed rows.
    ///
    /// Duplicate or blank ids and negative counts are errors. Dangling references
    /// are not: they are logged and dropped.
    pub fn build(seed: CivicSeed) -> Result<Self, SeedError> {
        let mut catalog = Self::default();

        for row in seed.issues {
            let id = checked_id("issue", &row.id, &catalog.issues)?;
            if row.count < 0 {
                return Err(SeedError::NegativeCount {
                    id: row.id,
                    count: row.count,
                });
            }
            catalog.issues.insert(
                id.clone(),
                Issue {
                    id,
                    name: row.name,
                    icon: row.icon,
                    description: row.description,
                    count: row.count,
                    related_offices: BTreeSet::new(),
                    related_measures: BTreeSet::new(),
                },
            );
        }

        for row in seed.offices {
            let id = checked_id("office", &row.id, &catalog.offices)?;
            let related_issues =
                resolve_refs("office", &row.id, "issue", row.related_issues, &catalog.issues);
            for issue_id in &related_issues {
                if let Some(issue) = catalog.issues.get_mut(issue_id) {
                    issue.related_offices.insert(id.clone());
                }
            }
            catalog.offices.insert(
                id.clone(),
                Office {
                    id,
                    name: row.name,
                    description: row.description,
                    explanation: row.explanation,
                    level: OfficeLevel::from(row.level),
                    related_issues,
                },
            );
        }

        for row in seed.ballot_measures {
            let id = checked_id(
                "ballot measure",
                &row.id,
                &catalog.ballot_measures,
            )?;
            let related_issues = resolve_refs(
                "ballot measure",
                &row.id,
                "issue",
                row.related_issues,
                &catalog.issues,
            );
            for issue_id in &related_issues {
                if let Some(issue) = catalog.issues.get_mut(issue_id) {
                    issue.related_measures.insert(id.clone());
                }
            }
            catalog.ballot_measures.insert(
                id.clone(),
                BallotMeasure {
                    id,
                    title: row.title,
                    description: row.description,
                    category: row.category,
                    impact: row.impact,
                    related_issues,
                },
            );
        }

        for row in seed.candidates {
            let id = checked_id("candidate", &row.id, &catalog.candidates)?;
            let office_id = match row.office_id {
                Some(raw) if raw.trim().is_empty() => None,
                Some(raw) if catalog.offices.contains_key(raw.as_str()) => Some(OfficeId::new(raw)),
                Some(raw) => {
                    tracing::warn!(
                        candidate_id = %row.id,
                        office_id = %raw,
                        "Candidate references unknown office, dropping relation"
                    );
                    None
                }
                None => None,
            };
            let related_issues = resolve_refs(
                "candidate",
                &row.id,
                "issue",
                row.related_issues,
                &catalog.issues,
            );

            if let Some(office_id) = &office_id {
                catalog
                    .candidates_by_office
                    .entry(office_id.clone())
                    .or_default()
                    .insert(id.clone());
            }
            for issue_id in &related_issues {
                catalog
                    .candidates_by_issue
                    .entry(issue_id.clone())
                    .or_default()
                    .insert(id.clone());
            }

            catalog.candidates.insert(
                id.clone(),
                Candidate {
                    id,
                    name: row.name,
                    party: row.party,
                    photo: row.photo,
                    positions: row.positions,
                    office_id,
                    related_issues,
                },
            );
        }

        tracing::debug!(
            issues = catalog.issues.len(),
            offices = catalog.offices.len(),
            ballot_measures = catalog.ballot_measures.len(),
            candidates = catalog.candidates.len(),
            "Civic catalog built"
        );

        Ok(catalog)
    }

    /// Flatten back into stored rows, with dangling references already removed.
    /// Rows come out sorted by id.
    pub fn to_seed(&self) -> CivicSeed {
        CivicSeed {
            issues: self
                .issues()
                .into_iter()
                .map(|issue| IssueRow {
                    id: issue.id.into_inner(),
                    name: issue.name,
                    icon: issue.icon,
                    description: issue.description,
                    count: issue.count,
                })
                .collect(),
            offices: self
                .offices()
                .into_iter()
                .map(|office| OfficeRow {
                    id: office.id.into_inner(),
                    name: office.name,
                    description: office.description,
                    explanation: office.explanation,
                    level: office.level.to_string(),
                    related_issues: slugs(office.related_issues),
                })
                .collect(),
            ballot_measures: self
                .ballot_measures()
                .into_iter()
                .map(|measure| BallotMeasureRow {
                    id: measure.id.into_inner(),
                    title: measure.title,
                    description: measure.description,
                    category: measure.category,
                    impact: measure.impact,
                    related_issues: slugs(measure.related_issues),
                })
                .collect(),
            candidates: self
                .candidates()
                .into_iter()
                .map(|candidate| CandidateRow {
                    id: candidate.id.into_inner(),
                    name: candidate.name,
                    party: candidate.party,
                    photo: candidate.photo,
                    positions: candidate.positions,
                    office_id: candidate.office_id.map(Id::into_inner),
                    related_issues: slugs(candidate.related_issues),
                })
                .collect(),
        }
    }

    // =========================================================================
    // Bulk listing (sorted by id for stable output)
    // =========================================================================

    pub fn issues(&self) -> Vec<Issue> {
        sorted_values(&self.issues)
    }

    pub fn offices(&self) -> Vec<Office> {
        sorted_values(&self.offices)
    }

    pub fn ballot_measures(&self) -> Vec<BallotMeasure> {
        sorted_values(&self.ballot_measures)
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        sorted_values(&self.candidates)
    }

    // =========================================================================
    // Direct lookup
    // =========================================================================

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.get(id)
    }

    pub fn office(&self, id: &str) -> Option<&Office> {
        self.offices.get(id)
    }

    pub fn ballot_measure(&self, id: &str) -> Option<&BallotMeasure> {
        self.ballot_measures.get(id)
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.get(id)
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    // =========================================================================
    // Relationship indices
    // =========================================================================

    pub fn candidate_ids_for_office(&self, office_id: &str) -> Option<&BTreeSet<CandidateId>> {
        self.candidates_by_office.get(office_id)
    }

    pub fn candidate_ids_tagged_with(&self, issue_id: &str) -> Option<&BTreeSet<CandidateId>> {
        self.candidates_by_issue.get(issue_id)
    }

    // =========================================================================
    // Counters
    // =========================================================================

    /// Keep only the ids that name an existing issue, deduplicated.
    pub fn resolve_issue_ids<'a>(
        &self,
        issue_ids: impl IntoIterator<Item = &'a IssueId>,
    ) -> BTreeSet<IssueId> {
        issue_ids
            .into_iter()
            .filter(|id| self.issues.contains_key(id.as_str()))
            .cloned()
            .collect()
    }

    /// Add one to the count of an existing issue. Returns false for unknown ids.
    pub fn bump_issue_count(&mut self, issue_id: &str) -> bool {
        match self.issues.get_mut(issue_id) {
            Some(issue) => {
                issue.count += 1;
                true
            }
            None => false,
        }
    }
}

/// Parse a row id, rejecting blanks and ids already present in `existing`.
fn checked_id<V, T>(
    entity: &'static str,
    raw: &str,
    existing: &HashMap<Id<T>, V>,
) -> Result<Id<T>, SeedError> {
    let id: Id<T> = Id::new(raw);
    if id.is_blank() {
        return Err(SeedError::BlankId { entity });
    }
    if existing.contains_key(raw) {
        return Err(SeedError::DuplicateId {
            entity,
            id: raw.to_string(),
        });
    }
    Ok(id)
}

/// Keep references that resolve against `known`; warn about and drop the rest.
fn resolve_refs<V, T>(
    owner_kind: &'static str,
    owner_id: &str,
    target_kind: &'static str,
    refs: Vec<String>,
    known: &HashMap<Id<T>, V>,
) -> BTreeSet<Id<T>> {
    let mut seen = HashSet::new();
    let mut resolved = BTreeSet::new();
    for raw in refs {
        if !seen.insert(raw.clone()) {
            continue;
        }
        if known.contains_key(raw.as_str()) {
            resolved.insert(Id::new(raw));
        } else {
            tracing::warn!(
                owner_kind,
                owner_id,
                target_kind,
                target_id = %raw,
                "Dropping reference to unknown id"
            );
        }
    }
    resolved
}

fn sorted_values<K: Ord, V: Clone>(map: &HashMap<K, V>) -> Vec<V> {
    let mut entries: Vec<(&K, &V)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, v)| v.clone()).collect()
}

fn slugs<T>(ids: BTreeSet<Id<T>>) -> Vec<String> {
    ids.into_iter().map(Id::into_inner).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_row(id: &str, count: i64) -> IssueRow {
        IssueRow {
            id: id.to_string(),
            name: id.to_string(),
            icon: String::new(),
            description: String::new(),
            count,
        }
    }

    fn office_row(id: &str, issues: &[&str]) -> OfficeRow {
        OfficeRow {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            explanation: String::new(),
            level: "local".to_string(),
            related_issues: issues.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn candidate_row(id: &str, office: Option<&str>, issues: &[&str]) -> CandidateRow {
        CandidateRow {
            id: id.to_string(),
            name: id.to_string(),
            party: String::new(),
            photo: String::new(),
            positions: vec![],
            office_id: office.map(str::to_string),
            related_issues: issues.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_embedded_seed_builds() {
        let catalog = CivicCatalog::build(CivicSeed::embedded().unwrap()).unwrap();
        assert_eq!(catalog.issues().len(), 8);
        assert_eq!(catalog.candidates().len(), 15);
    }

    #[test]
    fn test_office_relation_is_inverted_onto_issues() {
        let seed = CivicSeed {
            issues: vec![issue_row("housing", 1), issue_row("economy", 1), issue_row("taxes", 1)],
            offices: vec![office_row("council", &["housing", "economy"])],
            ..Default::default()
        };
        let catalog = CivicCatalog::build(seed).unwrap();

        assert!(catalog.issue("housing").unwrap().related_offices.contains("council"));
        assert!(catalog.issue("economy").unwrap().related_offices.contains("council"));
        assert!(catalog.issue("taxes").unwrap().related_offices.is_empty());
    }

    #[test]
    fn test_unknown_references_are_dropped() {
        let seed = CivicSeed {
            issues: vec![issue_row("housing", 1)],
            offices: vec![office_row("council", &["housing", "retired-issue"])],
            candidates: vec![candidate_row("c1", Some("abolished-office"), &["housing", "gone"])],
            ..Default::default()
        };
        let catalog = CivicCatalog::build(seed).unwrap();

        let office = catalog.office("council").unwrap();
        assert_eq!(office.related_issues.len(), 1);

        let candidate = catalog.candidate("c1").unwrap();
        assert_eq!(candidate.office_id, None);
        assert_eq!(candidate.related_issues.len(), 1);
        assert!(catalog.candidate_ids_for_office("abolished-office").is_none());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let seed = CivicSeed {
            issues: vec![issue_row("housing", 1), issue_row("housing", 2)],
            ..Default::default()
        };
        let err = CivicCatalog::build(seed).unwrap_err();
        assert!(matches!(err, SeedError::DuplicateId { entity: "issue", .. }));
    }

    #[test]
    fn test_blank_ids_and_negative_counts_are_rejected() {
        let blank = CivicSeed {
            issues: vec![issue_row(" ", 1)],
            ..Default::default()
        };
        assert!(matches!(
            CivicCatalog::build(blank).unwrap_err(),
            SeedError::BlankId { .. }
        ));

        let negative = CivicSeed {
            issues: vec![issue_row("housing", -1)],
            ..Default::default()
        };
        assert!(matches!(
            CivicCatalog::build(negative).unwrap_err(),
            SeedError::NegativeCount { .. }
        ));
    }

    #[test]
    fn test_blank_office_id_means_unset() {
        let seed = CivicSeed {
            candidates: vec![candidate_row("c1", Some(""), &[])],
            ..Default::default()
        };
        let catalog = CivicCatalog::build(seed).unwrap();
        assert_eq!(catalog.candidate("c1").unwrap().office_id, None);
    }

    #[test]
    fn test_to_seed_drops_dangling_references() {
        let seed = CivicSeed {
            issues: vec![issue_row("housing", 4)],
            offices: vec![office_row("council", &["housing", "nope"])],
            ..Default::default()
        };
        let rows = CivicCatalog::build(seed).unwrap().to_seed();
        assert_eq!(rows.offices[0].related_issues, vec!["housing".to_string()]);
        assert_eq!(rows.issues[0].count, 4);
    }

    #[test]
    fn test_resolve_and_bump() {
        let seed = CivicSeed {
            issues: vec![issue_row("housing", 10)],
            ..Default::default()
        };
        let mut catalog = CivicCatalog::build(seed).unwrap();
        let requested = [IssueId::new("housing"), IssueId::new("housing"), IssueId::new("x")];

        let resolved = catalog.resolve_issue_ids(requested.iter());
        assert_eq!(resolved.len(), 1);

        assert!(catalog.bump_issue_count("housing"));
        assert!(!catalog.bump_issue_count("x"));
        assert_eq!(catalog.issue("housing").unwrap().count, 11);
    }
}
