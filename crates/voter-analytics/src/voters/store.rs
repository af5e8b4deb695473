use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::domain::{VoterId, VoterRecord};
use super::filter::FilterCriteria;

/// Storage abstraction so ingestion and reporting can be exercised in isolation.
pub trait VoterStore: Send + Sync {
    /// Removes every record, returning how many were deleted.
    fn delete_all(&self) -> Result<usize, StoreError>;
    /// Stores a record and returns it with its assigned id.
    fn insert(&self, record: VoterRecord) -> Result<VoterRecord, StoreError>;
    fn fetch(&self, id: VoterId) -> Result<Option<VoterRecord>, StoreError>;
    /// Records matching every active criterion, in no particular order.
    fn filter(&self, criteria: &FilterCriteria) -> Result<Vec<VoterRecord>, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;

    fn group_by(
        &self,
        criteria: &FilterCriteria,
        field: GroupField,
    ) -> Result<BTreeMap<String, usize>, StoreError> {
        let voters = self.filter(criteria)?;
        Ok(group_counts(&voters, field))
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("voter store unavailable: {0}")]
    Unavailable(String),
}

/// Fields the store can group and count by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    PartyAffiliation,
    BirthYear,
    PrecinctNumber,
    ZipCode,
}

impl GroupField {
    /// Grouping key for a voter. Voters without a birth date have no birth-year key.
    pub fn key(self, voter: &VoterRecord) -> Option<String> {
        match self {
            Self::PartyAffiliation => Some(voter.party_affiliation.as_str().to_string()),
            Self::BirthYear => voter.birth_year().map(|year| year.to_string()),
            Self::PrecinctNumber => Some(voter.precinct_number.clone()),
            Self::ZipCode => Some(voter.zip_code.clone()),
        }
    }
}

pub fn group_counts(voters: &[VoterRecord], field: GroupField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in voters.iter().filter_map(|voter| field.key(voter)) {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Process-local store backing the service and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVoterStore {
    records: Arc<RwLock<BTreeMap<VoterId, VoterRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryVoterStore {
    fn next_id(&self) -> VoterId {
        VoterId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("voter store lock poisoned".to_string())
}

impl VoterStore for InMemoryVoterStore {
    fn delete_all(&self) -> Result<usize, StoreError> {
        let mut guard = self.records.write().map_err(poisoned)?;
        let removed = guard.len();
        guard.clear();
        Ok(removed)
    }

    fn insert(&self, mut record: VoterRecord) -> Result<VoterRecord, StoreError> {
        record.id = self.next_id();
        let mut guard = self.records.write().map_err(poisoned)?;
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: VoterId) -> Result<Option<VoterRecord>, StoreError> {
        let guard = self.records.read().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn filter(&self, criteria: &FilterCriteria) -> Result<Vec<VoterRecord>, StoreError> {
        let guard = self.records.read().map_err(poisoned)?;
        Ok(criteria.apply(guard.values()).cloned().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let guard = self.records.read().map_err(poisoned)?;
        Ok(guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voters::domain::PartyCode;
    use chrono::NaiveDate;

    fn voter(party: &str, birth_year: Option<i32>) -> VoterRecord {
        VoterRecord {
            id: VoterId::UNASSIGNED,
            first_name: "Pat".to_string(),
            last_name: "Lee".to_string(),
            street_number: "1".to_string(),
            street_name: "Main St".to_string(),
            apartment_number: None,
            zip_code: "02458".to_string(),
            date_of_birth: birth_year.and_then(|year| NaiveDate::from_ymd_opt(year, 6, 1)),
            date_of_registration: None,
            party_affiliation: PartyCode::normalize(party),
            precinct_number: "4".to_string(),
            elections: Default::default(),
            voter_score: 0,
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = InMemoryVoterStore::default();
        let first = store.insert(voter("D", None)).expect("insert");
        let second = store.insert(voter("R", None)).expect("insert");
        assert_eq!(first.id, VoterId(1));
        assert_eq!(second.id, VoterId(2));
        assert_eq!(store.fetch(VoterId(2)).expect("fetch"), Some(second));
        assert_eq!(store.fetch(VoterId(9)).expect("fetch"), None);
    }

    #[test]
    fn delete_all_reports_removed_rows() {
        let store = InMemoryVoterStore::default();
        store.insert(voter("D", None)).expect("insert");
        store.insert(voter("D", None)).expect("insert");
        assert_eq!(store.delete_all().expect("delete"), 2);
        assert_eq!(store.count().expect("count"), 0);
        assert_eq!(store.delete_all().expect("delete"), 0);
    }

    #[test]
    fn group_by_counts_filtered_records() {
        let store = InMemoryVoterStore::default();
        store.insert(voter("D", Some(1960))).expect("insert");
        store.insert(voter("D", Some(1960))).expect("insert");
        store.insert(voter("R", None)).expect("insert");

        let parties = store
            .group_by(&FilterCriteria::default(), GroupField::PartyAffiliation)
            .expect("group");
        assert_eq!(parties.get("D "), Some(&2));
        assert_eq!(parties.get("R "), Some(&1));

        let years = store
            .group_by(&FilterCriteria::default(), GroupField::BirthYear)
            .expect("group");
        assert_eq!(years.len(), 1);
        assert_eq!(years.get("1960"), Some(&2));

        let democrats = FilterCriteria::default().with_party("d");
        let precincts = store
            .group_by(&democrats, GroupField::PrecinctNumber)
            .expect("group");
        assert_eq!(precincts.get("4"), Some(&2));
    }
}
