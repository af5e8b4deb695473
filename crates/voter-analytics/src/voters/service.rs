use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::domain::{Election, VoterId, VoterRecord};
use super::filter::FilterCriteria;
use super::ingest::{IngestError, IngestSummary, VoterImporter};
use super::report::{
    paginate, ElectionOption, FilterOptions, PageError, PageSelector, VoterGraphs, VoterPage,
};
use super::store::{StoreError, VoterStore};

/// Scores offered by the filter form.
pub const SELECTABLE_SCORES: [u32; 6] = [0, 1, 2, 3, 4, 5];

/// Service composing the importer, the record store, and the reports.
#[derive(Debug)]
pub struct VoterAnalyticsService<S> {
    store: Arc<S>,
}

impl<S> VoterAnalyticsService<S>
where
    S: VoterStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Replace every stored voter with the contents of `path`.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<IngestSummary, IngestError> {
        VoterImporter::from_path(self.store.as_ref(), path)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<IngestSummary, IngestError> {
        VoterImporter::from_reader(self.store.as_ref(), reader)
    }

    /// One sorted page of the voters matching `criteria`.
    pub fn list(
        &self,
        criteria: &FilterCriteria,
        page: PageSelector,
        page_size: usize,
    ) -> Result<VoterPage, VoterServiceError> {
        let voters = self.store.filter(criteria)?;
        Ok(paginate(voters, page, page_size)?)
    }

    pub fn detail(&self, id: VoterId) -> Result<VoterRecord, VoterServiceError> {
        self.store
            .fetch(id)?
            .ok_or(VoterServiceError::NotFound(id))
    }

    pub fn graphs(&self, criteria: &FilterCriteria) -> Result<VoterGraphs, VoterServiceError> {
        let voters = self.store.filter(criteria)?;
        Ok(VoterGraphs::from_voters(&voters))
    }

    /// Choices for the filter form, drawn from every stored voter.
    pub fn filter_options(&self) -> Result<FilterOptions, VoterServiceError> {
        let voters = self.store.filter(&FilterCriteria::default())?;

        let parties: BTreeSet<_> = voters
            .iter()
            .map(|voter| voter.party_affiliation.clone())
            .collect();
        let birth_years: BTreeSet<i32> = voters.iter().filter_map(VoterRecord::birth_year).collect();

        Ok(FilterOptions {
            parties: parties.into_iter().collect(),
            birth_years: birth_years.into_iter().rev().collect(),
            scores: SELECTABLE_SCORES.to_vec(),
            elections: Election::ordered()
                .into_iter()
                .map(|election| ElectionOption {
                    key: election.key(),
                    label: election.label(),
                })
                .collect(),
        })
    }

    pub fn count(&self) -> Result<usize, VoterServiceError> {
        Ok(self.store.count()?)
    }
}

/// Error raised by the voter service.
#[derive(Debug, thiserror::Error)]
pub enum VoterServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("voter {0} not found")]
    NotFound(VoterId),
}
