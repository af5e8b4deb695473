//! Voter-roll ingestion, filtering, and reporting.
//!
//! Data flows one way: CSV export -> [`ingest`] -> [`store`] -> [`filter`] ->
//! [`report`] listings and charts. [`service`] ties the pieces together and
//! [`router`] exposes them over HTTP.

pub mod domain;
pub mod filter;
pub mod ingest;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{Election, ElectionHistory, PartyCode, VoterId, VoterRecord};
pub use filter::{CriteriaError, FilterCriteria};
pub use ingest::{IngestError, IngestSummary, IngestSummaryView, RowParseError, VoterImporter};
pub use report::{FilterOptions, PageError, PageSelector, VoterGraphs, VoterPage};
pub use router::{voter_router, VoterRouterSettings};
pub use service::{VoterAnalyticsService, VoterServiceError};
pub use store::{GroupField, InMemoryVoterStore, StoreError, VoterStore};
