mod listing;
mod summary;
pub mod views;

pub use listing::{paginate, parse_page, PageError, PageSelector};
pub use summary::{birth_year_histogram, election_participation, party_breakdown};
pub use views::{
    BirthYearBucket, ElectionOption, ElectionParticipation, FilterOptions, PartyShare,
    VoterGraphs, VoterPage,
};
