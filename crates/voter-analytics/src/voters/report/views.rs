use super::super::domain::{Election, PartyCode, VoterRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearBucket {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyShare {
    pub party: PartyCode,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionParticipation {
    pub election: Election,
    pub label: &'static str,
    pub count: usize,
}

/// The three chart datasets for one filtered voter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoterGraphs {
    pub total: usize,
    pub birth_years: Vec<BirthYearBucket>,
    pub parties: Vec<PartyShare>,
    pub elections: Vec<ElectionParticipation>,
}

/// One page of the voter listing, sorted by last then first name.
#[derive(Debug, Clone, Serialize)]
pub struct VoterPage {
    pub voters: Vec<VoterRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_records: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Values offered by the filter form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub parties: Vec<PartyCode>,
    pub birth_years: Vec<i32>,
    pub scores: Vec<u32>,
    pub elections: Vec<ElectionOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionOption {
    pub key: &'static str,
    pub label: &'static str,
}
