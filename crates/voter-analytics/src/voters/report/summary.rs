use super::super::domain::{Election, PartyCode, VoterRecord};
use super::views::{BirthYearBucket, ElectionParticipation, PartyShare, VoterGraphs};
use std::collections::BTreeMap;

/// Voters per birth year, ascending. Voters without a birth date are left out.
pub fn birth_year_histogram(voters: &[VoterRecord]) -> Vec<BirthYearBucket> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for year in voters.iter().filter_map(VoterRecord::birth_year) {
        *counts.entry(year).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(year, count)| BirthYearBucket { year, count })
        .collect()
}

/// Voters per party code, ordered by code.
pub fn party_breakdown(voters: &[VoterRecord]) -> Vec<PartyShare> {
    let mut counts: BTreeMap<&PartyCode, usize> = BTreeMap::new();
    for voter in voters {
        *counts.entry(&voter.party_affiliation).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(party, count)| PartyShare {
            party: party.clone(),
            label: party.label(),
            count,
        })
        .collect()
}

pub fn election_participation(voters: &[VoterRecord]) -> Vec<ElectionParticipation> {
    Election::ordered()
        .into_iter()
        .map(|election| ElectionParticipation {
            election,
            label: election.label(),
            count: voters
                .iter()
                .filter(|voter| voter.voted_in(election))
                .count(),
        })
        .collect()
}

impl VoterGraphs {
    pub fn from_voters(voters: &[VoterRecord]) -> Self {
        Self {
            total: voters.len(),
            birth_years: birth_year_histogram(voters),
            parties: party_breakdown(voters),
            elections: election_participation(voters),
        }
    }
}
