use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::{Election, PartyCode, VoterRecord};

pub const PARTY_PARAM: &str = "party_affiliation";
pub const MIN_BIRTH_YEAR_PARAM: &str = "min_birth_year";
pub const MAX_BIRTH_YEAR_PARAM: &str = "max_birth_year";
pub const SCORE_PARAM: &str = "voter_score";

/// Raised when a request parameter cannot become a criterion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("{field} must be an integer, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Conjunction of optional predicates over voters. The default value matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<PartyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_score: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub elections: BTreeSet<Election>,
}

impl FilterCriteria {
    pub fn with_party(mut self, party: &str) -> Self {
        self.party = Some(PartyCode::normalize(party));
        self
    }

    pub fn with_min_birth_year(mut self, year: i32) -> Self {
        self.min_birth_year = Some(year);
        self
    }

    pub fn with_max_birth_year(mut self, year: i32) -> Self {
        self.max_birth_year = Some(year);
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.voter_score = Some(score);
        self
    }

    pub fn requiring(mut self, election: Election) -> Self {
        self.elections.insert(election);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.party.is_none()
            && self.min_birth_year.is_none()
            && self.max_birth_year.is_none()
            && self.voter_score.is_none()
            && self.elections.is_empty()
    }

    /// Builds criteria from request parameters. Only an empty value leaves a
    /// criterion unset, so a whitespace party selects voters with a blank code.
    /// An election key with any non-empty value requires that flag.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, CriteriaError> {
        let present = |key: &str| {
            params
                .get(key)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        };

        let mut criteria = Self {
            party: present(PARTY_PARAM).map(PartyCode::normalize),
            min_birth_year: present(MIN_BIRTH_YEAR_PARAM)
                .map(|value| parse_number(MIN_BIRTH_YEAR_PARAM, value))
                .transpose()?,
            max_birth_year: present(MAX_BIRTH_YEAR_PARAM)
                .map(|value| parse_number(MAX_BIRTH_YEAR_PARAM, value))
                .transpose()?,
            voter_score: present(SCORE_PARAM)
                .map(|value| parse_number(SCORE_PARAM, value))
                .transpose()?,
            elections: BTreeSet::new(),
        };

        for election in Election::ordered() {
            if present(election.key()).is_some() {
                criteria.elections.insert(election);
            }
        }

        Ok(criteria)
    }

    pub fn matches(&self, voter: &VoterRecord) -> bool {
        if let Some(party) = &self.party {
            if &voter.party_affiliation != party {
                return false;
            }
        }

        if let Some(min_year) = self.min_birth_year {
            if !voter.birth_year().is_some_and(|year| year >= min_year) {
                return false;
            }
        }

        if let Some(max_year) = self.max_birth_year {
            if !voter.birth_year().is_some_and(|year| year <= max_year) {
                return false;
            }
        }

        if let Some(score) = self.voter_score {
            if voter.voter_score != score {
                return false;
            }
        }

        self.elections
            .iter()
            .all(|election| voter.voted_in(*election))
    }

    /// Lazily narrows `voters` to the matching records.
    pub fn apply<'a, I, V>(&'a self, voters: I) -> impl Iterator<Item = V> + 'a
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: 'a,
        V: Borrow<VoterRecord>,
    {
        voters
            .into_iter()
            .filter(move |voter| self.matches(voter.borrow()))
    }

    /// Re-encodes the active criteria as query parameters, omitting paging.
    pub fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(party) = &self.party {
            let code = if party.is_blank() {
                party.as_str()
            } else {
                party.as_str().trim()
            };
            query.append_pair(PARTY_PARAM, code);
        }
        if let Some(year) = self.min_birth_year {
            query.append_pair(MIN_BIRTH_YEAR_PARAM, &year.to_string());
        }
        if let Some(year) = self.max_birth_year {
            query.append_pair(MAX_BIRTH_YEAR_PARAM, &year.to_string());
        }
        if let Some(score) = self.voter_score {
            query.append_pair(SCORE_PARAM, &score.to_string());
        }
        for election in &self.elections {
            query.append_pair(election.key(), "on");
        }
        query.finish()
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, CriteriaError> {
    value.trim().parse().map_err(|_| CriteriaError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
