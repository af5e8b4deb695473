use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier for a voter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(pub u64);

impl VoterId {
    /// Placeholder carried by parsed rows until the store assigns a real id.
    pub const UNASSIGNED: Self = Self(0);
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-character party code. Always upper-case and exactly two characters wide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyCode(String);

impl PartyCode {
    pub const WIDTH: usize = 2;

    /// Upper-cases, truncates to two characters, and right-pads with spaces.
    pub fn normalize(raw: &str) -> Self {
        let mut code: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .take(Self::WIDTH)
            .collect();
        while code.chars().count() < Self::WIDTH {
            code.push(' ');
        }
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Trimmed code for display, or `(blank)` when the voter has no party.
    pub fn label(&self) -> String {
        if self.is_blank() {
            BLANK_PARTY_LABEL.to_string()
        } else {
            self.0.trim().to_string()
        }
    }
}

impl Default for PartyCode {
    fn default() -> Self {
        Self::normalize("")
    }
}

impl fmt::Display for PartyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const BLANK_PARTY_LABEL: &str = "(blank)";

/// Elections tracked by the participation flags on each voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Election {
    State2020,
    Town2021,
    Primary2021,
    General2022,
    Town2023,
}

impl Election {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::State2020,
            Self::Town2021,
            Self::Primary2021,
            Self::General2022,
            Self::Town2023,
        ]
    }

    /// Column and query-parameter name for the flag.
    pub const fn key(self) -> &'static str {
        match self {
            Self::State2020 => "v20state",
            Self::Town2021 => "v21town",
            Self::Primary2021 => "v21primary",
            Self::General2022 => "v22general",
            Self::Town2023 => "v23town",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::State2020 => "2020 State",
            Self::Town2021 => "2021 Town",
            Self::Primary2021 => "2021 Primary",
            Self::General2022 => "2022 General",
            Self::Town2023 => "2023 Town",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|election| election.key().eq_ignore_ascii_case(key.trim()))
    }
}

/// Participation flags, one per [`Election`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionHistory {
    pub v20state: bool,
    pub v21town: bool,
    pub v21primary: bool,
    pub v22general: bool,
    pub v23town: bool,
}

impl ElectionHistory {
    pub fn voted_in(&self, election: Election) -> bool {
        match election {
            Election::State2020 => self.v20state,
            Election::Town2021 => self.v21town,
            Election::Primary2021 => self.v21primary,
            Election::General2022 => self.v22general,
            Election::Town2023 => self.v23town,
        }
    }

    pub fn set(&mut self, election: Election, voted: bool) {
        let slot = match election {
            Election::State2020 => &mut self.v20state,
            Election::Town2021 => &mut self.v21town,
            Election::Primary2021 => &mut self.v21primary,
            Election::General2022 => &mut self.v22general,
            Election::Town2023 => &mut self.v23town,
        };
        *slot = voted;
    }
}

/// One registered voter as stored after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub id: VoterId,
    pub first_name: String,
    pub last_name: String,
    pub street_number: String,
    pub street_name: String,
    pub apartment_number: Option<String>,
    pub zip_code: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_registration: Option<NaiveDate>,
    pub party_affiliation: PartyCode,
    pub precinct_number: String,
    #[serde(flatten)]
    pub elections: ElectionHistory,
    pub voter_score: u32,
}

impl VoterRecord {
    pub fn birth_year(&self) -> Option<i32> {
        self.date_of_birth.map(|date| date.year())
    }

    pub fn voted_in(&self, election: Election) -> bool {
        self.elections.voted_in(election)
    }
}

impl fmt::Display for VoterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {}, Precinct {}",
            self.first_name,
            self.last_name,
            self.street_number,
            self.street_name,
            self.precinct_number
        )
    }
}
