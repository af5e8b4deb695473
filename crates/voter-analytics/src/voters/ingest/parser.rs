use super::normalizer::{clean_text, optional_text, parse_date, parse_flag, parse_score};
use super::RowParseError;
use crate::voters::domain::{Election, ElectionHistory, PartyCode, VoterId, VoterRecord};
use csv::StringRecord;
use std::collections::HashMap;

/// Columns read from a voter export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum VoterColumn {
    LastName,
    FirstName,
    StreetNumber,
    StreetName,
    ApartmentNumber,
    ZipCode,
    DateOfBirth,
    DateOfRegistration,
    PartyAffiliation,
    PrecinctNumber,
    Participation(Election),
    VoterScore,
}

impl VoterColumn {
    const ALL: [Self; 16] = [
        Self::LastName,
        Self::FirstName,
        Self::StreetNumber,
        Self::StreetName,
        Self::ApartmentNumber,
        Self::ZipCode,
        Self::DateOfBirth,
        Self::DateOfRegistration,
        Self::PartyAffiliation,
        Self::PrecinctNumber,
        Self::Participation(Election::State2020),
        Self::Participation(Election::Town2021),
        Self::Participation(Election::Primary2021),
        Self::Participation(Election::General2022),
        Self::Participation(Election::Town2023),
        Self::VoterScore,
    ];

    pub(crate) const fn header(self) -> &'static str {
        match self {
            Self::LastName => "Last Name",
            Self::FirstName => "First Name",
            Self::StreetNumber => "Residential Address - Street Number",
            Self::StreetName => "Residential Address - Street Name",
            Self::ApartmentNumber => "Residential Address - Apartment Number",
            Self::ZipCode => "Residential Address - Zip Code",
            Self::DateOfBirth => "Date of Birth",
            Self::DateOfRegistration => "Date of Registration",
            Self::PartyAffiliation => "Party Affiliation",
            Self::PrecinctNumber => "Precinct Number",
            Self::Participation(election) => election.key(),
            Self::VoterScore => "voter_score",
        }
    }

    /// Position in legacy exports, which lead with a `Voter ID Number` column.
    const fn legacy_position(self) -> usize {
        match self {
            Self::LastName => 1,
            Self::FirstName => 2,
            Self::StreetNumber => 3,
            Self::StreetName => 4,
            Self::ApartmentNumber => 5,
            Self::ZipCode => 6,
            Self::DateOfBirth => 7,
            Self::DateOfRegistration => 8,
            Self::PartyAffiliation => 9,
            Self::PrecinctNumber => 10,
            Self::Participation(Election::State2020) => 11,
            Self::Participation(Election::Town2021) => 12,
            Self::Participation(Election::Primary2021) => 13,
            Self::Participation(Election::General2022) => 14,
            Self::Participation(Election::Town2023) => 15,
            Self::VoterScore => 16,
        }
    }
}

/// How columns are located in each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnLayout {
    /// Columns found by header name. Columns the header lacks read as empty.
    Named {
        positions: HashMap<VoterColumn, usize>,
        width: usize,
    },
    /// Header names none of the known columns; fall back to fixed positions.
    Legacy,
}

impl ColumnLayout {
    pub(crate) fn resolve(headers: &StringRecord) -> Self {
        let cleaned: Vec<String> = headers.iter().map(clean_header).collect();

        let positions: HashMap<VoterColumn, usize> = VoterColumn::ALL
            .into_iter()
            .filter_map(|column| {
                cleaned
                    .iter()
                    .position(|header| header == column.header())
                    .map(|index| (column, index))
            })
            .collect();

        if positions.is_empty() {
            Self::Legacy
        } else {
            Self::Named {
                positions,
                width: cleaned.len(),
            }
        }
    }

    pub(crate) fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    fn check_width(&self, record: &StringRecord, line: u64) -> Result<(), RowParseError> {
        match self {
            Self::Named { width, .. } if record.len() != *width => Err(RowParseError::Malformed {
                line,
                reason: format!("expected {width} fields, found {}", record.len()),
            }),
            _ => Ok(()),
        }
    }

    fn field<'r>(
        &self,
        record: &'r StringRecord,
        column: VoterColumn,
        line: u64,
    ) -> Result<&'r str, RowParseError> {
        match self {
            Self::Named { positions, .. } => Ok(positions
                .get(&column)
                .and_then(|index| record.get(*index))
                .unwrap_or("")),
            Self::Legacy => {
                record
                    .get(column.legacy_position())
                    .ok_or(RowParseError::MissingColumn {
                        line,
                        column: column.header(),
                    })
            }
        }
    }
}

fn clean_header(value: &str) -> String {
    value.replace('\u{feff}', "").trim().to_string()
}

/// Normalizes one CSV row. The returned record carries [`VoterId::UNASSIGNED`]
/// until the store inserts it.
pub(crate) fn parse_row(
    layout: &ColumnLayout,
    record: &StringRecord,
    line: u64,
) -> Result<VoterRecord, RowParseError> {
    layout.check_width(record, line)?;
    let field = |column: VoterColumn| layout.field(record, column, line);

    let raw_score = field(VoterColumn::VoterScore)?;
    let voter_score = parse_score(raw_score).ok_or_else(|| RowParseError::InvalidScore {
        line,
        value: raw_score.trim().to_string(),
    })?;

    let mut elections = ElectionHistory::default();
    for election in Election::ordered() {
        elections.set(
            election,
            parse_flag(field(VoterColumn::Participation(election))?),
        );
    }

    Ok(VoterRecord {
        id: VoterId::UNASSIGNED,
        first_name: clean_text(field(VoterColumn::FirstName)?),
        last_name: clean_text(field(VoterColumn::LastName)?),
        street_number: clean_text(field(VoterColumn::StreetNumber)?),
        street_name: clean_text(field(VoterColumn::StreetName)?),
        apartment_number: optional_text(field(VoterColumn::ApartmentNumber)?),
        zip_code: clean_text(field(VoterColumn::ZipCode)?),
        date_of_birth: parse_date(field(VoterColumn::DateOfBirth)?),
        date_of_registration: parse_date(field(VoterColumn::DateOfRegistration)?),
        party_affiliation: PartyCode::normalize(field(VoterColumn::PartyAffiliation)?),
        precinct_number: clean_text(field(VoterColumn::PrecinctNumber)?),
        elections,
        voter_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Voter ID Number,Last Name,First Name,Residential Address - Street Number,Residential Address - Street Name,Residential Address - Apartment Number,Residential Address - Zip Code,Date of Birth,Date of Registration,Party Affiliation,Precinct Number,v20state,v21town,v21primary,v22general,v23town,voter_score";

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn header_record(line: &str) -> StringRecord {
        record(&line.split(',').collect::<Vec<_>>())
    }

    #[test]
    fn resolves_named_layout_with_padded_headers() {
        let headers = record(&["\u{feff} Last Name ", " voter_score", "Date of Birth "]);
        let layout = ColumnLayout::resolve(&headers);
        match layout {
            ColumnLayout::Named { positions, width } => {
                assert_eq!(width, 3);
                assert_eq!(positions.get(&VoterColumn::LastName), Some(&0));
                assert_eq!(positions.get(&VoterColumn::VoterScore), Some(&1));
                assert_eq!(positions.get(&VoterColumn::DateOfBirth), Some(&2));
            }
            ColumnLayout::Legacy => panic!("expected named layout"),
        }
    }

    #[test]
    fn unknown_headers_fall_back_to_legacy_positions() {
        let layout = ColumnLayout::resolve(&record(&["id", "surname", "given"]));
        assert!(layout.is_legacy());
    }

    #[test]
    fn parses_full_row_by_header_name() {
        let layout = ColumnLayout::resolve(&header_record(HEADER));
        let row = record(&[
            "10001", " Smith ", "Jane", "12", "Walnut St", "", "02459", "01/15/1990",
            "2012-03-04", "d", "3", "TRUE", "no", "Y", "1", "", "3",
        ]);
        let voter = parse_row(&layout, &row, 2).expect("row parses");

        assert_eq!(voter.id, VoterId::UNASSIGNED);
        assert_eq!(voter.last_name, "Smith");
        assert_eq!(voter.apartment_number, None);
        assert_eq!(voter.zip_code, "02459");
        assert_eq!(
            voter.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 1, 15)
        );
        assert_eq!(
            voter.date_of_registration,
            NaiveDate::from_ymd_opt(2012, 3, 4)
        );
        assert_eq!(voter.party_affiliation.as_str(), "D ");
        assert!(voter.voted_in(Election::State2020));
        assert!(!voter.voted_in(Election::Town2021));
        assert!(voter.voted_in(Election::Primary2021));
        assert!(voter.voted_in(Election::General2022));
        assert!(!voter.voted_in(Election::Town2023));
        assert_eq!(voter.voter_score, 3);
    }

    #[test]
    fn reordered_headers_are_matched_by_name() {
        let layout = ColumnLayout::resolve(&record(&["voter_score", "First Name", "Last Name"]));
        let voter = parse_row(&layout, &record(&["", "Ada", "Lovelace"]), 2).expect("parses");
        assert_eq!(voter.first_name, "Ada");
        assert_eq!(voter.last_name, "Lovelace");
        assert_eq!(voter.voter_score, 0);
        assert_eq!(voter.party_affiliation.as_str(), "  ");
        assert_eq!(voter.date_of_birth, None);
    }

    #[test]
    fn invalid_score_is_a_row_error() {
        let layout = ColumnLayout::resolve(&record(&["Last Name", "voter_score"]));
        let error = parse_row(&layout, &record(&["Smith", "high"]), 3).expect_err("bad score");
        assert_eq!(
            error,
            RowParseError::InvalidScore {
                line: 3,
                value: "high".to_string()
            }
        );
    }

    #[test]
    fn named_rows_with_wrong_width_are_malformed() {
        let layout = ColumnLayout::resolve(&record(&["Last Name", "voter_score"]));
        let error = parse_row(&layout, &record(&["Smith"]), 4).expect_err("short row");
        assert!(matches!(error, RowParseError::Malformed { line: 4, .. }));
    }

    #[test]
    fn legacy_rows_read_fixed_positions() {
        let layout = ColumnLayout::Legacy;
        let row = record(&[
            "1", "Doe", "John", "5", "Elm", "3", "02460", "1950-07-04", "", "R", "7", "", "",
            "", "", "yes", "1",
        ]);
        let voter = parse_row(&layout, &row, 2).expect("legacy row parses");
        assert_eq!(voter.last_name, "Doe");
        assert_eq!(voter.apartment_number.as_deref(), Some("3"));
        assert_eq!(voter.party_affiliation.as_str(), "R ");
        assert!(voter.voted_in(Election::Town2023));
        assert_eq!(voter.voter_score, 1);
    }

    #[test]
    fn short_legacy_rows_report_missing_column() {
        let error = parse_row(&ColumnLayout::Legacy, &record(&["1", "Doe"]), 5)
            .expect_err("short legacy row");
        assert_eq!(
            error,
            RowParseError::MissingColumn {
                line: 5,
                column: "voter_score"
            }
        );
    }
}
