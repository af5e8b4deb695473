use crate::infra::FilterArgs;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voter_analytics::config::AppConfig;
use voter_analytics::error::AppError;
use voter_analytics::voters::{
    FilterCriteria, GroupField, InMemoryVoterStore, IngestSummary, VoterAnalyticsService,
    VoterGraphs, VoterPage, VoterStore,
};

#[derive(Args, Debug, Default)]
pub(crate) struct LoadArgs {
    /// Voter CSV export (defaults to APP_VOTER_CSV)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Print every skipped row with its reason
    #[arg(long)]
    pub(crate) show_errors: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Voter CSV export (defaults to APP_VOTER_CSV)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Page to print (1-based)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Voter CSV export (defaults to APP_VOTER_CSV)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Also break the matches down by precinct
    #[arg(long)]
    pub(crate) by_precinct: bool,
}

type Service = VoterAnalyticsService<InMemoryVoterStore>;

pub(crate) fn run_load(args: LoadArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.csv.unwrap_or(config.ingest.csv_path);
    let (_, summary) = load_service(&path)?;
    render_load_summary(&path, &summary, args.show_errors);
    Ok(())
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.csv.unwrap_or(config.ingest.csv_path);
    let (service, _) = load_service(&path)?;

    let criteria = args.filters.criteria();
    let page = service.list(&criteria, args.page.into(), config.ingest.page_size)?;
    render_page(&criteria, &page);
    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.csv.unwrap_or(config.ingest.csv_path);
    let (service, _) = load_service(&path)?;

    let criteria = args.filters.criteria();
    let graphs = service.graphs(&criteria)?;
    render_graphs(&criteria, &graphs);

    if args.by_precinct {
        let precincts = service
            .store()
            .group_by(&criteria, GroupField::PrecinctNumber)
            .map_err(voter_analytics::voters::VoterServiceError::from)?;
        println!("\nVoters by precinct");
        for (precinct, count) in precincts {
            println!("- Precinct {precinct}: {count}");
        }
    }

    Ok(())
}

pub(crate) fn load_service(path: &Path) -> Result<(Service, IngestSummary), AppError> {
    let service = VoterAnalyticsService::new(Arc::new(InMemoryVoterStore::default()));
    let summary = service.load_path(path)?;
    Ok((service, summary))
}

fn describe(criteria: &FilterCriteria) -> String {
    if criteria.is_empty() {
        "all voters".to_string()
    } else {
        criteria.query_string()
    }
}

pub(crate) fn render_load_summary(path: &Path, summary: &IngestSummary, show_errors: bool) {
    println!(
        "Loaded {} voters from {} ({} skipped)",
        summary.loaded,
        path.display(),
        summary.skipped
    );

    if show_errors {
        for error in &summary.errors {
            println!("- {error}");
        }
    }
}

pub(crate) fn render_page(criteria: &FilterCriteria, page: &VoterPage) {
    println!("Voters matching {}", describe(criteria));
    println!(
        "Page {}/{} ({} total)",
        page.page, page.total_pages, page.total_records
    );

    for voter in &page.voters {
        let birth = voter
            .date_of_birth
            .map(|date| date.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "- #{} {} | born {} | party {} | score {}",
            voter.id,
            voter,
            birth,
            voter.party_affiliation.label(),
            voter.voter_score
        );
    }
}

pub(crate) fn render_graphs(criteria: &FilterCriteria, graphs: &VoterGraphs) {
    println!("Voter summary for {} ({} voters)", describe(criteria), graphs.total);

    println!("\nVoters by birth year");
    if graphs.birth_years.is_empty() {
        println!("- none with a recorded birth date");
    }
    for bucket in &graphs.birth_years {
        println!("- {}: {}", bucket.year, bucket.count);
    }

    println!("\nVoters by party");
    for share in &graphs.parties {
        println!("- {}: {}", share.label, share.count);
    }

    println!("\nElection participation");
    for entry in &graphs.elections {
        println!("- {}: {}", entry.label, entry.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_service_reads_csv_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Last Name,First Name,Precinct Number,voter_score").expect("write");
        writeln!(file, "Reyes,Ana,4,2").expect("write");
        writeln!(file, "Stone,Ben,4,x").expect("write");

        let path = file.path().to_path_buf();
        let (service, summary) = load_service(&path).expect("loads");
        assert_eq!((summary.loaded, summary.skipped), (1, 1));

        let groups = service
            .store()
            .group_by(&FilterCriteria::default(), GroupField::PrecinctNumber)
            .expect("group");
        assert_eq!(groups.get("4"), Some(&1));
    }

    #[test]
    fn load_service_propagates_missing_source() {
        let error = load_service(&PathBuf::from("./missing.csv")).expect_err("missing file");
        assert!(matches!(
            error,
            AppError::Ingest(voter_analytics::voters::IngestError::SourceNotFound { .. })
        ));
    }
}
