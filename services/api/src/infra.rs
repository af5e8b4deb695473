use clap::Args;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use voter_analytics::voters::{Election, FilterCriteria};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Filter flags shared by the `list` and `report` commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FilterArgs {
    /// Party code, e.g. D, R, or U
    #[arg(long)]
    pub(crate) party: Option<String>,
    /// Earliest birth year to include
    #[arg(long)]
    pub(crate) min_birth_year: Option<i32>,
    /// Latest birth year to include
    #[arg(long)]
    pub(crate) max_birth_year: Option<i32>,
    /// Exact voter score
    #[arg(long)]
    pub(crate) score: Option<u32>,
    /// Require participation in an election (v20state, v21town, v21primary, v22general, v23town)
    #[arg(long = "election", value_parser = parse_election)]
    pub(crate) elections: Vec<Election>,
}

impl FilterArgs {
    pub(crate) fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::default();
        if let Some(party) = self.party.as_deref().filter(|party| !party.is_empty()) {
            criteria = criteria.with_party(party);
        }
        if let Some(year) = self.min_birth_year {
            criteria = criteria.with_min_birth_year(year);
        }
        if let Some(year) = self.max_birth_year {
            criteria = criteria.with_max_birth_year(year);
        }
        if let Some(score) = self.score {
            criteria = criteria.with_score(score);
        }
        for election in &self.elections {
            criteria = criteria.requiring(*election);
        }
        criteria
    }
}

pub(crate) fn parse_election(raw: &str) -> Result<Election, String> {
    Election::from_key(raw).ok_or_else(|| {
        let known: Vec<&str> = Election::ordered().iter().map(|e| e.key()).collect();
        format!("unknown election '{raw}' (expected one of {})", known.join(", "))
    })
}
