use crate::commands::{run_list, run_load, run_report, ListArgs, LoadArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use voter_analytics::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Voter Analytics",
    about = "Load, browse, and chart municipal voter-roll exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Load a voter CSV and report how many rows were stored or skipped
    Load(LoadArgs),
    /// Print one page of voters matching the filters
    List(ListArgs),
    /// Print birth-year, party, and election participation summaries
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Load(args) => run_load(args),
        Command::List(args) => run_list(args),
        Command::Report(args) => run_report(args),
    }
}
