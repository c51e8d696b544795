use crate::commands::{run_indices, run_score, run_table, IndicesArgs, ScoreArgs, TableArgs};
use crate::server;
use bioscore::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bioscore",
    about = "Score the biodiversity of conservation project regions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and scoring form (default command)
    Serve(ServeArgs),
    /// Score a single project year from index observations
    Score(ScoreArgs),
    /// Score a range of years and print the per-year table
    Table(TableArgs),
    /// List the indices the engine accepts
    Indices(IndicesArgs),
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
        Command::Score(args) => run_score(args),
        Command::Table(args) => run_table(args),
        Command::Indices(args) => run_indices(args),
    }
}
