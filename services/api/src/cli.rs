use crate::batch::{run_score, run_template, ScoreArgs, TemplateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use site_scoring::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Site Scoring",
    about = "Score candidate PV, storage and charging locations over HTTP or from the command line",
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
    /// Score a CSV or Excel file and print or export the ranking
    Score(ScoreArgs),
    /// Write an input template or a mock workbook
    Template(TemplateArgs),
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
        Command::Template(args) => run_template(args),
    }
}
