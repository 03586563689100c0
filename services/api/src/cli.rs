use crate::report::{run_evaluate, EvaluateArgs};
use crate::server;
use art_eligibility::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ART Eligibility",
    about = "Classify patients on ART for more than the PVLS threshold, from the command line or over HTTP",
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
    /// Evaluate a cohort from CSV exports and print the classification
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// CSV export of ART start dates (patient_id,art_start_date) to serve from
    #[arg(long, requires = "obs_csv")]
    pub(crate) art_csv: Option<PathBuf>,
    /// CSV export of observations to serve from
    #[arg(long, requires = "art_csv")]
    pub(crate) obs_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["art-eligibility"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_requires_both_exports() {
        let err = Cli::try_parse_from(["art-eligibility", "serve", "--art-csv", "art.csv"])
            .expect_err("observations export required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn evaluate_accepts_cohort_and_reference_date() {
        let cli = Cli::try_parse_from([
            "art-eligibility",
            "evaluate",
            "--art-csv",
            "art.csv",
            "--obs-csv",
            "obs.csv",
            "--now",
            "2021-06-30",
            "--cohort",
            "4",
            "--cohort",
            "9",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.cohort, vec![4, 9]);
                assert!(args.json);
                assert!(args.now.is_some());
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }
}
