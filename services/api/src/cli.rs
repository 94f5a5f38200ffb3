use crate::listing::{run_question_listing, QuestionListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use polls::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Polls",
    about = "Serve the polls site or inspect a question seed from the command line",
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
    /// Inspect questions loaded from a seed file
    Questions {
        #[command(subcommand)]
        command: QuestionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QuestionsCommand {
    /// Print the index listing as it would appear at a given moment
    List(QuestionListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// CSV of questions to load at startup (overrides POLLS_SEED_PATH)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Questions {
            command: QuestionsCommand::List(args),
        } => run_question_listing(args),
    }
}
