use crate::demo::{run_demo, DemoArgs};
use crate::leads::{run_list, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_intake::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Tutoring Lead Intake",
    about = "Serve and inspect contact requests from the tutoring website",
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
    /// Inspect persisted contact requests
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },
    /// Walk a contact form through local validation, submission, and listing
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LeadsCommand {
    /// Print every stored contact request in insertion order
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Persist leads to this JSON-lines file instead of memory
    #[arg(long)]
    pub(crate) store_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Leads {
            command: LeadsCommand::List(args),
        } => run_list(args),
        Command::Demo(args) => run_demo(args),
    }
}
