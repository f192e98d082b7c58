pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use adops_core::config::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::list::ListArgs;

#[derive(Debug, Parser)]
#[command(
    name = "adops",
    about = "AdOps console operator CLI",
    long_about = "Inspect configuration, browse the mock ad-ops tables with filters, and move HUR requests through their approval pipeline.",
    after_help = "Examples:\n  adops config\n  adops list campaigns --search fandom --sort investment --desc\n  adops hur advance HUR-2025-001"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Explicit config file (adops.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "List a table with search, multi-select, date range, flag, and sort options")]
    List(ListArgs),
    #[command(about = "Inspect and act on Historical Update Requests")]
    Hur {
        #[command(subcommand)]
        action: HurCommand,
    },
}

#[derive(Debug, Subcommand)]
enum HurCommand {
    #[command(about = "Show a request with formatted amounts and its next status")]
    Show { id: String },
    #[command(about = "Move a request to the next status of the pipeline")]
    Advance { id: String },
    #[command(about = "Reject a request that is still in Review")]
    Reject { id: String },
    #[command(name = "more-info", about = "Ask the requester for more information")]
    MoreInfo {
        id: String,
        #[arg(long, help = "Question recorded on the request")]
        comments: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Config => commands::config::run(options),
        Command::List(args) => commands::list::run(&args, options),
        Command::Hur { action } => match action {
            HurCommand::Show { id } => commands::hur::show(&id, options),
            HurCommand::Advance { id } => commands::hur::advance(&id, options),
            HurCommand::Reject { id } => commands::hur::reject(&id, options),
            HurCommand::MoreInfo { id, comments } => {
                commands::hur::more_info(&id, &comments, options)
            }
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout carries only the JSON payload.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        eprintln!("logging was already initialized: {error}");
    }
}
