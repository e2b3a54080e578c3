//! CLI entrypoint for gaia
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod context;
mod handlers;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use gaia_presentation::{Cli, Command, ConsoleFormatter};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", ConsoleFormatter::error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Starting gaia");

    let Some(command) = cli.resolved_command() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    match command {
        Command::Ask(args) => handlers::ask(cli, &args).await,
        Command::Chat(args) => handlers::chat(cli, &args).await,
        Command::Investigate(args) => handlers::investigate(cli, &args).await,
        Command::Tool(args) => handlers::tool(cli, &args).await,
        Command::Cache(command) => handlers::cache(cli, &command).await,
        Command::Config(command) => handlers::config(cli, &command),
        Command::Version => Ok(handlers::version()),
    }
}
