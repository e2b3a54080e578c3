//! One function per subcommand.

use crate::context::AppContext;
use anyhow::{Context, Result, bail};
use chrono::SecondsFormat;
use gaia_application::{
    OperatorError, RunAskError, RunAskInput, RunOperatorInput, RunToolActionInput,
    ToolActionError, ToolActionOutcome,
};
use gaia_domain::{ChatHistory, DEFAULT_ROLE};
use gaia_infrastructure::{ConfigEditor, ConfigLoader, FileCache};
use gaia_presentation::{
    AskArgs, CacheCommand, ChatArgs, ChatRepl, Cli, ConfigCommand, ConsoleFormatter,
    InvestigateArgs, OperatorProgressReporter, StreamingPrinter, ToolCommandArgs,
    compose_message, read_piped_stdin,
};
use std::process::ExitCode;

/// Exit status after Ctrl-C, as a shell reports SIGINT
const EXIT_CANCELLED: u8 = 130;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const COMMIT: &str = match option_env!("GAIA_COMMIT") {
    Some(commit) => commit,
    None => "none",
};
const BUILD_DATE: &str = match option_env!("GAIA_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

fn cancelled() -> ExitCode {
    eprintln!("Cancelled.");
    ExitCode::from(EXIT_CANCELLED)
}

pub async fn ask(cli: &Cli, args: &AskArgs) -> Result<ExitCode> {
    let piped = read_piped_stdin();
    let message = compose_message(piped.as_deref(), &args.prompt);
    if message.is_empty() {
        bail!("no message provided. Please provide a message as an argument or via stdin.");
    }

    let ctx = AppContext::load(cli)?;
    ctx.cancel_on_ctrl_c();

    let printer = StreamingPrinter::new().with_role_trace(cli.debug);
    printer.start_spinner();
    let input = RunAskInput::new(message)
        .with_role(args.role.clone())
        .with_cache_mode(ctx.cache_mode);
    let result = ctx
        .ask_use_case()
        .execute_with_progress(input, &mut ChatHistory::new(), &printer)
        .await;
    printer.finish();

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(RunAskError::Cancelled) => Ok(cancelled()),
        Err(e) => Err(e.into()),
    }
}

pub async fn chat(cli: &Cli, args: &ChatArgs) -> Result<ExitCode> {
    // Ctrl-C is read by the line editor; during a reply it ends the process
    let ctx = AppContext::load(cli)?;
    ChatRepl::new(std::sync::Arc::new(ctx.ask_use_case()))
        .with_role(args.role.clone())
        .with_cache_mode(ctx.cache_mode)
        .with_role_trace(cli.debug)
        .run()
        .await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn investigate(cli: &Cli, args: &InvestigateArgs) -> Result<ExitCode> {
    let ctx = AppContext::load(cli)?;
    ctx.cancel_on_ctrl_c();

    let mut policy = ctx.config.operator.to_policy();
    if let Some(max_steps) = args.max_steps {
        policy.max_steps = max_steps;
    }
    let mut guard = ctx.config.operator.to_guard_options();
    guard.dry_run |= args.dry_run;
    guard.yes = args.yes;

    let progress = OperatorProgressReporter::new().with_debug(cli.debug);
    let result = ctx
        .operator_use_case()
        .execute_with_progress(&args.goal_text(), RunOperatorInput::new(policy, guard), &progress)
        .await;

    match result {
        Ok(answer) => {
            println!("{}", answer);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_max_steps() => {
            eprintln!("{}", ConsoleFormatter::warning(&e.to_string()));
            println!("{}", e.partial_answer().unwrap_or_default());
            Ok(ExitCode::SUCCESS)
        }
        Err(OperatorError::Cancelled) => Ok(cancelled()),
        Err(e) => {
            if let Some(partial) = e.partial_answer() {
                println!("{}", partial);
            }
            Err(e.into())
        }
    }
}

pub async fn tool(cli: &Cli, args: &ToolCommandArgs) -> Result<ExitCode> {
    let ctx = AppContext::load(cli)?;
    let Some(recipe) = ctx.config.tools.action(&args.tool, &args.action) else {
        bail!(
            "tool action '{}.{}' is not configured. Use 'gaia config list' to see available tools",
            args.tool,
            args.action
        );
    };
    let mut recipe = recipe.clone();
    if !recipe.role.trim().is_empty() && !ctx.roles.contains(recipe.role.trim()) {
        recipe.role = DEFAULT_ROLE.to_string();
    }
    ctx.cancel_on_ctrl_c();

    let printer = StreamingPrinter::new().with_role_trace(cli.debug);
    printer.start_spinner();
    let input = RunToolActionInput::new(&args.tool, &args.action, recipe)
        .with_args(args.args.clone())
        .with_cache_mode(ctx.cache_mode);
    let result = ctx
        .tool_action_use_case()
        .execute_with_progress(input, &printer)
        .await;
    printer.finish();

    match result {
        Ok(ToolActionOutcome::Declined { .. }) => {
            println!("Cancelled.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(ToolActionOutcome::Executed { .. } | ToolActionOutcome::Printed { .. }) => {
            Ok(ExitCode::SUCCESS)
        }
        Err(ToolActionError::Cancelled) => Ok(cancelled()),
        Err(e) => Err(e.into()),
    }
}

pub async fn cache(cli: &Cli, command: &CacheCommand) -> Result<ExitCode> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;
    let cache = FileCache::new(config.cache.resolved_dir());

    match command {
        CacheCommand::Stats => {
            let stats = cache.stats().await?;
            println!("{}", ConsoleFormatter::cache_stats(stats.entries, stats.size_bytes));
        }
        CacheCommand::List => {
            let listings = cache.list().await?;
            if listings.is_empty() {
                println!("No cache entries found");
            }
            for entry in listings {
                let created = entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
                println!("{}", ConsoleFormatter::cache_row(&entry.key, &created, entry.size_bytes));
            }
        }
        CacheCommand::Clear => {
            let removed = cache.clear().await?;
            println!("{}", ConsoleFormatter::cache_cleared(removed));
        }
        CacheCommand::Dump => {
            let entries = cache.dump().await?;
            if entries.is_empty() {
                println!("No cache entries found");
            }
            for (entry, _) in entries {
                let created = entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
                println!(
                    "{}",
                    ConsoleFormatter::cache_dump_entry(&entry.key, &created, &entry.response)
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn config(cli: &Cli, command: &ConfigCommand) -> Result<ExitCode> {
    let explicit = cli.config.as_deref();
    match command {
        ConfigCommand::List => {
            let config = ConfigLoader::load(explicit)?;
            print!("{}", ConfigEditor::list(&config)?);
        }
        ConfigCommand::Get { key } => {
            let config = ConfigLoader::load(explicit)?;
            println!("{}", ConfigEditor::get(&config, key)?);
        }
        ConfigCommand::Set { key, value } => {
            let path = ConfigLoader::writable_config_path(explicit)?;
            ConfigEditor::set(&path, key, value)?;
            println!("Config setting updated {} to {}", key, value);
        }
        ConfigCommand::Path => {
            println!("{}", ConfigLoader::writable_config_path(explicit)?.display());
            if cli.verbose > 0 {
                for (label, path, exists) in ConfigLoader::config_sources(explicit) {
                    eprintln!(
                        "{}",
                        ConsoleFormatter::config_source(label, &path.display().to_string(), exists)
                    );
                }
            }
        }
        ConfigCommand::Create => {
            let path = ConfigLoader::writable_config_path(explicit)?;
            ConfigEditor::create(&path)?;
            println!("Configuration file ensured at: {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn version() -> ExitCode {
    println!("{}", ConsoleFormatter::version(VERSION, COMMIT, BUILD_DATE));
    ExitCode::SUCCESS
}
