mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{delta, history, maintain, posts, proposals, query, rules, Context};
use crate::error::{exit_code_for, report_error};
use tagsync_config as config;
use tagsync_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "tagsync", version, about = "tagsync CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical API string of a tag change
    Delta(delta::DeltaArgs),
    #[command(subcommand)]
    Rule(rules::RuleCommand),
    #[command(subcommand)]
    Post(posts::PostCommand),
    /// Run a boolean tag expression against the local mirror
    Query(query::QueryArgs),
    /// Evaluate every rule against every mirrored post
    Maintain(maintain::MaintainArgs),
    #[command(subcommand)]
    Proposals(proposals::ProposalCommand),
    #[command(subcommand)]
    History(history::HistoryCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Delta(args) => delta::print_delta(json, args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
                    Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }
            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
            debug!(path = %db_path.display(), "database path resolved");

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
            };

            match command {
                Command::Rule(cmd) => match cmd {
                    rules::RuleCommand::Add(args) => rules::add_rule(&ctx, args),
                    rules::RuleCommand::Ls(args) => rules::list_rules(&ctx, args),
                    rules::RuleCommand::Rm(args) => rules::remove_rule(&ctx, args),
                    rules::RuleCommand::Autofix(args) => rules::set_autofix(&ctx, args),
                },
                Command::Post(cmd) => match cmd {
                    posts::PostCommand::Set(args) => posts::set_post(&ctx, args),
                    posts::PostCommand::Show(args) => posts::show_post(&ctx, args),
                    posts::PostCommand::Tag(args) => posts::tag_post(&ctx, args),
                    posts::PostCommand::Toggle(args) => posts::toggle_post(&ctx, args),
                    posts::PostCommand::Rm(args) => posts::remove_post(&ctx, args),
                },
                Command::Query(args) => query::run_query(&ctx, args),
                Command::Maintain(args) => maintain::maintain(&ctx, args),
                Command::Proposals(cmd) => match cmd {
                    proposals::ProposalCommand::Ls(args) => proposals::list_proposals(&ctx, args),
                    proposals::ProposalCommand::Commit(args) => {
                        proposals::commit_proposals(&ctx, args)
                    }
                    proposals::ProposalCommand::Dismiss(args) => {
                        proposals::dismiss_proposal(&ctx, args)
                    }
                },
                Command::History(cmd) => match cmd {
                    history::HistoryCommand::Ls(args) => history::list_history(&ctx, args),
                    history::HistoryCommand::Prune(args) => history::prune_history(&ctx, args),
                },
                Command::Delta(_) => unreachable!("delta command handled before store initialization"),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
